use crate::models::visitor::Visitor;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

/// Latest generated questions as a plain-text attachment.
pub async fn download_latest(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Result<Response, AppError> {
    let handle = state.sessions.get_session(&visitor.id);
    let document = {
        let mut session = handle.lock().await;
        session.touch();
        session.latest.clone()
    };

    let Some(document) = document else {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "No generated questions to download yet"
        )));
    };

    let file_name = document.file_name();
    tracing::info!(
        visitor_id = %visitor.id,
        file_name = %file_name,
        size = document.text.len(),
        "Questions download"
    );

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "text/plain; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        document.text,
    )
        .into_response())
}
