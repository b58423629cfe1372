use crate::handlers::app::{IndexTemplate, InputMode, Notice};
use crate::models::generation::{GenerationRequest, ImageInput, MIN_TOPIC_CHARS};
use crate::models::visitor::Visitor;
use crate::services::error::GenerationError;
use crate::services::metrics;
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

pub const TOPIC_TOO_SHORT: &str = "Please enter a valid topic (at least 5 characters)";
pub const IMAGE_MISSING: &str = "Please upload an image first";

/// Raw fields of the generation form.
#[derive(Debug, Default)]
pub struct GenerateForm {
    pub mode: InputMode,
    pub topic: String,
    pub image: Option<Vec<u8>>,
}

impl GenerateForm {
    /// Read `mode`, `topic` and `image` fields. Unknown fields are skipped and an
    /// empty file input counts as no upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = GenerateForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("mode") => form.mode = InputMode::parse(&field.text().await?),
                Some("topic") => form.topic = field.text().await?,
                Some("image") => {
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        form.image = Some(bytes.to_vec());
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate the selected input. The topic is sent as typed; only the length
    /// check looks at the trimmed text.
    pub fn to_request(&self) -> Result<GenerationRequest, GenerationError> {
        match self.mode {
            InputMode::Text => {
                validate_topic(&self.topic)?;
                Ok(GenerationRequest::Topic(self.topic.clone()))
            }
            InputMode::Image => match &self.image {
                Some(bytes) => Ok(GenerationRequest::Image(ImageInput::new(bytes.clone()))),
                None => Err(GenerationError::ValidationError(IMAGE_MISSING.to_string())),
            },
        }
    }
}

pub fn validate_topic(topic: &str) -> Result<(), GenerationError> {
    if topic.trim().chars().count() < MIN_TOPIC_CHARS {
        return Err(GenerationError::ValidationError(TOPIC_TOO_SHORT.to_string()));
    }
    Ok(())
}

fn mode_label(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Text => "text",
        InputMode::Image => "image",
    }
}

async fn render(
    state: &AppState,
    visitor: &Visitor,
    status: StatusCode,
    form: &GenerateForm,
    notice: Notice,
    output: Option<String>,
) -> Response {
    let handle = state.sessions.get_session(&visitor.id);
    let session = handle.lock().await;

    let mut page = IndexTemplate::for_session(&session)
        .with_input(form.mode, form.topic.clone())
        .with_notice(notice);
    if let Some(output) = output {
        page = page.with_output(output);
    }

    (status, page).into_response()
}

pub async fn generate(
    State(state): State<AppState>,
    visitor: Visitor,
    multipart: Multipart,
) -> Response {
    let form = match GenerateForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(visitor_id = %visitor.id, error = %e, "Failed to read generation form");
            let status = e.status();
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Upload is too large. Please choose a smaller screenshot.".to_string()
            } else {
                format!("Could not read the submitted form: {}", e.body_text())
            };
            return render(
                &state,
                &visitor,
                status,
                &GenerateForm::default(),
                Notice::error(message),
                None,
            )
            .await;
        }
    };

    let request = match form.to_request() {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(visitor_id = %visitor.id, error = %e, "Generation form rejected");
            metrics::record_generation(mode_label(form.mode), e.outcome());
            let message = e.to_string();
            let status = AppError::from(e).status_code();
            return render(&state, &visitor, status, &form, Notice::warning(message), None).await;
        }
    };

    match state.questions.submit(&visitor.id, &request).await {
        Ok(outcome) => {
            let notice = Notice::success(format!(
                "10 questions generated. {} credits left.",
                outcome.credits_remaining
            ));
            render(&state, &visitor, StatusCode::OK, &form, notice, Some(outcome.text)).await
        }
        Err(e) => {
            let message = e.to_string();
            let status = AppError::from(e).status_code();
            render(&state, &visitor, status, &form, Notice::error(message), None).await
        }
    }
}
