use crate::models::session::QueryRecord;
use crate::models::visitor::Visitor;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub credits: u32,
    pub total_queries: u32,
    pub history: Vec<QueryRecord>,
}

/// Current visitor's credits and history, oldest entry first.
pub async fn session_info(State(state): State<AppState>, visitor: Visitor) -> Json<SessionView> {
    let handle = state.sessions.get_session(&visitor.id);
    let mut session = handle.lock().await;
    session.touch();

    Json(SessionView {
        credits: session.credits,
        total_queries: session.total_queries,
        history: session.history.clone(),
    })
}
