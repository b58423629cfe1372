use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use service_core::error::AppError;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "predictor-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once the configured provider has an API key to use.
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let provider = state.generator.provider_name();

    if !state.generator.has_credential().await {
        tracing::warn!(provider, "Readiness check failed: API key not configured");
        return Err(AppError::ServiceUnavailable(format!(
            "API key not configured for provider {}",
            provider
        )));
    }

    Ok(Json(json!({ "status": "ready", "provider": provider })))
}
