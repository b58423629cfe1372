use crate::models::session::InsufficientCredits;
use crate::services::providers::ProviderError;
use service_core::error::AppError;
use thiserror::Error;

/// Why a generation attempt produced no questions. Every kind is terminal.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key not configured. Please add {key} to secrets.")]
    MissingCredential { key: String },

    #[error("API Error: {0}")]
    ApiError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("No credits left! Please add credits to continue.")]
    InsufficientCredits,
}

impl GenerationError {
    /// Metrics label for the `outcome` dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            GenerationError::MissingCredential { .. } => "missing_credential",
            GenerationError::ApiError(_) => "api_error",
            GenerationError::ValidationError(_) => "validation_error",
            GenerationError::InsufficientCredits => "insufficient_credits",
        }
    }
}

impl From<InsufficientCredits> for GenerationError {
    fn from(_: InsufficientCredits) -> Self {
        GenerationError::InsufficientCredits
    }
}

impl From<ProviderError> for GenerationError {
    fn from(err: ProviderError) -> Self {
        GenerationError::ApiError(err.to_string())
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        let message = err.to_string();
        match err {
            GenerationError::MissingCredential { .. } => {
                AppError::ConfigError(anyhow::anyhow!(message))
            }
            GenerationError::ApiError(_) => AppError::BadGateway(message),
            GenerationError::ValidationError(_) => {
                AppError::UnprocessableEntity(anyhow::anyhow!(message))
            }
            GenerationError::InsufficientCredits => AppError::PaymentRequired(message),
        }
    }
}
