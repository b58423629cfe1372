//! Text generation provider abstraction.
//!
//! The generator talks to a [`TextProvider`]; the Anthropic Messages API is the
//! production backend and [`mock::MockTextProvider`] stands in for tests and
//! offline development.

pub mod anthropic;
pub mod mock;

use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Non-success status from the upstream API. Holds the upstream message.
    #[error("{0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Content of the single user turn.
#[derive(Debug, Clone)]
pub enum UserContent {
    Text(String),
    /// Base64-encoded image followed by a text instruction.
    Image {
        media_type: &'static str,
        data: String,
        instruction: String,
    },
}

/// One generation request, provider-agnostic.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub content: UserContent,
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// First text block of the reply, verbatim.
    pub text: String,

    pub input_tokens: u32,

    pub output_tokens: u32,

    pub stop_reason: Option<String>,
}

/// Trait for text generation providers.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short name used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Send exactly one request. Implementations must not retry.
    async fn generate(
        &self,
        api_key: &Secret<String>,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError>;
}
