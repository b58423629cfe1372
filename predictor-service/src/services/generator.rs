//! Turns a topic or screenshot into one provider request and returns the reply.

use crate::config::GenerationSettings;
use crate::models::generation::GenerationRequest;
use crate::services::credentials::CredentialChain;
use crate::services::error::GenerationError;
use crate::services::metrics;
use crate::services::prompt::{topic_message, IMAGE_INSTRUCTION, SYSTEM_PROMPT};
use crate::services::providers::{ProviderRequest, TextProvider, UserContent};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Progress of a single `generate` call. Each call moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Idle,
    Validating,
    CredentialMissing,
    Sending,
    Succeeded,
    Failed,
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationPhase::Idle => "idle",
            GenerationPhase::Validating => "validating",
            GenerationPhase::CredentialMissing => "credential_missing",
            GenerationPhase::Sending => "sending",
            GenerationPhase::Succeeded => "succeeded",
            GenerationPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

fn enter(phase: GenerationPhase, mode: &str) {
    tracing::debug!(phase = %phase, mode = mode, "Generation phase");
}

pub struct QuestionGenerator {
    provider: Arc<dyn TextProvider>,
    credentials: CredentialChain,
    model: String,
    max_tokens: u32,
}

impl QuestionGenerator {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        credentials: CredentialChain,
        settings: &GenerationSettings,
    ) -> Self {
        Self {
            provider,
            credentials,
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Whether an API key can currently be resolved.
    pub async fn has_credential(&self) -> bool {
        self.credentials.resolve().await.is_some()
    }

    /// Build the provider request: fixed system prompt plus one user turn.
    pub fn build_request(&self, request: &GenerationRequest) -> ProviderRequest {
        let content = match request {
            GenerationRequest::Topic(topic) => UserContent::Text(topic_message(topic)),
            GenerationRequest::Image(image) => UserContent::Image {
                media_type: image.media_type.as_str(),
                data: STANDARD.encode(&image.bytes),
                instruction: IMAGE_INSTRUCTION.to_string(),
            },
        };

        ProviderRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            content,
        }
    }

    /// Resolve the key, send exactly one request and return the reply text
    /// verbatim. Topic validation is the caller's job.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let mode = request.mode();
        enter(GenerationPhase::Idle, mode);
        enter(GenerationPhase::Validating, mode);

        let Some(api_key) = self.credentials.resolve().await else {
            enter(GenerationPhase::CredentialMissing, mode);
            tracing::error!(key = %self.credentials.key(), "API key not configured");
            return Err(GenerationError::MissingCredential {
                key: self.credentials.key().to_string(),
            });
        };

        let provider_request = self.build_request(request);
        enter(GenerationPhase::Sending, mode);

        let started = Instant::now();
        let result = self.provider.generate(&api_key, &provider_request).await;
        let elapsed = started.elapsed();
        metrics::observe_provider_latency(self.provider.name(), elapsed.as_secs_f64());

        match result {
            Ok(response) => {
                enter(GenerationPhase::Succeeded, mode);
                tracing::info!(
                    provider = self.provider.name(),
                    mode = mode,
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    stop_reason = response.stop_reason.as_deref().unwrap_or("-"),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Generation succeeded"
                );
                Ok(response.text)
            }
            Err(e) => {
                enter(GenerationPhase::Failed, mode);
                tracing::warn!(
                    provider = self.provider.name(),
                    mode = mode,
                    error = %e,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Generation failed"
                );
                Err(e.into())
            }
        }
    }
}
