//! Mock provider implementation for testing and offline runs.

use super::{ProviderError, ProviderRequest, ProviderResponse, TextProvider, UserContent};
use async_trait::async_trait;
use secrecy::Secret;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Behavior {
    /// Fixed reply text.
    Respond(String),
    /// Upstream error with this message.
    Fail(String),
    /// Reply that names the input, so callers can tell requests apart.
    Echo,
}

/// Mock text provider that counts calls and records the last request.
pub struct MockTextProvider {
    behavior: Behavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ProviderRequest>>,
}

impl MockTextProvider {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Reply with a short echo of the request.
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Always reply with `text`.
    pub fn responding(text: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Respond(text.into()))
    }

    /// Always fail with an upstream error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Hold each call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        _api_key: &Secret<String>,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let text = match &self.behavior {
            Behavior::Respond(text) => text.clone(),
            Behavior::Fail(message) => return Err(ProviderError::ApiError(message.clone())),
            Behavior::Echo => match &request.content {
                UserContent::Text(text) => format!("Mock questions for: {}", text),
                UserContent::Image { media_type, .. } => {
                    format!("Mock questions for uploaded {}", media_type)
                }
            },
        };

        Ok(ProviderResponse {
            output_tokens: text.len() as u32 / 4,
            input_tokens: request.system.len() as u32 / 4,
            text,
            stop_reason: Some("end_turn".to_string()),
        })
    }
}
