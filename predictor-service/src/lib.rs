pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use config::{ProviderKind, Settings};
use service_core::error::AppError;
use services::{
    credentials::CredentialChain,
    generator::QuestionGenerator,
    providers::{
        anthropic::{AnthropicConfig, AnthropicProvider},
        mock::MockTextProvider,
        TextProvider,
    },
    question_service::QuestionService,
    session_store::SessionStore,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: SessionStore,
    pub generator: Arc<QuestionGenerator>,
    pub questions: Arc<QuestionService>,
}

impl AppState {
    pub fn new(settings: Settings, provider: Arc<dyn TextProvider>) -> Self {
        let credentials = CredentialChain::from_settings(&settings.credentials);
        Self::with_credentials(settings, provider, credentials)
    }

    pub fn with_credentials(
        settings: Settings,
        provider: Arc<dyn TextProvider>,
        credentials: CredentialChain,
    ) -> Self {
        let sessions = SessionStore::new(settings.credits.initial);
        let generator = Arc::new(QuestionGenerator::new(
            provider,
            credentials,
            &settings.generation,
        ));
        let questions = Arc::new(QuestionService::new(
            sessions.clone(),
            generator.clone(),
            settings.credits.preview_chars,
        ));

        Self {
            settings: Arc::new(settings),
            sessions,
            generator,
            questions,
        }
    }

    /// Build state with the provider named in configuration.
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let provider: Arc<dyn TextProvider> = match settings.generation.provider {
            ProviderKind::Anthropic => Arc::new(
                AnthropicProvider::new(AnthropicConfig::from(&settings.generation))
                    .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?,
            ),
            ProviderKind::Mock => {
                tracing::warn!("Using mock text provider; responses are canned");
                Arc::new(MockTextProvider::new())
            }
        };

        Ok(Self::new(settings, provider))
    }
}
