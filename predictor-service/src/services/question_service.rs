use crate::models::generation::GenerationRequest;
use crate::models::session::QueryRecord;
use crate::services::error::GenerationError;
use crate::services::generator::QuestionGenerator;
use crate::services::metrics;
use crate::services::session_store::SessionStore;
use std::sync::Arc;

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub text: String,
    pub credits_remaining: u32,
    pub record: QueryRecord,
}

/// Runs one submission against a visitor's session: credit check, generation,
/// then credit spend and history append.
pub struct QuestionService {
    sessions: SessionStore,
    generator: Arc<QuestionGenerator>,
    preview_chars: usize,
}

impl QuestionService {
    pub fn new(sessions: SessionStore, generator: Arc<QuestionGenerator>, preview_chars: usize) -> Self {
        Self {
            sessions,
            generator,
            preview_chars,
        }
    }

    /// The session lock is held for the whole call, so a visitor has at most
    /// one generation in flight and can never spend a credit twice. State is
    /// only touched after the provider succeeds.
    pub async fn submit(
        &self,
        visitor_id: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let mode = request.mode();
        let handle = self.sessions.get_session(visitor_id);
        let mut session = handle.lock().await;
        session.touch();

        if !session.has_credit() {
            tracing::info!(visitor_id = %visitor_id, mode, "Generation refused: no credits left");
            metrics::record_generation(mode, GenerationError::InsufficientCredits.outcome());
            return Err(GenerationError::InsufficientCredits);
        }

        let text = match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                metrics::record_generation(mode, e.outcome());
                return Err(e);
            }
        };

        let credits_remaining = session.spend_credit()?;
        let record = session
            .record_query(request.topic_label(), &text, self.preview_chars)
            .clone();

        metrics::record_credit_spent();
        metrics::record_generation(mode, "success");
        tracing::info!(
            visitor_id = %visitor_id,
            mode,
            credits_remaining,
            total_queries = session.total_queries,
            "Questions generated"
        );

        Ok(GenerationOutcome {
            text,
            credits_remaining,
            record,
        })
    }
}
