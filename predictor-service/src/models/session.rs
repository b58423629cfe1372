//! Per-visitor session state: credits, usage counters and query history.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use thiserror::Error;

/// Topic recorded in history for screenshot submissions.
pub const IMAGE_TOPIC_LABEL: &str = "Image Upload";

/// Appended to history previews that were cut short.
pub const PREVIEW_ELLIPSIS: &str = "...";

/// Raised when a session tries to spend a credit it does not have.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("No credits left")]
pub struct InsufficientCredits;

/// One successful generation, as shown in the history list.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRecord {
    /// Submitted topic, or [`IMAGE_TOPIC_LABEL`] for screenshots.
    pub topic: String,

    /// When the output was recorded. Serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,

    /// Leading slice of the generated text.
    pub output_preview: String,
}

/// Full text of the latest generation, kept for download.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub text: String,
    pub generated_at: DateTime<Local>,
}

impl GeneratedDocument {
    /// Download name, e.g. `upsc_questions_20250114_093012.txt`.
    pub fn file_name(&self) -> String {
        format!(
            "upsc_questions_{}.txt",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Mutable state for a single visitor.
///
/// Only a successful generation mutates credits, counters and history; the
/// caller holds the session lock for the whole check-generate-spend sequence.
#[derive(Debug, Clone)]
pub struct Session {
    pub credits: u32,
    pub total_queries: u32,
    pub history: Vec<QueryRecord>,
    pub latest: Option<GeneratedDocument>,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(initial_credits: u32) -> Self {
        let now = Utc::now();
        Self {
            credits: initial_credits,
            total_queries: 0,
            history: Vec::new(),
            latest: None,
            created_at: now,
            last_seen: now,
        }
    }

    pub fn has_credit(&self) -> bool {
        self.credits >= 1
    }

    pub fn is_low_on_credits(&self) -> bool {
        self.credits <= 1
    }

    /// Take one credit. Returns the remaining balance.
    pub fn spend_credit(&mut self) -> Result<u32, InsufficientCredits> {
        if self.credits < 1 {
            return Err(InsufficientCredits);
        }
        self.credits -= 1;
        Ok(self.credits)
    }

    /// Append a history entry for `output` and keep the full text for download.
    pub fn record_query(&mut self, topic: &str, output: &str, preview_chars: usize) -> &QueryRecord {
        self.total_queries += 1;
        self.latest = Some(GeneratedDocument {
            text: output.to_string(),
            generated_at: Local::now(),
        });
        self.history.push(QueryRecord {
            topic: topic.to_string(),
            timestamp: Utc::now(),
            output_preview: preview(output, preview_chars),
        });
        &self.history[self.history.len() - 1]
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }
}

/// First `max_chars` characters of `output`, with [`PREVIEW_ELLIPSIS`] when cut.
pub fn preview(output: &str, max_chars: usize) -> String {
    match output.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &output[..cut], PREVIEW_ELLIPSIS),
        None => output.to_string(),
    }
}
