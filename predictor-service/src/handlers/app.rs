use crate::models::session::Session;
use crate::models::visitor::Visitor;
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse};

/// Which input the form shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Text,
    Image,
}

impl InputMode {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("image") {
            InputMode::Image
        } else {
            InputMode::Text
        }
    }

    pub fn is_image(&self) -> bool {
        *self == InputMode::Image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Warning,
    Success,
}

impl NoticeKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            NoticeKind::Error => "notice-error",
            NoticeKind::Warning => "notice-warning",
            NoticeKind::Success => "notice-success",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }
}

/// One row of the history list, newest first.
pub struct HistoryRow {
    pub topic: String,
    pub timestamp: String,
    pub preview: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub credits: u32,
    pub total_queries: u32,
    pub low_on_credits: bool,
    pub can_generate: bool,
    pub history: Vec<HistoryRow>,
    pub notice: Option<Notice>,
    /// Full text of the generation just completed, if any.
    pub output: Option<String>,
    /// Topic to refill the textarea with.
    pub topic: String,
    pub mode: InputMode,
}

impl IndexTemplate {
    pub fn for_session(session: &Session) -> Self {
        let history = session
            .history
            .iter()
            .rev()
            .map(|record| HistoryRow {
                topic: record.topic.clone(),
                timestamp: record.timestamp.format("%Y-%m-%d %H:%M UTC").to_string(),
                preview: record.output_preview.clone(),
            })
            .collect();

        Self {
            credits: session.credits,
            total_queries: session.total_queries,
            low_on_credits: session.is_low_on_credits(),
            can_generate: session.has_credit(),
            history,
            notice: None,
            output: None,
            topic: String::new(),
            mode: InputMode::default(),
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_input(mut self, mode: InputMode, topic: String) -> Self {
        self.mode = mode;
        self.topic = topic;
        self
    }
}

pub async fn index(State(state): State<AppState>, visitor: Visitor) -> impl IntoResponse {
    let handle = state.sessions.get_session(&visitor.id);
    let mut session = handle.lock().await;
    session.touch();

    IndexTemplate::for_session(&session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_listed_newest_first() {
        let mut session = Session::new(2);
        session.record_query("first topic", "a", 500);
        session.record_query("second topic", "b", 500);

        let page = IndexTemplate::for_session(&session);
        assert_eq!(page.history[0].topic, "second topic");
        assert_eq!(page.history[1].topic, "first topic");
        assert_eq!(page.total_queries, 2);
    }

    #[test]
    fn submit_disabled_without_credits() {
        let page = IndexTemplate::for_session(&Session::new(0));
        assert!(!page.can_generate);
        assert!(page.low_on_credits);

        let rendered = page.render().unwrap();
        assert!(rendered.contains("No credits left! Please add credits to continue."));
        assert!(rendered.contains("disabled"));
    }

    #[test]
    fn low_credit_warning_shown_at_one_credit() {
        let rendered = IndexTemplate::for_session(&Session::new(1)).render().unwrap();
        assert!(rendered.contains("Running low! Only a few queries left."));
        assert!(!rendered.contains("Add more credits"));

        let rendered = IndexTemplate::for_session(&Session::new(2)).render().unwrap();
        assert!(!rendered.contains("Running low!"));
    }

    #[test]
    fn output_is_html_escaped() {
        let rendered = IndexTemplate::for_session(&Session::new(2))
            .with_output("<script>alert(1)</script>".to_string())
            .render()
            .unwrap();

        assert!(!rendered.contains("<script>alert(1)</script>"));
        assert!(rendered.contains("&lt;script&gt;"));
        assert!(rendered.contains("href=\"/download\""));
    }

    #[test]
    fn input_mode_parsing() {
        assert_eq!(InputMode::parse("image"), InputMode::Image);
        assert_eq!(InputMode::parse(" IMAGE "), InputMode::Image);
        assert_eq!(InputMode::parse("text"), InputMode::Text);
        assert_eq!(InputMode::parse(""), InputMode::Text);
    }
}
