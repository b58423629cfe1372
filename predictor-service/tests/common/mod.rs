#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use predictor_service::config::{
    CreditSettings, CredentialSettings, GenerationSettings, ProviderKind, ServerSettings, Settings,
    TelemetrySettings,
};
use predictor_service::services::providers::TextProvider;
use predictor_service::startup::build_router;
use predictor_service::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_API_KEY: &str = "sk-ant-test-key";

/// Settings for an in-process app. The credential key name is unique per test
/// so the process environment never interferes.
pub fn test_settings(api_base_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 1024 * 1024,
            session_idle_minutes: 60,
            secure_cookies: false,
        },
        generation: GenerationSettings {
            provider: ProviderKind::Mock,
            api_base_url: api_base_url.to_string(),
            api_version: "2023-06-01".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 6000,
            request_timeout_secs: None,
        },
        credentials: CredentialSettings {
            secrets_file: std::env::temp_dir()
                .join(format!("predictor-secrets-{}.toml", uuid::Uuid::new_v4())),
            api_key_name: format!("PREDICTOR_TEST_KEY_{}", uuid::Uuid::new_v4().simple()),
        },
        credits: CreditSettings {
            initial: 2,
            preview_chars: 500,
        },
        telemetry: TelemetrySettings {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

/// Write the API key into the settings' secrets file.
pub fn write_api_key(settings: &Settings) -> PathBuf {
    let path = settings.credentials.secrets_file.clone();
    std::fs::write(
        &path,
        format!("{} = \"{}\"\n", settings.credentials.api_key_name, TEST_API_KEY),
    )
    .expect("Failed to write secrets file");
    path
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    secrets_file: PathBuf,
}

impl TestApp {
    /// App with an API key available in the secrets file.
    pub fn spawn(provider: Arc<dyn TextProvider>) -> Self {
        Self::spawn_with(test_settings("http://127.0.0.1:9"), provider, true)
    }

    pub fn spawn_with(settings: Settings, provider: Arc<dyn TextProvider>, with_key: bool) -> Self {
        predictor_service::services::metrics::init_metrics();

        let secrets_file = settings.credentials.secrets_file.clone();
        if with_key {
            write_api_key(&settings);
        }

        let state = AppState::new(settings, provider);
        let router = build_router(state.clone());

        TestApp {
            router,
            state,
            secrets_file,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// Open the page once and return the session cookie it sets.
    pub async fn start_session(&self) -> String {
        let response = self.get("/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("Index page should set a session cookie")
    }

    pub async fn post_form(&self, form: MultipartForm, cookie: &str) -> Response<Body> {
        let (content_type, body) = form.finish();
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, content_type)
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    pub async fn session_json(&self, cookie: &str) -> serde_json::Value {
        let response = self.get("/api/session", Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(&body_bytes(response).await).expect("Session view should be JSON")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_file(&self.secrets_file).ok();
    }
}

/// `name=value` pair from the response's `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|pair| pair.trim().to_string())
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).expect("Body should be UTF-8")
}

/// Minimal `multipart/form-data` encoder for form submissions.
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("----predictor-test-{}", uuid::Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// Text-mode submission.
pub fn topic_form(topic: &str) -> MultipartForm {
    MultipartForm::new().text("mode", "text").text("topic", topic)
}

/// Image-mode submission with an uploaded file.
pub fn image_form(bytes: &[u8]) -> MultipartForm {
    MultipartForm::new()
        .text("mode", "image")
        .text("topic", "")
        .file("image", "screenshot.png", "image/png", bytes)
}
