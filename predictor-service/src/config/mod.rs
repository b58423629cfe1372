use serde::Deserialize;
use service_core::config::{config_dir_for, load_layered};
use service_core::error::AppError;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub generation: GenerationSettings,
    pub credentials: CredentialSettings,
    pub credits: CreditSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_session_idle_minutes() -> i64 {
    24 * 60
}

/// Which text provider backs question generation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    /// Canned responses, for local development without network access.
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationSettings {
    pub provider: ProviderKind,
    pub api_base_url: String,
    pub api_version: String,
    pub model: String,
    pub max_tokens: u32,
    /// Unset means the outbound call waits as long as the service takes.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialSettings {
    /// TOML secrets file consulted before the process environment.
    pub secrets_file: PathBuf,
    pub api_key_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CreditSettings {
    /// Credits granted to a new session.
    pub initial: u32,
    /// Characters of output kept in each history entry.
    pub preview_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Settings {
    pub fn session_idle(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.server.session_idle_minutes.max(1))
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let configuration_directory = config_dir_for("predictor-service")?;
    load_layered(&configuration_directory)
}
