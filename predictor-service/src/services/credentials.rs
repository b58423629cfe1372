//! API key lookup.
//!
//! Sources are consulted in order on every call and the first non-empty value
//! wins: the TOML secrets file, then the process environment. Nothing is
//! cached, so a key added while the service runs is picked up by the next
//! request.

use crate::config::CredentialSettings;
use async_trait::async_trait;
use secrecy::Secret;
use std::path::PathBuf;
use std::sync::Arc;

/// A place an API key may be stored.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Value for `key`, or `None` when this source does not hold it.
    async fn lookup(&self, key: &str) -> Option<Secret<String>>;
}

fn non_empty(value: String) -> Option<Secret<String>> {
    if value.trim().is_empty() {
        None
    } else {
        Some(Secret::new(value))
    }
}

/// Top-level string keys of a TOML secrets file.
///
/// A missing file holds nothing. An unreadable or malformed file is logged and
/// treated the same way.
pub struct SecretsFileSource {
    path: PathBuf,
}

impl SecretsFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialSource for SecretsFileSource {
    fn name(&self) -> &'static str {
        "secrets_file"
    }

    async fn lookup(&self, key: &str) -> Option<Secret<String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read secrets file");
                return None;
            }
        };

        let table: toml::Table = match contents.parse() {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to parse secrets file");
                return None;
            }
        };

        table
            .get(key)
            .and_then(|value| value.as_str())
            .and_then(|value| non_empty(value.to_string()))
    }
}

/// Process environment.
#[derive(Default)]
pub struct EnvSource;

#[async_trait]
impl CredentialSource for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn lookup(&self, key: &str) -> Option<Secret<String>> {
        // Non-unicode values count as absent.
        std::env::var(key).ok().and_then(non_empty)
    }
}

/// Ordered list of sources for a single named key.
#[derive(Clone)]
pub struct CredentialChain {
    key: String,
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new(key: impl Into<String>, sources: Vec<Arc<dyn CredentialSource>>) -> Self {
        Self {
            key: key.into(),
            sources,
        }
    }

    /// Secrets file first, then the environment.
    pub fn from_settings(settings: &CredentialSettings) -> Self {
        Self::new(
            settings.api_key_name.clone(),
            vec![
                Arc::new(SecretsFileSource::new(settings.secrets_file.clone())),
                Arc::new(EnvSource),
            ],
        )
    }

    /// Name of the key this chain resolves.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn resolve(&self) -> Option<Secret<String>> {
        for source in &self.sources {
            if let Some(secret) = source.lookup(&self.key).await {
                tracing::debug!(source = source.name(), key = %self.key, "Resolved API key");
                return Some(secret);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    /// Fixed in-memory source.
    struct StaticSource(Option<&'static str>);

    #[async_trait]
    impl CredentialSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn lookup(&self, _key: &str) -> Option<Secret<String>> {
            self.0.and_then(|v| non_empty(v.to_string()))
        }
    }

    fn temp_secrets(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("secrets-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn first_non_empty_source_wins() {
        let chain = CredentialChain::new(
            "ANTHROPIC_API_KEY",
            vec![
                Arc::new(StaticSource(None)),
                Arc::new(StaticSource(Some(""))),
                Arc::new(StaticSource(Some("sk-second"))),
                Arc::new(StaticSource(Some("sk-third"))),
            ],
        );

        let secret = chain.resolve().await.unwrap();
        assert_eq!(secret.expose_secret(), "sk-second");
    }

    #[tokio::test]
    async fn empty_chain_resolves_nothing() {
        let chain = CredentialChain::new("ANTHROPIC_API_KEY", vec![Arc::new(StaticSource(Some("   ")))]);
        assert!(chain.resolve().await.is_none());
    }

    #[tokio::test]
    async fn secrets_file_is_read_on_each_lookup() {
        let path = temp_secrets("OTHER = \"x\"\n");
        let source = SecretsFileSource::new(&path);
        assert!(source.lookup("ANTHROPIC_API_KEY").await.is_none());

        std::fs::write(&path, "ANTHROPIC_API_KEY = \"sk-from-file\"\n").unwrap();
        let secret = source.lookup("ANTHROPIC_API_KEY").await.unwrap();
        assert_eq!(secret.expose_secret(), "sk-from-file");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn secrets_file_keys_are_case_sensitive() {
        let path = temp_secrets("anthropic_api_key = \"sk-lower\"\n");
        let source = SecretsFileSource::new(&path);
        assert!(source.lookup("ANTHROPIC_API_KEY").await.is_none());
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn missing_or_malformed_file_holds_nothing() {
        let missing = SecretsFileSource::new(std::env::temp_dir().join("definitely-missing.toml"));
        assert!(missing.lookup("ANTHROPIC_API_KEY").await.is_none());

        let path = temp_secrets("this is = not [toml");
        let malformed = SecretsFileSource::new(&path);
        assert!(malformed.lookup("ANTHROPIC_API_KEY").await.is_none());
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn env_source_reads_process_environment() {
        let key = format!("PREDICTOR_TEST_KEY_{}", uuid::Uuid::new_v4().simple());
        assert!(EnvSource.lookup(&key).await.is_none());

        std::env::set_var(&key, "sk-env");
        assert_eq!(EnvSource.lookup(&key).await.unwrap().expose_secret(), "sk-env");

        std::env::set_var(&key, "");
        assert!(EnvSource.lookup(&key).await.is_none());
        std::env::remove_var(&key);
    }

    #[tokio::test]
    async fn file_takes_precedence_over_env() {
        let key = format!("PREDICTOR_TEST_KEY_{}", uuid::Uuid::new_v4().simple());
        let path = temp_secrets(&format!("{} = \"sk-file\"\n", key));
        std::env::set_var(&key, "sk-env");

        let chain = CredentialChain::from_settings(&CredentialSettings {
            secrets_file: path.clone(),
            api_key_name: key.clone(),
        });
        assert_eq!(chain.resolve().await.unwrap().expose_secret(), "sk-file");

        std::env::remove_var(&key);
        std::fs::remove_file(&path).ok();
    }
}
