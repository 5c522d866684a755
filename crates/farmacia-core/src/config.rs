// ── Runtime session configuration ──
//
// Describes *where* the data lives and *who* is using it. Never touches
// disk: the CLI resolves profiles and hands a `SessionConfig` in.

use std::sync::LazyLock;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// `farmacia_api::DEFAULT_BASE_URL`, parsed once.
static DEFAULT_API_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(farmacia_api::DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
});

/// Where document and master-data operations are served from.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DataMode {
    /// In-memory fixtures, no network access.
    #[default]
    Mock,
    /// The REST backend at `SessionConfig::api_url`.
    Remote,
}

/// Login credentials used by `Controller::authenticate`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// TLS verification strategy for the backend connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on a lab backend).
    DangerAcceptInvalid,
}

/// Everything the `Controller` needs to open a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend base URL (e.g. `http://localhost:8080/api`).
    pub api_url: Url,
    pub mode: DataMode,
    /// Credentials for `authenticate`. In mock mode any email is accepted.
    pub credentials: Option<Credentials>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Artificial delay before a mock transmission completes.
    pub mock_latency: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.clone(),
            mode: DataMode::Mock,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            mock_latency: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_mode_is_default() {
        let config = SessionConfig::default();
        assert_eq!(config.mode, DataMode::Mock);
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/api");
    }

    #[test]
    fn default_base_url_parses() {
        assert!(Url::parse(farmacia_api::DEFAULT_BASE_URL).is_ok());
        assert_eq!(*DEFAULT_API_URL, SessionConfig::default().api_url);
    }

    #[test]
    fn data_mode_parses_case_insensitively() {
        assert_eq!("Remote".parse::<DataMode>().ok(), Some(DataMode::Remote));
        assert_eq!(DataMode::Mock.to_string(), "mock");
    }
}
