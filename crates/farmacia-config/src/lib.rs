//! Shared configuration for the farmacia tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `farmacia_core::SessionConfig`. The CLI layers its
//! `GlobalOpts` overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use farmacia_core::{Credentials, DataMode, SessionConfig, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "farmacia";

/// Backend URL used when a profile does not set one.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given on the command line.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g. "http://localhost:8080/api").
    pub api_url: Option<String>,

    /// "mock" (fixtures, the default) or "remote".
    #[serde(default)]
    pub mode: DataMode,

    /// Login email.
    pub email: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed certificates.
    pub insecure: Option<bool>,

    /// Request timeout in seconds; overrides `defaults.timeout`.
    pub timeout: Option<u64>,

    /// Artificial delay for mock transmissions, in milliseconds.
    pub mock_latency_ms: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "farmacia", "farmacia").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("farmacia");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) layered with `FARMACIA_*` env.
///
/// Nested keys use a double underscore: `FARMACIA_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FARMACIA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the login password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for `profile_name`.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Login credentials for a profile, if it names an email.
///
/// Mock mode tolerates a missing password; remote mode does not.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(email) = profile.email.clone() else {
        return Ok(None);
    };
    let password = match resolve_password(profile, profile_name) {
        Ok(pw) => pw,
        Err(ConfigError::NoCredentials { .. }) if profile.mode == DataMode::Mock => {
            SecretString::from(String::new())
        }
        Err(e) => return Err(e),
    };
    Ok(Some(Credentials { email, password }))
}

/// Build a `SessionConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let raw_url = profile.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let api_url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let credentials = resolve_credentials(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(SessionConfig {
        api_url,
        mode: profile.mode,
        credentials,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        mock_latency: Duration::from_millis(profile.mock_latency_ms.unwrap_or(0)),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn remote_profile() -> Profile {
        Profile {
            api_url: Some("http://farmacia.local:8080/api".into()),
            mode: DataMode::Remote,
            email: Some("ana@farmacia.com".into()),
            password: Some("s3cret".into()),
            timeout: Some(5),
            ..Profile::default()
        }
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("loja".into(), remote_profile());
        cfg.default_profile = Some("loja".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.active_profile_name(), "loja");
        assert_eq!(loaded.profiles["loja"], remote_profile());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.active_profile_name(), "default");
        assert_eq!(loaded.defaults.output, "table");
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn mode_parses_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[profiles.demo]\nmode = \"mock\"\n\n[profiles.prod]\nmode = \"remote\"\napi_url = \"http://10.0.0.5/api\"\n",
        )
        .unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["demo"].mode, DataMode::Mock);
        assert_eq!(loaded.profiles["prod"].mode, DataMode::Remote);
    }

    #[test]
    fn profile_becomes_session_config() {
        let session =
            profile_to_session_config(&remote_profile(), "farmacia-test-remote", &Defaults::default())
                .unwrap();
        assert_eq!(session.mode, DataMode::Remote);
        assert_eq!(session.api_url.as_str(), "http://farmacia.local:8080/api");
        assert_eq!(session.timeout, Duration::from_secs(5));
        assert_eq!(session.tls, TlsVerification::SystemDefaults);
        let creds = session.credentials.unwrap();
        assert_eq!(creds.email, "ana@farmacia.com");
        assert_eq!(creds.password.expose_secret(), "s3cret");
    }

    #[test]
    fn mock_profile_needs_no_password() {
        let profile = Profile {
            email: Some("demo@farmacia.com".into()),
            password_env: Some("FARMACIA_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        let creds = resolve_credentials(&profile, "farmacia-test-mock").unwrap().unwrap();
        assert_eq!(creds.email, "demo@farmacia.com");
    }

    #[test]
    fn remote_profile_without_password_fails() {
        let profile = Profile {
            mode: DataMode::Remote,
            email: Some("ana@farmacia.com".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_session_config(&profile, "farmacia-test-nopw", &Defaults::default()),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn rejects_bad_url() {
        let profile = Profile {
            api_url: Some("not a url".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_session_config(&profile, "x", &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
    }
}
