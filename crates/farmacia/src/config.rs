//! CLI configuration: thin wrapper around `farmacia_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--api-url, --mock/--remote, --email, --password, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use farmacia_config::{Config, Profile};
use farmacia_core::{Credentials, DataMode, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use farmacia_config::{config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build the session config from the config file, the active profile and
/// CLI flags. A missing profile is fine: defaults are mock mode against the
/// default backend URL.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    resolve_profile(&profile, &profile_name, &cfg, global)
}

/// Translate a `Profile` + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    let mut profile = profile.clone();

    // 1. Data source
    if global.mock {
        profile.mode = DataMode::Mock;
    } else if global.remote {
        profile.mode = DataMode::Remote;
    }

    // 2. Backend URL and login email (flag > env > profile)
    if let Some(ref url) = global.api_url {
        profile.api_url = Some(url.clone());
    }
    if let Some(ref email) = global.email {
        profile.email = Some(email.clone());
    }

    // 3. Password flag wins over every stored secret
    let email = if global.password.is_some() {
        profile.email.take()
    } else {
        None
    };

    let mut session =
        farmacia_config::profile_to_session_config(&profile, profile_name, &cfg.defaults)?;

    if let Some(ref password) = global.password {
        let email = email.ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;
        session.credentials = Some(Credentials {
            email,
            password: SecretString::from(password.clone()),
        });
    }

    // 4. TLS and timeout
    if global.insecure {
        session.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }

    Ok(session)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["farmacia"];
        argv.extend_from_slice(args);
        argv.push("login");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_profile() {
        let profile = Profile {
            api_url: Some("http://profile.local/api".into()),
            mode: DataMode::Mock,
            ..Profile::default()
        };
        let g = global(&[
            "--remote",
            "--api-url",
            "http://flag.local/api",
            "--email",
            "ana@farmacia.com",
            "--password",
            "s3cret",
            "--timeout",
            "5",
        ]);

        let session = resolve_profile(&profile, "default", &Config::default(), &g).unwrap();
        assert_eq!(session.mode, DataMode::Remote);
        assert_eq!(session.api_url.as_str(), "http://flag.local/api");
        assert_eq!(session.timeout, Duration::from_secs(5));
        assert_eq!(session.credentials.unwrap().email, "ana@farmacia.com");
    }

    #[test]
    fn password_without_email_is_rejected() {
        let g = global(&["--password", "s3cret"]);
        let err = resolve_profile(&Profile::default(), "default", &Config::default(), &g)
            .unwrap_err();
        assert!(matches!(err, CliError::NoCredentials { .. }));
    }
}
