//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use farmacia_config::ConfigError;
use farmacia_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend: {message}")]
    #[diagnostic(
        code(farmacia::connection_failed),
        help(
            "Check that the backend is running and the URL is right.\n\
             Try: farmacia --api-url http://localhost:8080/api ...\n\
             Or work offline with --mock"
        )
    )]
    ConnectionFailed { message: String },

    #[error("Backend answered {status}: {message}")]
    #[diagnostic(code(farmacia::backend_error))]
    Backend { status: u16, message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(farmacia::auth_failed),
        help(
            "Verify the email and password of the active profile.\n\
             Run: farmacia config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(farmacia::no_credentials),
        help(
            "Configure credentials with: farmacia config init\n\
             Or set FARMACIA_EMAIL and FARMACIA_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    #[error("Not logged in")]
    #[diagnostic(code(farmacia::not_logged_in))]
    NotLoggedIn,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(farmacia::not_found),
        help("Run: farmacia {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{entity} {id} is {status}; cannot {action}")]
    #[diagnostic(
        code(farmacia::invalid_state),
        help("Only draft documents can be edited, deleted or finalized.")
    )]
    InvalidState {
        entity: String,
        id: String,
        status: String,
        action: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(farmacia::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(farmacia::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: farmacia config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(farmacia::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(farmacia::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(farmacia::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(farmacia::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } | Self::NotLoggedIn => {
                exit_code::AUTH
            }
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::InvalidState { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// The `list` command that shows records of the entity named `label`.
fn list_command(label: &str) -> String {
    let plural = match label.to_lowercase().as_str() {
        "entrada" => "entradas",
        "saída" | "saida" => "saidas",
        "perda" => "perdas",
        "inventário" | "inventario" => "inventarios",
        "produto" => "produtos",
        "fornecedor" => "fornecedores",
        "empresa" => "empresas",
        _ => return "--help".into(),
    };
    format!("{plural} list")
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },

            CoreError::NotFound { entity, id } => CliError::NotFound {
                list_command: list_command(&entity),
                resource_type: entity,
                identifier: id,
            },

            CoreError::InvalidState {
                entity,
                id,
                status,
                action,
            } => CliError::InvalidState {
                entity,
                id,
                status,
                action,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::NotAuthenticated => CliError::NotLoggedIn,

            CoreError::Transport {
                message,
                status: Some(status),
            } => CliError::Backend { status, message },

            CoreError::Transport {
                message,
                status: None,
            } => CliError::ConnectionFailed { message },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_points_at_the_list_command() {
        let err: CliError = CoreError::not_found("Saída", "9").into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(
            matches!(err, CliError::NotFound { ref list_command, .. } if list_command == "saidas list")
        );
    }

    #[test]
    fn transport_without_status_is_a_connection_failure() {
        let err: CliError = CoreError::Transport {
            message: "connection refused".into(),
            status: None,
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);

        let err: CliError = CoreError::Transport {
            message: "boom".into(),
            status: Some(500),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn lifecycle_violation_is_a_conflict() {
        let err: CliError = CoreError::InvalidState {
            entity: "Perda".into(),
            id: "1".into(),
            status: "effective".into(),
            action: "finalize".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(err.to_string(), "Perda 1 is effective; cannot finalize");
    }
}
