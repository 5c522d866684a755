// ── Core error types ──
//
// User-facing errors from farmacia-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<farmacia_api::Error>`
// impl folds transport-layer failures into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
///
/// Every variant is terminal for the operation that raised it and leaves the
/// stores exactly as they were before the call.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    /// A required field is missing or a value breaks a record invariant.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    /// The operation is not allowed in the document's current status.
    #[error("{entity} {id} is {status}; cannot {action}")]
    InvalidState {
        entity: String,
        id: String,
        status: String,
        action: String,
    },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("No user is logged in")]
    NotAuthenticated,

    // ── Backend errors ───────────────────────────────────────────────
    /// Backend unreachable, or it answered with a non-2xx status.
    #[error("Backend request failed: {message}")]
    Transport {
        message: String,
        /// HTTP status code (if the backend answered).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Validation failure listing every missing required field.
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::Validation {
            field: fields.join(", "),
            reason: if fields.len() == 1 {
                "required field is missing".into()
            } else {
                "required fields are missing".into()
            },
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Attach the entity and id to a backend "not found" answer.
    ///
    /// Other errors pass through unchanged.
    pub(crate) fn with_context(self, entity: &str, id: &str) -> Self {
        match self {
            Self::NotFound { .. } => Self::not_found(entity, id),
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<farmacia_api::Error> for CoreError {
    fn from(err: farmacia_api::Error) -> Self {
        if err.is_not_found() {
            return CoreError::NotFound {
                entity: "record".into(),
                id: String::new(),
            };
        }

        match err {
            farmacia_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            farmacia_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            farmacia_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            farmacia_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            ref e @ (farmacia_api::Error::Transport(_) | farmacia_api::Error::Api { .. }) => {
                CoreError::Transport {
                    message: e.to_string(),
                    status: e.status(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_names_every_field() {
        let err = CoreError::missing_fields(&["cpf_paciente", "crm"]);
        assert_eq!(
            err.to_string(),
            "Invalid cpf_paciente, crm: required fields are missing"
        );
    }

    #[test]
    fn api_404_becomes_not_found() {
        let err: CoreError = farmacia_api::Error::Api {
            status: 404,
            message: "gone".into(),
        }
        .into();
        let err = err.with_context("Entrada", "7");
        assert!(matches!(err, CoreError::NotFound { ref entity, ref id } if entity == "Entrada" && id == "7"));
    }

    #[test]
    fn api_500_becomes_transport() {
        let err: CoreError = farmacia_api::Error::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Transport { status: Some(500), .. }));
    }
}
