// ── Core error types ──
//
// The structured error stored in slice state and returned to callers.
// Consumers never see reqwest errors or raw HTTP bodies: the
// `From<netdash_api::Error>` impl folds transport-layer failures into
// the four kinds the UI distinguishes.

use serde::Serialize;
use serde_json::json;
use strum::{Display, EnumString};
use thiserror::Error;

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
pub enum ErrorKind {
    /// Client-side pre-flight check failed; nothing was sent.
    #[strum(serialize = "VALIDATION_ERROR")]
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// The request never produced an HTTP response (connect, DNS, timeout).
    #[strum(serialize = "NETWORK_ERROR")]
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    /// The backend answered with a failure.
    #[strum(serialize = "SERVER_ERROR")]
    #[serde(rename = "SERVER_ERROR")]
    Server,
    /// The user aborted before anything was sent.
    #[strum(serialize = "CANCELLED")]
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

/// Which upload rule a payload violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationRule {
    MaxSize,
    ContentType,
    EmptyFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub rule: ValidationRule,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Validation failed: {}", join_issues(.issues))]
    Validation { issues: Vec<ValidationIssue> },

    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Underlying transport failure, rendered.
        cause: Option<String>,
        timed_out: bool,
    },

    #[error("{}", server_summary(.status, .message))]
    Server {
        /// `None` when the server answered 2xx but the body was unusable.
        status: Option<u16>,
        message: String,
        code: Option<String>,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn server_summary(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Server error (HTTP {status}): {message}"),
        None => format!("Server error: {message}"),
    }
}

/// Serializable `{kind, message, details}` view of a [`CoreError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub details: serde_json::Value,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network { .. } => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        Self::Validation { issues }
    }

    /// Violated rules, empty for non-validation errors.
    pub fn validation_issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Validation { issues } => issues,
            _ => &[],
        }
    }

    pub fn has_issue(&self, rule: ValidationRule) -> bool {
        self.validation_issues().iter().any(|i| i.rule == rule)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Validation { issues } => json!({ "issues": issues }),
            Self::Network {
                cause, timed_out, ..
            } => json!({ "cause": cause, "timedOut": timed_out }),
            Self::Server { status, code, .. } => json!({ "status": status, "code": code }),
            Self::Cancelled => json!({ "cancelled": true }),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netdash_api::Error> for CoreError {
    fn from(err: netdash_api::Error) -> Self {
        match err {
            netdash_api::Error::Transport(ref e) => {
                if let Some(status) = e.status() {
                    CoreError::Server {
                        status: Some(status.as_u16()),
                        message: e.to_string(),
                        code: None,
                    }
                } else {
                    CoreError::Network {
                        message: if e.is_connect() {
                            "could not reach the server".into()
                        } else {
                            "request failed before a response arrived".into()
                        },
                        cause: Some(e.to_string()),
                        timed_out: e.is_timeout(),
                    }
                }
            }
            netdash_api::Error::Timeout { timeout_secs } => CoreError::Network {
                message: format!("request timed out after {timeout_secs}s"),
                cause: None,
                timed_out: true,
            },
            netdash_api::Error::InvalidUrl(e) => CoreError::Network {
                message: "invalid backend URL".into(),
                cause: Some(e.to_string()),
                timed_out: false,
            },
            netdash_api::Error::Tls(msg) => CoreError::Network {
                message: "TLS setup failed".into(),
                cause: Some(msg),
                timed_out: false,
            },
            netdash_api::Error::Authentication { message } => CoreError::Server {
                status: Some(401),
                message,
                code: Some("unauthorized".into()),
            },
            netdash_api::Error::Server {
                status,
                message,
                code,
            } => CoreError::Server {
                status: Some(status),
                message,
                code,
            },
            netdash_api::Error::Deserialization { message, body: _ } => CoreError::Server {
                status: None,
                message: format!("unreadable response: {message}"),
                code: Some("invalid_response".into()),
            },
        }
    }
}
