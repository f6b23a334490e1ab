//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use netdash_config::ConfigError;
use netdash_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(netdash::connection_failed),
        help(
            "Check that the backend is running and the URL is right.\n\
             Override it with --base-url or [api].base_url in the config file."
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out: {reason}")]
    #[diagnostic(
        code(netdash::timeout),
        help("Increase the timeout with --timeout or [api].timeout_secs.")
    )]
    Timeout { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("The backend rejected the credentials")]
    #[diagnostic(
        code(netdash::auth_failed),
        help(
            "Pass a token with --api-key, set NETDASH_TOKEN, or configure\n\
             [api].api_key_env in the config file."
        )
    )]
    AuthFailed,

    #[error("Permission denied: {message}")]
    #[diagnostic(code(netdash::forbidden))]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netdash::not_found),
        help("Run: netdash {resource_type}s list to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Conflict: {message}")]
    #[diagnostic(code(netdash::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(netdash::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netdash::validation))]
    Validation { field: String, reason: String },

    #[error("Upload rejected: {reason}")]
    #[diagnostic(
        code(netdash::upload_rejected),
        help("Adjust [uploads].max_size_bytes or [uploads].allowed_types in the config file.")
    )]
    UploadRejected { reason: String },

    #[error("{failed} of {total} uploads failed")]
    #[diagnostic(code(netdash::batch_upload))]
    PartialUpload { failed: usize, total: usize },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(netdash::config),
        help("Inspect the effective configuration with: netdash config show")
    )]
    Config(#[from] ConfigError),

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(netdash::config_exists), help("Pass --force to overwrite it."))]
    ConfigExists { path: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(netdash::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Cancelled")]
    #[diagnostic(code(netdash::cancelled))]
    Cancelled,

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(netdash::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::UploadRejected { .. }
            | Self::Config(_)
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }

    /// Like `From<CoreError>`, but names the resource on a 404.
    pub fn from_core(err: CoreError, resource_type: &str, identifier: &str) -> Self {
        match err {
            CoreError::Server {
                status: Some(404), ..
            } => Self::NotFound {
                resource_type: resource_type.into(),
                identifier: identifier.into(),
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { .. } => Self::UploadRejected {
                reason: err
                    .validation_issues()
                    .iter()
                    .map(|i| i.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            },

            CoreError::Network {
                message,
                timed_out: true,
                ..
            } => Self::Timeout { reason: message },

            CoreError::Network { message, .. } => Self::ConnectionFailed { reason: message },

            CoreError::Server {
                status: Some(401), ..
            } => Self::AuthFailed,

            CoreError::Server {
                status: Some(403),
                message,
                ..
            } => Self::Forbidden { message },

            CoreError::Server {
                status: Some(409),
                message,
                ..
            } => Self::Conflict { message },

            CoreError::Server { .. } => Self::ApiError {
                message: err.to_string(),
            },

            CoreError::Cancelled => Self::Cancelled,
        }
    }
}
