use thiserror::Error;

/// Top-level error type for the `netdash-api` crate.
///
/// Covers every failure mode of the REST backend: transport, TLS,
/// authentication, server-reported failures, and malformed bodies.
/// `netdash-core` maps these into the structured operation error that
/// ends up in slice state.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// The backend rejected the bearer token (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Server ──────────────────────────────────────────────────────
    /// Non-2xx response from the backend.
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Server { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status associated with the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Authentication { .. } => Some(401),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Extract the backend error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
