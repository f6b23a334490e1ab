//! Configuration for the netdash front ends.
//!
//! TOML file + `NETDASH_*` environment layering, API token resolution
//! (env var, then plaintext), and translation to
//! `netdash_core::CoreConfig`. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use netdash_api::TlsMode;
use netdash_core::config::DEFAULT_BASE_URL;
use netdash_core::{
    CoreConfig, ListOrdering, NotificationConfig, NotificationKind, UploadPolicy,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub notifications: NotificationsSection,

    #[serde(default)]
    pub uploads: UploadsSection,

    #[serde(default)]
    pub lists: ListsSection,
}

/// `[api]`: backend connection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bearer token (plaintext; prefer `api_key_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// PEM file with a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            api_key_env: None,
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    10
}

/// `[notifications]`: toast behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationsSection {
    #[serde(default = "default_ttl_ms")]
    pub default_ttl_ms: u64,

    /// Kinds that stay until dismissed (`success`, `error`, `warning`,
    /// `info`, `loading`).
    #[serde(default = "default_sticky_kinds")]
    pub sticky_kinds: Vec<String>,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            default_ttl_ms: default_ttl_ms(),
            sticky_kinds: default_sticky_kinds(),
        }
    }
}

fn default_ttl_ms() -> u64 {
    5000
}
fn default_sticky_kinds() -> Vec<String> {
    vec!["error".into()]
}

/// `[uploads]`: pre-flight validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadsSection {
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Exact types or `family/*` wildcards. Empty allows everything.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadsSection {
    fn default() -> Self {
        Self {
            max_size_bytes: default_max_size_bytes(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_max_size_bytes() -> u64 {
    UploadPolicy::default().max_size_bytes
}
fn default_allowed_types() -> Vec<String> {
    UploadPolicy::default().allowed_content_types
}

/// `[lists]`: paging and overlapping-request policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListsSection {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// `last-resolved-wins` or `latest-issued-wins`.
    #[serde(default = "default_ordering")]
    pub ordering: String,
}

impl Default for ListsSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            ordering: default_ordering(),
        }
    }
}

fn default_page_size() -> u32 {
    netdash_core::slice::DEFAULT_PAGE_SIZE
}
fn default_ordering() -> String {
    ListOrdering::default().to_string()
}

/// Largest page the backend serves.
pub const MAX_PAGE_SIZE: u32 = 500;

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "netdash", "netdash").map_or_else(
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
    p.push("netdash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then
/// `NETDASH_<SECTION>__<KEY>` environment variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETDASH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize to TOML and write to `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Copy of `cfg` with the plaintext token masked.
pub fn redacted(cfg: &Config) -> Config {
    let mut shown = cfg.clone();
    if shown.api.api_key.is_some() {
        shown.api.api_key = Some("********".into());
    }
    shown
}

/// TOML rendering of [`redacted`].
pub fn render_redacted(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(&redacted(cfg))?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the bearer token: `api_key_env` first, then plaintext
/// `api_key`. `None` when neither yields a value.
pub fn resolve_api_key(api: &ApiSection) -> Option<SecretString> {
    if let Some(ref env_name) = api.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }
    api.api_key
        .as_ref()
        .filter(|key| !key.is_empty())
        .map(|key| SecretString::from(key.clone()))
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate `cfg` and build the runtime configuration.
pub fn to_core_config(cfg: &Config) -> Result<CoreConfig, ConfigError> {
    url::Url::parse(&cfg.api.base_url)
        .map_err(|e| invalid("api.base_url", format!("'{}': {e}", cfg.api.base_url)))?;

    if cfg.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be at least 1"));
    }

    let tls = if cfg.api.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = cfg.api.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let sticky_kinds = cfg
        .notifications
        .sticky_kinds
        .iter()
        .map(|kind| {
            NotificationKind::from_str(kind.trim())
                .map_err(|_| invalid("notifications.sticky_kinds", format!("unknown kind '{kind}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if cfg.uploads.max_size_bytes == 0 {
        return Err(invalid("uploads.max_size_bytes", "must be greater than 0"));
    }

    if cfg.lists.page_size == 0 || cfg.lists.page_size > MAX_PAGE_SIZE {
        return Err(invalid(
            "lists.page_size",
            format!("expected 1..={MAX_PAGE_SIZE}, got {}", cfg.lists.page_size),
        ));
    }

    let list_ordering = ListOrdering::from_str(cfg.lists.ordering.trim()).map_err(|_| {
        invalid(
            "lists.ordering",
            format!(
                "expected 'last-resolved-wins' or 'latest-issued-wins', got '{}'",
                cfg.lists.ordering
            ),
        )
    })?;

    Ok(CoreConfig {
        base_url: cfg.api.base_url.clone(),
        api_token: resolve_api_key(&cfg.api),
        tls,
        timeout: Duration::from_secs(cfg.api.timeout_secs),
        notifications: NotificationConfig {
            default_ttl: Duration::from_millis(cfg.notifications.default_ttl_ms),
            sticky_kinds,
        },
        uploads: UploadPolicy {
            max_size_bytes: cfg.uploads.max_size_bytes,
            allowed_content_types: cfg.uploads.allowed_types.clone(),
        },
        page_size: cfg.lists.page_size,
        list_ordering,
    })
}
