// ── Runtime configuration ──
//
// Everything `AppState` needs to wire itself up. Built by the CLI from
// `netdash-config`; core never reads configuration files itself.

use std::time::Duration;

use netdash_api::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
use secrecy::SecretString;

use crate::notify::NotificationConfig;
use crate::slice::{DEFAULT_PAGE_SIZE, ListOrdering, SliceConfig};
use crate::validate::UploadPolicy;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// REST backend root, e.g. `https://noc.example.net/api`.
    pub base_url: String,
    /// Bearer token sent on every request.
    pub api_token: Option<SecretString>,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub notifications: NotificationConfig,
    pub uploads: UploadPolicy,
    pub page_size: u32,
    pub list_ordering: ListOrdering,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_token: None,
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
            notifications: NotificationConfig::default(),
            uploads: UploadPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            list_ordering: ListOrdering::default(),
        }
    }
}

impl CoreConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }

    pub fn slice_config(&self) -> SliceConfig {
        SliceConfig {
            page_size: self.page_size,
            ordering: self.list_ordering,
            upload_policy: self.uploads.clone(),
        }
    }
}
