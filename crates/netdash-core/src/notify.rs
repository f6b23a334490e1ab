// ── Toast notification queue ──
//
// Ephemeral user-facing messages with per-entry auto-expiry. Entries are
// published as an ordered snapshot through a `watch` channel; each expiry
// timer is a tokio task guarded by its own `CancellationToken`, so an
// early dismissal cancels the timer instead of leaving it to fire later.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::stream::StateStream;

/// Default time an auto-closing toast stays visible.
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

static NEXT_NOTIFICATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique toast identifier from a monotonic counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        Self(NEXT_NOTIFICATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
    Loading,
}

/// A live toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEntry {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-push override of the auto-close behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expiry {
    /// Default TTL, unless the kind is configured as sticky.
    #[default]
    Default,
    /// Stay until dismissed.
    Never,
    /// Close after this delay regardless of kind.
    After(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub default_ttl: Duration,
    /// Kinds that never auto-close under [`Expiry::Default`].
    pub sticky_kinds: Vec<NotificationKind>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            sticky_kinds: vec![NotificationKind::Error],
        }
    }
}

// ── NotificationCenter ───────────────────────────────────────────

/// The toast queue.
///
/// Cheaply cloneable; every clone shares one queue. `push` must be called
/// from within a tokio runtime for auto-expiry to be scheduled.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<CenterInner>,
}

struct CenterInner {
    config: NotificationConfig,
    entries: watch::Sender<Arc<Vec<NotificationEntry>>>,
    /// Pending expiry timers keyed by entry.
    timers: DashMap<NotificationId, CancellationToken>,
    /// Parent of every timer token; cancelled when the queue is dropped.
    shutdown: CancellationToken,
}

impl NotificationCenter {
    pub fn new(config: NotificationConfig) -> Self {
        let (entries, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(CenterInner {
                config,
                entries,
                timers: DashMap::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.inner.config
    }

    // ── Producers ────────────────────────────────────────────────

    /// Append a toast with default expiry and return its id.
    pub fn push(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: Option<String>,
    ) -> NotificationId {
        self.push_with(kind, title, message, Expiry::Default)
    }

    pub fn push_with(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: Option<String>,
        expiry: Expiry,
    ) -> NotificationId {
        let entry = NotificationEntry {
            id: NotificationId::next(),
            kind,
            title: title.into(),
            message,
            created_at: Utc::now(),
        };
        let id = entry.id;
        debug!(%id, %kind, title = %entry.title, "toast pushed");

        self.inner
            .entries
            .send_modify(|list| Arc::make_mut(list).push(entry));

        let ttl = match expiry {
            Expiry::Default if self.inner.config.sticky_kinds.contains(&kind) => None,
            Expiry::Default => Some(self.inner.config.default_ttl),
            Expiry::Never => None,
            Expiry::After(delay) => Some(delay),
        };
        if let Some(ttl) = ttl {
            self.schedule_expiry(id, ttl);
        }
        id
    }

    pub fn success(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push(NotificationKind::Success, title, message)
    }

    /// Error toasts are sticky by default.
    pub fn error(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push(NotificationKind::Error, title, message)
    }

    pub fn warning(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push(NotificationKind::Warning, title, message)
    }

    pub fn info(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push(NotificationKind::Info, title, message)
    }

    pub fn loading(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.push(NotificationKind::Loading, title, message)
    }

    // ── Removal ──────────────────────────────────────────────────

    /// Remove a toast and cancel its timer. Unknown ids are a no-op.
    pub fn dismiss(&self, id: NotificationId) {
        if let Some((_, timer)) = self.inner.timers.remove(&id) {
            timer.cancel();
        }
        if self.inner.remove(id) {
            debug!(%id, "toast dismissed");
        }
    }

    /// Dismiss every toast and cancel every pending timer.
    pub fn clear(&self) {
        let ids: Vec<NotificationId> = self.inner.timers.iter().map(|r| *r.key()).collect();
        for id in ids {
            if let Some((_, timer)) = self.inner.timers.remove(&id) {
                timer.cancel();
            }
        }
        self.inner.entries.send_if_modified(|list| {
            if list.is_empty() {
                return false;
            }
            *list = Arc::new(Vec::new());
            true
        });
    }

    // ── Readers ──────────────────────────────────────────────────

    /// Live toasts in insertion order.
    pub fn entries(&self) -> Arc<Vec<NotificationEntry>> {
        self.inner.entries.borrow().clone()
    }

    pub fn get(&self, id: NotificationId) -> Option<NotificationEntry> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of timers still armed.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.len()
    }

    pub fn subscribe(&self) -> StateStream<Vec<NotificationEntry>> {
        StateStream::new(self.inner.entries.subscribe())
    }

    // ── Timers ───────────────────────────────────────────────────

    fn schedule_expiry(&self, id: NotificationId, ttl: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(%id, "no tokio runtime; toast will not auto-close");
            return;
        };

        let token = self.inner.shutdown.child_token();
        self.inner.timers.insert(id, token.clone());
        let queue: Weak<CenterInner> = Arc::downgrade(&self.inner);

        handle.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(ttl) => {
                    if let Some(inner) = queue.upgrade() {
                        inner.expire(id);
                    }
                }
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn fire_expiry(&self, id: NotificationId) {
        self.inner.expire(id);
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

impl CenterInner {
    /// Timer path. Safe to run any number of times per id.
    fn expire(&self, id: NotificationId) {
        self.timers.remove(&id);
        if self.remove(id) {
            debug!(%id, "toast expired");
        }
    }

    fn remove(&self, id: NotificationId) -> bool {
        self.entries.send_if_modified(|list| {
            let Some(pos) = list.iter().position(|e| e.id == id) else {
                return false;
            };
            Arc::make_mut(list).remove(pos);
            true
        })
    }
}

impl Drop for CenterInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
