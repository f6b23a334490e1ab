//! Client-side data layer for the netdash operations dashboard.
//!
//! Sits between `netdash-api` and the front ends:
//!
//! - **[`ResourceSlice`]**: single-writer cache of one remote collection
//!   (items, current item, search results, pagination, filters, sorting,
//!   per-operation loading counters, last error, upload progress). Every
//!   remote operation runs pending → fulfilled | rejected, each phase an
//!   atomic update of a `tokio::sync::watch` snapshot.
//!
//! - **[`ResourceHook`]**: the facade views use: slice actions plus
//!   composite workflows (validated and batch uploads, confirmed delete,
//!   drag and drop) and derived utilities.
//!
//! - **[`NotificationCenter`]**: toast queue with per-entry auto-expiry
//!   timers that are cancelled on early dismissal.
//!
//! - **[`AppState`]**: the explicitly constructed container that owns
//!   all of the above for one running application.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod hook;
pub mod model;
pub mod notify;
pub mod slice;
pub mod stream;
pub mod ui;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::{HttpResourceApi, ResourceApi};
pub use app::{AppState, DocumentsHook, MessagesHook};
pub use config::CoreConfig;
pub use error::{CoreError, ErrorKind, ErrorReport, ValidationIssue, ValidationRule};
pub use hook::{DropEvent, ResourceHook, UploadOutcome};
pub use notify::{
    Expiry, NotificationCenter, NotificationConfig, NotificationEntry, NotificationId,
    NotificationKind,
};
pub use slice::{
    ListOrdering, ListParams, Operation, Pagination, ResourceSlice, ResourceState, SliceConfig,
    SortDirection, Sorting, SortingPatch, UploadProgress,
};
pub use stream::StateStream;
pub use ui::{Theme, UiSlice, UiState};
pub use validate::{UploadFile, UploadPolicy};

pub use model::{
    Document, DocumentDraft, DocumentPatch, EntityId, Message, MessageDraft, MessagePatch,
    MessagePriority, Resource, ResourceStats,
};
