// ── Collection item contract ──
//
// Every type held by a `ResourceSlice` implements `Resource`. The trait
// carries the identity key, the endpoint it lives under, and the
// projections the facade's derived utilities rely on (category, size,
// tags, sort keys, text matching).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::EntityId;
use crate::validate::UploadFile;

/// A remote collection item.
pub trait Resource: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Metadata sent on create (JSON body or multipart `metadata` part).
    type Draft: Serialize + Clone + fmt::Debug + Send + Sync + 'static;
    /// Partial update sent on `update`, also applied locally by optimistic updates.
    type Patch: Serialize + Clone + fmt::Debug + Send + Sync + 'static;

    /// Backend collection path segment (e.g. `"documents"`).
    const COLLECTION: &'static str;
    /// Singular human label used in logs and toasts.
    const LABEL: &'static str;

    fn id(&self) -> &EntityId;

    /// Apply a patch in place, mirroring what the server would do.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Bucket used by the per-category statistics.
    fn category(&self) -> Option<&str> {
        None
    }

    fn size_bytes(&self) -> u64 {
        0
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    /// Project a sortable value for `field`; `None` for unknown fields.
    fn sort_key(&self, field: &str) -> Option<SortKey>;

    /// Case-insensitive free-text match against the item's text fields.
    /// `needle` is already lowercased.
    fn matches_text(&self, needle: &str) -> bool;

    /// Derive the per-file draft used by batch uploads.
    fn draft_for_upload(base: &Self::Draft, _file: &UploadFile) -> Self::Draft {
        base.clone()
    }
}

/// Totally ordered projection of a field value for client-side sorting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Flag(bool),
    Number(u64),
    Time(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    /// Text key compared case-insensitively.
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_lowercase())
    }
}

/// Aggregates recomputed from `items` after every change to the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStats {
    pub total: usize,
    pub total_size: u64,
    pub by_category: BTreeMap<String, usize>,
}

/// Bucket for items without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

impl ResourceStats {
    pub fn from_items<R: Resource>(items: &[Arc<R>]) -> Self {
        let mut stats = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            stats.total_size = stats.total_size.saturating_add(item.size_bytes());
            let bucket = item.category().unwrap_or(UNCATEGORIZED);
            *stats.by_category.entry(bucket.to_owned()).or_insert(0) += 1;
        }
        stats
    }
}
