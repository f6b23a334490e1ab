// Wire types shared by every collection endpoint.
//
// The backend wraps list and search responses in small envelopes and
// speaks camelCase JSON. Query types render into URL parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ── Responses ────────────────────────────────────────────────────────

/// Pagination metadata returned alongside a page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

fn first_page() -> u32 {
    1
}

/// `GET /{collection}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// `GET /{collection}/search` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// `DELETE /{collection}/{id}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default = "acknowledged")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn acknowledged() -> bool {
    true
}

impl Default for Confirmation {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

// ── Queries ──────────────────────────────────────────────────────────

/// Sort order as understood by the backend (`asc` / `desc`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Effective parameters for a list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
    /// Active filter criteria, flattened into individual query parameters.
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Render as `(name, value)` query pairs. Filters never shadow the
    /// reserved pagination/sort parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_owned(), self.page.to_string()),
            ("pageSize".to_owned(), self.page_size.to_string()),
        ];
        if let Some(ref field) = self.sort_by {
            params.push(("sortBy".to_owned(), field.clone()));
            params.push(("sortOrder".to_owned(), self.sort_order.to_string()));
        }
        push_filters(&mut params, &self.filters);
        params
    }
}

/// Parameters for a search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: BTreeMap<String, String>,
}

impl SearchQuery {
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_owned(), self.query.clone())];
        if let Some(page) = self.page {
            params.push(("page".to_owned(), page.to_string()));
        }
        if let Some(size) = self.page_size {
            params.push(("pageSize".to_owned(), size.to_string()));
        }
        push_filters(&mut params, &self.filters);
        params
    }
}

const RESERVED_PARAMS: &[&str] = &["page", "pageSize", "sortBy", "sortOrder", "q"];

fn push_filters(params: &mut Vec<(String, String)>, filters: &BTreeMap<String, String>) {
    for (key, value) in filters {
        if RESERVED_PARAMS.contains(&key.as_str()) || value.is_empty() {
            continue;
        }
        params.push((key.clone(), value.clone()));
    }
}

// ── Uploads ──────────────────────────────────────────────────────────

/// Binary payload attached to a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadPayload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Bytes handed to the connection so far for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub sent: u64,
    pub total: u64,
}

impl TransferProgress {
    /// Whole-number percentage in `0..=100`. An empty body counts as done.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = self.sent.min(self.total).saturating_mul(100) / self.total;
        u8::try_from(pct).unwrap_or(100)
    }
}

/// Progress handler passed directly into an upload call.
pub type ProgressFn = Arc<dyn Fn(TransferProgress) + Send + Sync>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn list_query_flattens_filters() {
        let mut filters = BTreeMap::new();
        filters.insert("contentType".to_owned(), "application/pdf".to_owned());
        filters.insert("category".to_owned(), String::new());
        let query = ListQuery {
            page: 2,
            page_size: 25,
            sort_by: Some("createdAt".into()),
            sort_order: SortOrder::Asc,
            filters,
        };

        let params = query.to_params();
        assert!(params.contains(&("page".into(), "2".into())));
        assert!(params.contains(&("pageSize".into(), "25".into())));
        assert!(params.contains(&("sortOrder".into(), "asc".into())));
        assert!(params.contains(&("contentType".into(), "application/pdf".into())));
        assert!(!params.iter().any(|(k, _)| k == "category"));
    }

    #[test]
    fn filters_cannot_override_pagination() {
        let mut filters = BTreeMap::new();
        filters.insert("page".to_owned(), "99".to_owned());
        let query = ListQuery {
            page: 1,
            page_size: 10,
            filters,
            ..ListQuery::default()
        };
        let pages: Vec<_> = query
            .to_params()
            .into_iter()
            .filter(|(k, _)| k == "page")
            .collect();
        assert_eq!(pages, vec![("page".to_owned(), "1".to_owned())]);
    }

    #[test]
    fn page_meta_parses_camel_case() {
        let meta: PageMeta = serde_json::from_str(
            r#"{"currentPage":3,"pageSize":20,"totalPages":5,"totalCount":97,"hasNext":true,"hasPrevious":true}"#,
        )
        .unwrap();
        assert_eq!(meta.current_page, 3);
        assert_eq!(meta.total_count, 97);
        assert!(meta.has_next);
    }

    #[test]
    fn progress_percent_is_clamped() {
        assert_eq!(TransferProgress { sent: 0, total: 200 }.percent(), 0);
        assert_eq!(TransferProgress { sent: 50, total: 200 }.percent(), 25);
        assert_eq!(TransferProgress { sent: 300, total: 200 }.percent(), 100);
        assert_eq!(TransferProgress { sent: 0, total: 0 }.percent(), 100);
    }
}
