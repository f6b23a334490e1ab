// ── Resource collection state ──
//
// Plain data plus the synchronous transitions applied at each phase of an
// operation. `ResourceSlice` runs these inside `watch::Sender::send_modify`,
// so every transition is atomic with respect to readers.

use std::collections::BTreeMap;
use std::sync::Arc;

use netdash_api::{ListQuery, Page, PageMeta, SearchResponse, SortOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;
use crate::model::{EntityId, Resource, ResourceStats};

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Named asynchronous operations. `list` and `get` both count as `Fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
    Search,
}

/// In-flight counters per operation.
///
/// Counting rather than a plain flag keeps `is_loading` raised while two
/// overlapping calls of the same kind are pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    fetch: u32,
    create: u32,
    update: u32,
    delete: u32,
    search: u32,
}

impl LoadingFlags {
    fn slot_mut(&mut self, op: Operation) -> &mut u32 {
        match op {
            Operation::Fetch => &mut self.fetch,
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Delete => &mut self.delete,
            Operation::Search => &mut self.search,
        }
    }

    pub fn in_flight(&self, op: Operation) -> u32 {
        match op {
            Operation::Fetch => self.fetch,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
            Operation::Search => self.search,
        }
    }

    pub fn is_loading(&self, op: Operation) -> bool {
        self.in_flight(op) > 0
    }

    /// True while any operation is in flight.
    pub fn any(&self) -> bool {
        Operation::iter().any(|op| self.is_loading(op))
    }

    pub(crate) fn begin(&mut self, op: Operation) {
        let slot = self.slot_mut(op);
        *slot = slot.saturating_add(1);
    }

    pub(crate) fn end(&mut self, op: Operation) {
        let slot = self.slot_mut(op);
        *slot = slot.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_pages: 0,
            total_count: 0,
            has_next: false,
            has_previous: false,
        }
    }

    /// Set `total_count` after a local insert or removal and recompute the
    /// page count and `has_next` from it. The current page is kept.
    pub(crate) fn set_total_count(&mut self, total_count: u64) {
        let per_page = u64::from(self.page_size.max(1));
        self.total_count = total_count;
        self.total_pages = u32::try_from(total_count.div_ceil(per_page)).unwrap_or(u32::MAX);
        self.has_next = self.current_page < self.total_pages;
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl From<PageMeta> for Pagination {
    fn from(meta: PageMeta) -> Self {
        Self {
            current_page: meta.current_page,
            page_size: meta.page_size,
            total_pages: meta.total_pages,
            total_count: meta.total_count,
            has_next: meta.has_next,
            has_previous: meta.has_previous,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortOrder::Asc,
            SortDirection::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sorting {
    pub field: String,
    pub direction: SortDirection,
}

impl Default for Sorting {
    fn default() -> Self {
        Self {
            field: "createdAt".into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Shallow-merge patch for [`Sorting`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortingPatch {
    pub field: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortingPatch {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            direction: None,
        }
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    fn merged_over(&self, base: &Sorting) -> Sorting {
        Sorting {
            field: self.field.clone().unwrap_or_else(|| base.field.clone()),
            direction: self.direction.unwrap_or(base.direction),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub file_name: Option<String>,
    /// Non-decreasing while `in_progress`.
    pub percent: u8,
    pub in_progress: bool,
    #[serde(skip)]
    pub(crate) generation: u64,
}

impl UploadProgress {
    /// Whether a progress report from upload `generation` should be applied.
    pub(crate) fn accepts(&self, generation: u64, percent: u8) -> bool {
        self.in_progress && self.generation == generation && percent > self.percent
    }
}

/// Explicit overrides for one `list` call, merged over the current
/// pagination, filter, and sort state. Overrides are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: BTreeMap<String, String>,
    pub sorting: SortingPatch,
}

impl ListParams {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

/// How overlapping `list` calls are reconciled.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ListOrdering {
    /// Whichever response settles last determines `items`.
    #[default]
    LastResolvedWins,
    /// Responses older than the most recently applied request are dropped.
    LatestIssuedWins,
}

// ── ResourceState ────────────────────────────────────────────────

/// Client-side view of one remote collection.
#[derive(Debug, Clone)]
pub struct ResourceState<R: Resource> {
    /// Server order, no duplicate ids.
    pub items: Vec<Arc<R>>,
    /// When also present in `items`, the very same `Arc`.
    pub current: Option<Arc<R>>,
    pub search_results: Vec<Arc<R>>,
    pub last_search_query: String,
    pub pagination: Pagination,
    pub loading: LoadingFlags,
    pub error: Option<CoreError>,
    pub filters: BTreeMap<String, String>,
    pub sorting: Sorting,
    pub upload: UploadProgress,
    pub stats: ResourceStats,
    applied_list_seq: u64,
    upload_generation: u64,
}

impl<R: Resource> Default for ResourceState<R> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl<R: Resource> ResourceState<R> {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            current: None,
            search_results: Vec::new(),
            last_search_query: String::new(),
            pagination: Pagination::with_page_size(page_size),
            loading: LoadingFlags::default(),
            error: None,
            filters: BTreeMap::new(),
            sorting: Sorting::default(),
            upload: UploadProgress::default(),
            stats: ResourceStats::default(),
            applied_list_seq: 0,
            upload_generation: 0,
        }
    }

    pub fn find(&self, id: &EntityId) -> Option<&Arc<R>> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Effective query for a `list` call: current state with `params` on top.
    pub fn list_query(&self, params: &ListParams) -> ListQuery {
        let sorting = params.sorting.merged_over(&self.sorting);
        let mut filters = self.filters.clone();
        filters.extend(params.filters.clone());
        ListQuery {
            page: params.page.unwrap_or(self.pagination.current_page).max(1),
            page_size: params.page_size.unwrap_or(self.pagination.page_size),
            sort_by: Some(sorting.field),
            sort_order: sorting.direction.into(),
            filters,
        }
    }

    // ── Phase transitions ────────────────────────────────────────

    pub(crate) fn begin(&mut self, op: Operation) {
        self.loading.begin(op);
    }

    /// Fulfilled: lower the flag and clear any stored error.
    pub(crate) fn succeed(&mut self, op: Operation) {
        self.loading.end(op);
        self.error = None;
    }

    /// Rejected: lower the flag and record the error.
    pub(crate) fn fail(&mut self, op: Operation, err: CoreError) {
        self.loading.end(op);
        self.error = Some(err);
    }

    /// Settle list call `seq`. Returns whether the outcome was applied;
    /// under [`ListOrdering::LatestIssuedWins`] outcomes older than the last
    /// applied call are dropped.
    pub(crate) fn settle_list(
        &mut self,
        seq: u64,
        ordering: ListOrdering,
        outcome: Result<Page<R>, CoreError>,
    ) -> bool {
        if ordering == ListOrdering::LatestIssuedWins && seq < self.applied_list_seq {
            self.loading.end(Operation::Fetch);
            return false;
        }
        self.applied_list_seq = self.applied_list_seq.max(seq);
        match outcome {
            Ok(page) => {
                self.replace_items(page.items);
                self.pagination = page.pagination.into();
                self.succeed(Operation::Fetch);
            }
            Err(err) => self.fail(Operation::Fetch, err),
        }
        true
    }

    fn replace_items(&mut self, items: Vec<R>) {
        let mut fresh: Vec<Arc<R>> = Vec::with_capacity(items.len());
        for item in items {
            if fresh.iter().any(|seen| seen.id() == item.id()) {
                continue;
            }
            fresh.push(Arc::new(item));
        }
        self.items = fresh;

        // Keep `current` pointing at the list's copy when it is in the page.
        if let Some(id) = self.current.as_ref().map(|c| c.id().clone()) {
            if let Some(entry) = self.find(&id) {
                self.current = Some(Arc::clone(entry));
            }
        }
        self.refresh_stats();
    }

    /// Insert a newly created item at the front and make it current. The
    /// page itself is not trimmed back to `page_size`; the next `list` does
    /// that.
    pub(crate) fn apply_created(&mut self, item: Arc<R>) {
        let before = self.items.len();
        self.items.retain(|existing| existing.id() != item.id());
        if self.items.len() == before {
            let total = self.pagination.total_count.saturating_add(1);
            self.pagination.set_total_count(total);
        }
        self.items.insert(0, Arc::clone(&item));
        self.current = Some(item);
        self.refresh_stats();
    }

    /// A fetched item becomes current and refreshes its list entries in place.
    pub(crate) fn apply_fetched(&mut self, item: Arc<R>) {
        self.replace_in_place(&item);
        self.current = Some(item);
    }

    /// Replace every copy of the item without reordering anything.
    pub(crate) fn apply_updated(&mut self, item: Arc<R>) {
        self.replace_in_place(&item);
        if self.current.as_ref().is_some_and(|c| c.id() == item.id()) {
            self.current = Some(item);
        }
    }

    pub(crate) fn apply_removed(&mut self, id: &EntityId) {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() < before {
            let total = self.pagination.total_count.saturating_sub(1);
            self.pagination.set_total_count(total);
        }
        self.search_results.retain(|item| item.id() != id);
        if self.current.as_ref().is_some_and(|c| c.id() == id) {
            self.current = None;
        }
        self.refresh_stats();
    }

    pub(crate) fn apply_search(&mut self, query: &str, response: SearchResponse<R>) {
        self.search_results = response.results.into_iter().map(Arc::new).collect();
        query.clone_into(&mut self.last_search_query);
    }

    fn replace_in_place(&mut self, item: &Arc<R>) {
        let id = item.id();
        for entry in self
            .items
            .iter_mut()
            .chain(self.search_results.iter_mut())
            .filter(|entry| entry.id() == id)
        {
            *entry = Arc::clone(item);
        }
        self.refresh_stats();
    }

    pub(crate) fn refresh_stats(&mut self) {
        self.stats = ResourceStats::from_items(&self.items);
    }

    // ── Local selection ──────────────────────────────────────────

    /// Select an item already held in `items` or `search_results`.
    pub(crate) fn select(&mut self, id: &EntityId) -> bool {
        let found = self
            .items
            .iter()
            .chain(self.search_results.iter())
            .find(|item| item.id() == id)
            .cloned();
        match found {
            Some(item) => {
                self.current = Some(item);
                true
            }
            None => false,
        }
    }

    /// Make an arbitrary item current. A matching list entry is replaced
    /// by the same allocation.
    pub(crate) fn select_item(&mut self, item: Arc<R>) {
        self.replace_in_place(&item);
        self.current = Some(item);
    }

    pub(crate) fn merge_filters(&mut self, filters: BTreeMap<String, String>) {
        self.filters.extend(filters);
        self.pagination.current_page = 1;
    }

    pub(crate) fn clear_filters(&mut self) {
        self.filters.clear();
        self.pagination.current_page = 1;
    }

    pub(crate) fn merge_sorting(&mut self, patch: &SortingPatch) {
        self.sorting = patch.merged_over(&self.sorting);
    }

    pub(crate) fn clear_search(&mut self) {
        self.search_results.clear();
        self.last_search_query.clear();
    }

    // ── Upload progress ──────────────────────────────────────────

    /// Start tracking an upload and return its generation.
    pub(crate) fn start_upload(&mut self, file_name: &str) -> u64 {
        self.upload_generation = self.upload_generation.wrapping_add(1);
        self.upload = UploadProgress {
            file_name: Some(file_name.to_owned()),
            percent: 0,
            in_progress: true,
            generation: self.upload_generation,
        };
        self.upload_generation
    }

    /// Back to idle, unless a newer upload has taken over the tracker.
    pub(crate) fn finish_upload(&mut self, generation: u64) {
        if self.upload.generation == generation {
            self.upload = UploadProgress::default();
        }
    }

    // ── Optimistic updates ───────────────────────────────────────

    /// Apply `patch` locally. Returns `(previous, optimistic)` when the item
    /// is held locally, `None` otherwise.
    pub(crate) fn apply_optimistic(
        &mut self,
        id: &EntityId,
        patch: &R::Patch,
    ) -> Option<(Arc<R>, Arc<R>)> {
        let previous = self
            .find(id)
            .or_else(|| self.current.as_ref().filter(|c| c.id() == id))
            .cloned()?;
        let mut patched = R::clone(&previous);
        patched.apply_patch(patch);
        let optimistic = Arc::new(patched);
        self.apply_updated(Arc::clone(&optimistic));
        Some((previous, optimistic))
    }

    /// Restore `previous` wherever `optimistic` is still the live value.
    pub(crate) fn rollback_optimistic(&mut self, previous: &Arc<R>, optimistic: &Arc<R>) {
        for entry in self
            .items
            .iter_mut()
            .chain(self.search_results.iter_mut())
            .filter(|entry| Arc::ptr_eq(entry, optimistic))
        {
            *entry = Arc::clone(previous);
        }
        if let Some(current) = self.current.as_mut() {
            if Arc::ptr_eq(current, optimistic) {
                *current = Arc::clone(previous);
            }
        }
        self.refresh_stats();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{Document, DocumentPatch};
    use crate::slice::testing::{doc, page_of};

    fn state_with(ids: &[&str]) -> ResourceState<Document> {
        let mut state = ResourceState::new(10);
        let docs = ids.iter().map(|id| doc(id, "application/pdf", 100)).collect();
        state.settle_list(1, ListOrdering::LastResolvedWins, Ok(page_of(docs, 1, 3)));
        state
    }

    fn ids(items: &[Arc<Document>]) -> Vec<String> {
        items.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn loading_counters_track_overlap() {
        let mut flags = LoadingFlags::default();
        flags.begin(Operation::Fetch);
        flags.begin(Operation::Fetch);
        flags.end(Operation::Fetch);
        assert!(flags.is_loading(Operation::Fetch));
        assert!(flags.any());
        flags.end(Operation::Fetch);
        flags.end(Operation::Fetch);
        assert!(!flags.any());
        assert_eq!(flags.in_flight(Operation::Fetch), 0);
    }

    #[test]
    fn list_query_merges_filters_and_overrides() {
        let mut state: ResourceState<Document> = ResourceState::new(25);
        state.merge_filters(BTreeMap::from([("category".into(), "reports".into())]));
        let params = ListParams::page(3).filter("contentType", "application/pdf");
        let query = state.list_query(&params);

        assert_eq!(query.page, 3);
        assert_eq!(query.page_size, 25);
        assert_eq!(query.sort_by.as_deref(), Some("createdAt"));
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters["category"], "reports");
        // Overrides are not persisted.
        assert_eq!(state.filters.len(), 1);
    }

    #[test]
    fn list_drops_duplicate_ids() {
        let state = state_with(&["a", "b", "a"]);
        assert_eq!(ids(&state.items), vec!["a", "b"]);
        assert_eq!(state.stats.total, 2);
    }

    #[test]
    fn list_rebinds_current_to_fresh_entry() {
        let mut state = state_with(&["a", "b"]);
        assert!(state.select(&"b".into()));
        let docs = vec![doc("b", "text/plain", 5), doc("c", "text/plain", 5)];
        state.settle_list(2, ListOrdering::LastResolvedWins, Ok(page_of(docs, 1, 1)));
        assert!(Arc::ptr_eq(
            state.current.as_ref().unwrap(),
            state.find(&"b".into()).unwrap()
        ));
    }

    #[test]
    fn stale_list_is_dropped_when_latest_wins() {
        let mut state = state_with(&["a"]);
        state.begin(Operation::Fetch);
        state.begin(Operation::Fetch);
        let newer = page_of(vec![doc("new", "text/plain", 1)], 2, 2);
        let older = page_of(vec![doc("old", "text/plain", 1)], 1, 2);

        assert!(state.settle_list(3, ListOrdering::LatestIssuedWins, Ok(newer)));
        assert!(!state.settle_list(2, ListOrdering::LatestIssuedWins, Ok(older)));
        assert_eq!(ids(&state.items), vec!["new"]);
        assert_eq!(state.pagination.current_page, 2);
        assert!(!state.loading.is_loading(Operation::Fetch));
    }

    #[test]
    fn create_prepends_and_becomes_current() {
        let mut state = state_with(&["a", "b"]);
        let created = Arc::new(doc("c", "text/plain", 7));
        state.apply_created(Arc::clone(&created));
        assert_eq!(ids(&state.items), vec!["c", "a", "b"]);
        assert!(Arc::ptr_eq(state.current.as_ref().unwrap(), &created));
        assert_eq!(state.pagination.total_count, 3);
    }

    #[test]
    fn local_writes_recompute_page_count() {
        let mut state: ResourceState<Document> = ResourceState::new(2);
        let mut page = page_of(
            vec![doc("a", "application/pdf", 1), doc("b", "application/pdf", 1)],
            1,
            1,
        );
        page.pagination.page_size = 2;
        state.settle_list(1, ListOrdering::LastResolvedWins, Ok(page));
        assert!(!state.pagination.has_next);

        state.apply_created(Arc::new(doc("c", "text/plain", 1)));
        assert_eq!(state.pagination.total_count, 3);
        assert_eq!(state.pagination.total_pages, 2);
        assert!(state.pagination.has_next);

        state.apply_removed(&"a".into());
        assert_eq!(state.pagination.total_count, 2);
        assert_eq!(state.pagination.total_pages, 1);
        assert!(!state.pagination.has_next);
        assert_eq!(state.pagination.current_page, 1);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut state = state_with(&["a", "b", "c"]);
        state.select(&"b".into());
        let mut changed = doc("b", "text/plain", 1);
        changed.title = "renamed".into();
        let changed = Arc::new(changed);
        state.apply_updated(Arc::clone(&changed));

        assert_eq!(ids(&state.items), vec!["a", "b", "c"]);
        assert_eq!(state.items[1].title, "renamed");
        assert!(Arc::ptr_eq(state.current.as_ref().unwrap(), &state.items[1]));
    }

    #[test]
    fn remove_clears_every_copy() {
        let mut state = state_with(&["a", "b"]);
        state.search_results = vec![Arc::clone(&state.items[0])];
        state.select(&"a".into());
        state.apply_removed(&"a".into());

        assert_eq!(ids(&state.items), vec!["b"]);
        assert!(state.search_results.is_empty());
        assert!(state.current.is_none());
        assert_eq!(state.pagination.total_count, 1);
    }

    #[test]
    fn upload_progress_ignores_other_generations() {
        let mut state: ResourceState<Document> = ResourceState::default();
        let first = state.start_upload("a.pdf");
        let second = state.start_upload("b.pdf");
        assert!(!state.upload.accepts(first, 50));
        assert!(state.upload.accepts(second, 50));

        state.finish_upload(first);
        assert!(state.upload.in_progress);
        state.finish_upload(second);
        assert_eq!(state.upload, UploadProgress::default());
    }

    #[test]
    fn rollback_skips_superseded_values() {
        let mut state = state_with(&["a"]);
        let patch = DocumentPatch {
            title: Some("draft".into()),
            ..DocumentPatch::default()
        };
        let (previous, optimistic) = state.apply_optimistic(&"a".into(), &patch).unwrap();
        assert_eq!(state.items[0].title, "draft");

        let mut newer = doc("a", "text/plain", 1);
        newer.title = "server".into();
        state.apply_updated(Arc::new(newer));
        state.rollback_optimistic(&previous, &optimistic);
        assert_eq!(state.items[0].title, "server");
    }

    #[test]
    fn merging_filters_resets_page() {
        let mut state: ResourceState<Document> = ResourceState::default();
        state.pagination.current_page = 4;
        state.merge_filters(BTreeMap::from([("tag".into(), "ops".into())]));
        assert_eq!(state.pagination.current_page, 1);

        state.merge_sorting(&SortingPatch::field("title"));
        assert_eq!(state.sorting.field, "title");
        assert_eq!(state.sorting.direction, SortDirection::Desc);
    }
}
