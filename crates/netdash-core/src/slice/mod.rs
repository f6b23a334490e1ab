// ── Async resource slice ──
//
// Single writer of one collection's `ResourceState`. Every operation runs
// as pending → (await backend) → fulfilled | rejected, and each phase is
// one atomic `send_modify` on the state channel. Failures are stored in
// the state and also returned to the caller.

mod state;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use netdash_api::{Confirmation, ProgressFn, SearchQuery, TransferProgress};
use tokio::sync::watch;
use tracing::{debug, warn};

pub use self::state::{
    DEFAULT_PAGE_SIZE, ListOrdering, ListParams, LoadingFlags, Operation, Pagination,
    ResourceState, SortDirection, Sorting, SortingPatch, UploadProgress,
};
use crate::api::ResourceApi;
use crate::error::CoreError;
use crate::model::{EntityId, Resource};
use crate::stream::StateStream;
use crate::validate::{UploadFile, UploadPolicy};

/// Construction-time settings for a slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceConfig {
    pub page_size: u32,
    pub ordering: ListOrdering,
    pub upload_policy: UploadPolicy,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            ordering: ListOrdering::default(),
            upload_policy: UploadPolicy::default(),
        }
    }
}

/// Client-side cache of one remote collection.
///
/// Cheaply cloneable; clones share the same state and backend.
pub struct ResourceSlice<R: Resource, A> {
    inner: Arc<SliceInner<R, A>>,
}

struct SliceInner<R: Resource, A> {
    api: A,
    state: watch::Sender<Arc<ResourceState<R>>>,
    policy: UploadPolicy,
    ordering: ListOrdering,
    list_seq: AtomicU64,
}

impl<R: Resource, A> Clone for ResourceSlice<R, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource, A: ResourceApi<R>> ResourceSlice<R, A> {
    pub fn new(api: A, config: SliceConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(ResourceState::new(config.page_size)));
        Self {
            inner: Arc::new(SliceInner {
                api,
                state,
                policy: config.upload_policy,
                ordering: config.ordering,
                list_seq: AtomicU64::new(0),
            }),
        }
    }

    // ── Reading ──────────────────────────────────────────────────

    /// Current state snapshot.
    pub fn snapshot(&self) -> Arc<ResourceState<R>> {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<ResourceState<R>> {
        StateStream::new(self.inner.state.subscribe())
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.inner.policy
    }

    pub fn ordering(&self) -> ListOrdering {
        self.inner.ordering
    }

    pub fn api(&self) -> &A {
        &self.inner.api
    }

    fn modify<T: Default>(&self, f: impl FnOnce(&mut ResourceState<R>) -> T) -> T {
        let mut out = T::default();
        self.inner
            .state
            .send_modify(|state| out = f(Arc::make_mut(state)));
        out
    }

    fn reject(&self, op: Operation, err: CoreError) -> CoreError {
        warn!(collection = R::COLLECTION, %op, error = %err, "operation failed");
        self.modify(|s| s.fail(op, err.clone()));
        err
    }

    // ── Remote operations ────────────────────────────────────────

    /// Fetch a page using current pagination, filters, and sorting with
    /// `params` layered on top. On success `items`, `pagination`, and
    /// `stats` are replaced wholesale; on failure they are left untouched.
    ///
    /// Returns the pagination the server reported for this call. Under
    /// [`ListOrdering::LatestIssuedWins`] a superseded call still returns
    /// its own outcome but does not touch the state.
    pub async fn list(&self, params: ListParams) -> Result<Pagination, CoreError> {
        let seq = self.inner.list_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let query = self.modify(|s| {
            s.begin(Operation::Fetch);
            s.list_query(&params)
        });
        debug!(
            collection = R::COLLECTION,
            seq,
            page = query.page,
            filters = query.filters.len(),
            "list requested"
        );

        let outcome = self
            .inner
            .api
            .list(&query)
            .await
            .map_err(CoreError::from);
        let reply = outcome
            .as_ref()
            .map(|page| Pagination::from(page.pagination.clone()))
            .map_err(Clone::clone);
        let ordering = self.inner.ordering;

        let applied = self.modify(|s| s.settle_list(seq, ordering, outcome));
        match reply {
            Ok(pagination) => {
                debug!(collection = R::COLLECTION, seq, applied, "list fulfilled");
                Ok(pagination)
            }
            Err(err) => {
                warn!(collection = R::COLLECTION, seq, applied, error = %err, "list failed");
                Err(err)
            }
        }
    }

    /// Create an item, optionally uploading `file` with it.
    ///
    /// The file is validated against the upload policy first; a rejected
    /// file fails with every violated rule and nothing is sent. While the
    /// upload runs `upload.percent` only moves forward; it returns to idle
    /// once the call settles.
    pub async fn create(
        &self,
        draft: R::Draft,
        file: Option<UploadFile>,
        progress: Option<ProgressFn>,
    ) -> Result<Arc<R>, CoreError> {
        if let Some(ref file) = file {
            if let Err(err) = self.inner.policy.validate(file) {
                warn!(collection = R::COLLECTION, file = %file.file_name, error = %err, "upload rejected");
                self.modify(|s| s.error = Some(err.clone()));
                return Err(err);
            }
        }

        let generation = self.modify(|s| {
            s.begin(Operation::Create);
            file.as_ref().map(|f| s.start_upload(&f.file_name))
        });
        debug!(
            collection = R::COLLECTION,
            file = file.as_ref().map(|f| f.file_name.as_str()),
            "create requested"
        );

        let reporter = generation.map(|generation| self.progress_reporter(generation, progress));
        let payload = file.as_ref().map(UploadFile::to_payload);
        let outcome = self.inner.api.create(&draft, payload, reporter).await;

        if let Some(generation) = generation {
            self.modify(|s| s.finish_upload(generation));
        }
        match outcome {
            Ok(item) => {
                let item = Arc::new(item);
                debug!(collection = R::COLLECTION, id = %item.id(), "create fulfilled");
                self.modify(|s| {
                    s.apply_created(Arc::clone(&item));
                    s.succeed(Operation::Create);
                });
                Ok(item)
            }
            Err(err) => Err(self.reject(Operation::Create, err.into())),
        }
    }

    /// Wrap the caller's handler so every report also advances
    /// `upload.percent` for this upload only.
    fn progress_reporter(&self, generation: u64, user: Option<ProgressFn>) -> ProgressFn {
        let slice: Weak<SliceInner<R, A>> = Arc::downgrade(&self.inner);
        Arc::new(move |progress: TransferProgress| {
            if let Some(inner) = slice.upgrade() {
                let percent = progress.percent();
                inner.state.send_if_modified(|state| {
                    if !state.upload.accepts(generation, percent) {
                        return false;
                    }
                    Arc::make_mut(state).upload.percent = percent;
                    true
                });
            }
            if let Some(ref user) = user {
                user(progress);
            }
        })
    }

    /// Server-side search. Blank queries are skipped: no request is made,
    /// `search_results` is left as is, and an empty list is returned.
    pub async fn search(&self, query: &str, params: ListParams) -> Result<Vec<Arc<R>>, CoreError> {
        let text = query.trim();
        if text.is_empty() {
            debug!(collection = R::COLLECTION, "blank search skipped");
            return Ok(Vec::new());
        }

        let request = self.modify(|s| {
            s.begin(Operation::Search);
            let mut filters = s.filters.clone();
            filters.extend(params.filters);
            SearchQuery {
                query: text.to_owned(),
                page: params.page,
                page_size: params.page_size,
                filters,
            }
        });
        debug!(collection = R::COLLECTION, query = text, "search requested");

        match self.inner.api.search(&request).await {
            Ok(response) => {
                let results = self.modify(|s| {
                    s.apply_search(text, response);
                    s.succeed(Operation::Search);
                    s.search_results.clone()
                });
                Ok(results)
            }
            Err(err) => Err(self.reject(Operation::Search, err.into())),
        }
    }

    /// Fetch one item; it becomes `current` and refreshes any list copy.
    pub async fn get(&self, id: &EntityId) -> Result<Arc<R>, CoreError> {
        self.modify(|s| s.begin(Operation::Fetch));
        debug!(collection = R::COLLECTION, %id, "get requested");

        match self.inner.api.get(id).await {
            Ok(item) => {
                let item = Arc::new(item);
                self.modify(|s| {
                    s.apply_fetched(Arc::clone(&item));
                    s.succeed(Operation::Fetch);
                });
                Ok(item)
            }
            Err(err) => Err(self.reject(Operation::Fetch, err.into())),
        }
    }

    /// Update an item; list order never changes.
    pub async fn update(&self, id: &EntityId, patch: R::Patch) -> Result<Arc<R>, CoreError> {
        self.modify(|s| s.begin(Operation::Update));
        debug!(collection = R::COLLECTION, %id, "update requested");

        match self.inner.api.update(id, &patch).await {
            Ok(item) => {
                let item = Arc::new(item);
                self.modify(|s| {
                    s.apply_updated(Arc::clone(&item));
                    s.succeed(Operation::Update);
                });
                Ok(item)
            }
            Err(err) => Err(self.reject(Operation::Update, err.into())),
        }
    }

    /// Apply `patch` locally before the request is sent.
    ///
    /// The server's item replaces the optimistic one on success. On failure
    /// the previous value is restored unless another write has replaced the
    /// optimistic value in the meantime; the error is recorded either way.
    pub async fn optimistic_update(
        &self,
        id: &EntityId,
        patch: R::Patch,
    ) -> Result<Arc<R>, CoreError> {
        let applied = self.modify(|s| {
            s.begin(Operation::Update);
            s.apply_optimistic(id, &patch)
        });
        debug!(
            collection = R::COLLECTION,
            %id,
            local = applied.is_some(),
            "optimistic update requested"
        );

        match self.inner.api.update(id, &patch).await {
            Ok(item) => {
                let item = Arc::new(item);
                self.modify(|s| {
                    s.apply_updated(Arc::clone(&item));
                    s.succeed(Operation::Update);
                });
                Ok(item)
            }
            Err(err) => {
                if let Some((previous, optimistic)) = applied {
                    self.modify(|s| s.rollback_optimistic(&previous, &optimistic));
                }
                Err(self.reject(Operation::Update, err.into()))
            }
        }
    }

    /// Delete an item from the backend and from every local copy.
    pub async fn remove(&self, id: &EntityId) -> Result<Confirmation, CoreError> {
        self.modify(|s| s.begin(Operation::Delete));
        debug!(collection = R::COLLECTION, %id, "remove requested");

        match self.inner.api.remove(id).await {
            Ok(confirmation) if !confirmation.success => {
                let err = CoreError::Server {
                    status: None,
                    message: confirmation
                        .message
                        .unwrap_or_else(|| format!("{} was not deleted", R::LABEL)),
                    code: Some("rejected".into()),
                };
                Err(self.reject(Operation::Delete, err))
            }
            Ok(confirmation) => {
                self.modify(|s| {
                    s.apply_removed(id);
                    s.succeed(Operation::Delete);
                });
                Ok(confirmation)
            }
            Err(err) => Err(self.reject(Operation::Delete, err.into())),
        }
    }

    // ── Local operations ─────────────────────────────────────────

    /// Select a held item as `current`. Returns `false` if it isn't held.
    pub fn set_current(&self, id: &EntityId) -> bool {
        self.modify(|s| s.select(id))
    }

    /// Make `item` current, replacing any list entry with the same id.
    pub fn set_current_item(&self, item: R) {
        self.modify(|s| s.select_item(Arc::new(item)));
    }

    pub fn clear_current(&self) {
        self.modify(|s| s.current = None);
    }

    /// Merge into the active filters and go back to page 1.
    pub fn set_filters(&self, filters: BTreeMap<String, String>) {
        self.modify(|s| s.merge_filters(filters));
    }

    pub fn clear_filters(&self) {
        self.modify(ResourceState::clear_filters);
    }

    pub fn set_sorting(&self, patch: &SortingPatch) {
        self.modify(|s| s.merge_sorting(patch));
    }

    pub fn clear_search_results(&self) {
        self.modify(ResourceState::clear_search);
    }

    pub fn clear_error(&self) {
        self.modify(|s| s.error = None);
    }

    pub fn reset_upload_progress(&self) {
        self.modify(|s| s.upload = UploadProgress::default());
    }

    /// Leave a view: clear filters, search results, current item, upload
    /// progress, and error in one transition.
    pub fn reset_view(&self) {
        self.modify(|s| {
            s.clear_filters();
            s.clear_search();
            s.current = None;
            s.upload = UploadProgress::default();
            s.error = None;
        });
    }

    pub(crate) fn record_error(&self, err: CoreError) {
        self.modify(|s| s.error = Some(err));
    }
}
