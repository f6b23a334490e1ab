// ── Resource facade ──
//
// What views consume: the slice's state, its actions, composite workflows
// (validated upload, batch upload, confirmed delete, drag and drop), and
// read-only utilities derived from the current snapshot. Composite
// workflows report through the toast queue when one is attached.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use netdash_api::{Confirmation, ProgressFn};
use tracing::{debug, info};

use crate::api::ResourceApi;
use crate::error::CoreError;
use crate::format;
use crate::model::{EntityId, Message, MessagePatch, Resource, ResourceStats};
use crate::notify::{NotificationCenter, NotificationKind};
use crate::slice::{
    ListParams, Operation, Pagination, ResourceSlice, ResourceState, SortDirection, SortingPatch,
};
use crate::stream::StateStream;
use crate::validate::UploadFile;

/// Per-file result of a batch upload. Keeps the file itself so a failed
/// one can be retried as is.
#[derive(Debug, Clone)]
pub struct UploadOutcome<R> {
    pub file: UploadFile,
    pub result: Result<Arc<R>, CoreError>,
}

impl<R> UploadOutcome<R> {
    pub fn file_name(&self) -> &str {
        &self.file.file_name
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&CoreError> {
        self.result.as_ref().err()
    }
}

/// Files released over a drop target.
#[derive(Debug, Clone, Default)]
pub struct DropEvent {
    pub files: Vec<UploadFile>,
}

/// Facade over one [`ResourceSlice`].
///
/// Clones share the slice, the toast queue, and the drag state, so a
/// handle taken once stays valid for the lifetime of the slice.
pub struct ResourceHook<R: Resource, A> {
    slice: ResourceSlice<R, A>,
    notifications: Option<NotificationCenter>,
    drag_active: Arc<AtomicBool>,
}

impl<R: Resource, A> Clone for ResourceHook<R, A> {
    fn clone(&self) -> Self {
        Self {
            slice: self.slice.clone(),
            notifications: self.notifications.clone(),
            drag_active: Arc::clone(&self.drag_active),
        }
    }
}

impl<R: Resource, A: ResourceApi<R>> ResourceHook<R, A> {
    pub fn new(slice: ResourceSlice<R, A>) -> Self {
        Self {
            slice,
            notifications: None,
            drag_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Post toasts for composite operations and failures.
    pub fn with_notifications(mut self, center: NotificationCenter) -> Self {
        self.notifications = Some(center);
        self
    }

    pub fn slice(&self) -> &ResourceSlice<R, A> {
        &self.slice
    }

    pub fn notifications(&self) -> Option<&NotificationCenter> {
        self.notifications.as_ref()
    }

    pub fn state(&self) -> Arc<ResourceState<R>> {
        self.slice.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<ResourceState<R>> {
        self.slice.subscribe()
    }

    // ── Derived state ────────────────────────────────────────────

    pub fn is_loading(&self) -> bool {
        self.state().loading.any()
    }

    pub fn is_busy(&self, op: Operation) -> bool {
        self.state().loading.is_loading(op)
    }

    pub fn has_error(&self) -> bool {
        self.state().error.is_some()
    }

    pub fn error(&self) -> Option<CoreError> {
        self.state().error.clone()
    }

    pub fn has_items(&self) -> bool {
        !self.state().items.is_empty()
    }

    pub fn can_go_next(&self) -> bool {
        self.state().pagination.has_next
    }

    pub fn can_go_previous(&self) -> bool {
        self.state().pagination.has_previous
    }

    // ── Actions ──────────────────────────────────────────────────

    pub async fn list(&self, params: ListParams) -> Result<Pagination, CoreError> {
        let result = self.slice.list(params).await;
        self.notify_failure(&result, || format!("Could not load {}", R::COLLECTION));
        result
    }

    /// Re-fetch the current page with the current filters.
    pub async fn refresh(&self) -> Result<Pagination, CoreError> {
        self.list(ListParams::default()).await
    }

    pub async fn search(&self, query: &str, params: ListParams) -> Result<Vec<Arc<R>>, CoreError> {
        let result = self.slice.search(query, params).await;
        self.notify_failure(&result, || "Search failed".to_owned());
        result
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<R>, CoreError> {
        let result = self.slice.get(id).await;
        self.notify_failure(&result, || format!("Could not load {}", R::LABEL));
        result
    }

    pub async fn update(&self, id: &EntityId, patch: R::Patch) -> Result<Arc<R>, CoreError> {
        let result = self.slice.update(id, patch).await;
        self.notify_failure(&result, || format!("Could not update {}", R::LABEL));
        result
    }

    pub async fn optimistic_update(
        &self,
        id: &EntityId,
        patch: R::Patch,
    ) -> Result<Arc<R>, CoreError> {
        let result = self.slice.optimistic_update(id, patch).await;
        self.notify_failure(&result, || format!("Could not update {}", R::LABEL));
        result
    }

    pub async fn remove(&self, id: &EntityId) -> Result<Confirmation, CoreError> {
        let result = self.slice.remove(id).await;
        self.notify_failure(&result, || format!("Could not delete {}", R::LABEL));
        result
    }

    pub fn set_current(&self, id: &EntityId) -> bool {
        self.slice.set_current(id)
    }

    pub fn clear_current(&self) {
        self.slice.clear_current();
    }

    pub fn set_filters(&self, filters: BTreeMap<String, String>) {
        self.slice.set_filters(filters);
    }

    pub fn clear_filters(&self) {
        self.slice.clear_filters();
    }

    pub fn set_sorting(&self, patch: &SortingPatch) {
        self.slice.set_sorting(patch);
    }

    pub fn clear_search_results(&self) {
        self.slice.clear_search_results();
    }

    pub fn clear_error(&self) {
        self.slice.clear_error();
    }

    /// Clear filters, search results, current item, upload progress, and
    /// error. Intended for leaving a view.
    pub fn reset(&self) {
        self.drag_active.store(false, Ordering::Relaxed);
        self.slice.reset_view();
    }

    // ── Pagination ───────────────────────────────────────────────

    /// Load the next page. `Ok(false)` without a request on the last page.
    pub async fn next_page(&self) -> Result<bool, CoreError> {
        let pagination = self.state().pagination.clone();
        if !pagination.has_next {
            return Ok(false);
        }
        self.go_to_page(pagination.current_page.saturating_add(1))
            .await
    }

    /// Load the previous page. `Ok(false)` without a request on page 1.
    pub async fn previous_page(&self) -> Result<bool, CoreError> {
        let pagination = self.state().pagination.clone();
        if !pagination.has_previous || pagination.current_page <= 1 {
            return Ok(false);
        }
        self.go_to_page(pagination.current_page - 1).await
    }

    /// Load page `page`. Out-of-range pages return `Ok(false)` and send
    /// nothing.
    pub async fn go_to_page(&self, page: u32) -> Result<bool, CoreError> {
        let last = self.state().pagination.total_pages.max(1);
        if page == 0 || page > last {
            debug!(collection = R::COLLECTION, page, last, "page out of range");
            return Ok(false);
        }
        self.list(ListParams::page(page)).await.map(|_| true)
    }

    // ── Uploads ──────────────────────────────────────────────────

    /// Validate `file`, then create the item with it.
    pub async fn upload_with_validation(
        &self,
        draft: R::Draft,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> Result<Arc<R>, CoreError> {
        let file_name = file.file_name.clone();
        let result = self.upload_one(draft, file, progress).await;
        match result {
            Ok(ref item) => {
                info!(collection = R::COLLECTION, id = %item.id(), file = %file_name, "uploaded");
                self.toast(
                    NotificationKind::Success,
                    format!("{} uploaded", capitalized(R::LABEL)),
                    Some(file_name),
                );
            }
            Err(ref err) => self.toast(
                NotificationKind::Error,
                format!("Upload failed: {file_name}"),
                Some(err.to_string()),
            ),
        }
        result
    }

    async fn upload_one(
        &self,
        draft: R::Draft,
        file: UploadFile,
        progress: Option<ProgressFn>,
    ) -> Result<Arc<R>, CoreError> {
        if let Err(err) = self.validate_file(&file) {
            self.slice.record_error(err.clone());
            return Err(err);
        }
        self.slice.create(draft, Some(file), progress).await
    }

    /// Upload files one after another. A failed file does not stop the
    /// rest; every file gets an outcome, in input order.
    pub async fn upload_multiple(
        &self,
        files: Vec<UploadFile>,
        base: &R::Draft,
    ) -> Vec<UploadOutcome<R>> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let draft = R::draft_for_upload(base, &file);
            let result = self.upload_one(draft, file.clone(), None).await;
            if let Err(ref err) = result {
                debug!(collection = R::COLLECTION, file = %file.file_name, error = %err, "batch item failed");
            }
            outcomes.push(UploadOutcome { file, result });
        }
        self.report_batch(&outcomes);
        outcomes
    }

    fn report_batch(&self, outcomes: &[UploadOutcome<R>]) {
        if outcomes.is_empty() {
            return;
        }
        let total = outcomes.len();
        let failed: Vec<&str> = outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(UploadOutcome::file_name)
            .collect();
        let uploaded = total - failed.len();
        info!(collection = R::COLLECTION, uploaded, failed = failed.len(), "batch upload finished");

        if failed.is_empty() {
            self.toast(
                NotificationKind::Success,
                format!("Uploaded {uploaded} of {total} files"),
                None,
            );
        } else if uploaded == 0 {
            self.toast(
                NotificationKind::Error,
                format!("All {total} uploads failed"),
                Some(failed.join(", ")),
            );
        } else {
            self.toast(
                NotificationKind::Warning,
                format!("Uploaded {uploaded} of {total} files"),
                Some(format!("Failed: {}", failed.join(", "))),
            );
        }
    }

    // ── Deletion ─────────────────────────────────────────────────

    /// Delete after asking `confirm`. A declined confirmation fails with
    /// [`CoreError::Cancelled`] and sends nothing.
    pub async fn delete_with_confirmation<F>(
        &self,
        id: &EntityId,
        confirm: Option<F>,
    ) -> Result<Confirmation, CoreError>
    where
        F: FnOnce(&EntityId) -> bool,
    {
        if let Some(confirm) = confirm {
            if !confirm(id) {
                debug!(collection = R::COLLECTION, %id, "delete declined");
                return Err(CoreError::Cancelled);
            }
        }
        let result = self.slice.remove(id).await;
        match result {
            Ok(_) => self.toast(
                NotificationKind::Success,
                format!("{} deleted", capitalized(R::LABEL)),
                None,
            ),
            Err(ref err) => self.toast(
                NotificationKind::Error,
                format!("Could not delete {}", R::LABEL),
                Some(err.to_string()),
            ),
        }
        result
    }

    // ── Drag and drop ────────────────────────────────────────────

    pub fn on_drag_over(&self) {
        self.drag_active.store(true, Ordering::Relaxed);
    }

    pub fn on_drag_leave(&self) {
        self.drag_active.store(false, Ordering::Relaxed);
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active.load(Ordering::Relaxed)
    }

    /// Upload everything dropped, with batch semantics.
    pub async fn on_drop(&self, event: DropEvent, base: &R::Draft) -> Vec<UploadOutcome<R>> {
        self.on_drag_leave();
        self.upload_multiple(event.files, base).await
    }

    // ── Utilities ────────────────────────────────────────────────

    pub fn filtered(&self, predicate: impl Fn(&R) -> bool) -> Vec<Arc<R>> {
        self.state()
            .items
            .iter()
            .filter(|item| predicate(item))
            .cloned()
            .collect()
    }

    /// Case-insensitive text match over the loaded page.
    pub fn search_local(&self, text: &str) -> Vec<Arc<R>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.state().items.clone();
        }
        self.filtered(|item| item.matches_text(&needle))
    }

    /// Loaded items ordered by `field`. Unknown fields keep server order.
    pub fn sorted(&self, field: &str, direction: SortDirection) -> Vec<Arc<R>> {
        let mut items = self.state().items.clone();
        items.sort_by(|a, b| {
            let ord = a.sort_key(field).cmp(&b.sort_key(field));
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        items
    }

    /// Distinct tags across the loaded page, sorted.
    pub fn all_tags(&self) -> Vec<String> {
        let tags: BTreeSet<String> = self
            .state()
            .items
            .iter()
            .flat_map(|item| item.tags().iter().cloned())
            .collect();
        tags.into_iter().collect()
    }

    pub fn items_with_tag(&self, tag: &str) -> Vec<Arc<R>> {
        self.filtered(|item| item.tags().iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }

    pub fn format_size(bytes: u64) -> String {
        format::format_size(bytes)
    }

    pub fn is_allowed_type(&self, content_type: &str) -> bool {
        self.slice.upload_policy().allows(content_type)
    }

    pub fn validate_file(&self, file: &UploadFile) -> Result<(), CoreError> {
        self.slice.upload_policy().validate(file)
    }

    pub fn stats(&self) -> ResourceStats {
        self.state().stats.clone()
    }

    pub fn total_size_display(&self) -> String {
        format::format_size(self.state().stats.total_size)
    }

    // ── Toasts ───────────────────────────────────────────────────

    fn toast(&self, kind: NotificationKind, title: String, message: Option<String>) {
        if let Some(ref center) = self.notifications {
            center.push(kind, title, message);
        }
    }

    fn notify_failure<T>(&self, result: &Result<T, CoreError>, title: impl FnOnce() -> String) {
        if let Err(err) = result {
            self.toast(NotificationKind::Error, title(), Some(err.to_string()));
        }
    }
}

// ── Inbox extras ─────────────────────────────────────────────────

impl<A: ResourceApi<Message>> ResourceHook<Message, A> {
    /// Unread messages on the loaded page.
    pub fn unread_count(&self) -> usize {
        self.state().items.iter().filter(|m| !m.read).count()
    }

    /// Flip the read flag locally first, then persist it.
    pub async fn mark_read(&self, id: &EntityId) -> Result<Arc<Message>, CoreError> {
        self.optimistic_update(id, MessagePatch::mark_read()).await
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::{ErrorKind, ValidationRule};
    use crate::model::{Document, DocumentDraft};
    use crate::slice::SliceConfig;
    use crate::slice::testing::{FakeApi, doc, document_factory, msg, not_found};

    type DocHook = ResourceHook<Document, FakeApi<Document>>;

    fn hook_with(docs: Vec<Document>, page_size: u32) -> (DocHook, FakeApi<Document>, NotificationCenter) {
        let api = FakeApi::with_factory(docs, document_factory);
        let slice = ResourceSlice::new(
            api.clone(),
            SliceConfig {
                page_size,
                ..SliceConfig::default()
            },
        );
        let center = NotificationCenter::default();
        let hook = ResourceHook::new(slice).with_notifications(center.clone());
        (hook, api, center)
    }

    fn pdf(name: &str, len: usize) -> UploadFile {
        UploadFile::new(name, "application/pdf", vec![1u8; len])
    }

    fn kinds(center: &NotificationCenter) -> Vec<NotificationKind> {
        center.entries().iter().map(|e| e.kind).collect()
    }

    #[tokio::test]
    async fn oversized_upload_fails_without_network() {
        let (hook, api, center) = hook_with(Vec::new(), 20);
        let max = usize::try_from(hook.slice().upload_policy().max_size_bytes).unwrap();

        let err = hook
            .upload_with_validation(DocumentDraft::default(), pdf("huge.pdf", max + 1), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.has_issue(ValidationRule::MaxSize));
        assert_eq!(api.calls(), 0);
        assert!(hook.has_error());
        assert_eq!(kinds(&center), vec![NotificationKind::Error]);
    }

    #[tokio::test]
    async fn valid_upload_posts_success_toast() {
        let (hook, _, center) = hook_with(Vec::new(), 20);
        let created = hook
            .upload_with_validation(DocumentDraft::default(), pdf("vlan-plan.pdf", 64), None)
            .await
            .unwrap();
        assert_eq!(created.file_name, "vlan-plan.pdf");
        assert_eq!(center.entries()[0].title, "Document uploaded");
    }

    #[tokio::test]
    async fn batch_upload_reports_each_file() {
        let (hook, api, center) = hook_with(Vec::new(), 20);
        let files = vec![
            pdf("good.pdf", 32),
            UploadFile::new("bad.exe", "application/x-msdownload", vec![1u8; 32]),
        ];

        let outcomes = hook.upload_multiple(files, &DocumentDraft::default()).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].file_name(), "good.pdf");
        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].file_name(), "bad.exe");
        assert!(outcomes[1].error().unwrap().has_issue(ValidationRule::ContentType));
        assert_eq!(api.calls(), 1);
        assert_eq!(kinds(&center), vec![NotificationKind::Warning]);

        // Untitled drafts take the file stem.
        assert_eq!(outcomes[0].result.as_ref().unwrap().title, "good");
    }

    #[tokio::test]
    async fn failed_batch_file_can_be_retried() {
        let (hook, api, _) = hook_with(Vec::new(), 20);
        api.fail_next(netdash_api::Error::Timeout { timeout_secs: 10 });

        let outcomes = hook
            .upload_multiple(
                vec![pdf("flaky.pdf", 48), pdf("steady.pdf", 16)],
                &DocumentDraft::default(),
            )
            .await;
        assert!(!outcomes[0].is_success());
        assert!(outcomes[1].is_success());

        let retry = outcomes[0].file.clone();
        assert_eq!(retry.size(), 48);
        let created = hook
            .upload_with_validation(DocumentDraft::default(), retry, None)
            .await
            .unwrap();
        assert_eq!(created.file_name, "flaky.pdf");
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn declined_delete_is_cancelled() {
        let (hook, api, _) = hook_with(vec![doc("a", "application/pdf", 1)], 20);
        hook.refresh().await.unwrap();
        let before = api.calls();

        let err = hook
            .delete_with_confirmation(&"a".into(), Some(|_: &EntityId| false))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(api.calls(), before);
        assert!(hook.has_items());
    }

    #[tokio::test]
    async fn confirmed_delete_removes_item() {
        let (hook, _, center) = hook_with(vec![doc("a", "application/pdf", 1)], 20);
        hook.refresh().await.unwrap();

        hook.delete_with_confirmation(&"a".into(), Some(|_: &EntityId| true))
            .await
            .unwrap();
        assert!(!hook.has_items());
        assert_eq!(center.entries()[0].title, "Document deleted");
    }

    #[tokio::test]
    async fn delete_failure_toasts_error() {
        let (hook, api, center) = hook_with(vec![doc("a", "application/pdf", 1)], 20);
        api.fail_next(not_found());
        let err = hook
            .delete_with_confirmation(&"a".into(), None::<fn(&EntityId) -> bool>)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(kinds(&center), vec![NotificationKind::Error]);
    }

    #[tokio::test]
    async fn paging_stays_in_range() {
        let docs = (0..5).map(|i| doc(&format!("d{i}"), "text/plain", 1)).collect();
        let (hook, api, _) = hook_with(docs, 2);
        hook.refresh().await.unwrap();
        assert!(hook.can_go_next());
        assert!(!hook.can_go_previous());

        assert!(!hook.previous_page().await.unwrap());
        assert!(hook.next_page().await.unwrap());
        assert!(hook.go_to_page(3).await.unwrap());
        assert_eq!(hook.state().pagination.current_page, 3);
        assert!(!hook.can_go_next());

        let calls = api.calls();
        assert!(!hook.next_page().await.unwrap());
        assert!(!hook.go_to_page(4).await.unwrap());
        assert!(!hook.go_to_page(0).await.unwrap());
        assert_eq!(api.calls(), calls);

        assert!(hook.previous_page().await.unwrap());
        assert_eq!(hook.state().pagination.current_page, 2);
    }

    #[tokio::test]
    async fn drop_uploads_and_clears_drag_state() {
        let (hook, _, _) = hook_with(Vec::new(), 20);
        hook.on_drag_over();
        assert!(hook.is_drag_active());
        hook.clone().on_drag_leave();
        assert!(!hook.is_drag_active());

        hook.on_drag_over();
        let event = DropEvent {
            files: vec![pdf("a.pdf", 8), pdf("b.pdf", 8)],
        };
        let outcomes = hook.on_drop(event, &DocumentDraft::default()).await;
        assert!(outcomes.iter().all(UploadOutcome::is_success));
        assert!(!hook.is_drag_active());
        assert_eq!(hook.state().items.len(), 2);
    }

    #[tokio::test]
    async fn derived_utilities() {
        let mut a = doc("a", "application/pdf", 3000);
        a.title = "Core Switch".into();
        a.tags = vec!["core".into(), "cisco".into()];
        a.category = Some("runbooks".into());
        let mut b = doc("b", "image/png", 100);
        b.title = "Access Layer".into();
        b.tags = vec!["access".into(), "core".into()];
        let (hook, _, _) = hook_with(vec![a, b], 20);
        hook.refresh().await.unwrap();

        assert_eq!(hook.all_tags(), vec!["access", "cisco", "core"]);
        assert_eq!(hook.items_with_tag("CORE").len(), 2);
        assert_eq!(hook.search_local("switch")[0].title, "Core Switch");
        assert_eq!(hook.search_local("  ").len(), 2);

        let by_size = hook.sorted("size", SortDirection::Asc);
        assert_eq!(by_size[0].title, "Access Layer");
        let by_title = hook.sorted("title", SortDirection::Desc);
        assert_eq!(by_title[0].title, "Core Switch");

        assert_eq!(hook.total_size_display(), "3.0 KB");
        assert_eq!(hook.stats().by_category["runbooks"], 1);
        assert!(hook.is_allowed_type("image/svg+xml"));
        assert!(!hook.is_allowed_type("application/x-sh"));
        assert_eq!(DocHook::format_size(512), "512 B");
    }

    #[tokio::test]
    async fn reset_clears_view_state() {
        let (hook, _, _) = hook_with(vec![doc("a", "text/plain", 1)], 20);
        hook.refresh().await.unwrap();
        hook.set_filters(BTreeMap::from([("category".into(), "x".into())]));
        hook.search("document", ListParams::default()).await.unwrap();
        hook.set_current(&"a".into());
        hook.on_drag_over();

        hook.reset();
        let state = hook.state();
        assert!(state.filters.is_empty());
        assert!(state.search_results.is_empty());
        assert!(state.current.is_none());
        assert!(state.error.is_none());
        assert!(!hook.is_drag_active());
        assert_eq!(state.items.len(), 1);
    }

    #[tokio::test]
    async fn list_failure_toasts_and_sets_error() {
        let (hook, api, center) = hook_with(Vec::new(), 20);
        api.fail_next(netdash_api::Error::Timeout { timeout_secs: 3 });
        assert!(hook.refresh().await.is_err());
        assert!(hook.has_error());
        assert!(!hook.is_loading());
        assert_eq!(center.entries()[0].title, "Could not load documents");
    }

    #[tokio::test]
    async fn mark_read_updates_unread_count() {
        let api = FakeApi::new(vec![msg("m1", false), msg("m2", false), msg("m3", true)]);
        let hook = ResourceHook::new(ResourceSlice::new(api, SliceConfig::default()));
        hook.refresh().await.unwrap();
        assert_eq!(hook.unread_count(), 2);

        let updated = hook.mark_read(&"m1".into()).await.unwrap();
        assert!(updated.read);
        assert_eq!(hook.unread_count(), 1);
    }

    #[test]
    fn capitalizes_labels() {
        assert_eq!(capitalized("document"), "Document");
        assert_eq!(capitalized(""), "");
    }
}
