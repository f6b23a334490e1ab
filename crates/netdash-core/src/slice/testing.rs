//! In-memory backend and fixtures for slice and hook tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use netdash_api::{
    Confirmation, ListQuery, Page, PageMeta, ProgressFn, SearchQuery, SearchResponse,
    TransferProgress, UploadPayload,
};
use tokio::sync::oneshot;

use crate::api::ResourceApi;
use crate::model::{Document, DocumentDraft, EntityId, Message, MessagePriority, Resource};

pub(crate) fn doc(id: &str, content_type: &str, size: u64) -> Document {
    Document {
        id: id.into(),
        title: format!("Document {id}"),
        description: None,
        file_name: format!("{id}.bin"),
        content_type: content_type.into(),
        size,
        category: None,
        tags: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub(crate) fn msg(id: &str, read: bool) -> Message {
    Message {
        id: id.into(),
        subject: format!("Message {id}"),
        body: String::new(),
        sender: "noc@example.net".into(),
        recipients: vec!["ops@example.net".into()],
        priority: MessagePriority::Normal,
        read,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub(crate) fn page_of<R>(items: Vec<R>, current_page: u32, total_pages: u32) -> Page<R> {
    let total_count = u64::try_from(items.len()).unwrap();
    Page {
        pagination: PageMeta {
            current_page,
            page_size: 10,
            total_pages,
            total_count,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        },
        items,
        metadata: serde_json::Value::Null,
    }
}

pub(crate) fn not_found() -> netdash_api::Error {
    netdash_api::Error::Server {
        status: 404,
        message: "not found".into(),
        code: Some("not_found".into()),
    }
}

type ListReply<R> = oneshot::Receiver<Result<Page<R>, netdash_api::Error>>;
type Factory<R> = fn(usize, &<R as Resource>::Draft, Option<&UploadPayload>) -> R;

/// Builds a `Document` from a draft and the uploaded file.
pub(crate) fn document_factory(
    n: usize,
    draft: &DocumentDraft,
    payload: Option<&UploadPayload>,
) -> Document {
    let mut created = doc(&format!("new-{n}"), "application/octet-stream", 0);
    created.title.clone_from(&draft.title);
    created.tags.clone_from(&draft.tags);
    if let Some(payload) = payload {
        created.file_name.clone_from(&payload.file_name);
        created.content_type.clone_from(&payload.content_type);
        created.size = payload.len();
    }
    created
}

/// Scriptable in-memory [`ResourceApi`]. Clones share state.
pub(crate) struct FakeApi<R: Resource> {
    inner: Arc<FakeInner<R>>,
}

struct FakeInner<R: Resource> {
    store: Mutex<Vec<R>>,
    factory: Option<Factory<R>>,
    calls: AtomicUsize,
    created: AtomicUsize,
    failures: Mutex<VecDeque<netdash_api::Error>>,
    upload_failure: Mutex<Option<(u64, netdash_api::Error)>>,
    rejected_removes: AtomicUsize,
    gated_lists: Mutex<VecDeque<ListReply<R>>>,
    list_queries: Mutex<Vec<ListQuery>>,
    search_queries: Mutex<Vec<SearchQuery>>,
}

impl<R: Resource> Clone for FakeApi<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> FakeApi<R> {
    pub(crate) fn new(store: Vec<R>) -> Self {
        Self {
            inner: Arc::new(FakeInner {
                store: Mutex::new(store),
                factory: None,
                calls: AtomicUsize::new(0),
                created: AtomicUsize::new(0),
                failures: Mutex::new(VecDeque::new()),
                upload_failure: Mutex::new(None),
                rejected_removes: AtomicUsize::new(0),
                gated_lists: Mutex::new(VecDeque::new()),
                list_queries: Mutex::new(Vec::new()),
                search_queries: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn with_factory(store: Vec<R>, factory: Factory<R>) -> Self {
        let mut api = Self::new(store);
        Arc::get_mut(&mut api.inner).unwrap().factory = Some(factory);
        api
    }

    /// Total network calls of any kind.
    pub(crate) fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn list_queries(&self) -> Vec<ListQuery> {
        self.inner.list_queries.lock().unwrap().clone()
    }

    pub(crate) fn search_queries(&self) -> Vec<SearchQuery> {
        self.inner.search_queries.lock().unwrap().clone()
    }

    /// Fail the next call (of any kind) with `err`.
    pub(crate) fn fail_next(&self, err: netdash_api::Error) {
        self.inner.failures.lock().unwrap().push_back(err);
    }

    /// Fail the next upload with `err` once `quarters` quarters of the
    /// body have been reported as sent.
    pub(crate) fn fail_upload_after(&self, quarters: u64, err: netdash_api::Error) {
        *self.inner.upload_failure.lock().unwrap() = Some((quarters, err));
    }

    /// The next `remove` is acknowledged with `success: false`.
    pub(crate) fn reject_next_remove(&self) {
        self.inner.rejected_removes.fetch_add(1, Ordering::SeqCst);
    }

    /// The next `list` call waits until the returned sender is resolved.
    pub(crate) fn gate_list(&self) -> oneshot::Sender<Result<Page<R>, netdash_api::Error>> {
        let (tx, rx) = oneshot::channel();
        self.inner.gated_lists.lock().unwrap().push_back(rx);
        tx
    }

    fn begin_call(&self) -> Result<(), netdash_api::Error> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        match self.inner.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn stored(&self, id: &EntityId) -> Result<R, netdash_api::Error> {
        self.inner
            .store
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(not_found)
    }
}

impl<R: Resource> ResourceApi<R> for FakeApi<R> {
    async fn list(&self, query: &ListQuery) -> Result<Page<R>, netdash_api::Error> {
        self.inner.list_queries.lock().unwrap().push(query.clone());
        let gate = self.inner.gated_lists.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return gate.await.expect("list gate dropped");
        }
        self.begin_call()?;
        let store = self.inner.store.lock().unwrap().clone();
        let size = usize::try_from(query.page_size.max(1)).unwrap();
        let total_pages = u32::try_from(store.len().div_ceil(size)).unwrap().max(1);
        let total_count = u64::try_from(store.len()).unwrap();
        let skip = usize::try_from(query.page.saturating_sub(1)).unwrap() * size;
        let items = store.into_iter().skip(skip).take(size).collect();

        let mut page = page_of(items, query.page, total_pages);
        page.pagination.page_size = query.page_size;
        page.pagination.total_count = total_count;
        Ok(page)
    }

    async fn create(
        &self,
        draft: &R::Draft,
        payload: Option<UploadPayload>,
        progress: Option<ProgressFn>,
    ) -> Result<R, netdash_api::Error> {
        self.begin_call()?;
        if let (Some(payload), Some(progress)) = (payload.as_ref(), progress.as_ref()) {
            let total = payload.len();
            let mut failure = self.inner.upload_failure.lock().unwrap().take();
            for quarter in 1..=4u64 {
                progress(TransferProgress {
                    sent: total * quarter / 4,
                    total,
                });
                tokio::task::yield_now().await;
                if failure.as_ref().is_some_and(|(after, _)| *after == quarter) {
                    let (_, err) = failure.take().unwrap();
                    return Err(err);
                }
            }
        }
        let n = self.inner.created.fetch_add(1, Ordering::SeqCst);
        let factory = self.inner.factory.expect("FakeApi has no factory");
        let item = factory(n, draft, payload.as_ref());
        self.inner.store.lock().unwrap().insert(0, item.clone());
        Ok(item)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse<R>, netdash_api::Error> {
        self.inner.search_queries.lock().unwrap().push(query.clone());
        self.begin_call()?;
        let needle = query.query.to_lowercase();
        let results = self
            .inner
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.matches_text(&needle))
            .cloned()
            .collect();
        Ok(SearchResponse {
            results,
            metadata: serde_json::Value::Null,
        })
    }

    async fn get(&self, id: &EntityId) -> Result<R, netdash_api::Error> {
        self.begin_call()?;
        self.stored(id)
    }

    async fn update(&self, id: &EntityId, patch: &R::Patch) -> Result<R, netdash_api::Error> {
        self.begin_call()?;
        let mut store = self.inner.store.lock().unwrap();
        let item = store
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(not_found)?;
        item.apply_patch(patch);
        Ok(item.clone())
    }

    async fn remove(&self, id: &EntityId) -> Result<Confirmation, netdash_api::Error> {
        self.begin_call()?;
        let rejected = self
            .inner
            .rejected_removes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Ok(Confirmation {
                success: false,
                message: Some("document is locked".into()),
            });
        }
        let mut store = self.inner.store.lock().unwrap();
        let before = store.len();
        store.retain(|item| item.id() != id);
        if store.len() == before {
            return Err(not_found());
        }
        Ok(Confirmation::default())
    }
}
