// ── Backend seam ──
//
// The six calls a resource slice makes against its collection. The HTTP
// implementation is the production path; tests substitute in-memory fakes.

use std::future::Future;
use std::marker::PhantomData;

use netdash_api::{
    ApiClient, Confirmation, ListQuery, Page, ProgressFn, SearchQuery, SearchResponse,
    UploadPayload,
};

use crate::model::{EntityId, Resource};

/// Remote collection operations consumed by a `ResourceSlice`.
pub trait ResourceApi<R: Resource>: Send + Sync + 'static {
    fn list(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Page<R>, netdash_api::Error>> + Send;

    /// Create from metadata, optionally with a binary payload. `progress`
    /// is only meaningful when a payload is present.
    fn create(
        &self,
        draft: &R::Draft,
        payload: Option<UploadPayload>,
        progress: Option<ProgressFn>,
    ) -> impl Future<Output = Result<R, netdash_api::Error>> + Send;

    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<SearchResponse<R>, netdash_api::Error>> + Send;

    fn get(&self, id: &EntityId) -> impl Future<Output = Result<R, netdash_api::Error>> + Send;

    fn update(
        &self,
        id: &EntityId,
        patch: &R::Patch,
    ) -> impl Future<Output = Result<R, netdash_api::Error>> + Send;

    fn remove(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Confirmation, netdash_api::Error>> + Send;
}

/// [`ResourceApi`] over the REST backend at `{base}/{R::COLLECTION}`.
pub struct HttpResourceApi<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> HttpResourceApi<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl<R> Clone for HttpResourceApi<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R: Resource> ResourceApi<R> for HttpResourceApi<R> {
    async fn list(&self, query: &ListQuery) -> Result<Page<R>, netdash_api::Error> {
        self.client.list_page(R::COLLECTION, query).await
    }

    async fn create(
        &self,
        draft: &R::Draft,
        payload: Option<UploadPayload>,
        progress: Option<ProgressFn>,
    ) -> Result<R, netdash_api::Error> {
        match payload {
            Some(payload) => {
                self.client
                    .upload(R::COLLECTION, draft, payload, progress)
                    .await
            }
            None => self.client.create(R::COLLECTION, draft).await,
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse<R>, netdash_api::Error> {
        self.client.search(R::COLLECTION, query).await
    }

    async fn get(&self, id: &EntityId) -> Result<R, netdash_api::Error> {
        self.client.fetch(R::COLLECTION, &id.to_string()).await
    }

    async fn update(&self, id: &EntityId, patch: &R::Patch) -> Result<R, netdash_api::Error> {
        self.client
            .update(R::COLLECTION, &id.to_string(), patch)
            .await
    }

    async fn remove(&self, id: &EntityId) -> Result<Confirmation, netdash_api::Error> {
        self.client.remove(R::COLLECTION, &id.to_string()).await
    }
}
