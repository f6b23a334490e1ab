// ── Application state container ──
//
// One instance per running application, built from `CoreConfig` and
// handed to every consumer. Owns the toast queue, the per-collection
// hooks, and the shell UI slice.

use netdash_api::ApiClient;
use tracing::debug;

use crate::api::{HttpResourceApi, ResourceApi};
use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::hook::ResourceHook;
use crate::model::{Document, Message};
use crate::notify::NotificationCenter;
use crate::slice::ResourceSlice;
use crate::ui::UiSlice;

pub type DocumentsHook<A = HttpResourceApi<Document>> = ResourceHook<Document, A>;
pub type MessagesHook<A = HttpResourceApi<Message>> = ResourceHook<Message, A>;

/// Everything the views share. Cheaply cloneable.
pub struct AppState<D = HttpResourceApi<Document>, M = HttpResourceApi<Message>> {
    notifications: NotificationCenter,
    documents: ResourceHook<Document, D>,
    messages: ResourceHook<Message, M>,
    ui: UiSlice,
}

impl<D, M> Clone for AppState<D, M> {
    fn clone(&self) -> Self {
        Self {
            notifications: self.notifications.clone(),
            documents: self.documents.clone(),
            messages: self.messages.clone(),
            ui: self.ui.clone(),
        }
    }
}

impl AppState {
    /// Build the HTTP client from `config` and wire every container to it.
    pub fn connect(config: &CoreConfig) -> Result<Self, CoreError> {
        let client = ApiClient::new(
            &config.base_url,
            &config.transport(),
            config.api_token.as_ref(),
        )?;
        debug!(base_url = %client.base_url(), "backend client ready");
        Ok(Self::from_client(config, &client))
    }

    pub fn from_client(config: &CoreConfig, client: &ApiClient) -> Self {
        Self::with_apis(
            config,
            HttpResourceApi::new(client.clone()),
            HttpResourceApi::new(client.clone()),
        )
    }
}

impl<D: ResourceApi<Document>, M: ResourceApi<Message>> AppState<D, M> {
    /// Wire the containers to explicit backends.
    pub fn with_apis(config: &CoreConfig, documents: D, messages: M) -> Self {
        let notifications = NotificationCenter::new(config.notifications.clone());
        let slice_config = config.slice_config();
        Self {
            documents: ResourceHook::new(ResourceSlice::new(documents, slice_config.clone()))
                .with_notifications(notifications.clone()),
            messages: ResourceHook::new(ResourceSlice::new(messages, slice_config))
                .with_notifications(notifications.clone()),
            notifications,
            ui: UiSlice::default(),
        }
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn documents(&self) -> &ResourceHook<Document, D> {
        &self.documents
    }

    pub fn messages(&self) -> &ResourceHook<Message, M> {
        &self.messages
    }

    pub fn ui(&self) -> &UiSlice {
        &self.ui
    }
}
