// ── Shell UI state ──
//
// Layout state shared by every view: sidebar, theme, the active modal,
// and the page title. Local only; nothing here talks to the backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;

use crate::stream::StateStream;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiState {
    pub sidebar_open: bool,
    pub theme: Theme,
    pub active_modal: Option<String>,
    pub page_title: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            theme: Theme::default(),
            active_modal: None,
            page_title: "Dashboard".into(),
        }
    }
}

/// Cheaply cloneable handle to the shell UI state.
#[derive(Clone)]
pub struct UiSlice {
    state: Arc<watch::Sender<Arc<UiState>>>,
}

impl UiSlice {
    pub fn new(initial: UiState) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));
        Self {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> Arc<UiState> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> StateStream<UiState> {
        StateStream::new(self.state.subscribe())
    }

    fn update(&self, f: impl FnOnce(&mut UiState) -> bool) {
        self.state.send_if_modified(|state| {
            let mut next = UiState::clone(state);
            if !f(&mut next) {
                return false;
            }
            *state = Arc::new(next);
            true
        });
    }

    pub fn toggle_sidebar(&self) {
        self.update(|s| {
            s.sidebar_open = !s.sidebar_open;
            true
        });
    }

    pub fn set_sidebar(&self, open: bool) {
        self.update(|s| std::mem::replace(&mut s.sidebar_open, open) != open);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|s| std::mem::replace(&mut s.theme, theme) != theme);
    }

    /// Open `name`, replacing any modal already open.
    pub fn open_modal(&self, name: impl Into<String>) {
        let name = name.into();
        self.update(|s| {
            if s.active_modal.as_deref() == Some(name.as_str()) {
                return false;
            }
            s.active_modal = Some(name);
            true
        });
    }

    pub fn close_modal(&self) {
        self.update(|s| s.active_modal.take().is_some());
    }

    pub fn set_page_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.update(|s| {
            if s.page_title == title {
                return false;
            }
            s.page_title = title;
            true
        });
    }
}

impl Default for UiSlice {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}
