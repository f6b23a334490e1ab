// ── Reactive state subscriptions ──
//
// Every container in this crate (resource slices, the toast queue, the UI
// slice) publishes `Arc` snapshots through a `watch` channel. Consumers
// hold a `StateStream` to re-render whenever a snapshot is replaced.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A subscription to one state container.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct StateStream<S: Send + Sync + 'static> {
    current: Arc<S>,
    receiver: watch::Receiver<Arc<S>>,
}

impl<S: Send + Sync + 'static> StateStream<S> {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<S>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<S> {
        &self.current
    }

    /// The latest snapshot (may have changed since `current`).
    pub fn latest(&self) -> Arc<S> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the owning container has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<S>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> StateWatchStream<S> {
        StateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then one snapshot per change.
pub struct StateWatchStream<S: Send + Sync + 'static> {
    inner: WatchStream<Arc<S>>,
}

impl<S: Send + Sync + 'static> Stream for StateWatchStream<S> {
    type Item = Arc<S>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // `WatchStream<Arc<S>>` is Unpin.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
