// ── Reactive sync cells ──
//
// A tracker behind a mutex with push-based change notification via a
// `watch` channel. Every transition rebuilds the immutable snapshot
// subscribers receive, so readers observe either the previous or the
// next complete state, never a torn intermediate.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures_core::Stream;
use tokio::sync::{Mutex, watch};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::tracker::{Settlement, SyncStatus, SyncTracker, Ticket, TransitionDenied};

/// One complete observation of a tracker: status, payload, error, and
/// the time of the last applied data-carrying transition.
#[derive(Debug)]
pub struct SyncSnapshot<P> {
    pub status: SyncStatus,
    pub payload: Option<Arc<P>>,
    pub error: Option<String>,
    pub synced_at: Option<DateTime<Utc>>,
}

// Derived Clone would demand `P: Clone`; the payload is shared, not
// copied.
impl<P> Clone for SyncSnapshot<P> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            payload: self.payload.clone(),
            error: self.error.clone(),
            synced_at: self.synced_at,
        }
    }
}

impl<P> SyncSnapshot<P> {
    fn of(tracker: &SyncTracker<P>) -> Self {
        Self {
            status: tracker.status(),
            payload: tracker.payload().cloned(),
            error: tracker.error().map(str::to_owned),
            synced_at: tracker.synced_at(),
        }
    }
}

/// A [`SyncTracker`] shared between an orchestrator and its observers.
///
/// The orchestrator drives transitions through the async methods; UI
/// consumers hold [`SyncSubscription`]s and re-render on change.
pub struct SyncCell<P> {
    tracker: Mutex<SyncTracker<P>>,
    snapshot: watch::Sender<SyncSnapshot<P>>,
    /// What this cell synchronizes, for log lines only.
    label: String,
}

impl<P: Send + Sync + 'static> SyncCell<P> {
    pub fn new(label: impl Into<String>) -> Self {
        let tracker = SyncTracker::new();
        let (snapshot, _) = watch::channel(SyncSnapshot::of(&tracker));
        Self {
            tracker: Mutex::new(tracker),
            snapshot,
            label: label.into(),
        }
    }

    /// The current snapshot (cheap clone of `Arc`-held data).
    pub fn snapshot(&self) -> SyncSnapshot<P> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> SyncSubscription<P> {
        SyncSubscription::new(self.snapshot.subscribe())
    }

    // ── Transitions ─────────────────────────────────────────────────

    pub async fn begin_fetch(&self) -> Result<Ticket, TransitionDenied> {
        let mut tracker = self.tracker.lock().await;
        let ticket = tracker.begin_fetch()?;
        self.broadcast(&tracker);
        Ok(ticket)
    }

    pub async fn begin_update(&self) -> Result<Ticket, TransitionDenied> {
        let mut tracker = self.tracker.lock().await;
        let ticket = tracker.begin_update()?;
        self.broadcast(&tracker);
        Ok(ticket)
    }

    pub async fn complete_fetch(&self, ticket: Ticket, payload: P) -> Settlement {
        let mut tracker = self.tracker.lock().await;
        let settlement = tracker.complete_fetch(ticket, payload);
        self.settled(&tracker, settlement, "fetch response")
    }

    pub async fn fail_fetch(&self, ticket: Ticket, error: impl Into<String>) -> Settlement {
        let mut tracker = self.tracker.lock().await;
        let settlement = tracker.fail_fetch(ticket, error);
        self.settled(&tracker, settlement, "fetch failure")
    }

    pub async fn complete_update(&self, ticket: Ticket, payload: P) -> Settlement {
        let mut tracker = self.tracker.lock().await;
        let settlement = tracker.complete_update(ticket, payload);
        self.settled(&tracker, settlement, "update response")
    }

    pub async fn fail_update(&self, ticket: Ticket, error: impl Into<String>) -> Settlement {
        let mut tracker = self.tracker.lock().await;
        let settlement = tracker.fail_update(ticket, error);
        self.settled(&tracker, settlement, "update failure")
    }

    pub async fn mark_deleted(&self) {
        let mut tracker = self.tracker.lock().await;
        tracker.mark_deleted();
        self.broadcast(&tracker);
    }

    // ── Internals ───────────────────────────────────────────────────

    fn settled(
        &self,
        tracker: &SyncTracker<P>,
        settlement: Settlement,
        what: &'static str,
    ) -> Settlement {
        match settlement {
            Settlement::Applied => self.broadcast(tracker),
            Settlement::Stale => {
                debug!(entity = %self.label, "discarded superseded {what}");
            }
        }
        settlement
    }

    fn broadcast(&self, tracker: &SyncTracker<P>) {
        // `send_replace` updates even with zero receivers.
        self.snapshot.send_replace(SyncSnapshot::of(tracker));
    }
}

// ── Subscriptions ───────────────────────────────────────────────────

/// A subscription to one cell's snapshots.
///
/// Offers both point-in-time access and reactive change notification,
/// either through `changed()` or by converting into a `Stream`.
pub struct SyncSubscription<P> {
    current: SyncSnapshot<P>,
    receiver: watch::Receiver<SyncSnapshot<P>>,
}

impl<P: Send + Sync + 'static> SyncSubscription<P> {
    fn new(receiver: watch::Receiver<SyncSnapshot<P>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or by the last `changed()`.
    pub fn current(&self) -> &SyncSnapshot<P> {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> SyncSnapshot<P> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next transition, returning the new snapshot.
    /// Returns `None` once the cell has been dropped.
    pub async fn changed(&mut self) -> Option<SyncSnapshot<P>> {
        self.receiver.changed().await.ok()?;
        let snapshot = self.receiver.borrow_and_update().clone();
        self.current = snapshot.clone();
        Some(snapshot)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> SyncWatchStream<P> {
        SyncWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per tracker transition.
pub struct SyncWatchStream<P> {
    inner: WatchStream<SyncSnapshot<P>>,
}

impl<P: Send + Sync + 'static> Stream for SyncWatchStream<P> {
    type Item = SyncSnapshot<P>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscription_sees_each_transition() {
        let cell: SyncCell<u32> = SyncCell::new("twin sensor-1");
        let mut subscription = cell.subscribe();
        assert_eq!(subscription.current().status, SyncStatus::Initialized);

        let ticket = cell.begin_fetch().await.unwrap();
        let snapshot = subscription.changed().await.unwrap();
        assert_eq!(snapshot.status, SyncStatus::Working);
        assert!(snapshot.payload.is_none());

        cell.complete_fetch(ticket, 7).await;
        let snapshot = subscription.changed().await.unwrap();
        assert_eq!(snapshot.status, SyncStatus::Fetched);
        assert_eq!(snapshot.payload.as_deref(), Some(&7));
    }

    #[tokio::test]
    async fn stale_completion_does_not_broadcast() {
        let cell: SyncCell<u32> = SyncCell::new("twin sensor-1");
        let first = cell.begin_fetch().await.unwrap();
        let second = cell.begin_fetch().await.unwrap();

        cell.complete_fetch(second, 2).await;
        assert_eq!(cell.complete_fetch(first, 1).await, Settlement::Stale);

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, SyncStatus::Fetched);
        assert_eq!(snapshot.payload.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn failure_snapshot_keeps_payload_and_carries_error() {
        let cell: SyncCell<u32> = SyncCell::new("twin sensor-1");
        let ticket = cell.begin_fetch().await.unwrap();
        cell.complete_fetch(ticket, 7).await;

        let ticket = cell.begin_fetch().await.unwrap();
        cell.fail_fetch(ticket, "registry unreachable").await;

        let snapshot = cell.snapshot();
        assert_eq!(snapshot.status, SyncStatus::Failed);
        assert_eq!(snapshot.payload.as_deref(), Some(&7));
        assert_eq!(snapshot.error.as_deref(), Some("registry unreachable"));
    }

    #[tokio::test]
    async fn stream_adapter_yields_snapshots() {
        use tokio_stream::StreamExt as _;

        let cell: SyncCell<u32> = SyncCell::new("twin sensor-1");
        let mut stream = cell.subscribe().into_stream();

        // WatchStream yields the current value first.
        let initial = stream.next().await.unwrap();
        assert_eq!(initial.status, SyncStatus::Initialized);

        let ticket = cell.begin_fetch().await.unwrap();
        cell.complete_fetch(ticket, 7).await;
        // Collapse to the latest pending snapshot.
        let mut last = stream.next().await.unwrap();
        if last.status == SyncStatus::Working {
            last = stream.next().await.unwrap();
        }
        assert_eq!(last.status, SyncStatus::Fetched);
    }
}
