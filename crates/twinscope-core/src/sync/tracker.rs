// ── Synchronization state machine ──
//
// One tracker per remotely-sourced entity (a twin, a model definition).
// Fully synchronous: the async plumbing lives in `cell`, which wraps a
// tracker behind a mutex and broadcasts snapshots.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Lifecycle status of a synchronized entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SyncStatus {
    /// Created; nothing fetched yet.
    Initialized,
    /// A fetch is in flight.
    Working,
    /// The last fetch succeeded.
    Fetched,
    /// An update is in flight.
    Updating,
    /// The last update succeeded and its result is the current payload.
    Upserted,
    /// The last fetch or update failed. The previous payload, if any,
    /// is retained.
    Failed,
    /// The entity was deleted. Terminal.
    Deleted,
}

impl SyncStatus {
    /// `true` while a request is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Working | Self::Updating)
    }

    /// `true` once the tracker holds a server-confirmed payload.
    pub fn has_settled_payload(self) -> bool {
        matches!(self, Self::Fetched | Self::Upserted)
    }
}

/// A transition was requested that the current status does not permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDenied {
    pub operation: &'static str,
    pub from: SyncStatus,
}

impl fmt::Display for TransitionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' denied in state {}", self.operation, self.from)
    }
}

impl std::error::Error for TransitionDenied {}

/// Identifies one issued request. Only the completion carrying the most
/// recently issued ticket for a tracker is applied; anything older is a
/// superseded in-flight request whose response must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// What happened to a delivered completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The completion matched the current ticket and was applied.
    Applied,
    /// The completion belonged to a superseded request and was dropped.
    /// Not an error: the entity already has a newer request in flight
    /// or settled.
    Stale,
}

impl Settlement {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The per-entity fetch/update state machine.
///
/// Payloads are held behind `Arc` and replaced whole on every
/// data-carrying transition, so a reader holding a snapshot never
/// observes a half-updated value.
#[derive(Debug)]
pub struct SyncTracker<P> {
    status: SyncStatus,
    payload: Option<Arc<P>>,
    error: Option<String>,
    synced_at: Option<DateTime<Utc>>,
    /// Ticket of the request currently allowed to complete.
    current: Option<Ticket>,
    next_ticket: u64,
}

impl<P> Default for SyncTracker<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> SyncTracker<P> {
    pub fn new() -> Self {
        Self {
            status: SyncStatus::Initialized,
            payload: None,
            error: None,
            synced_at: None,
            current: None,
            next_ticket: 0,
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// The last server-confirmed payload. Retained through `Working`
    /// and `Failed` so consumers can keep rendering stale data.
    pub fn payload(&self) -> Option<&Arc<P>> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    // ── Request initiation ──────────────────────────────────────────

    /// Enter `Working` for a fetch and issue its ticket.
    ///
    /// Allowed from every non-terminal state except `Updating` (a save
    /// must settle before its result can be refreshed over). Re-entry
    /// from `Working` itself is allowed: a user may refresh again before
    /// the first fetch lands, and the new ticket supersedes the old one.
    /// Entering `Working` clears the displayed error; the payload stays.
    pub fn begin_fetch(&mut self) -> Result<Ticket, TransitionDenied> {
        match self.status {
            SyncStatus::Updating | SyncStatus::Deleted => Err(self.denied("fetch")),
            _ => {
                self.status = SyncStatus::Working;
                self.error = None;
                Ok(self.issue_ticket())
            }
        }
    }

    /// Enter `Updating` for a save and issue its ticket.
    ///
    /// Requires a settled payload (`Fetched` or `Upserted`): there is
    /// nothing meaningful to patch before the first successful fetch,
    /// and overlapping saves are rejected rather than queued.
    pub fn begin_update(&mut self) -> Result<Ticket, TransitionDenied> {
        if !self.status.has_settled_payload() {
            return Err(self.denied("update"));
        }
        self.status = SyncStatus::Updating;
        self.error = None;
        Ok(self.issue_ticket())
    }

    // ── Request completion ──────────────────────────────────────────

    /// Apply a successful fetch, unless the ticket was superseded.
    pub fn complete_fetch(&mut self, ticket: Ticket, payload: P) -> Settlement {
        self.settle(ticket, SyncStatus::Fetched, Some(payload), None)
    }

    /// Record a failed fetch, unless the ticket was superseded. The
    /// previous payload survives; only the error changes.
    pub fn fail_fetch(&mut self, ticket: Ticket, error: impl Into<String>) -> Settlement {
        self.settle(ticket, SyncStatus::Failed, None, Some(error.into()))
    }

    /// Apply a successful update: the server's post-save document
    /// becomes the payload.
    pub fn complete_update(&mut self, ticket: Ticket, payload: P) -> Settlement {
        self.settle(ticket, SyncStatus::Upserted, Some(payload), None)
    }

    /// Record a failed update; the pre-save payload survives.
    pub fn fail_update(&mut self, ticket: Ticket, error: impl Into<String>) -> Settlement {
        self.settle(ticket, SyncStatus::Failed, None, Some(error.into()))
    }

    /// Mark the entity deleted. Terminal: every later request and
    /// completion is denied or discarded.
    pub fn mark_deleted(&mut self) {
        self.status = SyncStatus::Deleted;
        self.payload = None;
        self.error = None;
        self.current = None;
    }

    // ── Internals ───────────────────────────────────────────────────

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.current = Some(ticket);
        ticket
    }

    fn settle(
        &mut self,
        ticket: Ticket,
        status: SyncStatus,
        payload: Option<P>,
        error: Option<String>,
    ) -> Settlement {
        if self.current != Some(ticket) || self.status == SyncStatus::Deleted {
            return Settlement::Stale;
        }
        self.current = None;
        self.status = status;
        self.error = error;
        if let Some(payload) = payload {
            self.payload = Some(Arc::new(payload));
            self.synced_at = Some(Utc::now());
        }
        Settlement::Applied
    }

    fn denied(&self, operation: &'static str) -> TransitionDenied {
        TransitionDenied {
            operation,
            from: self.status,
        }
    }
}
