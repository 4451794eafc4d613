// ── Twin synchronization ──
//
// Per-entity fetch/edit/update lifecycle: the pure state machine in
// `tracker`, the consumer-side edit buffer in `draft`, and the shared
// reactive wrapper in `cell`. One instance per synchronized entity;
// entities never share mutable state.

mod cell;
mod draft;
mod tracker;

pub use cell::{SyncCell, SyncSnapshot, SyncSubscription, SyncWatchStream};
pub use draft::EditDraft;
pub use tracker::{Settlement, SyncStatus, SyncTracker, Ticket, TransitionDenied};
