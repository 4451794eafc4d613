use crate::repository::ModelSource;
use crate::sync::{SyncStatus, TransitionDenied};
use thiserror::Error;
use twinscope_dtdl::DtdlError;

/// Top-level error type for the `twinscope-core` crate.
///
/// Covers every failure mode across model resolution, twin transport,
/// and synchronization. Embedding applications map these into
/// user-facing diagnostics; sync state carries them as strings on the
/// `Failed` status.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Model resolution ────────────────────────────────────────────
    /// A fetched model definition could not be parsed or translated.
    #[error("Model {model_id} failed to parse: {source}")]
    ModelParse {
        model_id: String,
        #[source]
        source: DtdlError,
    },

    /// No configured location could supply the model definition.
    #[error("Model {model_id} not found (tried {locations_tried:?})")]
    ModelNotFound {
        model_id: String,
        locations_tried: Vec<ModelSource>,
    },

    /// A model location failed in a way other than "not found".
    #[error("Repository error at {location} source: {message}")]
    Repository {
        location: ModelSource,
        message: String,
    },

    // ── Twin transport ──────────────────────────────────────────────
    /// The twin registry could not return the twin document.
    #[error("Twin fetch failed: {message}")]
    TwinFetch { message: String },

    /// The twin registry rejected or failed an update.
    #[error("Twin update failed: {message}")]
    TwinUpdate { message: String },

    /// The patch document is not something the registry would accept.
    #[error("Invalid twin patch: {message}")]
    InvalidPatch { message: String },

    // ── Synchronization ─────────────────────────────────────────────
    /// The operation is not valid in the entity's current sync state.
    #[error("Operation '{operation}' not allowed in state {status}")]
    NotAllowed {
        operation: &'static str,
        status: SyncStatus,
    },

    /// The session's background tasks have been shut down.
    #[error("Session closed")]
    SessionClosed,
}

impl CoreError {
    /// Returns `true` if this error means the model simply is not
    /// present at any searched location.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModelNotFound { .. })
    }

    /// Returns `true` if the operation was refused because a request is
    /// already in flight; retry after the current request settles.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::NotAllowed {
                status: SyncStatus::Working | SyncStatus::Updating,
                ..
            }
        )
    }
}

impl From<TransitionDenied> for CoreError {
    fn from(denied: TransitionDenied) -> Self {
        Self::NotAllowed {
            operation: denied.operation,
            status: denied.from,
        }
    }
}
