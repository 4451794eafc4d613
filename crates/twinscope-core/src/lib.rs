//! Model adaptation and twin synchronization for twinscope.
//!
//! Everything between a parsed DTDL document and a rendered twin editor
//! lives here:
//!
//! - [`adaptor`] categorizes a model's contents and translates each
//!   schema into a presentation [`SchemaDescriptor`].
//! - [`projector`] slices a twin document down to one component's
//!   desired/reported sub-trees and resolves reported-value ack
//!   envelopes centrally.
//! - [`sync`] is the per-entity fetch/edit/update state machine, with a
//!   reactive cell wrapper and the consumer-side edit draft.
//! - [`repository`] defines the capability traits the environment
//!   implements (model fetchers, the twin registry) plus the local
//!   directory fetcher and the multi-location resolver.
//! - [`session`] ties the above together into the [`TwinSession`]
//!   consumers hold.
//!
//! DTDL parsing itself lives in `twinscope-dtdl`; UI rendering and
//! network transport live in the embedding application.

pub mod adaptor;
pub mod config;
pub mod error;
pub mod model;
pub mod projector;
pub mod repository;
pub mod session;
pub mod sync;

pub use adaptor::{AdaptedModel, ComponentRef, adapt, component_index};
pub use config::{RepositoryLocation, SessionConfig};
pub use error::CoreError;
pub use model::{DEFAULT_COMPONENT, SchemaDescriptor, TwinDocument, TwinTarget};
pub use projector::{ProjectedProperties, project, property_tuples};
pub use repository::{
    LocalModelFetcher, ModelDefinitionWithSource, ModelFetcher, ModelResolver, ModelSource,
    TwinApi,
};
pub use session::{ResolvedModel, TwinSession};
pub use sync::{EditDraft, SyncSnapshot, SyncStatus, SyncSubscription};
