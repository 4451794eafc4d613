// ── Core domain model ──
//
// Canonical types shared across the adaptor, projector, and session:
// presentation schema descriptors on one side, twin documents on the
// other. Model definitions themselves come from `twinscope-dtdl`.

pub mod descriptor;
pub mod twin;

// ── Re-exports ──────────────────────────────────────────────────────

pub use descriptor::{DescriptorType, EnumOption, SchemaDescriptor, ValueKind};
pub use twin::{AckMetadata, ReportedSlice, TwinDocument, TwinProperties, TwinTarget};

/// Name of the synthesized root component. An interface's own contents
/// (everything not nested under a named component) live here.
pub const DEFAULT_COMPONENT: &str = "$default";
