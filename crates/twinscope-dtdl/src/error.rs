use thiserror::Error;

/// Top-level error type for the `twinscope-dtdl` crate.
///
/// Covers every failure mode between raw JSON and a typed
/// [`ModelDefinition`](crate::ModelDefinition): identifier syntax, content
/// dispatch, schema resolution, and document shape. `twinscope-core` maps
/// these into model-validity diagnostics.
#[derive(Debug, Error)]
pub enum DtdlError {
    // ── Identifiers ─────────────────────────────────────────────────
    /// DTMI failed syntactic validation.
    #[error("Invalid DTMI '{raw}': {reason}")]
    InvalidDtmi { raw: String, reason: &'static str },

    // ── Document shape ──────────────────────────────────────────────
    /// The document's `@type` does not include `Interface`.
    #[error("Document is not a DTDL interface")]
    NotAnInterface,

    /// A required field is absent or has the wrong JSON type.
    #[error("'{context}': missing or malformed field '{field}'")]
    MissingField {
        context: String,
        field: &'static str,
    },

    // ── Contents ────────────────────────────────────────────────────
    /// A content entry's `@type` tag is not one of the four known kinds.
    #[error("Content '{name}' has unrecognized type '{tag}'")]
    UnknownContentType { name: String, tag: String },

    // ── Schemas ─────────────────────────────────────────────────────
    /// A complex schema's `@type` is not Enum, Object, Map, or Array.
    #[error("Unrecognized schema kind '{tag}'")]
    UnknownSchemaKind { tag: String },

    /// A schema given by name is not a DTDL primitive.
    #[error("Unrecognized primitive schema '{name}'")]
    UnknownPrimitive { name: String },

    /// An Enum schema declared no values.
    #[error("Enum schema '{context}' has no values")]
    EmptyEnum { context: String },

    /// A schema reference points at no entry in the interface's
    /// reusable `schemas` table.
    #[error("Unresolved schema reference '{id}'")]
    UnresolvedSchemaReference { id: String },

    /// Following schema references revisited an id already on the
    /// resolution stack.
    #[error("Circular schema reference through '{id}'")]
    CircularSchemaReference { id: String },

    /// Inline schema nesting went past the resolver's depth cap.
    #[error("Schema nesting exceeds {limit} levels")]
    SchemaTooDeep { limit: usize },

    // ── Encoding ────────────────────────────────────────────────────
    /// The document is not valid JSON at all.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DtdlError {
    /// Returns `true` if the failure is in a schema (as opposed to the
    /// document envelope or an identifier).
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownSchemaKind { .. }
                | Self::UnknownPrimitive { .. }
                | Self::EmptyEnum { .. }
                | Self::UnresolvedSchemaReference { .. }
                | Self::CircularSchemaReference { .. }
                | Self::SchemaTooDeep { .. }
        )
    }
}
