// Raw DTDL document shapes
//
// Permissive mirror of the interface JSON as it arrives from a model
// repository. Fields use `#[serde(default)]` liberally because authoring
// tools are inconsistent about optional DTDL keywords; anything this layer
// does not model explicitly lands in `extra` so a document can be shown
// back to the user byte-faithfully. Strict validation happens one layer
// up, when a `RawInterface` is typed into a `ModelDefinition`.

use crate::localized::LocalizedText;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── One-or-many ──────────────────────────────────────────────────────

/// JSON-LD allows most keywords to be a single value or an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Iterate the values regardless of form.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        match self {
            Self::One(value) => std::slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
    }

    /// The first value, if any.
    pub fn first(&self) -> Option<&T> {
        self.iter().next()
    }
}

impl OneOrMany<String> {
    pub fn contains(&self, needle: &str) -> bool {
        self.iter().any(|value| value == needle)
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

// ── Interface document ───────────────────────────────────────────────

/// A DTDL interface document, loosely parsed.
///
/// Only `@id` and `@type` are required up front; every other keyword is
/// optional here so that malformed documents still deserialize far enough
/// to be diagnosed and displayed raw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInterface {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub entity_type: OneOrMany<String>,
    #[serde(default, rename = "@context")]
    pub context: Option<OneOrMany<String>>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub contents: Vec<RawContent>,
    /// Reusable schema definitions, referenced from `contents` by DTMI.
    #[serde(default)]
    pub schemas: Vec<Value>,
    #[serde(default)]
    pub extends: Option<OneOrMany<String>>,
    /// Catch-all for keywords this layer does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One entry of an interface's `contents` array.
///
/// The `@type` tag decides which of the optional fields are meaningful;
/// dispatch happens during typing, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContent {
    #[serde(rename = "@type")]
    pub entity_type: OneOrMany<String>,
    pub name: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Primitive name, inline complex schema, or DTMI reference.
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub writable: Option<bool>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Command request payload (`{ name, schema, ... }`).
    #[serde(default)]
    pub request: Option<Value>,
    /// Command response payload (`{ name, schema, ... }`).
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default, rename = "commandType")]
    pub command_type: Option<String>,
    /// Catch-all for keywords this layer does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RawInterface {
    /// Parse a raw interface from a JSON value without typing it.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}
