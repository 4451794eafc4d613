// ── Presentation schema descriptors ──
//
// JSON-Schema-shaped summaries of DTDL schemas, produced by the adaptor
// for form rendering and validation. The wire form is camelCase JSON;
// `type` is either a single kind or a `[kind, "null"]` union for
// non-required values.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use twinscope_dtdl::EnumLiteral;

// ── Value kinds ─────────────────────────────────────────────────────

/// The JSON value kinds a descriptor can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    String,
    Boolean,
    Object,
    Array,
}

impl ValueKind {
    fn as_json_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_json_str())
    }
}

/// A descriptor's `type` field: a required kind, or a union with `null`
/// for values a device may omit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    Required(ValueKind),
    Nullable(ValueKind),
}

impl DescriptorType {
    /// The non-null kind, regardless of nullability.
    pub fn value_kind(self) -> ValueKind {
        match self {
            Self::Required(kind) | Self::Nullable(kind) => kind,
        }
    }

    pub fn is_nullable(self) -> bool {
        matches!(self, Self::Nullable(_))
    }
}

impl Serialize for DescriptorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Required(kind) => kind.serialize(serializer),
            Self::Nullable(kind) => [kind.as_json_str(), "null"].serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for DescriptorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::String(name) => ValueKind::parse(name)
                .map(Self::Required)
                .ok_or_else(|| D::Error::custom(format!("unknown value kind '{name}'"))),
            Value::Array(items) => {
                let kinds: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                match kinds.as_slice() {
                    [kind, "null"] | ["null", kind] => ValueKind::parse(kind)
                        .map(Self::Nullable)
                        .ok_or_else(|| D::Error::custom(format!("unknown value kind '{kind}'"))),
                    _ => Err(D::Error::custom("expected a [kind, \"null\"] union")),
                }
            }
            _ => Err(D::Error::custom("expected a string or array type")),
        }
    }
}

// ── Schema descriptor ───────────────────────────────────────────────

/// One member of a descriptor's `enumValues` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumOption {
    pub label: String,
    pub value: EnumLiteral,
}

/// A JSON-Schema-shaped description of one DTDL schema, in a named
/// context (a property, a command payload, an object field).
///
/// `title` is the context name. `description` is composed from the
/// context's display name and description, each half replaced by `--`
/// when absent. Field ordering in `definitions` follows the source
/// model, which is why this is an `IndexMap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    pub title: String,
    #[serde(rename = "type")]
    pub descriptor_type: DescriptorType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumOption>>,
}

impl SchemaDescriptor {
    /// `true` when the value renders as a single editable field: numbers,
    /// strings, and booleans (enums included). Objects, arrays, and maps
    /// need structured rendering.
    pub fn is_simple_type(&self) -> bool {
        matches!(
            self.descriptor_type.value_kind(),
            ValueKind::Number | ValueKind::String | ValueKind::Boolean
        )
    }

    /// `true` when a Map occurs anywhere in this descriptor tree. Maps
    /// surface as `additionalProperties`, which generic form renderers
    /// cannot lay out ahead of time.
    pub fn contains_maps(&self) -> bool {
        self.additional_properties.is_some()
            || self.definitions.values().any(Self::contains_maps)
            || self.items.as_deref().is_some_and(Self::contains_maps)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(title: &str) -> SchemaDescriptor {
        SchemaDescriptor {
            title: title.to_owned(),
            descriptor_type: DescriptorType::Required(ValueKind::Number),
            description: "-- / --".to_owned(),
            unit: None,
            required: Vec::new(),
            definitions: IndexMap::new(),
            additional_properties: None,
            items: None,
            enum_values: None,
        }
    }

    #[test]
    fn required_type_serializes_as_bare_string() {
        let value = serde_json::to_value(&number("brightness")).unwrap();
        assert_eq!(value["type"], json!("number"));
        assert_eq!(value["title"], json!("brightness"));
        assert!(value.get("required").is_none());
        assert!(value.get("enumValues").is_none());
    }

    #[test]
    fn nullable_type_serializes_as_null_union() {
        let mut descriptor = number("offset");
        descriptor.descriptor_type = DescriptorType::Nullable(ValueKind::Number);
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["type"], json!(["number", "null"]));
    }

    #[test]
    fn descriptor_round_trips() {
        let mut descriptor = number("modules");
        descriptor.descriptor_type = DescriptorType::Required(ValueKind::Object);
        descriptor.additional_properties = Some(Box::new(number("moduleState")));

        let text = serde_json::to_string(&descriptor).unwrap();
        let back: SchemaDescriptor = serde_json::from_str(&text).unwrap();
        assert_eq!(back, descriptor);
    }

    #[test]
    fn simple_type_covers_scalars_only() {
        assert!(number("n").is_simple_type());

        let mut text = number("s");
        text.descriptor_type = DescriptorType::Nullable(ValueKind::String);
        assert!(text.is_simple_type());

        let mut object = number("o");
        object.descriptor_type = DescriptorType::Required(ValueKind::Object);
        assert!(!object.is_simple_type());

        let mut array = number("a");
        array.descriptor_type = DescriptorType::Required(ValueKind::Array);
        assert!(!array.is_simple_type());
    }

    #[test]
    fn contains_maps_walks_the_tree() {
        assert!(!number("plain").contains_maps());

        let mut map = number("modules");
        map.descriptor_type = DescriptorType::Required(ValueKind::Object);
        map.additional_properties = Some(Box::new(number("state")));
        assert!(map.contains_maps());

        let mut object = number("wrapper");
        object.descriptor_type = DescriptorType::Required(ValueKind::Object);
        object.definitions.insert("inner".into(), map);
        assert!(object.contains_maps());

        let mut array = number("list");
        array.descriptor_type = DescriptorType::Required(ValueKind::Array);
        array.items = Some(Box::new(object));
        assert!(array.contains_maps());
    }

    #[test]
    fn enum_options_serialize_with_labels() {
        let mut state = number("state");
        state.enum_values = Some(vec![
            EnumOption {
                label: "offline".into(),
                value: EnumLiteral::Int(1),
            },
            EnumOption {
                label: "online".into(),
                value: EnumLiteral::Int(2),
            },
        ]);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["enumValues"][1], json!({"label": "online", "value": 2}));
    }
}
