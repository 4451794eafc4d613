// ── DTDL schema tree ──
//
// Typed representation of everything that can appear under a `schema`
// keyword: the ten primitives plus the four complex kinds (Enum, Object,
// Map, Array). Resolution walks raw JSON, follows DTMI references into
// the interface's reusable `schemas` table, and guards against reference
// cycles and runaway nesting.

use crate::error::DtdlError;
use crate::localized::LocalizedText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Inline nesting cap for schema resolution. DTDL documents in the wild
/// stay in single digits; anything deeper is malformed or adversarial.
const MAX_SCHEMA_DEPTH: usize = 32;

// ── Primitives ──────────────────────────────────────────────────────

/// The ten DTDL v2 primitive schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Date,
    DateTime,
    Double,
    Duration,
    Float,
    Integer,
    Long,
    String,
    Time,
}

impl PrimitiveKind {
    /// Parse a DTDL primitive name. Returns `None` for anything else,
    /// including complex-kind tags and DTMI references.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "dateTime" => Some(Self::DateTime),
            "double" => Some(Self::Double),
            "duration" => Some(Self::Duration),
            "float" => Some(Self::Float),
            "integer" => Some(Self::Integer),
            "long" => Some(Self::Long),
            "string" => Some(Self::String),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    /// The DTDL spelling of this primitive.
    pub fn as_dtdl_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Double => "double",
            Self::Duration => "duration",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::String => "string",
            Self::Time => "time",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_dtdl_str())
    }
}

// ── Complex schema pieces ───────────────────────────────────────────

/// An enum member's wire value: integer or string, depending on the
/// enum's `valueSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumLiteral {
    Int(i64),
    Str(String),
}

impl fmt::Display for EnumLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value}"),
        }
    }
}

/// One member of an Enum schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub value: EnumLiteral,
    pub display_name: Option<LocalizedText>,
}

/// An Enum schema: a closed set of named values over one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub value_schema: PrimitiveKind,
    pub values: Vec<EnumValue>,
}

/// One field of an Object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectField {
    pub name: String,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub schema: SchemaNode,
}

/// Any resolved DTDL schema.
///
/// DTMI references into the `schemas` table are resolved away during
/// construction; consumers only ever see the inlined tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Primitive(PrimitiveKind),
    Enum(EnumSchema),
    Object { fields: Vec<ObjectField> },
    Map {
        key_name: String,
        value_name: String,
        value: Box<SchemaNode>,
    },
    Array { element: Box<SchemaNode> },
}

impl SchemaNode {
    /// The primitive kind, if this node is a primitive.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

// ── Resolution ──────────────────────────────────────────────────────

/// Reusable schema definitions from an interface's `schemas` array,
/// keyed by their `@id`.
pub(crate) type SchemaTable<'a> = BTreeMap<&'a str, &'a Value>;

/// Index the `schemas` array by `@id`. Entries without a string `@id`
/// are unreferencable and skipped.
pub(crate) fn schema_table(schemas: &[Value]) -> SchemaTable<'_> {
    let mut table = SchemaTable::new();
    for entry in schemas {
        if let Some(id) = entry.get("@id").and_then(Value::as_str) {
            table.insert(id, entry);
        }
    }
    table
}

/// Resolve a raw `schema` value into a typed node.
///
/// `context` names the content entry or field being resolved and only
/// feeds error messages.
pub(crate) fn resolve_schema(
    raw: &Value,
    table: &SchemaTable<'_>,
    context: &str,
) -> Result<SchemaNode, DtdlError> {
    let mut stack = Vec::new();
    resolve_inner(raw, table, context, &mut stack, 0)
}

fn resolve_inner<'a>(
    raw: &'a Value,
    table: &SchemaTable<'a>,
    context: &str,
    stack: &mut Vec<&'a str>,
    depth: usize,
) -> Result<SchemaNode, DtdlError> {
    if depth > MAX_SCHEMA_DEPTH {
        return Err(DtdlError::SchemaTooDeep {
            limit: MAX_SCHEMA_DEPTH,
        });
    }

    match raw {
        Value::String(name) => resolve_named(name, table, context, stack, depth),
        Value::Object(obj) => resolve_complex(obj, table, context, stack, depth),
        _ => Err(DtdlError::MissingField {
            context: context.to_owned(),
            field: "schema",
        }),
    }
}

/// A string schema is either a primitive name or a DTMI reference into
/// the reusable schemas table.
fn resolve_named<'a>(
    name: &'a str,
    table: &SchemaTable<'a>,
    context: &str,
    stack: &mut Vec<&'a str>,
    depth: usize,
) -> Result<SchemaNode, DtdlError> {
    if let Some(kind) = PrimitiveKind::parse(name) {
        return Ok(SchemaNode::Primitive(kind));
    }
    if name.starts_with("dtmi:") {
        if stack.contains(&name) {
            return Err(DtdlError::CircularSchemaReference {
                id: name.to_owned(),
            });
        }
        let Some(target) = table.get(name) else {
            return Err(DtdlError::UnresolvedSchemaReference {
                id: name.to_owned(),
            });
        };
        stack.push(name);
        let resolved = resolve_inner(target, table, context, stack, depth + 1);
        stack.pop();
        return resolved;
    }
    Err(DtdlError::UnknownPrimitive {
        name: name.to_owned(),
    })
}

fn resolve_complex<'a>(
    obj: &'a Map<String, Value>,
    table: &SchemaTable<'a>,
    context: &str,
    stack: &mut Vec<&'a str>,
    depth: usize,
) -> Result<SchemaNode, DtdlError> {
    let tag = complex_tag(obj, context)?;
    match tag {
        "Enum" => resolve_enum(obj, context),
        "Object" => resolve_object(obj, table, context, stack, depth),
        "Map" => resolve_map(obj, table, context, stack, depth),
        "Array" => {
            let element = value_field(obj, context, "elementSchema")?;
            Ok(SchemaNode::Array {
                element: Box::new(resolve_inner(element, table, context, stack, depth + 1)?),
            })
        }
        other => Err(DtdlError::UnknownSchemaKind {
            tag: other.to_owned(),
        }),
    }
}

fn resolve_enum(obj: &Map<String, Value>, context: &str) -> Result<SchemaNode, DtdlError> {
    let value_schema_name = str_field(obj, context, "valueSchema")?;
    let value_schema =
        PrimitiveKind::parse(value_schema_name).ok_or_else(|| DtdlError::UnknownPrimitive {
            name: value_schema_name.to_owned(),
        })?;

    let entries = value_field(obj, context, "enumValues")?
        .as_array()
        .ok_or_else(|| missing(context, "enumValues"))?;
    if entries.is_empty() {
        return Err(DtdlError::EmptyEnum {
            context: context.to_owned(),
        });
    }

    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        let member = entry.as_object().ok_or_else(|| missing(context, "enumValues"))?;
        let name = str_field(member, context, "name")?.to_owned();
        let value = match member.get("enumValue") {
            Some(Value::Number(n)) => {
                EnumLiteral::Int(n.as_i64().ok_or_else(|| missing(context, "enumValue"))?)
            }
            Some(Value::String(s)) => EnumLiteral::Str(s.clone()),
            _ => return Err(missing(context, "enumValue")),
        };
        values.push(EnumValue {
            name,
            value,
            display_name: localized_field(member, "displayName"),
        });
    }

    Ok(SchemaNode::Enum(EnumSchema {
        value_schema,
        values,
    }))
}

fn resolve_object<'a>(
    obj: &'a Map<String, Value>,
    table: &SchemaTable<'a>,
    context: &str,
    stack: &mut Vec<&'a str>,
    depth: usize,
) -> Result<SchemaNode, DtdlError> {
    let entries = value_field(obj, context, "fields")?
        .as_array()
        .ok_or_else(|| missing(context, "fields"))?;

    let mut fields = Vec::with_capacity(entries.len());
    for entry in entries {
        let field = entry.as_object().ok_or_else(|| missing(context, "fields"))?;
        let name = str_field(field, context, "name")?.to_owned();
        let field_context = format!("{context}.{name}");
        let schema_value = value_field(field, &field_context, "schema")?;
        fields.push(ObjectField {
            schema: resolve_inner(schema_value, table, &field_context, stack, depth + 1)?,
            display_name: localized_field(field, "displayName"),
            description: localized_field(field, "description"),
            name,
        });
    }

    Ok(SchemaNode::Object { fields })
}

fn resolve_map<'a>(
    obj: &'a Map<String, Value>,
    table: &SchemaTable<'a>,
    context: &str,
    stack: &mut Vec<&'a str>,
    depth: usize,
) -> Result<SchemaNode, DtdlError> {
    let map_key = value_field(obj, context, "mapKey")?
        .as_object()
        .ok_or_else(|| missing(context, "mapKey"))?;
    let map_value = value_field(obj, context, "mapValue")?
        .as_object()
        .ok_or_else(|| missing(context, "mapValue"))?;

    // DTDL fixes map keys to strings; anything else is malformed.
    let key_schema = str_field(map_key, context, "schema")?;
    if PrimitiveKind::parse(key_schema) != Some(PrimitiveKind::String) {
        return Err(missing(context, "mapKey"));
    }

    let value_schema = value_field(map_value, context, "schema")?;
    Ok(SchemaNode::Map {
        key_name: str_field(map_key, context, "name")?.to_owned(),
        value_name: str_field(map_value, context, "name")?.to_owned(),
        value: Box::new(resolve_inner(value_schema, table, context, stack, depth + 1)?),
    })
}

// ── Field extraction helpers ────────────────────────────────────────

fn complex_tag<'v>(obj: &'v Map<String, Value>, context: &str) -> Result<&'v str, DtdlError> {
    match obj.get("@type") {
        Some(Value::String(tag)) => Ok(tag),
        Some(Value::Array(tags)) => tags
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| missing(context, "@type")),
        _ => Err(missing(context, "@type")),
    }
}

fn str_field<'v>(
    obj: &'v Map<String, Value>,
    context: &str,
    field: &'static str,
) -> Result<&'v str, DtdlError> {
    obj.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(context, field))
}

fn value_field<'v>(
    obj: &'v Map<String, Value>,
    context: &str,
    field: &'static str,
) -> Result<&'v Value, DtdlError> {
    obj.get(field).ok_or_else(|| missing(context, field))
}

/// Cosmetic fields (display names, descriptions) are lenient: a
/// wrong-shaped value is dropped rather than failing the whole model.
fn localized_field(obj: &Map<String, Value>, field: &str) -> Option<LocalizedText> {
    obj.get(field)
        .and_then(|value| LocalizedText::deserialize(value).ok())
}

fn missing(context: &str, field: &'static str) -> DtdlError {
    DtdlError::MissingField {
        context: context.to_owned(),
        field,
    }
}
