// ── Typed interface model ──
//
// Strict typing pass over a RawInterface. Content entries are dispatched
// on their `@type` tag into one of the four supported kinds, schemas are
// resolved (references included), and identifiers are validated. Fail
// here and the document is not a usable model; the raw form is still
// available for display.

use crate::dtmi::Dtmi;
use crate::error::DtdlError;
use crate::localized::LocalizedText;
use crate::raw::{RawContent, RawInterface};
use crate::schema::{SchemaNode, SchemaTable, resolve_schema, schema_table};
use serde_json::Value;

// ── Content entries ─────────────────────────────────────────────────

/// A Property content entry: named state, optionally writable from the
/// service side.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub schema: SchemaNode,
    pub writable: bool,
    pub unit: Option<String>,
    /// Semantic co-types beside `Property`, e.g. `Temperature`.
    pub co_types: Vec<String>,
}

/// A Telemetry content entry: a transient event stream, never stored on
/// the twin.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEntry {
    pub name: String,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub schema: SchemaNode,
    pub unit: Option<String>,
    pub co_types: Vec<String>,
}

/// Request or response payload of a Command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPayload {
    pub name: String,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub schema: SchemaNode,
}

/// A Command content entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEntry {
    pub name: String,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub command_type: Option<String>,
    pub request: Option<CommandPayload>,
    pub response: Option<CommandPayload>,
}

/// A Component content entry: a named reference to another interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentEntry {
    pub name: String,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub schema: Dtmi,
}

/// One entry of an interface's `contents`, dispatched by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEntry {
    Property(PropertyEntry),
    Command(CommandEntry),
    Telemetry(TelemetryEntry),
    Component(ComponentEntry),
}

impl ContentEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Property(entry) => &entry.name,
            Self::Command(entry) => &entry.name,
            Self::Telemetry(entry) => &entry.name,
            Self::Component(entry) => &entry.name,
        }
    }

    pub fn display_name(&self) -> Option<&LocalizedText> {
        match self {
            Self::Property(entry) => entry.display_name.as_ref(),
            Self::Command(entry) => entry.display_name.as_ref(),
            Self::Telemetry(entry) => entry.display_name.as_ref(),
            Self::Component(entry) => entry.display_name.as_ref(),
        }
    }

    pub fn description(&self) -> Option<&LocalizedText> {
        match self {
            Self::Property(entry) => entry.description.as_ref(),
            Self::Command(entry) => entry.description.as_ref(),
            Self::Telemetry(entry) => entry.description.as_ref(),
            Self::Component(entry) => entry.description.as_ref(),
        }
    }
}

// ── Model definition ────────────────────────────────────────────────

/// A fully typed DTDL interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub id: Dtmi,
    pub display_name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub contents: Vec<ContentEntry>,
}

impl ModelDefinition {
    /// Look up a content entry by name.
    pub fn content(&self, name: &str) -> Option<&ContentEntry> {
        self.contents.iter().find(|entry| entry.name() == name)
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// Parse a DTDL interface document from JSON text.
pub fn parse_interface(json: &str) -> Result<ModelDefinition, DtdlError> {
    let value: Value = serde_json::from_str(json)?;
    interface_from_value(&value)
}

/// Parse a DTDL interface document from an already-decoded JSON value.
pub fn interface_from_value(value: &Value) -> Result<ModelDefinition, DtdlError> {
    let raw = RawInterface::from_value(value)?;
    type_interface(&raw)
}

/// Type a loosely-parsed interface into a [`ModelDefinition`].
pub fn type_interface(raw: &RawInterface) -> Result<ModelDefinition, DtdlError> {
    if !raw.entity_type.contains("Interface") {
        return Err(DtdlError::NotAnInterface);
    }
    let id = Dtmi::parse(&raw.id)?;
    let table = schema_table(&raw.schemas);

    let mut contents = Vec::with_capacity(raw.contents.len());
    for entry in &raw.contents {
        contents.push(type_content(entry, &table)?);
    }

    Ok(ModelDefinition {
        id,
        display_name: raw.display_name.clone(),
        description: raw.description.clone(),
        contents,
    })
}

const CONTENT_KINDS: [&str; 4] = ["Property", "Command", "Telemetry", "Component"];

fn type_content(entry: &RawContent, table: &SchemaTable<'_>) -> Result<ContentEntry, DtdlError> {
    // Semantic co-types may precede the kind tag, so search the whole
    // list rather than assuming position.
    let kind = entry
        .entity_type
        .iter()
        .find(|tag| CONTENT_KINDS.contains(&tag.as_str()));
    let Some(kind) = kind else {
        return Err(DtdlError::UnknownContentType {
            name: entry.name.clone(),
            tag: entry
                .entity_type
                .first()
                .cloned()
                .unwrap_or_default(),
        });
    };
    let co_types: Vec<String> = entry
        .entity_type
        .iter()
        .filter(|tag| *tag != kind)
        .cloned()
        .collect();

    let typed = match kind.as_str() {
        "Property" => ContentEntry::Property(PropertyEntry {
            schema: required_schema(entry, table)?,
            name: entry.name.clone(),
            display_name: entry.display_name.clone(),
            description: entry.description.clone(),
            writable: entry.writable.unwrap_or(false),
            unit: entry.unit.clone(),
            co_types,
        }),
        "Telemetry" => ContentEntry::Telemetry(TelemetryEntry {
            schema: required_schema(entry, table)?,
            name: entry.name.clone(),
            display_name: entry.display_name.clone(),
            description: entry.description.clone(),
            unit: entry.unit.clone(),
            co_types,
        }),
        "Command" => ContentEntry::Command(CommandEntry {
            request: command_payload(entry.request.as_ref(), table, &entry.name, "request")?,
            response: command_payload(entry.response.as_ref(), table, &entry.name, "response")?,
            name: entry.name.clone(),
            display_name: entry.display_name.clone(),
            description: entry.description.clone(),
            command_type: entry.command_type.clone(),
        }),
        // Component is the only remaining member of CONTENT_KINDS.
        _ => ContentEntry::Component(ComponentEntry {
            schema: component_target(entry)?,
            name: entry.name.clone(),
            display_name: entry.display_name.clone(),
            description: entry.description.clone(),
        }),
    };
    Ok(typed)
}

fn required_schema(entry: &RawContent, table: &SchemaTable<'_>) -> Result<SchemaNode, DtdlError> {
    let Some(schema) = entry.schema.as_ref() else {
        return Err(DtdlError::MissingField {
            context: entry.name.clone(),
            field: "schema",
        });
    };
    resolve_schema(schema, table, &entry.name)
}

fn command_payload(
    value: Option<&Value>,
    table: &SchemaTable<'_>,
    command: &str,
    side: &'static str,
) -> Result<Option<CommandPayload>, DtdlError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let context = format!("{command}.{side}");
    let obj = value.as_object().ok_or_else(|| DtdlError::MissingField {
        context: context.clone(),
        field: side,
    })?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| DtdlError::MissingField {
            context: context.clone(),
            field: "name",
        })?
        .to_owned();
    let schema = obj.get("schema").ok_or_else(|| DtdlError::MissingField {
        context: context.clone(),
        field: "schema",
    })?;

    Ok(Some(CommandPayload {
        schema: resolve_schema(schema, table, &context)?,
        display_name: obj
            .get("displayName")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        description: obj
            .get("description")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        name,
    }))
}

/// Components reference another interface by DTMI, either as a bare
/// string or as an object carrying an `@id`.
fn component_target(entry: &RawContent) -> Result<Dtmi, DtdlError> {
    let missing = || DtdlError::MissingField {
        context: entry.name.clone(),
        field: "schema",
    };
    match entry.schema.as_ref() {
        Some(Value::String(id)) => Dtmi::parse(id),
        Some(Value::Object(obj)) => {
            let id = obj.get("@id").and_then(Value::as_str).ok_or_else(missing)?;
            Dtmi::parse(id)
        }
        _ => Err(missing()),
    }
}
