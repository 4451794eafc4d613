// ── Schema translation ──
//
// Converts typed DTDL schema trees into presentation descriptors. The
// mapping is total: every SchemaNode has a descriptor, so translation
// can never fail on a model that typed successfully.
//
// Contractual details consumers rely on:
// - long/integer/double/float map to "number"; date/dateTime/time/
//   duration map to "string" (rendered textually).
// - A context that is not required gets a `[type, "null"]` union.
//   Property values are never required -- a device may not have
//   reported anything yet. Telemetry, command payloads, map values,
//   and array items are required.
// - `description` is always `"{displayName} / {description}"` with
//   `--` standing in for a missing half. Renderers split on the
//   separator, so the format is contractual.
// - Object descriptors keep `required` empty: DTDL object fields carry
//   no required marker in observed usage.

use crate::model::{DescriptorType, EnumOption, SchemaDescriptor, ValueKind};
use indexmap::IndexMap;
use twinscope_dtdl::{
    CommandPayload, LocalizedText, PrimitiveKind, PropertyEntry, SchemaNode, TelemetryEntry,
};

/// Placeholder for a missing display name or description half.
pub const DESCRIPTION_PLACEHOLDER: &str = "--";

// ── Entry points ────────────────────────────────────────────────────

/// Descriptor for a property's value. Property values are nullable:
/// the device may never have reported one.
pub fn translate_property(entry: &PropertyEntry, locale: &str) -> SchemaDescriptor {
    let ctx = SchemaContext {
        name: &entry.name,
        display_name: entry.display_name.as_ref(),
        description: entry.description.as_ref(),
        unit: entry.unit.as_deref(),
        required: false,
        locale,
    };
    translate_schema(&entry.schema, &ctx)
}

/// Descriptor for a telemetry event body. An event that arrives always
/// carries its value, so the type is required.
pub fn translate_telemetry(entry: &TelemetryEntry, locale: &str) -> SchemaDescriptor {
    let ctx = SchemaContext {
        name: &entry.name,
        display_name: entry.display_name.as_ref(),
        description: entry.description.as_ref(),
        unit: entry.unit.as_deref(),
        required: true,
        locale,
    };
    translate_schema(&entry.schema, &ctx)
}

/// Descriptor for a command's request or response payload.
pub fn translate_payload(payload: &CommandPayload, locale: &str) -> SchemaDescriptor {
    let ctx = SchemaContext {
        name: &payload.name,
        display_name: payload.display_name.as_ref(),
        description: payload.description.as_ref(),
        unit: None,
        required: true,
        locale,
    };
    translate_schema(&payload.schema, &ctx)
}

// ── Recursive translation ───────────────────────────────────────────

pub(crate) struct SchemaContext<'a> {
    pub name: &'a str,
    pub display_name: Option<&'a LocalizedText>,
    pub description: Option<&'a LocalizedText>,
    pub unit: Option<&'a str>,
    pub required: bool,
    pub locale: &'a str,
}

impl SchemaContext<'_> {
    fn composed_description(&self) -> String {
        let display = self
            .display_name
            .and_then(|text| text.resolve(self.locale))
            .unwrap_or(DESCRIPTION_PLACEHOLDER);
        let description = self
            .description
            .and_then(|text| text.resolve(self.locale))
            .unwrap_or(DESCRIPTION_PLACEHOLDER);
        format!("{display} / {description}")
    }

    fn typed(&self, kind: ValueKind) -> DescriptorType {
        if self.required {
            DescriptorType::Required(kind)
        } else {
            DescriptorType::Nullable(kind)
        }
    }

    fn descriptor(&self, kind: ValueKind) -> SchemaDescriptor {
        SchemaDescriptor {
            title: self.name.to_owned(),
            descriptor_type: self.typed(kind),
            description: self.composed_description(),
            unit: self.unit.map(str::to_owned),
            required: Vec::new(),
            definitions: IndexMap::new(),
            additional_properties: None,
            items: None,
            enum_values: None,
        }
    }

    /// Context for a nested value with its own docs. Nested object
    /// fields inherit the no-required-marker rule; everything else
    /// passes `required: true`.
    fn nested<'a>(
        &'a self,
        name: &'a str,
        display_name: Option<&'a LocalizedText>,
        description: Option<&'a LocalizedText>,
        required: bool,
    ) -> SchemaContext<'a> {
        SchemaContext {
            name,
            display_name,
            description,
            unit: None,
            required,
            locale: self.locale,
        }
    }
}

pub(crate) fn translate_schema(schema: &SchemaNode, ctx: &SchemaContext<'_>) -> SchemaDescriptor {
    match schema {
        SchemaNode::Primitive(kind) => ctx.descriptor(primitive_value_kind(*kind)),
        SchemaNode::Enum(schema) => {
            let mut descriptor = ctx.descriptor(primitive_value_kind(schema.value_schema));
            descriptor.enum_values = Some(
                schema
                    .values
                    .iter()
                    .map(|member| EnumOption {
                        label: member
                            .display_name
                            .as_ref()
                            .and_then(|text| text.resolve(ctx.locale))
                            .unwrap_or(&member.name)
                            .to_owned(),
                        value: member.value.clone(),
                    })
                    .collect(),
            );
            descriptor
        }
        SchemaNode::Object { fields } => {
            let mut descriptor = ctx.descriptor(ValueKind::Object);
            descriptor.definitions = fields
                .iter()
                .map(|field| {
                    let nested = ctx.nested(
                        &field.name,
                        field.display_name.as_ref(),
                        field.description.as_ref(),
                        false,
                    );
                    (field.name.clone(), translate_schema(&field.schema, &nested))
                })
                .collect();
            descriptor
        }
        SchemaNode::Map {
            value_name, value, ..
        } => {
            let mut descriptor = ctx.descriptor(ValueKind::Object);
            let nested = ctx.nested(value_name, None, None, true);
            descriptor.additional_properties =
                Some(Box::new(translate_schema(value, &nested)));
            descriptor
        }
        SchemaNode::Array { element } => {
            let mut descriptor = ctx.descriptor(ValueKind::Array);
            let nested = ctx.nested(ctx.name, None, None, true);
            descriptor.items = Some(Box::new(translate_schema(element, &nested)));
            descriptor
        }
    }
}

fn primitive_value_kind(kind: PrimitiveKind) -> ValueKind {
    match kind {
        PrimitiveKind::Double
        | PrimitiveKind::Float
        | PrimitiveKind::Integer
        | PrimitiveKind::Long => ValueKind::Number,
        PrimitiveKind::Boolean => ValueKind::Boolean,
        PrimitiveKind::String
        | PrimitiveKind::Date
        | PrimitiveKind::DateTime
        | PrimitiveKind::Duration
        | PrimitiveKind::Time => ValueKind::String,
    }
}
