// ── Model adaptor ──
//
// Bridges typed DTDL models to what consumers render: categorized
// content lists with presentation descriptors attached, and the
// component index that names each sub-tree of the twin.

mod classify;
mod translate;

pub use classify::{ClassifiedContents, classify, classify_contents};
pub use translate::{
    DESCRIPTION_PLACEHOLDER, translate_payload, translate_property, translate_telemetry,
};

use crate::model::{DEFAULT_COMPONENT, SchemaDescriptor};
use serde::{Deserialize, Serialize};
use twinscope_dtdl::{CommandEntry, Dtmi, ModelDefinition, PropertyEntry, TelemetryEntry};

// ── Adapted output ──────────────────────────────────────────────────

/// A property entry paired with its value descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedProperty {
    pub entry: PropertyEntry,
    pub schema: SchemaDescriptor,
}

/// A command entry with translated request/response payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedCommand {
    pub entry: CommandEntry,
    pub request: Option<SchemaDescriptor>,
    pub response: Option<SchemaDescriptor>,
}

/// A telemetry entry paired with its event-body descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedTelemetry {
    pub entry: TelemetryEntry,
    pub schema: SchemaDescriptor,
}

/// One entry of the component index: a component name and the model it
/// instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
    pub component_name: String,
    pub model_id: Dtmi,
}

/// A model's contents, categorized and translated for rendering.
///
/// Produced by [`adapt`]; owned by the caller and never mutated by this
/// crate afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedModel {
    pub model_id: Dtmi,
    /// Properties the service may write.
    pub writable: Vec<AdaptedProperty>,
    /// Properties only the device reports.
    pub read_only: Vec<AdaptedProperty>,
    pub commands: Vec<AdaptedCommand>,
    pub telemetry: Vec<AdaptedTelemetry>,
    /// Named component references, in source order. The synthesized
    /// root entry is not included here; see [`component_index`].
    pub components: Vec<ComponentRef>,
}

impl AdaptedModel {
    /// Look up a property by name across both writability categories.
    pub fn property(&self, name: &str) -> Option<&AdaptedProperty> {
        self.writable
            .iter()
            .chain(self.read_only.iter())
            .find(|property| property.entry.name == name)
    }

    /// `true` when the model has contents of its own beyond component
    /// references.
    pub fn has_own_contents(&self) -> bool {
        !self.writable.is_empty()
            || !self.read_only.is_empty()
            || !self.commands.is_empty()
            || !self.telemetry.is_empty()
    }
}

// ── Operations ──────────────────────────────────────────────────────

/// Categorize and translate a model's contents.
///
/// Total by construction: a model that typed successfully always
/// adapts. Malformed documents never reach this point; they fail
/// during parsing and the model is marked invalid there.
pub fn adapt(model: &ModelDefinition, locale: &str) -> AdaptedModel {
    let classified = classify(model);

    AdaptedModel {
        model_id: model.id.clone(),
        writable: adapted_properties(&classified.writable, locale),
        read_only: adapted_properties(&classified.read_only, locale),
        commands: classified
            .commands
            .iter()
            .map(|command| AdaptedCommand {
                entry: (*command).clone(),
                request: command
                    .request
                    .as_ref()
                    .map(|payload| translate_payload(payload, locale)),
                response: command
                    .response
                    .as_ref()
                    .map(|payload| translate_payload(payload, locale)),
            })
            .collect(),
        telemetry: classified
            .telemetry
            .iter()
            .map(|telemetry| AdaptedTelemetry {
                entry: (*telemetry).clone(),
                schema: translate_telemetry(telemetry, locale),
            })
            .collect(),
        components: classified
            .components
            .iter()
            .map(|component| ComponentRef {
                component_name: component.name.clone(),
                model_id: component.schema.clone(),
            })
            .collect(),
    }
}

fn adapted_properties(entries: &[&PropertyEntry], locale: &str) -> Vec<AdaptedProperty> {
    entries
        .iter()
        .map(|property| AdaptedProperty {
            entry: (*property).clone(),
            schema: translate_property(property, locale),
        })
        .collect()
}

/// The ordered component index for a model.
///
/// When the interface has any contents of its own, a root entry named
/// [`DEFAULT_COMPONENT`] pairing the model's own id comes first, then
/// the named components in source order. A model with no contents at
/// all yields an empty index: there is nothing to render, so no root
/// entry is synthesized.
pub fn component_index(model: &ModelDefinition) -> Vec<ComponentRef> {
    let classified = classify(model);
    let mut index = Vec::with_capacity(classified.components.len() + 1);
    if classified.has_own_contents() {
        index.push(ComponentRef {
            component_name: DEFAULT_COMPONENT.to_owned(),
            model_id: model.id.clone(),
        });
    }
    index.extend(classified.components.iter().map(|component| ComponentRef {
        component_name: component.name.clone(),
        model_id: component.schema.clone(),
    }));
    index
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use twinscope_dtdl::interface_from_value;

    fn sensor() -> ModelDefinition {
        interface_from_value(&json!({
            "@id": "dtmi:com:example:Sensor;1",
            "@type": "Interface",
            "contents": [
                {"@type": "Property", "name": "brightness", "schema": "long", "writable": true,
                 "displayName": "Brightness Level"},
                {"@type": "Property", "name": "serialNumber", "schema": "string"},
                {"@type": "Telemetry", "name": "temperature", "schema": "double"},
                {"@type": "Command", "name": "blink", "request": {
                    "name": "interval", "schema": "duration",
                }},
                {"@type": "Component", "name": "thermostat1",
                 "schema": "dtmi:com:example:Thermostat;1"},
            ],
        }))
        .unwrap()
    }

    #[test]
    fn adapt_categorizes_and_translates() {
        let adapted = adapt(&sensor(), "en");

        assert_eq!(adapted.writable.len(), 1);
        assert_eq!(adapted.writable[0].schema.title, "brightness");
        assert_eq!(
            adapted.writable[0].schema.description,
            "Brightness Level / --"
        );
        assert_eq!(adapted.read_only.len(), 1);
        assert_eq!(adapted.commands.len(), 1);
        assert!(adapted.commands[0].request.is_some());
        assert!(adapted.commands[0].response.is_none());
        assert_eq!(adapted.telemetry.len(), 1);
        assert_eq!(adapted.components.len(), 1);
    }

    #[test]
    fn property_lookup_spans_categories() {
        let adapted = adapt(&sensor(), "en");
        assert!(adapted.property("brightness").is_some());
        assert!(adapted.property("serialNumber").is_some());
        assert!(adapted.property("temperature").is_none());
    }

    #[test]
    fn component_index_synthesizes_root_entry() {
        let index = component_index(&sensor());
        assert_eq!(index.len(), 2);
        assert_eq!(index[0].component_name, DEFAULT_COMPONENT);
        assert_eq!(index[0].model_id.as_str(), "dtmi:com:example:Sensor;1");
        assert_eq!(index[1].component_name, "thermostat1");
    }

    #[test]
    fn empty_model_yields_empty_index() {
        let empty = interface_from_value(&json!({
            "@id": "dtmi:com:example:Empty;1",
            "@type": "Interface",
            "contents": [],
        }))
        .unwrap();
        assert!(component_index(&empty).is_empty());
    }

    #[test]
    fn component_only_model_omits_root_entry() {
        let hub = interface_from_value(&json!({
            "@id": "dtmi:com:example:Hub;1",
            "@type": "Interface",
            "contents": [
                {"@type": "Component", "name": "left", "schema": "dtmi:com:example:T;1"},
                {"@type": "Component", "name": "right", "schema": "dtmi:com:example:T;2"},
            ],
        }))
        .unwrap();
        let index = component_index(&hub);
        assert_eq!(index.len(), 2);
        assert!(index.iter().all(|entry| entry.component_name != DEFAULT_COMPONENT));
    }

    #[test]
    fn component_ref_serializes_camel_case() {
        let index = component_index(&sensor());
        let value = serde_json::to_value(&index[1]).unwrap();
        assert_eq!(value["componentName"], json!("thermostat1"));
        assert_eq!(value["modelId"], json!("dtmi:com:example:Thermostat;1"));
    }
}
