// ── Twin projection ──
//
// Slices a twin document down to the sub-tree one component owns, and
// resolves the reported-property envelope ambiguity in one place so
// renderers never shape-sniff twin JSON themselves.

use crate::adaptor::AdaptedProperty;
use crate::model::{
    AckMetadata, DEFAULT_COMPONENT, ReportedSlice, SchemaDescriptor, TwinDocument, ValueKind,
};
use serde_json::{Map, Value, json};

/// Plug-and-play marker key identifying a property-bag entry as a
/// component sub-tree rather than a root property.
const COMPONENT_MARKER: &str = "__t";

/// A component's slice of the desired and reported property bags.
///
/// `None` means the twin has no data for the component at all, which is
/// different from `Some` of an empty bag (the component exists but has
/// no properties yet). Renderers show the two differently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedProperties {
    pub desired: Option<Map<String, Value>>,
    pub reported: Option<Map<String, Value>>,
}

impl ProjectedProperties {
    /// `true` when the twin carries no data for this component in
    /// either section.
    pub fn is_absent(&self) -> bool {
        self.desired.is_none() && self.reported.is_none()
    }
}

/// Project a twin onto one component.
///
/// The root component returns the twin's own property bags unmodified.
/// A named component returns the object stored under its name in each
/// bag, with the plug-and-play marker stripped.
pub fn project(twin: &TwinDocument, component: &str) -> ProjectedProperties {
    if component == DEFAULT_COMPONENT {
        return ProjectedProperties {
            desired: Some(twin.properties.desired.clone()),
            reported: Some(twin.properties.reported.clone()),
        };
    }
    ProjectedProperties {
        desired: component_section(&twin.properties.desired, component),
        reported: component_section(&twin.properties.reported, component),
    }
}

/// A non-object under the component's name means the twin has no usable
/// data for it; only object values form a component sub-tree.
fn component_section(bag: &Map<String, Value>, component: &str) -> Option<Map<String, Value>> {
    match bag.get(component) {
        Some(Value::Object(section)) => {
            let mut section = section.clone();
            section.remove(COMPONENT_MARKER);
            Some(section)
        }
        _ => None,
    }
}

// ── Reported-value resolution ───────────────────────────────────────

/// Extract one property's reported slice from a projected section.
pub fn reported_slice(
    reported: Option<&Map<String, Value>>,
    property: &str,
    descriptor: &SchemaDescriptor,
) -> ReportedSlice {
    let Some(section) = reported else {
        return ReportedSlice::default();
    };
    let Some(raw) = section.get(property) else {
        return ReportedSlice::default();
    };
    split_reported(raw, descriptor)
}

/// Split a reported value from its acknowledgement envelope, if any.
pub fn split_reported(raw: &Value, descriptor: &SchemaDescriptor) -> ReportedSlice {
    if let Value::Object(obj) = raw {
        if is_ack_envelope(obj, descriptor) {
            let ack = AckMetadata {
                code: obj.get("ac").and_then(Value::as_i64),
                description: obj.get("ad").and_then(Value::as_str).map(str::to_owned),
                version: obj.get("av").and_then(Value::as_i64),
            };
            return ReportedSlice {
                value: obj.get("value").cloned(),
                ack: Some(ack),
            };
        }
    }
    ReportedSlice {
        value: Some(raw.clone()),
        ack: None,
    }
}

/// Envelope detection, disambiguated by the property's own descriptor.
///
/// A scalar-typed property cannot legitimately report an object, so a
/// `value` key plus any ack key means envelope. An object-typed
/// property could genuinely contain a `value` field, so the guard is
/// stricter there: both the ack code and the acked version must be
/// present before the object is read as an envelope.
fn is_ack_envelope(obj: &Map<String, Value>, descriptor: &SchemaDescriptor) -> bool {
    if !obj.contains_key("value") {
        return false;
    }
    let has_code = obj.contains_key("ac");
    let has_version = obj.contains_key("av");
    if descriptor.descriptor_type.value_kind() == ValueKind::Object {
        has_code && has_version
    } else {
        has_code || has_version
    }
}

// ── Property tuples ─────────────────────────────────────────────────

/// One property's render-ready pairing: its descriptor plus the twin
/// values currently attached to it. Recomputed from the twin on every
/// use, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTuple<'a> {
    pub property: &'a AdaptedProperty,
    pub desired_value: Option<Value>,
    pub reported: ReportedSlice,
}

/// Pair one adapted property with its projected twin values.
pub fn property_tuple<'a>(
    property: &'a AdaptedProperty,
    projected: &ProjectedProperties,
) -> PropertyTuple<'a> {
    let name = property.entry.name.as_str();
    let desired_value = projected
        .desired
        .as_ref()
        .and_then(|section| section.get(name))
        .cloned();
    PropertyTuple {
        desired_value,
        reported: reported_slice(projected.reported.as_ref(), name, &property.schema),
        property,
    }
}

/// Pair a whole category of adapted properties with twin values.
pub fn property_tuples<'a>(
    properties: &'a [AdaptedProperty],
    projected: &ProjectedProperties,
) -> Vec<PropertyTuple<'a>> {
    properties
        .iter()
        .map(|property| property_tuple(property, projected))
        .collect()
}

// ── Patch construction ──────────────────────────────────────────────

/// Build a desired-property patch for one property.
///
/// Root properties patch the desired bag directly; component properties
/// nest under the component's name with the plug-and-play marker, which
/// the registry requires on component writes.
pub fn desired_patch(component: &str, property: &str, value: Value) -> Value {
    let mut desired = Map::new();
    if component == DEFAULT_COMPONENT {
        desired.insert(property.to_owned(), value);
    } else {
        let mut section = Map::new();
        section.insert(COMPONENT_MARKER.to_owned(), Value::String("c".to_owned()));
        section.insert(property.to_owned(), value);
        desired.insert(component.to_owned(), Value::Object(section));
    }
    json!({"properties": {"desired": desired}})
}
