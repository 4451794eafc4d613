// Integration tests for DTDL interface parsing.
//
// Exercises a complete, realistic interface document end to end: every
// content kind, complex schemas (inline and via the reusable schemas
// table), localized display strings, and semantic co-types.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use twinscope_dtdl::{
    ContentEntry, DtdlError, EnumLiteral, PrimitiveKind, SchemaNode, interface_from_value,
    parse_interface,
};

fn environment_sensor() -> serde_json::Value {
    json!({
        "@id": "dtmi:com:contoso:EnvironmentSensor;2",
        "@type": "Interface",
        "@context": "dtmi:dtdl:context;2",
        "displayName": {"en": "Environment Sensor", "de": "Umweltsensor"},
        "description": "Multi-channel environment monitoring",
        "contents": [
            {
                "@type": "Property",
                "name": "brightness",
                "displayName": "Brightness Level",
                "description": "The brightness level for the light on the device.",
                "schema": "long",
                "writable": true,
            },
            {
                "@type": "Property",
                "name": "serialNumber",
                "schema": "string",
            },
            {
                "@type": "Property",
                "name": "state",
                "schema": "dtmi:com:contoso:EnvironmentSensor:StateEnum;1",
                "writable": true,
            },
            {
                "@type": "Property",
                "name": "modules",
                "writable": true,
                "schema": {
                    "@type": "Map",
                    "mapKey": {"name": "moduleName", "schema": "string"},
                    "mapValue": {"name": "moduleState", "schema": "string"},
                },
            },
            {
                "@type": "Property",
                "name": "location",
                "writable": true,
                "schema": {
                    "@type": "Object",
                    "fields": [
                        {"name": "latitude", "schema": "double"},
                        {"name": "longitude", "schema": "double"},
                        {"name": "history", "schema": {
                            "@type": "Array",
                            "elementSchema": "dateTime",
                        }},
                    ],
                },
            },
            {
                "@type": ["Telemetry", "Temperature"],
                "name": "temperature",
                "schema": "double",
                "unit": "degreeCelsius",
            },
            {
                "@type": "Command",
                "name": "blink",
                "displayName": "Blink LED",
                "commandType": "synchronous",
                "request": {
                    "name": "interval",
                    "displayName": "Blink interval",
                    "schema": "duration",
                },
                "response": {
                    "name": "accepted",
                    "schema": "boolean",
                },
            },
            {
                "@type": "Component",
                "name": "thermostat1",
                "displayName": "Primary thermostat",
                "schema": "dtmi:com:contoso:Thermostat;1",
            },
        ],
        "schemas": [
            {
                "@id": "dtmi:com:contoso:EnvironmentSensor:StateEnum;1",
                "@type": "Enum",
                "valueSchema": "integer",
                "enumValues": [
                    {"name": "offline", "enumValue": 1},
                    {"name": "online", "enumValue": 2, "displayName": "Online"},
                ],
            },
        ],
    })
}

#[test]
fn parses_full_document() {
    let model = interface_from_value(&environment_sensor()).unwrap();

    assert_eq!(model.id.as_str(), "dtmi:com:contoso:EnvironmentSensor;2");
    assert_eq!(model.id.version(), 2);
    assert_eq!(
        model.display_name.as_ref().unwrap().resolve("de"),
        Some("Umweltsensor")
    );
    assert_eq!(model.contents.len(), 8);
}

#[test]
fn property_entries_carry_writability_and_docs() {
    let model = interface_from_value(&environment_sensor()).unwrap();

    let ContentEntry::Property(brightness) = model.content("brightness").unwrap() else {
        panic!("expected property");
    };
    assert!(brightness.writable);
    assert_eq!(brightness.schema.primitive(), Some(PrimitiveKind::Long));
    assert_eq!(
        brightness.display_name.as_ref().unwrap().any(),
        Some("Brightness Level")
    );

    let ContentEntry::Property(serial) = model.content("serialNumber").unwrap() else {
        panic!("expected property");
    };
    assert!(!serial.writable);
}

#[test]
fn enum_reference_resolves_through_schemas_table() {
    let model = interface_from_value(&environment_sensor()).unwrap();

    let ContentEntry::Property(state) = model.content("state").unwrap() else {
        panic!("expected property");
    };
    let SchemaNode::Enum(schema) = &state.schema else {
        panic!("expected enum schema");
    };
    assert_eq!(schema.value_schema, PrimitiveKind::Integer);
    assert_eq!(schema.values[0].name, "offline");
    assert_eq!(schema.values[1].value, EnumLiteral::Int(2));
}

#[test]
fn complex_schemas_resolve_inline() {
    let model = interface_from_value(&environment_sensor()).unwrap();

    let ContentEntry::Property(modules) = model.content("modules").unwrap() else {
        panic!("expected property");
    };
    assert!(matches!(modules.schema, SchemaNode::Map { .. }));

    let ContentEntry::Property(location) = model.content("location").unwrap() else {
        panic!("expected property");
    };
    let SchemaNode::Object { fields } = &location.schema else {
        panic!("expected object schema");
    };
    assert_eq!(fields.len(), 3);
    assert!(matches!(fields[2].schema, SchemaNode::Array { .. }));
}

#[test]
fn telemetry_keeps_semantic_type_and_unit() {
    let model = interface_from_value(&environment_sensor()).unwrap();

    let ContentEntry::Telemetry(temperature) = model.content("temperature").unwrap() else {
        panic!("expected telemetry");
    };
    assert_eq!(temperature.co_types, vec!["Temperature".to_owned()]);
    assert_eq!(temperature.unit.as_deref(), Some("degreeCelsius"));
}

#[test]
fn command_and_component_entries() {
    let model = interface_from_value(&environment_sensor()).unwrap();

    let ContentEntry::Command(blink) = model.content("blink").unwrap() else {
        panic!("expected command");
    };
    assert_eq!(blink.command_type.as_deref(), Some("synchronous"));
    assert_eq!(blink.request.as_ref().unwrap().name, "interval");
    assert_eq!(
        blink.response.as_ref().unwrap().schema.primitive(),
        Some(PrimitiveKind::Boolean)
    );

    let ContentEntry::Component(thermostat) = model.content("thermostat1").unwrap() else {
        panic!("expected component");
    };
    assert_eq!(thermostat.schema.as_str(), "dtmi:com:contoso:Thermostat;1");
}

#[test]
fn parse_interface_accepts_text() {
    let text = environment_sensor().to_string();
    let model = parse_interface(&text).unwrap();
    assert_eq!(model.contents.len(), 8);
}

#[test]
fn malformed_json_reports_json_error() {
    let err = parse_interface("{not json").unwrap_err();
    assert!(matches!(err, DtdlError::Json(_)));
}

#[test]
fn schema_error_classification_helper() {
    let err = interface_from_value(&json!({
        "@id": "dtmi:com:contoso:Broken;1",
        "@type": "Interface",
        "contents": [{"@type": "Property", "name": "bad", "schema": "decimal"}],
    }))
    .unwrap_err();
    assert!(err.is_schema_error());
}
