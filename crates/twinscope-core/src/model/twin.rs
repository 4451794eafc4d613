// ── Twin documents ──
//
// Service-side twin state as fetched from a twin registry. Like the rest
// of the wire layer this is permissive: only identity is required, and
// unmodeled service fields ride along in `extra` so an update round-trip
// never drops them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Addresses one twin: a device, or a module hosted on a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TwinTarget {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

impl TwinTarget {
    pub fn device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            module_id: None,
        }
    }

    pub fn module(device_id: impl Into<String>, module_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            module_id: Some(module_id.into()),
        }
    }
}

impl fmt::Display for TwinTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module_id {
            Some(module_id) => write!(f, "{}/{module_id}", self.device_id),
            None => write!(f, "{}", self.device_id),
        }
    }
}

/// The `desired` and `reported` property sections of a twin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwinProperties {
    #[serde(default)]
    pub desired: Map<String, Value>,
    #[serde(default)]
    pub reported: Map<String, Value>,
}

/// A twin document as returned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinDocument {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(default, rename = "moduleId", skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default, rename = "connectionState")]
    pub connection_state: Option<String>,
    #[serde(default, rename = "lastActivityTime")]
    pub last_activity_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub tags: Map<String, Value>,
    #[serde(default)]
    pub properties: TwinProperties,
    /// Catch-all for service fields this layer does not model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TwinDocument {
    pub fn target(&self) -> TwinTarget {
        TwinTarget {
            device_id: self.device_id.clone(),
            module_id: self.module_id.clone(),
        }
    }
}

// ── Acknowledgement metadata ────────────────────────────────────────

/// Writable-property acknowledgement envelope, reported by a device
/// after it applies (or rejects) a desired value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AckMetadata {
    /// Status code, HTTP-flavored (`200` applied, `4xx` rejected).
    #[serde(default, rename = "ac", skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Human-readable status description.
    #[serde(default, rename = "ad", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The `$version` of the desired section the device acknowledged.
    #[serde(default, rename = "av", skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl AckMetadata {
    pub fn is_success(&self) -> bool {
        self.code.is_some_and(|code| (200..300).contains(&code))
    }
}

/// One property's slice of the reported section: the bare value plus
/// acknowledgement metadata when the device wrapped it in an envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportedSlice {
    pub value: Option<Value>,
    pub ack: Option<AckMetadata>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_display_includes_module() {
        assert_eq!(TwinTarget::device("sensor-1").to_string(), "sensor-1");
        assert_eq!(
            TwinTarget::module("edge-1", "camera").to_string(),
            "edge-1/camera"
        );
    }

    #[test]
    fn twin_document_deserializes_registry_shape() {
        let twin: TwinDocument = serde_json::from_value(json!({
            "deviceId": "sensor-1",
            "etag": "AAAAAAAAAAE=",
            "version": 7,
            "connectionState": "Connected",
            "properties": {
                "desired": {"brightness": 128, "$version": 4},
                "reported": {"brightness": {"value": 128, "ac": 200, "av": 4}},
            },
            "capabilities": {"iotEdge": false},
        }))
        .unwrap();

        assert_eq!(twin.device_id, "sensor-1");
        assert_eq!(twin.version, Some(7));
        assert_eq!(twin.properties.desired["brightness"], json!(128));
        assert_eq!(twin.extra["capabilities"]["iotEdge"], json!(false));
    }

    #[test]
    fn missing_properties_default_to_empty() {
        let twin: TwinDocument =
            serde_json::from_value(json!({"deviceId": "bare"})).unwrap();
        assert!(twin.properties.desired.is_empty());
        assert!(twin.properties.reported.is_empty());
    }

    #[test]
    fn ack_success_requires_2xx() {
        let ack: AckMetadata =
            serde_json::from_value(json!({"ac": 200, "ad": "applied", "av": 4})).unwrap();
        assert!(ack.is_success());
        assert_eq!(ack.version, Some(4));

        let rejected: AckMetadata = serde_json::from_value(json!({"ac": 400})).unwrap();
        assert!(!rejected.is_success());

        assert!(!AckMetadata::default().is_success());
    }
}
