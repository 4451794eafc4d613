// ── Digital Twin Model Identifier ──
//
// Every DTDL interface, component reference, and reusable schema is keyed
// by a DTMI ("dtmi:com:example:Thermostat;1"). Validation happens once at
// construction; the rest of the workspace passes Dtmi values around and
// never re-checks syntax.

use crate::error::DtdlError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Validated Digital Twin Model Identifier.
///
/// Wraps the canonical string form (`dtmi:<path>;<version>`). DTMIs are
/// case-sensitive; the original casing is preserved and only
/// [`repository_path`](Self::repository_path) lowercases, per the device
/// model repository convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dtmi(String);

impl Dtmi {
    /// Parse and validate a DTMI from its string form.
    ///
    /// Enforces the `dtmi:` scheme, segment syntax (letters, digits,
    /// underscores; must start with a letter and not end with an
    /// underscore), and a numeric version of one to nine digits with no
    /// leading zero.
    pub fn parse(raw: &str) -> Result<Self, DtdlError> {
        let invalid = |reason: &'static str| DtdlError::InvalidDtmi {
            raw: raw.to_owned(),
            reason,
        };

        let Some(body) = raw.strip_prefix("dtmi:") else {
            return Err(invalid("missing 'dtmi:' scheme"));
        };
        let Some((path, version)) = body.rsplit_once(';') else {
            return Err(invalid("missing ';<version>' suffix"));
        };

        if version.is_empty() || version.len() > 9 {
            return Err(invalid("version must be one to nine digits"));
        }
        if !version.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("version must be numeric"));
        }
        if version.starts_with('0') {
            return Err(invalid("version must not have a leading zero"));
        }

        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        for segment in path.split(':') {
            if !valid_segment(segment) {
                return Err(invalid(
                    "path segments must start with a letter, contain only \
                     letters, digits, and underscores, and not end with an \
                     underscore",
                ));
            }
        }

        Ok(Self(raw.to_owned()))
    }

    /// The full canonical form, e.g. `dtmi:com:example:Thermostat;1`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path portion between the scheme and the version separator.
    pub fn path(&self) -> &str {
        let body = self.0.strip_prefix("dtmi:").unwrap_or(&self.0);
        body.rsplit_once(';').map_or(body, |(path, _)| path)
    }

    /// The numeric version suffix.
    pub fn version(&self) -> u32 {
        self.0
            .rsplit_once(';')
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(1)
    }

    /// Relative file path under a device model repository root.
    ///
    /// Follows the DMR convention: lowercase, `:` becomes `/`, `;` becomes
    /// `-`, `.json` appended. `dtmi:com:example:Thermostat;1` maps to
    /// `dtmi/com/example/thermostat-1.json`.
    pub fn repository_path(&self) -> String {
        let mut path = self.0.to_lowercase().replace(':', "/").replace(';', "-");
        path.push_str(".json");
        path
    }
}

fn valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && !segment.ends_with('_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Dtmi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Dtmi {
    type Err = DtdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Dtmi {
    type Error = DtdlError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl AsRef<str> for Dtmi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Dtmi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Dtmi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_form() {
        let dtmi = Dtmi::parse("dtmi:com:example:Thermostat;1").unwrap();
        assert_eq!(dtmi.path(), "com:example:Thermostat");
        assert_eq!(dtmi.version(), 1);
        assert_eq!(dtmi.as_str(), "dtmi:com:example:Thermostat;1");
    }

    #[test]
    fn preserves_casing() {
        let dtmi = Dtmi::parse("dtmi:com:Example:ThermoStat;2").unwrap();
        assert_eq!(dtmi.to_string(), "dtmi:com:Example:ThermoStat;2");
    }

    #[test]
    fn accepts_underscores_inside_segments() {
        assert!(Dtmi::parse("dtmi:com:my_company:sensor_hub;12").is_ok());
    }

    #[test]
    fn rejects_missing_scheme() {
        let err = Dtmi::parse("com:example:Thermostat;1").unwrap_err();
        assert!(matches!(err, DtdlError::InvalidDtmi { .. }));
    }

    #[test]
    fn rejects_missing_version() {
        assert!(Dtmi::parse("dtmi:com:example:Thermostat").is_err());
    }

    #[test]
    fn rejects_leading_zero_version() {
        assert!(Dtmi::parse("dtmi:com:example:Thermostat;01").is_err());
    }

    #[test]
    fn rejects_non_numeric_version() {
        assert!(Dtmi::parse("dtmi:com:example:Thermostat;v1").is_err());
    }

    #[test]
    fn rejects_segment_starting_with_digit() {
        assert!(Dtmi::parse("dtmi:com:1example:Thermostat;1").is_err());
    }

    #[test]
    fn rejects_segment_ending_with_underscore() {
        assert!(Dtmi::parse("dtmi:com:example_:Thermostat;1").is_err());
    }

    #[test]
    fn rejects_empty_segment() {
        assert!(Dtmi::parse("dtmi:com::Thermostat;1").is_err());
    }

    #[test]
    fn repository_path_lowercases_and_rewrites() {
        let dtmi = Dtmi::parse("dtmi:com:example:Thermostat;1").unwrap();
        assert_eq!(
            dtmi.repository_path(),
            "dtmi/com/example/thermostat-1.json"
        );
    }

    #[test]
    fn from_str_round_trip() {
        let dtmi: Dtmi = "dtmi:azure:DeviceManagement:DeviceInformation;1"
            .parse()
            .unwrap();
        assert_eq!(dtmi.version(), 1);
    }

    #[test]
    fn serde_round_trip() {
        let dtmi = Dtmi::parse("dtmi:com:example:Thermostat;1").unwrap();
        let json = serde_json::to_string(&dtmi).unwrap();
        assert_eq!(json, "\"dtmi:com:example:Thermostat;1\"");
        let back: Dtmi = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dtmi);
    }

    #[test]
    fn deserialize_rejects_invalid() {
        let result: Result<Dtmi, _> = serde_json::from_str("\"not-a-dtmi\"");
        assert!(result.is_err());
    }
}
