//! DTDL v2 interface parsing for twinscope.
//!
//! This crate turns Digital Twins Definition Language interface documents
//! into typed Rust values. Parsing is two-layered:
//!
//! - [`raw`] deserializes permissively, keeping unknown keywords so a
//!   document can always be displayed back byte-faithfully.
//! - [`interface`] types the raw form strictly: content entries are
//!   dispatched into the four supported kinds (Property, Command,
//!   Telemetry, Component), schema references are resolved and inlined,
//!   and identifiers are validated as [`Dtmi`] values.
//!
//! Anything higher level (categorizing contents, translating schemas for
//! presentation, twin synchronization) lives in `twinscope-core`.

pub mod dtmi;
pub mod error;
pub mod interface;
pub mod localized;
pub mod raw;
pub mod schema;

pub use dtmi::Dtmi;
pub use error::DtdlError;
pub use interface::{
    CommandEntry, CommandPayload, ComponentEntry, ContentEntry, ModelDefinition, PropertyEntry,
    TelemetryEntry, interface_from_value, parse_interface, type_interface,
};
pub use localized::LocalizedText;
pub use raw::{OneOrMany, RawContent, RawInterface};
pub use schema::{EnumLiteral, EnumSchema, EnumValue, ObjectField, PrimitiveKind, SchemaNode};
