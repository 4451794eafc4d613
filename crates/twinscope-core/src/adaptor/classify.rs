// ── Content classification ──
//
// Splits an interface's contents into the five categories consumers
// render separately. Source order is preserved within each category;
// the match is exhaustive, so a content entry lands in exactly one.

use twinscope_dtdl::{
    CommandEntry, ComponentEntry, ContentEntry, ModelDefinition, PropertyEntry, TelemetryEntry,
};

/// Borrowed views of a model's contents, split by category.
#[derive(Debug, Default)]
pub struct ClassifiedContents<'a> {
    /// Properties the service may write (`writable: true`).
    pub writable: Vec<&'a PropertyEntry>,
    /// Properties only the device reports.
    pub read_only: Vec<&'a PropertyEntry>,
    pub commands: Vec<&'a CommandEntry>,
    pub telemetry: Vec<&'a TelemetryEntry>,
    pub components: Vec<&'a ComponentEntry>,
}

impl ClassifiedContents<'_> {
    /// `true` when the interface has any contents of its own, beyond
    /// component references. Drives whether a root component entry is
    /// synthesized.
    pub fn has_own_contents(&self) -> bool {
        !self.writable.is_empty()
            || !self.read_only.is_empty()
            || !self.commands.is_empty()
            || !self.telemetry.is_empty()
    }
}

/// Classify a model's contents into the five categories.
pub fn classify(model: &ModelDefinition) -> ClassifiedContents<'_> {
    classify_contents(&model.contents)
}

/// Classify a bare contents slice.
pub fn classify_contents(contents: &[ContentEntry]) -> ClassifiedContents<'_> {
    let mut classified = ClassifiedContents::default();
    for entry in contents {
        match entry {
            ContentEntry::Property(property) if property.writable => {
                classified.writable.push(property);
            }
            ContentEntry::Property(property) => classified.read_only.push(property),
            ContentEntry::Command(command) => classified.commands.push(command),
            ContentEntry::Telemetry(telemetry) => classified.telemetry.push(telemetry),
            ContentEntry::Component(component) => classified.components.push(component),
        }
    }
    classified
}
