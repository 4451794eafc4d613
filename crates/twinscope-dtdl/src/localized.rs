// ── Localizable display strings ──

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A DTDL `displayName` or `description`.
///
/// The DTDL grammar allows either a bare string or a map of IETF language
/// tags to strings. [`resolve`](Self::resolve) collapses either form to a
/// single string for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    ByLocale(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Resolve to a string for `locale`.
    ///
    /// Lookup order for the map form: exact tag, then the bare language
    /// part (`en-US` falls back to `en`), then `en`, then the first entry
    /// in tag order. Returns `None` only for an empty map.
    pub fn resolve(&self, locale: &str) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            Self::ByLocale(by_tag) => {
                if let Some(text) = by_tag.get(locale) {
                    return Some(text);
                }
                let language = locale.split('-').next().unwrap_or(locale);
                by_tag
                    .get(language)
                    .or_else(|| by_tag.get("en"))
                    .or_else(|| by_tag.values().next())
                    .map(String::as_str)
            }
        }
    }

    /// Resolve with no locale preference.
    pub fn any(&self) -> Option<&str> {
        self.resolve("en")
    }
}

impl From<&str> for LocalizedText {
    fn from(text: &str) -> Self {
        Self::Plain(text.to_owned())
    }
}

impl From<String> for LocalizedText {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn by_locale(pairs: &[(&str, &str)]) -> LocalizedText {
        LocalizedText::ByLocale(
            pairs
                .iter()
                .map(|(tag, text)| ((*tag).to_owned(), (*text).to_owned()))
                .collect(),
        )
    }

    #[test]
    fn plain_ignores_locale() {
        let text = LocalizedText::from("Target Temperature");
        assert_eq!(text.resolve("fr"), Some("Target Temperature"));
    }

    #[test]
    fn exact_tag_wins() {
        let text = by_locale(&[("en", "Temperature"), ("fr", "Température")]);
        assert_eq!(text.resolve("fr"), Some("Température"));
    }

    #[test]
    fn regional_tag_falls_back_to_language() {
        let text = by_locale(&[("en", "Temperature"), ("fr", "Température")]);
        assert_eq!(text.resolve("fr-CA"), Some("Température"));
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        let text = by_locale(&[("en", "Temperature"), ("fr", "Température")]);
        assert_eq!(text.resolve("de"), Some("Temperature"));
    }

    #[test]
    fn no_english_falls_back_to_first_entry() {
        let text = by_locale(&[("fr", "Température"), ("ja", "温度")]);
        assert_eq!(text.resolve("de"), Some("Température"));
    }

    #[test]
    fn empty_map_resolves_to_none() {
        let text = LocalizedText::ByLocale(BTreeMap::new());
        assert_eq!(text.resolve("en"), None);
    }

    #[test]
    fn deserializes_both_forms() {
        let plain: LocalizedText = serde_json::from_str("\"Brightness\"").unwrap();
        assert_eq!(plain.any(), Some("Brightness"));

        let tagged: LocalizedText =
            serde_json::from_str(r#"{"en": "Brightness", "de": "Helligkeit"}"#).unwrap();
        assert_eq!(tagged.resolve("de"), Some("Helligkeit"));
    }
}
