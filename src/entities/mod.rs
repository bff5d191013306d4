// Entity Models
// Identity is the StableId computed from the source URI; everything else
// is a value built by one reconciliation pass.
//
// Each entity has:
// - Stable identity (UUID v5) that is the same on every run
// - Values (labels, symbols, factors) copied from the source records
// - Cross-references expressed as StableIds or page titles

pub mod unit;
pub mod quantity;
pub mod characteristic;
pub mod property;

pub use unit::{ComposedUnit, PrefixUnit, QuantityUnit, UnitPrefix};
pub use quantity::QuantityKind;
pub use characteristic::{Characteristic, CharacteristicKind};
pub use property::{
    AdditionalUnit, MainQuantityProperty, MainUnit, QuantityProperty, SubQuantityProperty,
    UnitEnumerationElement,
};

use serde::{Deserialize, Serialize};

use crate::parser::parse_labels;

/// Language used for untagged and empty-tagged text
pub const DEFAULT_LANG: &str = "en";

// ============================================================================
// LANGUAGE-TAGGED TEXT
// ============================================================================

/// Text with its language tag (labels and descriptions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangString {
    pub text: String,
    pub lang: String,
}

impl LangString {
    pub fn new(text: &str, lang: &str) -> Self {
        LangString {
            text: text.to_string(),
            lang: lang.to_string(),
        }
    }

    pub fn en(text: &str) -> Self {
        Self::new(text, DEFAULT_LANG)
    }

    /// Parse and clean a `"text@lang, ..."` label string
    ///
    /// An empty tag and a regional tag ("en-US") fold into the generic
    /// language only when that language is absent; otherwise they are
    /// dropped. English sorts first, the rest keep source order.
    pub fn from_tagged(labels: &str) -> Vec<LangString> {
        fold_languages(labels, generic_lang)
    }

    /// Parse a unit label string; only the empty tag folds into English,
    /// regional tags are kept as they are
    pub fn from_unit_tagged(labels: &str) -> Vec<LangString> {
        fold_languages(labels, empty_as_default)
    }

    /// Upper-case the first character, keep the rest
    pub fn capitalized(&self) -> LangString {
        LangString {
            text: capitalize_first(&self.text),
            lang: self.lang.clone(),
        }
    }
}

/// Parsed labels with each tag mapped through `target`; a tag whose target
/// is already present in the source, or already taken, is dropped
fn fold_languages(labels: &str, target: fn(&str) -> &str) -> Vec<LangString> {
    let parsed = parse_labels(labels);
    let mut folded: Vec<LangString> = Vec::with_capacity(parsed.len());

    for (lang, text) in &parsed {
        let lang = lang.as_str();
        let folded_lang = target(lang);
        if folded_lang != lang && parsed.contains_key(folded_lang) {
            continue;
        }
        if folded.iter().any(|l| l.lang == folded_lang) {
            continue;
        }
        folded.push(LangString::new(text, folded_lang));
    }

    folded.sort_by_key(|l| l.lang != DEFAULT_LANG);
    folded
}

/// "" -> "en", anything else unchanged
fn empty_as_default(lang: &str) -> &str {
    if lang.is_empty() {
        DEFAULT_LANG
    } else {
        lang
    }
}

/// "en-US" -> "en", "" -> "en"
fn generic_lang(lang: &str) -> &str {
    match lang.split('-').next() {
        Some(generic) if !generic.is_empty() => generic,
        _ => DEFAULT_LANG,
    }
}

pub type Label = LangString;
pub type Description = LangString;

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"speed of light"` -> `"SpeedOfLight"`
///
/// Splits on every non-alphanumeric character and upper-cases the first
/// character of each word; the rest of a word is kept as is.
pub fn pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tagged_folds_regional_variant() {
        let labels = LangString::from_tagged("Meter@en-US, metro@it");
        assert_eq!(labels, vec![LangString::en("Meter"), LangString::new("metro", "it")]);
    }

    #[test]
    fn test_from_tagged_keeps_generic_over_regional() {
        let labels = LangString::from_tagged("Meter@en-US, Metre@en");
        assert_eq!(labels, vec![LangString::en("Metre")]);
    }

    #[test]
    fn test_from_tagged_empty_tag_and_order() {
        let labels = LangString::from_tagged("Meter@de, metre@");
        assert_eq!(labels, vec![LangString::en("metre"), LangString::new("Meter", "de")]);
    }

    #[test]
    fn test_from_unit_tagged_keeps_regional_tags() {
        let labels = LangString::from_unit_tagged("Meter@en-US, metre@, metro@it");
        assert_eq!(
            labels,
            vec![
                LangString::en("metre"),
                LangString::new("Meter", "en-US"),
                LangString::new("metro", "it"),
            ]
        );
    }

    #[test]
    fn test_from_unit_tagged_empty_tag_yields_to_english() {
        let labels = LangString::from_unit_tagged("meter@, Metre@en");
        assert_eq!(labels, vec![LangString::en("Metre")]);
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("speed of light"), "SpeedOfLight");
        assert_eq!(pascal_case("Vapor-permeance (NEON)"), "VaporPermeanceNEON");
        assert_eq!(pascal_case("VaporPermeance"), "VaporPermeance");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_capitalized() {
        assert_eq!(LangString::new("length", "en").capitalized().text, "Length");
        assert_eq!(LangString::new("ångström", "sv").capitalized().text, "Ångström");
    }
}
