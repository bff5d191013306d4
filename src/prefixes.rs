// 🔤 Prefix Index - Known scaling prefixes and prefix matching
//
// Prefix detection is a SUBSTRING test on the lowercased identifier, not a
// token-boundary test. A base unit whose name happens to contain a prefix
// label is therefore classified as prefixed. Callers only see this through
// PrefixIndex, so a stricter matcher can replace it here.

use crate::error::{Result, TaxonomyError};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// PREFIX NAME
// ============================================================================

/// A scaling prefix as published by the SI reference source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixName {
    /// Lowercase label, e.g. "kilo"
    pub label: String,

    /// Symbol, e.g. "k"
    pub symbol: String,

    /// Multiplier, e.g. 1000.0
    #[serde(deserialize_with = "number_or_string")]
    pub scaling_factor: f64,

    /// Source identifier of the prefix (used for its stable id)
    pub pid: String,
}

impl PrefixName {
    pub fn new(label: &str, symbol: &str, scaling_factor: f64, pid: &str) -> Self {
        PrefixName {
            label: label.to_string(),
            symbol: symbol.to_string(),
            scaling_factor,
            pid: pid.to_string(),
        }
    }

    /// Label with its first letter upper-cased, as it appears inside unit
    /// path segments ("kilo" -> "Kilo")
    pub fn capitalized(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
            None => String::new(),
        }
    }
}

/// The reference source publishes factors both as JSON numbers and strings
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid scaling factor '{}': {}", s, e))),
    }
}

// ============================================================================
// PREFIX INDEX
// ============================================================================

/// Ordered, immutable set of prefixes for one reconciliation pass
///
/// The source order is the tie-break for "first prefix" lookups.
#[derive(Debug, Clone)]
pub struct PrefixIndex {
    prefixes: Vec<PrefixName>,

    /// Case-insensitive alternation of all labels, in source order
    alternation: Regex,
}

impl PrefixIndex {
    /// Build the index; fails on an empty list or an empty label
    pub fn new(prefixes: Vec<PrefixName>) -> Result<Self> {
        if prefixes.is_empty() {
            return Err(TaxonomyError::configuration(
                "prefix list is empty; every unit would classify as non-prefixed",
            ));
        }

        let mut normalized = Vec::with_capacity(prefixes.len());
        for mut prefix in prefixes {
            let label = prefix.label.trim().to_lowercase();
            if label.is_empty() {
                return Err(TaxonomyError::configuration(format!(
                    "prefix with pid '{}' has an empty label",
                    prefix.pid
                )));
            }
            prefix.label = label;
            normalized.push(prefix);
        }

        let pattern = normalized
            .iter()
            .map(|p| regex::escape(&p.label))
            .collect::<Vec<_>>()
            .join("|");
        let alternation = Regex::new(&format!("(?i)(?:{})", pattern))
            .map_err(|e| TaxonomyError::configuration(format!("prefix pattern: {}", e)))?;

        Ok(PrefixIndex {
            prefixes: normalized,
            alternation,
        })
    }

    /// Convenience constructor from bare labels (symbol/factor unknown)
    pub fn from_labels(labels: &[&str]) -> Result<Self> {
        Self::new(
            labels
                .iter()
                .map(|label| PrefixName::new(label, "", 1.0, label))
                .collect(),
        )
    }

    pub fn prefixes(&self) -> &[PrefixName] {
        &self.prefixes
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Look up a prefix by label
    pub fn get(&self, label: &str) -> Option<&PrefixName> {
        self.prefixes.iter().find(|p| p.label == label)
    }

    /// All prefix labels contained in `text`, in prefix-list order
    pub fn find_prefixes(&self, text: &str) -> Vec<&str> {
        let lower = text.to_lowercase();
        self.prefixes
            .iter()
            .filter(|p| lower.contains(p.label.as_str()))
            .map(|p| p.label.as_str())
            .collect()
    }

    /// First prefix (in prefix-list order) contained in `text`
    pub fn first_prefix(&self, text: &str) -> Option<&PrefixName> {
        let lower = text.to_lowercase();
        self.prefixes.iter().find(|p| lower.contains(p.label.as_str()))
    }

    /// Number of non-overlapping prefix occurrences in `text`
    pub fn count_occurrences(&self, text: &str) -> usize {
        self.alternation.find_iter(text).count()
    }

    pub fn has_multiple_prefixes(&self, text: &str) -> bool {
        self.count_occurrences(text) > 1
    }

    /// Remove every prefix occurrence, case-insensitively
    pub fn strip_all(&self, text: &str) -> String {
        self.alternation.replace_all(text, "").into_owned()
    }

    /// Strip the first capitalized prefix that `tail` starts with
    ///
    /// Only a LEADING prefix qualifies; every occurrence of that prefix's
    /// capitalized form is then removed. Tails without a leading prefix are
    /// returned unchanged.
    pub fn strip_leading(&self, tail: &str) -> String {
        for prefix in &self.prefixes {
            let capitalized = prefix.capitalized();
            if tail.starts_with(&capitalized) {
                return tail.replace(&capitalized, "");
            }
        }
        tail.to_string()
    }

    /// Remove every capitalized prefix occurrence, wherever it sits
    pub fn strip_all_capitalized(&self, tail: &str) -> String {
        let mut stripped = tail.to_string();
        for prefix in &self.prefixes {
            let capitalized = prefix.capitalized();
            if stripped.contains(&capitalized) {
                stripped = stripped.replace(&capitalized, "");
            }
        }
        stripped
    }
}

/// Substring after the last '/' of an identifier
pub fn path_tail(identifier: &str) -> &str {
    identifier.rsplit('/').next().unwrap_or(identifier)
}

// ============================================================================
// TESTS
// ============================================================================
