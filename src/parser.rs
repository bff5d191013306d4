// 📥 Query Result Records - Already-fetched source data
// Quantity-kind and unit bindings in SPARQL-JSON shape, plus the small
// string formats they carry (labels, descriptions, code lists)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::prefixes::PrefixName;

// ============================================================================
// QUERY RESULT ENVELOPE
// ============================================================================

/// `{"results": {"bindings": [...]}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub results: QueryBindings<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBindings<T> {
    pub bindings: Vec<T>,
}

impl<T> QueryResult<T> {
    pub fn into_bindings(self) -> Vec<T> {
        self.results.bindings
    }
}

/// One bound variable: `{"type": "uri", "value": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
}

impl BindingValue {
    pub fn literal(value: &str) -> Self {
        BindingValue {
            kind: Some("literal".to_string()),
            value: value.to_string(),
        }
    }

    pub fn uri(value: &str) -> Self {
        BindingValue {
            kind: Some("uri".to_string()),
            value: value.to_string(),
        }
    }
}

fn value_of(binding: &Option<BindingValue>) -> Option<&str> {
    binding.as_ref().map(|b| b.value.as_str())
}

// ============================================================================
// QUANTITY KIND RECORD
// ============================================================================

/// One row of the quantity-kind query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityKindRecord {
    pub quantity: BindingValue,
    pub labels: BindingValue,
    pub applicable_units: BindingValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text_descriptions: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broader: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbpedia_match: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub si_exact_match: Option<BindingValue>,
}

impl QuantityKindRecord {
    /// Minimal record (tests and programmatic callers)
    pub fn new(uri: &str, labels: &str, applicable_units: &str) -> Self {
        QuantityKindRecord {
            quantity: BindingValue::uri(uri),
            labels: BindingValue::literal(labels),
            applicable_units: BindingValue::literal(applicable_units),
            descriptions: None,
            plain_text_descriptions: None,
            broader: None,
            dbpedia_match: None,
            si_exact_match: None,
        }
    }

    pub fn with_broader(mut self, broader: &str) -> Self {
        self.broader = Some(BindingValue::uri(broader));
        self
    }

    pub fn uri(&self) -> &str {
        &self.quantity.value
    }

    pub fn applicable_units(&self) -> &str {
        &self.applicable_units.value
    }

    pub fn broader(&self) -> Option<&str> {
        value_of(&self.broader)
    }

    /// Ontology matches other than the record itself (dbpedia, SI)
    pub fn external_matches(&self) -> Vec<String> {
        [value_of(&self.dbpedia_match), value_of(&self.si_exact_match)]
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    /// First description; plain-text wins when non-empty
    pub fn description(&self) -> Option<String> {
        let mut description = value_of(&self.descriptions).map(|d| {
            let text = first_multi_value(d);
            if text.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                text
            }
        });

        if let Some(plain) = value_of(&self.plain_text_descriptions) {
            let text = first_multi_value(plain);
            if !text.is_empty() {
                description = Some(text);
            }
        }

        description
    }
}

/// Placeholder for quantity kinds whose description value is blank
pub const NO_DESCRIPTION: &str = "No description provided by QUDT";

// ============================================================================
// UNIT RECORD
// ============================================================================

/// One row of the unit query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRecord {
    pub applicable_unit: BindingValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qlabels: Option<BindingValue>,
    #[serde(rename = "conversionMultiplierSN", default, skip_serializing_if = "Option::is_none")]
    pub conversion_multiplier_sn: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text_description: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucum_codes: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbpedia_match: Option<BindingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub si_exact_match: Option<BindingValue>,
}

impl UnitRecord {
    /// Minimal record (tests and programmatic callers)
    pub fn new(iri: &str, symbol: &str, conversion_factor: Option<f64>) -> Self {
        UnitRecord {
            applicable_unit: BindingValue::uri(iri),
            symbol: Some(BindingValue::literal(symbol)),
            qlabels: None,
            conversion_multiplier_sn: conversion_factor.map(|f| BindingValue::literal(&f.to_string())),
            description: None,
            plain_text_description: None,
            ucum_codes: None,
            dbpedia_match: None,
            si_exact_match: None,
        }
    }

    pub fn iri(&self) -> &str {
        &self.applicable_unit.value
    }

    pub fn symbol(&self) -> Option<&str> {
        value_of(&self.symbol)
    }

    pub fn labels(&self) -> Option<&str> {
        value_of(&self.qlabels)
    }

    /// Raw conversion multiplier text, if any
    pub fn conversion_multiplier(&self) -> Option<&str> {
        value_of(&self.conversion_multiplier_sn)
    }

    /// Plain-text description replaces the formatted one
    pub fn description(&self) -> Option<String> {
        value_of(&self.plain_text_description)
            .or_else(|| value_of(&self.description))
            .map(str::to_string)
    }

    pub fn ucum_codes(&self) -> Vec<String> {
        value_of(&self.ucum_codes).map(split_codes).unwrap_or_default()
    }

    /// `[iri, dbpedia?, siExact?]`
    pub fn ontology_matches(&self) -> Vec<String> {
        let mut matches = vec![self.iri().to_string()];
        matches.extend(
            [value_of(&self.dbpedia_match), value_of(&self.si_exact_match)]
                .into_iter()
                .flatten()
                .map(str::to_string),
        );
        matches
    }
}

// ============================================================================
// UNIT INDEX
// ============================================================================

/// Direct lookup of unit records by identifier, built once per pass
#[derive(Debug, Clone, Default)]
pub struct UnitIndex {
    records: IndexMap<String, UnitRecord>,
}

impl UnitIndex {
    /// First record per identifier wins
    pub fn new(records: &[UnitRecord]) -> Self {
        let mut index = IndexMap::with_capacity(records.len());
        for record in records {
            index
                .entry(record.iri().to_string())
                .or_insert_with(|| record.clone());
        }
        UnitIndex { records: index }
    }

    pub fn get(&self, iri: &str) -> Option<&UnitRecord> {
        self.records.get(iri)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// STRING FORMATS
// ============================================================================

/// Parse `"Metre@en, Meter@en-US, Meter@"` into lang -> text
///
/// Parts without '@' default to English. A repeated language keeps the
/// last text at the position of its first occurrence.
pub fn parse_labels(labels: &str) -> IndexMap<String, String> {
    let mut parsed = IndexMap::new();
    for part in labels.split(", ") {
        if part.is_empty() {
            continue;
        }
        let (text, lang) = match part.rsplit_once('@') {
            Some((text, lang)) => (text, lang),
            None => (part, "en"),
        };
        parsed.insert(lang.to_string(), text.to_string());
    }
    parsed
}

/// First value of a `" #,# "`-separated multi-value, trimmed
pub fn first_multi_value(value: &str) -> String {
    value.split(" #,# ").next().unwrap_or("").trim().to_string()
}

/// Split a comma-separated code list, trimming whitespace
pub fn split_codes(codes: &str) -> Vec<String> {
    codes
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// LOADERS (file collaborators)
// ============================================================================

/// Load a prefix list (JSON array)
pub fn load_prefixes<P: AsRef<Path>>(path: P) -> Result<Vec<PrefixName>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read prefix file: {:?}", path.as_ref()))?;
    serde_json::from_str(&content).context("Failed to parse prefix JSON")
}

/// Load a quantity-kind query result
pub fn load_quantity_kinds<P: AsRef<Path>>(path: P) -> Result<Vec<QuantityKindRecord>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read quantity-kind file: {:?}", path.as_ref()))?;
    let result: QueryResult<QuantityKindRecord> =
        serde_json::from_str(&content).context("Failed to parse quantity-kind query result")?;
    Ok(result.into_bindings())
}

/// Load a unit query result
pub fn load_units<P: AsRef<Path>>(path: P) -> Result<Vec<UnitRecord>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read unit file: {:?}", path.as_ref()))?;
    let result: QueryResult<UnitRecord> =
        serde_json::from_str(&content).context("Failed to parse unit query result")?;
    Ok(result.into_bindings())
}

// ============================================================================
// TESTS
// ============================================================================
