// 📋 Hierarchy Overrides - Named corrections as data
// Finite, named exceptions for known defects of the source ontology:
// forced fundamental/derived quantity kinds, label collisions and UCUM codes

use anyhow::{Context as AnyhowContext, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const QUANTITY_KIND: &str = "http://qudt.org/vocab/quantitykind/";
const UNIT: &str = "http://qudt.org/vocab/unit/";

/// Quantity kinds whose `broader` relation is semantically wrong
const FUNDAMENTAL: &[&str] = &["Frequency", "Radiance", "SpecificImpulseByWeight"];

/// Labels that would otherwise collide with another record's label
const LABEL_CORRECTIONS: &[(&str, &str)] = &[
    ("VaporPermeance", "VaporPermeance"),
    ("ConductivityVariance_NEON", "NEON Conductivity Variance"),
    ("TemperatureVariance_NEON", "NEON Temperature Variance"),
    ("EvaporativeHeatTransferCoefficient", "Evaporative Heat Transfer Coefficient"),
];

/// Units whose published UCUM code is missing or wrong
const UCUM_CODE_CORRECTIONS: &[(&str, &str)] = &[
    ("VA-HR", "V.A.h"),
    ("GM-PER-DEG_C", "d.Cel-1"),
    ("DEG_C-PER-M", "Cel.m-1"),
    ("DEG_F-PER-K", "[degF].K-1"),
    ("J-PER-GM-DEG_C", "J.g-1.Cel-1"),
    ("PPT", "[ppt]"),
    ("FRACTION", "{fraction}"),
    ("M2-PER-SEC2-K", "m2.s2-1.K-1"),
    ("PH", "[pH]"),
    ("GM-PER-M2-HR", "g.m-2.hr-1"),
    ("DEG_C-PER-K", "Cel.K-1"),
    ("DEG_C-PER-MIN", "Cel.min-1"),
    ("DEG_C-WK", "Cel.wk"),
    ("NUM", "1"),
    ("A-PER-DEG_C", "A.Cel-1"),
    ("DEG_C-PER-YR", "Cel.a-1"),
    ("VA", "V.A"),
    ("K-PER-SEC2", "K/s^2"),
    ("TONNE-PER-HA-YR", "t.har-1.year-1"),
    ("DEG_C-PER-SEC", "Cel.s-1"),
    ("DEG_C-PER-HR", "Cel.h-1"),
    ("MOL-DEG_C", "mol.Cel"),
    ("PPQ", "[ppq]"),
    ("PER-KiloVA-HR", "kV.A-1.h-1"),
    ("CentiM-SEC-DEG_C", "cm.s.Cel-1"),
    ("MicroGM-PER-GM-HR", "ug.g-1.hr-1"),
    ("CentiM2-PER-V-SEC", "cm2.V.s-1"),
];

// ============================================================================
// HIERARCHY OVERRIDES
// ============================================================================

/// Override tables handed to the quantity hierarchy and unit catalog
///
/// `default()` carries the built-in corrections for QUDT; absent keys in an
/// overrides file are empty tables, not built-ins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyOverrides {
    /// Quantity-kind URIs classified Fundamental regardless of `broader`
    #[serde(default)]
    pub fundamental: IndexSet<String>,

    /// Quantity-kind URIs classified Derived; each still needs a `broader`
    #[serde(default)]
    pub derived: IndexSet<String>,

    /// Quantity-kind URI -> replacement for its primary label
    #[serde(default)]
    pub label_corrections: IndexMap<String, String>,

    /// Unit URI -> replacement UCUM code
    #[serde(default)]
    pub ucum_code_corrections: IndexMap<String, String>,
}

impl HierarchyOverrides {
    /// No corrections at all
    pub fn empty() -> Self {
        HierarchyOverrides {
            fundamental: IndexSet::new(),
            derived: IndexSet::new(),
            label_corrections: IndexMap::new(),
            ucum_code_corrections: IndexMap::new(),
        }
    }

    /// Load override tables from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read overrides file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse overrides JSON")
    }

    pub fn is_forced_fundamental(&self, quantity: &str) -> bool {
        self.fundamental.contains(quantity)
    }

    pub fn is_forced_derived(&self, quantity: &str) -> bool {
        self.derived.contains(quantity)
    }

    pub fn label_correction(&self, quantity: &str) -> Option<&str> {
        self.label_corrections.get(quantity).map(String::as_str)
    }

    pub fn ucum_code_correction(&self, unit: &str) -> Option<&str> {
        self.ucum_code_corrections.get(unit).map(String::as_str)
    }

    /// Total number of entries over all tables
    pub fn len(&self) -> usize {
        self.fundamental.len()
            + self.derived.len()
            + self.label_corrections.len()
            + self.ucum_code_corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HierarchyOverrides {
    fn default() -> Self {
        HierarchyOverrides {
            fundamental: FUNDAMENTAL
                .iter()
                .map(|name| format!("{}{}", QUANTITY_KIND, name))
                .collect(),
            derived: IndexSet::new(),
            label_corrections: LABEL_CORRECTIONS
                .iter()
                .map(|(name, label)| (format!("{}{}", QUANTITY_KIND, name), label.to_string()))
                .collect(),
            ucum_code_corrections: UCUM_CODE_CORRECTIONS
                .iter()
                .map(|(name, code)| (format!("{}{}", UNIT, name), code.to_string()))
                .collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let overrides = HierarchyOverrides::default();

        assert!(overrides.is_forced_fundamental("http://qudt.org/vocab/quantitykind/Frequency"));
        assert!(!overrides.is_forced_fundamental("http://qudt.org/vocab/quantitykind/Length"));
        assert!(overrides.derived.is_empty());
        assert_eq!(
            overrides.label_correction("http://qudt.org/vocab/quantitykind/TemperatureVariance_NEON"),
            Some("NEON Temperature Variance")
        );
        assert_eq!(overrides.ucum_code_correction("http://qudt.org/vocab/unit/PH"), Some("[pH]"));
        assert_eq!(overrides.ucum_code_corrections.len(), 27);
    }

    #[test]
    fn test_empty_tables() {
        let overrides = HierarchyOverrides::empty();
        assert!(overrides.is_empty());
        assert!(!overrides.is_forced_fundamental("http://qudt.org/vocab/quantitykind/Frequency"));
    }

    #[test]
    fn test_from_file_missing_keys_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        fs::write(
            &path,
            r#"{"derived": ["qk/Speed"], "label_corrections": {"qk/Speed": "Velocity"}}"#,
        )
        .unwrap();

        let overrides = HierarchyOverrides::from_file(&path).unwrap();

        assert!(overrides.is_forced_derived("qk/Speed"));
        assert_eq!(overrides.label_correction("qk/Speed"), Some("Velocity"));
        assert!(overrides.fundamental.is_empty());
        assert!(overrides.ucum_code_corrections.is_empty());
        assert_eq!(overrides.len(), 2);
    }

    #[test]
    fn test_from_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        fs::write(&path, "{not json").unwrap();

        let err = HierarchyOverrides::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse overrides JSON"));
    }
}
