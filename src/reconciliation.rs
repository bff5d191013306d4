// ⚖️ Reconciliation Engine - One full pass from source records to taxonomy
//
// Pipeline:
//   prefixes -> classify units -> unit hierarchy -> compound units (settled)
//            -> unit catalog -> quantity hierarchy -> quantity properties
//
// A pass either returns a complete taxonomy or aborts with a fatal error;
// lookup gaps are collected in the report instead.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::ambiguity::{verify_totality, AmbiguousUnitResolver, CompoundUnits};
use crate::catalog::UnitCatalogBuilder;
use crate::classifier::UnitClassifier;
use crate::data_quality::{QualityIssue, QualityLog};
use crate::entities::{Characteristic, CharacteristicKind, ComposedUnit, QuantityKind, QuantityProperty, QuantityUnit, UnitPrefix};
use crate::error::{Result, TaxonomyError};
use crate::hierarchy::{UnitHierarchy, UnitHierarchyBuilder};
use crate::overrides::HierarchyOverrides;
use crate::parser::{QuantityKindRecord, UnitIndex, UnitRecord};
use crate::prefixes::{PrefixIndex, PrefixName};
use crate::properties::QuantityPropertySynthesizer;
use crate::quantities::QuantityHierarchyBuilder;

// ============================================================================
// TAXONOMY
// ============================================================================

/// Entity graph of one pass, ready for serialization by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub prefixes: Vec<UnitPrefix>,
    pub units: Vec<QuantityUnit>,
    pub composed_units: Vec<ComposedUnit>,
    pub quantity_kinds: Vec<QuantityKind>,
    pub characteristics: Vec<Characteristic>,

    /// Property title -> property
    pub properties: IndexMap<String, QuantityProperty>,

    /// base unit -> prefixed variants
    pub unit_hierarchy: UnitHierarchy,

    /// compound key -> associated units (empty = undeterminable)
    pub compound_units: CompoundUnits,
}

impl Taxonomy {
    pub fn prefix_unit_count(&self) -> usize {
        self.units.iter().map(|u| u.prefix_units.len()).sum::<usize>()
            + self.composed_units.iter().map(|c| c.unit.prefix_units.len()).sum::<usize>()
    }

    /// SHA-256 over every stable id and enumeration order
    ///
    /// Two passes over identical input have identical fingerprints.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        for prefix in &self.prefixes {
            hasher.update(prefix.uuid.as_bytes());
        }
        for unit in self.units.iter().chain(self.composed_units.iter().map(|c| &c.unit)) {
            hasher.update(unit.uuid.as_bytes());
            for variant in &unit.prefix_units {
                hasher.update(variant.osw_id.as_bytes());
            }
        }
        for quantity in &self.quantity_kinds {
            hasher.update(quantity.uuid.as_bytes());
            for unit in &quantity.units {
                hasher.update(unit.as_bytes());
            }
        }
        for characteristic in &self.characteristics {
            hasher.update(characteristic.uuid.as_bytes());
            match &characteristic.kind {
                CharacteristicKind::Fundamental {
                    quantity,
                    unit_enumeration,
                    ..
                } => {
                    hasher.update(quantity.as_bytes());
                    for element in unit_enumeration {
                        hasher.update(element.osw_id.as_bytes());
                    }
                }
                CharacteristicKind::Derived { subclass_of, .. } => hasher.update(subclass_of.as_bytes()),
            }
        }
        for property in self.properties.values() {
            hasher.update(property.uuid().as_bytes());
            if let Some(main) = property.as_main() {
                if let Some(unit) = &main.main_unit {
                    hasher.update(unit.uuid.as_bytes());
                }
                for unit in &main.additional_units {
                    hasher.update(unit.uuid.as_bytes());
                    hasher.update(unit.conversion_factor_to_main_unit.to_be_bytes());
                }
            }
        }

        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub prefix_count: usize,
    pub unit_count: usize,
    pub prefix_unit_count: usize,
    pub composed_unit_count: usize,
    pub undeterminable_unit_count: usize,
    pub quantity_kind_count: usize,
    pub fundamental_count: usize,
    pub derived_count: usize,
    pub property_count: usize,

    /// Recoverable lookup gaps, in the order they were hit
    pub issues: Vec<QualityIssue>,

    /// Distinct entities a fallback policy was applied to
    pub fallback_entity_count: usize,

    pub fingerprint: String,
}

impl ReconciliationReport {
    pub fn has_gaps(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Reconciled {} units ({} prefixed, {} composed, {} undeterminable), {} quantity kinds, \
             {} characteristics ({} fundamental, {} derived), {} properties; \
             fallback applied to {} entities",
            self.unit_count,
            self.prefix_unit_count,
            self.composed_unit_count,
            self.undeterminable_unit_count,
            self.quantity_kind_count,
            self.fundamental_count + self.derived_count,
            self.fundamental_count,
            self.derived_count,
            self.property_count,
            self.fallback_entity_count
        )
    }
}

/// Result of a successful pass
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub taxonomy: Taxonomy,
    pub report: ReconciliationReport,
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    overrides: HierarchyOverrides,
}

impl ReconciliationEngine {
    /// Engine with the built-in override tables
    pub fn new() -> Self {
        ReconciliationEngine {
            overrides: HierarchyOverrides::default(),
        }
    }

    pub fn with_overrides(overrides: HierarchyOverrides) -> Self {
        ReconciliationEngine { overrides }
    }

    pub fn overrides(&self) -> &HierarchyOverrides {
        &self.overrides
    }

    /// Run one reconciliation pass
    ///
    /// Example:
    /// ```
    /// use unit_taxonomy::{PrefixName, QuantityKindRecord, ReconciliationEngine, UnitRecord};
    ///
    /// let engine = ReconciliationEngine::new();
    /// let prefixes = vec![PrefixName::new("kilo", "k", 1000.0, "si:kilo")];
    /// let quantity_kinds = vec![QuantityKindRecord::new("qk/Length", "length@en", "unit/M, unit/KiloM")];
    /// let units = vec![
    ///     UnitRecord::new("unit/M", "m", Some(1.0)),
    ///     UnitRecord::new("unit/KiloM", "km", Some(1000.0)),
    /// ];
    ///
    /// let reconciliation = engine.reconcile(prefixes, &quantity_kinds, &units).unwrap();
    /// assert_eq!(reconciliation.report.unit_count, 1);
    /// assert_eq!(reconciliation.report.prefix_unit_count, 1);
    /// ```
    pub fn reconcile(
        &self,
        prefixes: Vec<PrefixName>,
        quantity_kinds: &[QuantityKindRecord],
        units: &[UnitRecord],
    ) -> Result<Reconciliation> {
        if quantity_kinds.is_empty() {
            return Err(TaxonomyError::configuration("quantity-kind data is empty"));
        }
        if units.is_empty() {
            return Err(TaxonomyError::configuration("unit data is empty"));
        }
        let prefixes = PrefixIndex::new(prefixes)?;

        // 1. Units: classify, build hierarchy, settle compound units
        let classifier = UnitClassifier::new(&prefixes);
        let all = classifier.classify_all(quantity_kinds);
        debug!(
            non_prefixed = all.non_prefixed.len(),
            prefixed = all.prefixed.len(),
            "Classified applicable units"
        );

        let unit_hierarchy = UnitHierarchyBuilder::new(&prefixes).build(&all.non_prefixed, &all.prefixed);
        let resolver = AmbiguousUnitResolver::new(&prefixes, &all.non_prefixed);
        let compound_units = resolver.resolve(&classifier, quantity_kinds, &unit_hierarchy, &all.prefixed);
        verify_totality(&all.prefixed, &unit_hierarchy, &compound_units)?;

        let mut log = QualityLog::new();
        let records = UnitIndex::new(units);
        let catalog = UnitCatalogBuilder::new(&prefixes, &records, &self.overrides).build(
            &unit_hierarchy,
            &compound_units,
            &mut log,
        );

        // 2. Quantity kinds and characteristics
        let mut quantities =
            QuantityHierarchyBuilder::new(&classifier, &resolver, &compound_units, &self.overrides)
                .build(quantity_kinds)?;

        // 3. Properties
        let properties = QuantityPropertySynthesizer::new(&catalog).synthesize(&mut quantities, &mut log)?;

        let fundamental_count = quantities.fundamental_count();
        let derived_count = quantities.derived_count();
        let undeterminable_unit_count = catalog.undeterminable_count();

        let taxonomy = Taxonomy {
            prefixes: catalog.prefixes,
            units: catalog.units.into_values().collect(),
            composed_units: catalog.composed.into_values().collect(),
            quantity_kinds: quantities.quantity_kinds.into_values().collect(),
            characteristics: quantities.characteristics.into_values().collect(),
            properties,
            unit_hierarchy,
            compound_units,
        };

        let report = ReconciliationReport {
            prefix_count: taxonomy.prefixes.len(),
            unit_count: taxonomy.units.len(),
            prefix_unit_count: taxonomy.prefix_unit_count(),
            composed_unit_count: taxonomy.composed_units.len(),
            undeterminable_unit_count,
            quantity_kind_count: taxonomy.quantity_kinds.len(),
            fundamental_count,
            derived_count,
            property_count: taxonomy.properties.len(),
            fallback_entity_count: log.fallback_entity_count(),
            issues: log.issues().to_vec(),
            fingerprint: taxonomy.fingerprint(),
        };

        debug!(
            issues = report.issues.len(),
            fallback_entities = report.fallback_entity_count,
            "{}",
            log.summary()
        );
        info!("{}", report.summary());

        Ok(Reconciliation { taxonomy, report })
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_quality::GapKind;
    use crate::identity::stable_id;

    const QK: &str = "http://qudt.org/vocab/quantitykind/";
    const UNIT: &str = "http://qudt.org/vocab/unit/";

    fn qk(name: &str) -> String {
        format!("{}{}", QK, name)
    }

    fn unit(name: &str) -> String {
        format!("{}{}", UNIT, name)
    }

    fn units_of(names: &[&str]) -> String {
        names.iter().map(|n| unit(n)).collect::<Vec<_>>().join(", ")
    }

    fn prefixes() -> Vec<PrefixName> {
        vec![
            PrefixName::new("kilo", "k", 1000.0, "https://si-digital-framework.org/SI/prefixes/kilo"),
            PrefixName::new("centi", "c", 0.01, "https://si-digital-framework.org/SI/prefixes/centi"),
            PrefixName::new("milli", "m", 0.001, "https://si-digital-framework.org/SI/prefixes/milli"),
            PrefixName::new("micro", "μ", 0.000001, "https://si-digital-framework.org/SI/prefixes/micro"),
        ]
    }

    fn quantity_kinds() -> Vec<QuantityKindRecord> {
        vec![
            QuantityKindRecord::new(&qk("Length"), "length@en, Länge@de", &units_of(&["M", "KiloM", "CentiM", "FT"])),
            QuantityKindRecord::new(&qk("Width"), "width@en", &units_of(&["M"])).with_broader(&qk("Length")),
            QuantityKindRecord::new(&qk("Speed"), "speed@en", &units_of(&["M-PER-SEC", "KiloM-PER-HR"])),
            QuantityKindRecord::new(&qk("FastSpeed"), "fast speed@en", &units_of(&["MilliM-PER-MicroSEC"])),
            QuantityKindRecord::new(&qk("Strange"), "strange@en", &units_of(&["MilliX", "MilliX-PER-MicroY"])),
        ]
    }

    fn units() -> Vec<UnitRecord> {
        vec![
            UnitRecord::new(&unit("M"), "m", Some(1.0)),
            UnitRecord::new(&unit("KiloM"), "km", Some(1000.0)),
            UnitRecord::new(&unit("CentiM"), "cm", Some(0.01)),
            UnitRecord::new(&unit("FT"), "ft", Some(0.3048)),
            UnitRecord::new(&unit("M-PER-SEC"), "m/s", Some(1.0)),
            UnitRecord::new(&unit("KiloM-PER-HR"), "km/h", Some(0.277778)),
            UnitRecord::new(&unit("MilliM-PER-MicroSEC"), "mm/μs", Some(1000.0)),
            UnitRecord::new(&unit("MilliX"), "mX", None),
            UnitRecord::new(&unit("MilliX-PER-MicroY"), "mX/μY", None),
        ]
    }

    #[test]
    fn test_full_pass() {
        let engine = ReconciliationEngine::with_overrides(HierarchyOverrides::empty());

        let Reconciliation { taxonomy, report } = engine.reconcile(prefixes(), &quantity_kinds(), &units()).unwrap();

        assert_eq!(report.prefix_count, 4);
        assert_eq!(report.fundamental_count, 4);
        assert_eq!(report.derived_count, 1);
        assert_eq!(report.quantity_kind_count, 4);
        assert_eq!(report.property_count, 5);

        // Base units: M, FT, M-PER-SEC
        assert_eq!(report.unit_count, 3);
        assert_eq!(taxonomy.unit_hierarchy[&unit("M")], vec![unit("KiloM"), unit("CentiM")]);

        // KiloM-PER-HR and MilliM-PER-MicroSEC cannot be reduced by a leading strip
        assert!(taxonomy.compound_units.contains_key(&unit("KiloM-PER-HR")));
        assert!(taxonomy.compound_units.associations[&unit("MilliX")].contains(&unit("MilliX-PER-MicroY")));

        // FastSpeed reaches M-PER-SEC by stripping all prefixes
        let fast = taxonomy.quantity_kinds.iter().find(|q| q.name == "FastSpeed").unwrap();
        assert_eq!(fast.units, vec![stable_id("", &unit("M-PER-SEC"))]);

        // Length: m is main, then ft, then the variants of m
        let length = taxonomy.properties["Property:HasLengthValue"].as_main().unwrap();
        assert_eq!(length.main_unit.as_ref().map(|m| m.symbol.as_str()), Some("m"));
        let symbols: Vec<&str> = length.additional_units.iter().map(|u| u.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ft", "km", "cm"]);

        let width = taxonomy.properties["Property:HasWidthValue"].as_sub().unwrap();
        assert_eq!(width.base_property, "Property:HasLengthValue");

        // MilliX has no factor 1.0 and no factor at all
        assert!(report.has_gaps());
        assert!(report.issues.iter().any(|i| i.kind == GapKind::NoUnitFactorUnit));
    }

    #[test]
    fn test_pass_is_deterministic() {
        let engine = ReconciliationEngine::new();

        let first = engine.reconcile(prefixes(), &quantity_kinds(), &units()).unwrap();
        let second = engine.reconcile(prefixes(), &quantity_kinds(), &units()).unwrap();

        assert_eq!(first.taxonomy, second.taxonomy);
        assert_eq!(first.report.fingerprint, second.report.fingerprint);
        assert_eq!(
            serde_json::to_string(&first.taxonomy).unwrap(),
            serde_json::to_string(&second.taxonomy).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_changes_with_input() {
        let engine = ReconciliationEngine::new();
        let mut fewer = quantity_kinds();
        fewer.pop();

        let full = engine.reconcile(prefixes(), &quantity_kinds(), &units()).unwrap();
        let partial = engine.reconcile(prefixes(), &fewer, &units()).unwrap();

        assert_ne!(full.report.fingerprint, partial.report.fingerprint);
        assert_eq!(full.report.fingerprint.len(), 64);
    }

    #[test]
    fn test_missing_inputs_are_configuration_errors() {
        let engine = ReconciliationEngine::new();

        let err = engine.reconcile(Vec::new(), &quantity_kinds(), &units()).unwrap_err();
        assert!(matches!(err, TaxonomyError::Configuration(_)));

        let err = engine.reconcile(prefixes(), &[], &units()).unwrap_err();
        assert!(matches!(err, TaxonomyError::Configuration(_)));

        let err = engine.reconcile(prefixes(), &quantity_kinds(), &[]).unwrap_err();
        assert!(!err.is_consistency_error());
    }

    #[test]
    fn test_report_summary() {
        let engine = ReconciliationEngine::new();
        let reconciliation = engine.reconcile(prefixes(), &quantity_kinds(), &units()).unwrap();

        let summary = reconciliation.report.summary();
        assert!(summary.starts_with("Reconciled 3 units"));
        assert!(summary.contains("1 derived"));
    }
}
