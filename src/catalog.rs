// 📚 Unit Catalog - Unit entities built from the settled unit buckets
//
// One QuantityUnit per hierarchy key, one ComposedUnit per compound key,
// each carrying its prefixed variants. Units without a record are skipped
// and logged; nothing here aborts the pass.

use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

use crate::ambiguity::CompoundUnits;
use crate::data_quality::{GapKind, QualityLog};
use crate::entities::{ComposedUnit, Description, LangString, PrefixUnit, QuantityUnit, UnitEnumerationElement, UnitPrefix};
use crate::hierarchy::UnitHierarchy;
use crate::identity::{item_title, stable_id, StableId, NO_PREFIX};
use crate::overrides::HierarchyOverrides;
use crate::parser::{UnitIndex, UnitRecord};
use crate::prefixes::{path_tail, PrefixIndex};

// ============================================================================
// CATALOG UNIT (read view)
// ============================================================================

/// Uniform view of a base, composed or prefixed unit
#[derive(Debug, Clone, Copy)]
pub struct CatalogUnit<'a> {
    pub uuid: StableId,
    pub iri: &'a str,
    pub name: &'a str,
    pub symbol: &'a str,
    pub conversion_factor_from_si: Option<f64>,

    /// Prefixed variants (empty for a prefixed unit itself)
    pub variants: &'a [PrefixUnit],

    /// Set for prefixed units: `Item:OSW<parent>#OSW<own>`
    sub_item: Option<&'a str>,
}

impl<'a> CatalogUnit<'a> {
    fn base(unit: &'a QuantityUnit) -> Self {
        CatalogUnit {
            uuid: unit.uuid,
            iri: &unit.iri,
            name: &unit.name,
            symbol: &unit.main_symbol,
            conversion_factor_from_si: unit.conversion_factor_from_si,
            variants: &unit.prefix_units,
            sub_item: None,
        }
    }

    fn prefixed(unit: &'a PrefixUnit) -> Self {
        CatalogUnit {
            uuid: unit.uuid,
            iri: &unit.iri,
            name: &unit.name,
            symbol: &unit.main_symbol,
            conversion_factor_from_si: unit.conversion_factor_from_si,
            variants: &[],
            sub_item: Some(unit.osw_id.as_str()),
        }
    }

    /// Page title the unit is referenced by
    pub fn osw_id(&self) -> String {
        match self.sub_item {
            Some(title) => title.to_string(),
            None => item_title(&self.uuid),
        }
    }

    pub fn enumeration_element(&self) -> UnitEnumerationElement {
        UnitEnumerationElement {
            osw_id: self.osw_id(),
            name: self.name.to_string(),
            symbol: self.symbol.to_string(),
        }
    }
}

// ============================================================================
// UNIT CATALOG
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum UnitLocation {
    Base,
    Composed,
    Variant { parent: String, composed: bool },
}

#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    pub prefixes: Vec<UnitPrefix>,
    pub units: IndexMap<String, QuantityUnit>,
    pub composed: IndexMap<String, ComposedUnit>,

    /// unit IRI -> where its entity lives; first placement wins
    locations: HashMap<String, UnitLocation>,
}

impl UnitCatalog {
    fn insert_unit(&mut self, unit: QuantityUnit) {
        self.locate(&unit, false);
        self.units.insert(unit.iri.clone(), unit);
    }

    fn insert_composed(&mut self, composed: ComposedUnit) {
        self.locate(&composed.unit, true);
        self.composed.insert(composed.unit.iri.clone(), composed);
    }

    fn locate(&mut self, unit: &QuantityUnit, composed: bool) {
        let location = if composed { UnitLocation::Composed } else { UnitLocation::Base };
        self.locations.entry(unit.iri.clone()).or_insert(location);
        for variant in &unit.prefix_units {
            self.locations
                .entry(variant.iri.clone())
                .or_insert_with(|| UnitLocation::Variant {
                    parent: unit.iri.clone(),
                    composed,
                });
        }
    }

    /// Any unit entity of the catalog by IRI
    pub fn unit(&self, iri: &str) -> Option<CatalogUnit<'_>> {
        match self.locations.get(iri)? {
            UnitLocation::Base => self.units.get(iri).map(CatalogUnit::base),
            UnitLocation::Composed => self.composed.get(iri).map(|c| CatalogUnit::base(&c.unit)),
            UnitLocation::Variant { parent, composed } => {
                let parent = if *composed {
                    self.composed.get(parent).map(|c| &c.unit)
                } else {
                    self.units.get(parent)
                }?;
                parent.variant(iri).map(CatalogUnit::prefixed)
            }
        }
    }

    pub fn contains(&self, iri: &str) -> bool {
        self.locations.contains_key(iri)
    }

    /// Prefixed variants over base and composed units
    pub fn prefix_unit_count(&self) -> usize {
        self.units.values().map(|u| u.prefix_units.len()).sum::<usize>()
            + self.composed.values().map(|c| c.unit.prefix_units.len()).sum::<usize>()
    }

    pub fn undeterminable_count(&self) -> usize {
        self.composed.values().filter(|c| c.undeterminable).count()
    }
}

// ============================================================================
// CATALOG BUILDER
// ============================================================================

pub struct UnitCatalogBuilder<'a> {
    prefixes: &'a PrefixIndex,
    records: &'a UnitIndex,
    overrides: &'a HierarchyOverrides,
}

impl<'a> UnitCatalogBuilder<'a> {
    pub fn new(prefixes: &'a PrefixIndex, records: &'a UnitIndex, overrides: &'a HierarchyOverrides) -> Self {
        UnitCatalogBuilder {
            prefixes,
            records,
            overrides,
        }
    }

    pub fn build(&self, hierarchy: &UnitHierarchy, compound: &CompoundUnits, log: &mut QualityLog) -> UnitCatalog {
        let mut catalog = UnitCatalog {
            prefixes: self.prefixes.prefixes().iter().map(UnitPrefix::new).collect(),
            ..UnitCatalog::default()
        };

        for (base, variants) in hierarchy {
            let mut unit = match self.quantity_unit(base, log) {
                Some(unit) => unit,
                None => continue,
            };
            unit.prefix_units = self.prefix_units(&unit.uuid, variants, log);
            catalog.insert_unit(unit);
        }

        for (key, members) in &compound.associations {
            let mut unit = match self.quantity_unit(key, log) {
                Some(unit) => unit,
                None => continue,
            };
            unit.prefix_units = self.prefix_units(&unit.uuid, members, log);
            catalog.insert_composed(ComposedUnit {
                unit,
                undeterminable: members.is_empty(),
            });
        }

        debug!(
            prefixes = catalog.prefixes.len(),
            units = catalog.units.len(),
            composed_units = catalog.composed.len(),
            prefix_units = catalog.prefix_unit_count(),
            "Built unit catalog"
        );

        catalog
    }

    fn record(&self, iri: &str, log: &mut QualityLog) -> Option<&'a UnitRecord> {
        let record = self.records.get(iri);
        if record.is_none() {
            log.record(GapKind::UnresolvedUnit, iri, "No unit record found; unit skipped");
        }
        record
    }

    /// Base or composed unit entity of `iri`, without variants
    pub fn quantity_unit(&self, iri: &str, log: &mut QualityLog) -> Option<QuantityUnit> {
        let record = self.record(iri, log)?;

        let mut unit = QuantityUnit::new(iri, main_symbol(record, log));
        unit.label = record.labels().map(LangString::from_unit_tagged).unwrap_or_default();
        unit.description = record.description().map(|text| Description::en(&text));
        unit.conversion_factor_from_si = conversion_factor(record, log);
        unit.ucum_codes = match self.overrides.ucum_code_correction(iri) {
            Some(code) => vec![code.to_string()],
            None => record.ucum_codes(),
        };
        unit.exact_ontology_match = record.ontology_matches();

        Some(unit)
    }

    fn prefix_units<'u, I>(&self, parent: &StableId, variants: I, log: &mut QualityLog) -> Vec<PrefixUnit>
    where
        I: IntoIterator<Item = &'u String>,
    {
        variants
            .into_iter()
            .filter_map(|iri| self.prefix_unit(parent, iri, log))
            .collect()
    }

    pub fn prefix_unit(&self, parent: &StableId, iri: &str, log: &mut QualityLog) -> Option<PrefixUnit> {
        let record = self.record(iri, log)?;

        let mut unit = PrefixUnit::new(parent, iri, main_symbol(record, log));
        unit.prefix = match self.prefixes.first_prefix(iri) {
            Some(prefix) => Some(item_title(&stable_id(NO_PREFIX, &prefix.pid))),
            None => {
                log.record(GapKind::UnknownPrefix, iri, "No known prefix in unit identifier");
                None
            }
        };
        unit.conversion_factor_from_si = conversion_factor(record, log);
        unit.exact_ontology_match = record.ontology_matches();

        Some(unit)
    }
}

/// Record symbol, or the path tail when the record has none
fn main_symbol(record: &UnitRecord, log: &mut QualityLog) -> String {
    match record.symbol() {
        Some(symbol) if !symbol.is_empty() => symbol.to_string(),
        _ => {
            let tail = path_tail(record.iri());
            log.record(
                GapKind::MissingSymbol,
                record.iri(),
                format!("No symbol; using '{}'", tail),
            );
            tail.to_string()
        }
    }
}

/// Parsed SI conversion multiplier; unparsable or non-finite text counts
/// as absent
pub fn conversion_factor(record: &UnitRecord, log: &mut QualityLog) -> Option<f64> {
    let text = record.conversion_multiplier()?;
    match text.trim().parse::<f64>() {
        Ok(factor) if factor.is_finite() => Some(factor),
        _ => {
            log.record(
                GapKind::UnparsableConversionFactor,
                record.iri(),
                format!("Conversion factor '{}' is not a number", text),
            );
            None
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::BindingValue;
    use crate::prefixes::PrefixName;

    fn prefixes() -> PrefixIndex {
        PrefixIndex::new(vec![
            PrefixName::new("kilo", "k", 1000.0, "si:kilo"),
            PrefixName::new("milli", "m", 0.001, "si:milli"),
        ])
        .unwrap()
    }

    fn hierarchy() -> UnitHierarchy {
        let mut hierarchy = UnitHierarchy::new();
        hierarchy.insert(
            "unit/M".to_string(),
            vec!["unit/KiloM".to_string(), "unit/MilliM".to_string()],
        );
        hierarchy
    }

    #[test]
    fn test_build_base_units_with_variants() {
        let prefixes = prefixes();
        let records = UnitIndex::new(&[
            UnitRecord::new("unit/M", "m", Some(1.0)),
            UnitRecord::new("unit/KiloM", "km", Some(1000.0)),
            UnitRecord::new("unit/MilliM", "mm", Some(0.001)),
        ]);
        let overrides = HierarchyOverrides::empty();
        let mut log = QualityLog::new();

        let catalog = UnitCatalogBuilder::new(&prefixes, &records, &overrides).build(
            &hierarchy(),
            &CompoundUnits::default(),
            &mut log,
        );

        assert!(log.is_empty());
        assert_eq!(catalog.units.len(), 1);
        assert_eq!(catalog.prefixes.len(), 2);
        assert_eq!(catalog.prefix_unit_count(), 2);

        let meter = &catalog.units["unit/M"];
        assert_eq!(meter.uuid, stable_id("", "unit/M"));
        assert_eq!(meter.prefix_units[0].prefix, Some(item_title(&stable_id("", "si:kilo"))));

        let kilometer = catalog.unit("unit/KiloM").unwrap();
        assert_eq!(kilometer.conversion_factor_from_si, Some(1000.0));
        assert_eq!(kilometer.osw_id(), meter.prefix_units[0].osw_id);
        assert!(kilometer.variants.is_empty());
        assert_eq!(catalog.unit("unit/M").unwrap().variants.len(), 2);
    }

    #[test]
    fn test_missing_record_is_skipped_and_logged() {
        let prefixes = prefixes();
        let records = UnitIndex::new(&[UnitRecord::new("unit/M", "m", Some(1.0))]);
        let overrides = HierarchyOverrides::empty();
        let mut log = QualityLog::new();

        let catalog = UnitCatalogBuilder::new(&prefixes, &records, &overrides).build(
            &hierarchy(),
            &CompoundUnits::default(),
            &mut log,
        );

        assert!(catalog.units["unit/M"].prefix_units.is_empty());
        assert!(!catalog.contains("unit/KiloM"));
        assert_eq!(log.count_of(GapKind::UnresolvedUnit), 2);
    }

    #[test]
    fn test_symbol_and_factor_fallbacks() {
        let prefixes = prefixes();
        let mut record = UnitRecord::new("unit/PH", "", None);
        record.conversion_multiplier_sn = Some(BindingValue::literal("n/a"));
        let records = UnitIndex::new(&[record]);
        let overrides = HierarchyOverrides::default();
        let mut log = QualityLog::new();

        let unit = UnitCatalogBuilder::new(&prefixes, &records, &overrides)
            .quantity_unit("unit/PH", &mut log)
            .unwrap();

        assert_eq!(unit.main_symbol, "PH");
        assert_eq!(unit.conversion_factor_from_si, None);
        assert_eq!(log.count_of(GapKind::MissingSymbol), 1);
        assert_eq!(log.count_of(GapKind::UnparsableConversionFactor), 1);
    }

    #[test]
    fn test_non_finite_factor_counts_as_absent() {
        let prefixes = prefixes();
        let records: Vec<UnitRecord> = ["NaN", "inf", "-infinity"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut record = UnitRecord::new(&format!("unit/X{}", i), "x", None);
                record.conversion_multiplier_sn = Some(BindingValue::literal(text));
                record
            })
            .collect();
        let records = UnitIndex::new(&records);
        let overrides = HierarchyOverrides::empty();
        let builder = UnitCatalogBuilder::new(&prefixes, &records, &overrides);
        let mut log = QualityLog::new();

        for i in 0..3 {
            let unit = builder.quantity_unit(&format!("unit/X{}", i), &mut log).unwrap();
            assert_eq!(unit.conversion_factor_from_si, None);
        }
        assert_eq!(log.count_of(GapKind::UnparsableConversionFactor), 3);
    }

    #[test]
    fn test_unit_labels_keep_regional_tags() {
        let prefixes = prefixes();
        let mut record = UnitRecord::new("unit/M", "m", Some(1.0));
        record.qlabels = Some(BindingValue::literal("Meter@en-US, metre@"));
        let records = UnitIndex::new(&[record]);
        let overrides = HierarchyOverrides::empty();
        let mut log = QualityLog::new();

        let unit = UnitCatalogBuilder::new(&prefixes, &records, &overrides)
            .quantity_unit("unit/M", &mut log)
            .unwrap();

        assert_eq!(
            unit.label,
            vec![LangString::en("metre"), LangString::new("Meter", "en-US")]
        );
    }

    #[test]
    fn test_ucum_code_correction() {
        let prefixes = prefixes();
        let mut record = UnitRecord::new("http://qudt.org/vocab/unit/PH", "pH", None);
        record.ucum_codes = Some(BindingValue::literal("pH"));
        let records = UnitIndex::new(&[record]);
        let overrides = HierarchyOverrides::default();
        let mut log = QualityLog::new();

        let unit = UnitCatalogBuilder::new(&prefixes, &records, &overrides)
            .quantity_unit("http://qudt.org/vocab/unit/PH", &mut log)
            .unwrap();

        assert_eq!(unit.ucum_codes, vec!["[pH]".to_string()]);
    }

    #[test]
    fn test_composed_units() {
        let prefixes = prefixes();
        let records = UnitIndex::new(&[
            UnitRecord::new("unit/MilliA", "mA", Some(0.001)),
            UnitRecord::new("unit/MilliA-PER-KiloM", "mA/km", Some(0.000001)),
            UnitRecord::new("unit/KiloZ", "kZ", None),
        ]);
        let overrides = HierarchyOverrides::empty();
        let mut log = QualityLog::new();
        let compound = CompoundUnits::merge(vec![
            ("unit/MilliA".to_string(), Some(vec!["unit/MilliA-PER-KiloM".to_string()])),
            ("unit/KiloZ".to_string(), None),
        ]);

        let catalog = UnitCatalogBuilder::new(&prefixes, &records, &overrides).build(
            &UnitHierarchy::new(),
            &compound,
            &mut log,
        );

        assert_eq!(catalog.composed.len(), 2);
        assert_eq!(catalog.undeterminable_count(), 1);
        assert!(!catalog.composed["unit/MilliA"].undeterminable);
        assert_eq!(
            catalog.unit("unit/MilliA-PER-KiloM").map(|u| u.symbol),
            Some("mA/km")
        );
        assert_eq!(catalog.composed.keys().collect::<Vec<_>>(), vec!["unit/MilliA", "unit/KiloZ"]);
    }
}
