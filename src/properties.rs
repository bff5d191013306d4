// 🧮 Quantity Property Synthesizer - Main unit, additional units, sub-properties
//
// Fundamental characteristics:
//   units = resolved units, then their prefixed variants (one level)
//   main  = first unit with SI factor exactly 1.0 (else first, with a warning)
//   additional units in cyclic order from the main unit,
//   conversion to main = round(1 / factor_from_si, 6)
//
// Derived characteristics:
//   subproperty_of = parent's property, base_property = root fundamental's

use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use tracing::debug;

use crate::catalog::{CatalogUnit, UnitCatalog};
use crate::data_quality::{GapKind, QualityLog};
use crate::entities::property::property_title;
use crate::entities::{
    AdditionalUnit, Characteristic, CharacteristicKind, MainQuantityProperty, MainUnit, QuantityKind,
    QuantityProperty, SubQuantityProperty, UnitEnumerationElement,
};
use crate::error::{Result, TaxonomyError};
use crate::identity::{stable_id, StableId, SMW_UNIT};
use crate::quantities::QuantityHierarchy;

/// Property title -> property, in characteristic order
pub type PropertyMap = IndexMap<String, QuantityProperty>;

/// `round(1 / factor, 6)`
pub fn conversion_to_main(factor_from_si: f64) -> f64 {
    ((1.0 / factor_from_si) * 1e6).round() / 1e6
}

fn smw_unit_id(unit: &StableId) -> StableId {
    stable_id(SMW_UNIT, &unit.to_string())
}

pub struct QuantityPropertySynthesizer<'a> {
    catalog: &'a UnitCatalog,
}

impl<'a> QuantityPropertySynthesizer<'a> {
    pub fn new(catalog: &'a UnitCatalog) -> Self {
        QuantityPropertySynthesizer { catalog }
    }

    /// Resolved units, then the prefixed variants of each in the same order
    pub fn expand_units(&self, unit_iris: &[String]) -> Vec<String> {
        let mut expanded: IndexSet<String> = unit_iris.iter().cloned().collect();
        for iri in unit_iris {
            if let Some(unit) = self.catalog.unit(iri) {
                expanded.extend(unit.variants.iter().map(|v| v.iri.clone()));
            }
        }
        expanded.into_iter().collect()
    }

    /// Property map for every characteristic; fills in the unit enumeration,
    /// default unit and property title of each characteristic
    pub fn synthesize(&self, hierarchy: &mut QuantityHierarchy, log: &mut QualityLog) -> Result<PropertyMap> {
        let mut properties = PropertyMap::new();
        let mut enumerations = Vec::new();

        for characteristic in hierarchy.characteristics.values() {
            let property = match &characteristic.kind {
                CharacteristicKind::Fundamental { .. } => {
                    let quantity = hierarchy.quantity_kinds.get(&characteristic.iri).ok_or_else(|| {
                        TaxonomyError::DanglingReference {
                            characteristic: characteristic.name.clone(),
                            parent: characteristic.iri.clone(),
                        }
                    })?;
                    let (property, enumeration) = self.main_property(characteristic, quantity, log);
                    enumerations.push((characteristic.iri.clone(), enumeration));
                    QuantityProperty::Main(property)
                }
                CharacteristicKind::Derived { broader, .. } => {
                    QuantityProperty::Sub(sub_property(characteristic, broader, &hierarchy.characteristics)?)
                }
            };
            properties.insert(property.title().to_string(), property);
        }

        for characteristic in hierarchy.characteristics.values_mut() {
            characteristic.quantity_property = Some(property_title(&characteristic.name));
        }
        for (iri, enumeration) in enumerations {
            if let Some(characteristic) = hierarchy.characteristics.get_mut(&iri) {
                if let CharacteristicKind::Fundamental {
                    unit_enumeration,
                    default_unit,
                    ..
                } = &mut characteristic.kind
                {
                    *default_unit = enumeration.first().map(|e| e.osw_id.clone());
                    *unit_enumeration = enumeration;
                }
            }
        }

        debug!(properties = properties.len(), "Synthesized quantity properties");
        Ok(properties)
    }

    fn main_property(
        &self,
        characteristic: &Characteristic,
        quantity: &QuantityKind,
        log: &mut QualityLog,
    ) -> (MainQuantityProperty, Vec<UnitEnumerationElement>) {
        let mut property = MainQuantityProperty::new(&characteristic.name, characteristic.uuid);

        let mut units = Vec::new();
        for iri in self.expand_units(&quantity.unit_iris) {
            match self.catalog.unit(&iri) {
                Some(unit) => units.push(unit),
                None => log.record(
                    GapKind::UnresolvedUnit,
                    iri.as_str(),
                    format!("Unit of {} has no unit entity; skipped", characteristic.name),
                ),
            }
        }

        let main = match select_main_unit(&units, &characteristic.name, log) {
            Some(main) => main,
            None => return (property, Vec::new()),
        };

        let main_unit = &units[main];
        property.main_unit = Some(MainUnit {
            uuid: smw_unit_id(&main_unit.uuid),
            unit: main_unit.uuid,
            name: main_unit.symbol.to_string(),
            symbol: main_unit.symbol.to_string(),
        });
        let mut enumeration = vec![main_unit.enumeration_element()];

        for unit in units[main + 1..].iter().chain(units[..main].iter()) {
            let factor = match unit.conversion_factor_from_si {
                Some(factor) if factor != 0.0 => factor,
                Some(_) => {
                    log.record(
                        GapKind::ZeroConversionFactor,
                        unit.name,
                        format!("Conversion factor for unit {} was 0", unit.name),
                    );
                    continue;
                }
                None => {
                    log.record(
                        GapKind::MissingConversionFactor,
                        unit.name,
                        format!("No conversion factor found for unit {}", unit.name),
                    );
                    continue;
                }
            };

            property.additional_units.push(AdditionalUnit {
                uuid: smw_unit_id(&unit.uuid),
                unit: unit.uuid,
                name: unit.symbol.to_string(),
                symbol: unit.symbol.to_string(),
                conversion_factor_to_main_unit: conversion_to_main(factor),
            });
            enumeration.push(unit.enumeration_element());
        }

        (property, enumeration)
    }
}

/// Index of the main unit, or None when there are no units
pub fn select_main_unit(units: &[CatalogUnit<'_>], characteristic: &str, log: &mut QualityLog) -> Option<usize> {
    if let Some(main) = units
        .iter()
        .position(|u| u.conversion_factor_from_si == Some(1.0))
    {
        return Some(main);
    }

    match units.len() {
        0 => {
            log.record(
                GapKind::NoApplicableUnits,
                characteristic,
                "No units resolved; property has no main unit",
            );
            None
        }
        1 => {
            log.record(
                GapKind::SingleNonUnitFactor,
                characteristic,
                format!(
                    "Only unit {} has conversion factor != 1.0; using it as main unit",
                    units[0].name
                ),
            );
            Some(0)
        }
        n => {
            log.record(
                GapKind::NoUnitFactorUnit,
                characteristic,
                format!("No unit with conversion factor 1.0 among {}; using {}", n, units[0].name),
            );
            Some(0)
        }
    }
}

/// Sub-property of a derived characteristic
///
/// Walks the subclass chain up to a fundamental characteristic; a revisit
/// is a cycle, a missing parent a dangling reference.
fn sub_property(
    characteristic: &Characteristic,
    broader: &str,
    characteristics: &IndexMap<String, Characteristic>,
) -> Result<SubQuantityProperty> {
    let lookup = |iri: &str| {
        characteristics
            .get(iri)
            .ok_or_else(|| TaxonomyError::DanglingReference {
                characteristic: characteristic.name.clone(),
                parent: iri.to_string(),
            })
    };

    let parent = lookup(broader)?;
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(characteristic.iri.as_str());

    let mut root = parent;
    while let Some(next) = root.broader() {
        if !visited.insert(root.iri.as_str()) {
            return Err(TaxonomyError::SubclassCycle {
                characteristic: characteristic.name.clone(),
                revisited: root.iri.clone(),
                depth: visited.len(),
            });
        }
        root = lookup(next)?;
    }

    Ok(SubQuantityProperty::new(
        &characteristic.name,
        characteristic.uuid,
        property_title(&parent.name),
        property_title(&root.name),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
