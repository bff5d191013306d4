// 🗂️ Quantity Hierarchy Builder - Fundamental vs derived quantity kinds
//
// Every quantity-kind record becomes a Characteristic. Fundamental ones
// also become a QuantityKind with resolved units; derived ones point at
// the characteristic of their broader quantity kind.
//
// Rule:
//   Fundamental  if forced fundamental
//                or (no broader and not forced derived)
//   Derived      otherwise (a broader reference is then required)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ambiguity::{AmbiguousUnitResolver, CompoundUnits};
use crate::classifier::UnitClassifier;
use crate::entities::{pascal_case, Characteristic, CharacteristicKind, Description, Label, LangString, QuantityKind};
use crate::error::{Result, TaxonomyError};
use crate::identity::{stable_id, CHARACTERISTIC};
use crate::overrides::HierarchyOverrides;
use crate::parser::QuantityKindRecord;
use crate::prefixes::path_tail;

// ============================================================================
// QUANTITY HIERARCHY
// ============================================================================

/// Quantity kinds and characteristics of one pass, keyed by quantity IRI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityHierarchy {
    pub quantity_kinds: IndexMap<String, QuantityKind>,
    pub characteristics: IndexMap<String, Characteristic>,
}

impl QuantityHierarchy {
    pub fn fundamental_count(&self) -> usize {
        self.characteristics.values().filter(|c| c.is_fundamental()).count()
    }

    pub fn derived_count(&self) -> usize {
        self.characteristics.len() - self.fundamental_count()
    }

    /// Fundamental == quantity kinds, and every record has a characteristic
    pub fn verify(&self, records: usize) -> Result<()> {
        let fundamental = self.fundamental_count();
        if fundamental != self.quantity_kinds.len() || self.characteristics.len() != records {
            return Err(TaxonomyError::HierarchyCountMismatch {
                fundamental,
                quantity_kinds: self.quantity_kinds.len(),
                characteristics: self.characteristics.len(),
                records,
            });
        }
        Ok(())
    }
}

// ============================================================================
// QUANTITY HIERARCHY BUILDER
// ============================================================================

pub struct QuantityHierarchyBuilder<'a> {
    classifier: &'a UnitClassifier<'a>,
    resolver: &'a AmbiguousUnitResolver<'a>,
    compound: &'a CompoundUnits,
    overrides: &'a HierarchyOverrides,
}

impl<'a> QuantityHierarchyBuilder<'a> {
    pub fn new(
        classifier: &'a UnitClassifier<'a>,
        resolver: &'a AmbiguousUnitResolver<'a>,
        compound: &'a CompoundUnits,
        overrides: &'a HierarchyOverrides,
    ) -> Self {
        QuantityHierarchyBuilder {
            classifier,
            resolver,
            compound,
            overrides,
        }
    }

    pub fn is_fundamental(&self, record: &QuantityKindRecord) -> bool {
        let uri = record.uri();
        self.overrides.is_forced_fundamental(uri)
            || (record.broader().is_none() && !self.overrides.is_forced_derived(uri))
    }

    /// Cleaned labels: folded languages, capitalized, English first, with
    /// the label correction applied to the first one
    pub fn labels(&self, record: &QuantityKindRecord) -> Vec<Label> {
        let mut labels: Vec<Label> = LangString::from_tagged(&record.labels.value)
            .iter()
            .map(LangString::capitalized)
            .collect();

        if let Some(correction) = self.overrides.label_correction(record.uri()) {
            match labels.first_mut() {
                Some(first) => first.text = correction.to_string(),
                None => labels.push(Label::en(correction)),
            }
        }

        labels
    }

    /// Concrete units of a quantity kind; the first non-empty source wins:
    /// known base units, then prefix-stripped matches to known base units,
    /// then compound keys applicable to this quantity kind
    pub fn resolve_units(&self, record: &QuantityKindRecord) -> Vec<String> {
        let classified = self.classifier.classify(record.applicable_units());

        let known: Vec<String> = classified
            .non_prefixed
            .iter()
            .filter(|unit| self.resolver.is_known_base(unit))
            .cloned()
            .collect();
        if !known.is_empty() {
            return known;
        }

        let referenced: Vec<String> = self
            .resolver
            .referenceable_bases(&classified.prefixed)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !referenced.is_empty() {
            return referenced;
        }

        classified
            .prefixed
            .iter()
            .filter(|unit| self.compound.contains_key(unit))
            .cloned()
            .collect()
    }

    pub fn build(&self, records: &[QuantityKindRecord]) -> Result<QuantityHierarchy> {
        let mut hierarchy = QuantityHierarchy::default();

        for record in records {
            let uri = record.uri();
            let label = self.labels(record);
            let name = label
                .first()
                .map(|l| pascal_case(&l.text))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| pascal_case(path_tail(uri)));
            let description: Vec<Description> = record
                .description()
                .map(|text| vec![Description::en(&text)])
                .unwrap_or_default();
            let external = record.external_matches();

            let kind = if self.is_fundamental(record) {
                let mut quantity = QuantityKind::new(uri, name.clone()).with_units(self.resolve_units(record));
                quantity.label = label.clone();
                quantity.description = description.clone();
                quantity.close_ontology_match = external.clone();

                let kind = CharacteristicKind::Fundamental {
                    quantity: quantity.uuid,
                    unit_enumeration: Vec::new(),
                    default_unit: None,
                };
                hierarchy.quantity_kinds.insert(uri.to_string(), quantity);
                kind
            } else {
                let broader = record
                    .broader()
                    .ok_or_else(|| TaxonomyError::MissingBroader(uri.to_string()))?;
                CharacteristicKind::Derived {
                    subclass_of: stable_id(CHARACTERISTIC, broader),
                    broader: broader.to_string(),
                }
            };

            let mut characteristic = Characteristic::new(uri, name, kind);
            characteristic.label = label;
            characteristic.description = description;
            characteristic.close_ontology_match.extend(external);
            hierarchy.characteristics.insert(uri.to_string(), characteristic);
        }

        debug!(
            records = records.len(),
            fundamental = hierarchy.fundamental_count(),
            derived = hierarchy.derived_count(),
            quantity_kinds = hierarchy.quantity_kinds.len(),
            "Built quantity hierarchy"
        );

        hierarchy.verify(records.len())?;
        Ok(hierarchy)
    }
}

// ============================================================================
// TESTS
// ============================================================================
