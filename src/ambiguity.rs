// 🧩 Ambiguous Unit Resolver - Compound and undeterminable prefixed units
//
// Recovers prefixed units that the hierarchy builder could not reduce to a
// known base unit. Every prefixed unit ends up in exactly one bucket:
//   reconciled     - in a base unit's variant list
//   compound       - associated with a compound base (or heading one)
//   undeterminable - a compound key with no members

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::classifier::UnitClassifier;
use crate::error::{Result, TaxonomyError};
use crate::hierarchy::{reconciled_units, UnitHierarchy};
use crate::parser::QuantityKindRecord;
use crate::prefixes::{path_tail, PrefixIndex};

// ============================================================================
// COMPOUND UNITS
// ============================================================================

/// compound key -> associated multi-prefixed units (empty = undeterminable)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompoundUnits {
    pub associations: IndexMap<String, IndexSet<String>>,
}

impl CompoundUnits {
    /// Merge `(key, members?)` pairs by set-union on members
    ///
    /// Duplicate associations collapse; a key first seen without members
    /// keeps an empty set until members arrive.
    pub fn merge(pairs: Vec<(String, Option<Vec<String>>)>) -> Self {
        let mut associations: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for (key, members) in pairs {
            associations
                .entry(key)
                .or_default()
                .extend(members.unwrap_or_default());
        }
        CompoundUnits { associations }
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    pub fn contains_key(&self, unit: &str) -> bool {
        self.associations.contains_key(unit)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.associations.keys()
    }

    /// Keys with at least one associated unit
    pub fn associated(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.associations.iter().filter(|(_, members)| !members.is_empty())
    }

    /// Keys nothing could be associated with
    pub fn undeterminable(&self) -> impl Iterator<Item = &String> {
        self.associations
            .iter()
            .filter(|(_, members)| members.is_empty())
            .map(|(key, _)| key)
    }

    /// Every unit associated with some key
    pub fn members(&self) -> IndexSet<&str> {
        self.associations
            .values()
            .flat_map(|members| members.iter().map(String::as_str))
            .collect()
    }

    /// Make the buckets disjoint and total over `prefixed`
    fn settle(&mut self, hierarchy: &UnitHierarchy, prefixed: &IndexSet<String>) {
        let reconciled = reconciled_units(hierarchy);

        for members in self.associations.values_mut() {
            members.retain(|m| !reconciled.contains(m.as_str()));
        }

        let members: IndexSet<String> = self.members().into_iter().map(str::to_string).collect();
        self.associations.retain(|key, group| {
            !group.is_empty() || !(reconciled.contains(key.as_str()) || members.contains(key))
        });

        for unit in prefixed {
            if !reconciled.contains(unit.as_str())
                && !members.contains(unit)
                && !self.associations.contains_key(unit)
            {
                self.associations.insert(unit.clone(), IndexSet::new());
            }
        }
    }
}

// ============================================================================
// PLACEMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitPlacement {
    /// Prefixed variant of a base unit
    Reconciled { base: String },

    /// Member of a compound association
    CompoundMember { key: String },

    /// Heads a compound association
    CompoundBase,

    /// Could not be associated with anything
    Undeterminable,
}

/// Bucket of a prefixed unit; reconciled wins over compound membership
pub fn placement(unit: &str, hierarchy: &UnitHierarchy, compound: &CompoundUnits) -> Option<UnitPlacement> {
    if let Some((base, _)) = hierarchy
        .iter()
        .find(|(_, variants)| variants.iter().any(|v| v == unit))
    {
        return Some(UnitPlacement::Reconciled { base: base.clone() });
    }
    if let Some((key, _)) = compound
        .associations
        .iter()
        .find(|(_, members)| members.contains(unit))
    {
        return Some(UnitPlacement::CompoundMember { key: key.clone() });
    }
    match compound.associations.get(unit) {
        Some(members) if members.is_empty() => Some(UnitPlacement::Undeterminable),
        Some(_) => Some(UnitPlacement::CompoundBase),
        None => None,
    }
}

/// Check that every prefixed unit is accounted for exactly once
///
/// A unit heading a compound association may also be reconciled or a
/// member elsewhere; any other overlap or a missing unit is fatal.
pub fn verify_totality(
    prefixed: &IndexSet<String>,
    hierarchy: &UnitHierarchy,
    compound: &CompoundUnits,
) -> Result<()> {
    let reconciled = reconciled_units(hierarchy);
    let members = compound.members();
    let undeterminable: IndexSet<&str> = compound.undeterminable().map(String::as_str).collect();

    let unaccounted: Vec<&String> = prefixed
        .iter()
        .filter(|unit| {
            let unit = unit.as_str();
            let buckets = [
                reconciled.contains(unit),
                members.contains(unit),
                undeterminable.contains(unit),
            ]
            .iter()
            .filter(|hit| **hit)
            .count();
            let heads_association = compound.contains_key(unit) && !undeterminable.contains(unit);

            match buckets {
                0 => !heads_association,
                1 => false,
                _ => true,
            }
        })
        .collect();

    match unaccounted.first() {
        None => Ok(()),
        Some(first) => Err(TaxonomyError::UnaccountedUnits {
            count: unaccounted.len(),
            first: (*first).clone(),
        }),
    }
}

// ============================================================================
// AMBIGUOUS UNIT RESOLVER
// ============================================================================

pub struct AmbiguousUnitResolver<'a> {
    prefixes: &'a PrefixIndex,

    /// Known base units (all non-prefixed units of the pass)
    known_bases: &'a IndexSet<String>,

    /// base path tail -> base unit, first base per tail
    base_tails: HashMap<&'a str, &'a str>,
}

impl<'a> AmbiguousUnitResolver<'a> {
    pub fn new(prefixes: &'a PrefixIndex, known_bases: &'a IndexSet<String>) -> Self {
        let mut base_tails = HashMap::with_capacity(known_bases.len());
        for base in known_bases {
            base_tails.entry(path_tail(base)).or_insert(base.as_str());
        }
        AmbiguousUnitResolver {
            prefixes,
            known_bases,
            base_tails,
        }
    }

    pub fn is_known_base(&self, unit: &str) -> bool {
        self.known_bases.contains(unit)
    }

    /// Split units into (multi-prefixed, single-or-no-prefix), input order
    pub fn split_by_prefix_count<'u>(&self, units: &'u IndexSet<String>) -> (Vec<&'u String>, Vec<&'u String>) {
        units
            .iter()
            .partition(|unit| self.prefixes.has_multiple_prefixes(unit))
    }

    /// Multi-prefixed units whose full identifier contains `unit`'s path tail
    pub fn matching_compounds(&self, unit: &str, multi_prefixed: &[&String]) -> Vec<String> {
        let tail = path_tail(unit);
        multi_prefixed
            .iter()
            .filter(|candidate| candidate.contains(tail))
            .map(|candidate| (*candidate).clone())
            .collect()
    }

    /// Compound associations of one quantity kind's prefixed units
    ///
    /// With single-prefix units present, each becomes a candidate base
    /// (with its matching multi-prefixed units, or none). Without them,
    /// every multi-prefixed unit is undeterminable.
    pub fn categorize(&self, prefixed: &IndexSet<String>) -> Vec<(String, Option<Vec<String>>)> {
        let (multi, single) = self.split_by_prefix_count(prefixed);

        if single.is_empty() {
            return multi.into_iter().map(|unit| (unit.clone(), None)).collect();
        }

        single
            .into_iter()
            .map(|candidate| {
                let matches = self.matching_compounds(candidate, &multi);
                if matches.is_empty() {
                    (candidate.clone(), None)
                } else {
                    (candidate.clone(), Some(matches))
                }
            })
            .collect()
    }

    /// Known base unit reached by stripping ALL prefixes from the path tail
    pub fn fallback_base(&self, unit: &str) -> Option<&'a str> {
        let stripped = self.prefixes.strip_all(path_tail(unit));
        self.base_tails.get(stripped.as_str()).copied()
    }

    /// Known base units referenced by prefix-stripped units, deduplicated
    pub fn referenceable_bases(&self, prefixed: &IndexSet<String>) -> IndexSet<&'a str> {
        prefixed
            .iter()
            .filter_map(|unit| self.fallback_base(unit))
            .collect()
    }

    /// Compound buckets over all quantity kinds, settled against the
    /// hierarchy so that every prefixed unit is placed exactly once
    pub fn resolve(
        &self,
        classifier: &UnitClassifier,
        quantity_kinds: &[QuantityKindRecord],
        hierarchy: &UnitHierarchy,
        all_prefixed: &IndexSet<String>,
    ) -> CompoundUnits {
        let mut pairs = Vec::new();
        let mut categorized_kinds = 0usize;

        for record in quantity_kinds {
            let classified = classifier.classify(record.applicable_units());

            // Quantity kinds with a reachable base unit need no compound units
            if classified.non_prefixed.iter().any(|u| self.is_known_base(u)) {
                continue;
            }
            if !self.referenceable_bases(&classified.prefixed).is_empty() {
                continue;
            }

            categorized_kinds += 1;
            pairs.extend(self.categorize(&classified.prefixed));
        }

        let mut compound = CompoundUnits::merge(pairs);
        let merged = compound.len();
        compound.settle(hierarchy, all_prefixed);

        debug!(
            categorized_kinds,
            merged_keys = merged,
            settled_keys = compound.len(),
            undeterminable = compound.undeterminable().count(),
            "Resolved compound units"
        );

        compound
    }
}

// ============================================================================
// TESTS
// ============================================================================
