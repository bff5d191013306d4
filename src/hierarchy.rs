// 🌳 Unit Hierarchy Builder - Base units and their prefixed variants
//
// A prefixed unit belongs to a base unit when stripping its LEADING
// capitalized prefix yields the base unit's path tail. Units with a
// non-leading prefix stay orphaned here and go to the ambiguity resolver.

use indexmap::{IndexMap, IndexSet};

use crate::prefixes::{path_tail, PrefixIndex};

/// base unit -> prefixed variants, both in input order
pub type UnitHierarchy = IndexMap<String, Vec<String>>;

pub struct UnitHierarchyBuilder<'a> {
    prefixes: &'a PrefixIndex,
}

impl<'a> UnitHierarchyBuilder<'a> {
    pub fn new(prefixes: &'a PrefixIndex) -> Self {
        UnitHierarchyBuilder { prefixes }
    }

    /// Pure function of its inputs: same sets, same map, same list order
    pub fn build(&self, non_prefixed: &IndexSet<String>, prefixed: &IndexSet<String>) -> UnitHierarchy {
        // Strip each prefixed tail once instead of once per base unit
        let stripped: Vec<(&String, String)> = prefixed
            .iter()
            .map(|unit| (unit, self.prefixes.strip_leading(path_tail(unit))))
            .collect();

        let mut hierarchy = UnitHierarchy::with_capacity(non_prefixed.len());
        for base in non_prefixed {
            let base_tail = path_tail(base);
            let variants = stripped
                .iter()
                .filter(|(unit, candidate)| candidate == base_tail && *unit != base)
                .map(|(unit, _)| (*unit).clone())
                .collect();
            hierarchy.insert(base.clone(), variants);
        }

        hierarchy
    }
}

/// All prefixed units placed under some base unit
pub fn reconciled_units(hierarchy: &UnitHierarchy) -> IndexSet<&str> {
    hierarchy
        .values()
        .flat_map(|variants| variants.iter().map(String::as_str))
        .collect()
}

/// Prefixed units not placed under any base unit, in input order
pub fn orphaned_units<'p>(hierarchy: &UnitHierarchy, prefixed: &'p IndexSet<String>) -> Vec<&'p String> {
    let reconciled = reconciled_units(hierarchy);
    prefixed
        .iter()
        .filter(|unit| !reconciled.contains(unit.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(units: &[&str]) -> IndexSet<String> {
        units.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_meter_scenario() {
        let index = PrefixIndex::from_labels(&["kilo", "centi"]).unwrap();
        let builder = UnitHierarchyBuilder::new(&index);

        let hierarchy = builder.build(
            &set(&["unit/Meter"]),
            &set(&["unit/KiloMeter", "unit/CentiMeter"]),
        );

        assert_eq!(hierarchy.len(), 1);
        assert_eq!(
            hierarchy["unit/Meter"],
            vec!["unit/KiloMeter".to_string(), "unit/CentiMeter".to_string()]
        );
    }

    #[test]
    fn test_non_leading_prefix_stays_orphaned() {
        let index = PrefixIndex::from_labels(&["kilo", "milli"]).unwrap();
        let builder = UnitHierarchyBuilder::new(&index);
        let prefixed = set(&["unit/KiloGM", "unit/GM-PER-MilliSEC"]);

        let hierarchy = builder.build(&set(&["unit/GM", "unit/GM-PER-SEC"]), &prefixed);

        assert_eq!(hierarchy["unit/GM"], vec!["unit/KiloGM".to_string()]);
        assert!(hierarchy["unit/GM-PER-SEC"].is_empty());
        assert_eq!(orphaned_units(&hierarchy, &prefixed), vec![&"unit/GM-PER-MilliSEC".to_string()]);
    }

    #[test]
    fn test_base_without_variants_is_kept() {
        let index = PrefixIndex::from_labels(&["kilo"]).unwrap();
        let builder = UnitHierarchyBuilder::new(&index);

        let hierarchy = builder.build(&set(&["unit/SEC"]), &set(&["unit/KiloM"]));

        assert!(hierarchy.contains_key("unit/SEC"));
        assert!(hierarchy["unit/SEC"].is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let index = PrefixIndex::from_labels(&["kilo", "centi", "milli"]).unwrap();
        let builder = UnitHierarchyBuilder::new(&index);
        let non_prefixed = set(&["unit/M", "unit/GM"]);
        let prefixed = set(&["unit/MilliM", "unit/KiloGM", "unit/KiloM", "unit/CentiM"]);

        let first = builder.build(&non_prefixed, &prefixed);
        let second = builder.build(&non_prefixed, &prefixed);

        assert_eq!(first, second);
        assert_eq!(
            first["unit/M"],
            vec!["unit/MilliM".to_string(), "unit/KiloM".to_string(), "unit/CentiM".to_string()]
        );
    }
}
