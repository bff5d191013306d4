// 🏷️ Unit Classifier - Split applicable units into prefixed / non-prefixed

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::parser::QuantityKindRecord;
use crate::prefixes::PrefixIndex;

/// Separator of the applicable-units string, exactly as the source emits it
pub const UNIT_SEPARATOR: &str = ", ";

// ============================================================================
// CLASSIFIED UNITS
// ============================================================================

/// Deduplicated, insertion-ordered partition of unit identifiers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedUnits {
    pub non_prefixed: IndexSet<String>,
    pub prefixed: IndexSet<String>,
}

impl ClassifiedUnits {
    pub fn is_empty(&self) -> bool {
        self.non_prefixed.is_empty() && self.prefixed.is_empty()
    }

    /// Append another partition, keeping first-seen order
    pub fn extend(&mut self, other: ClassifiedUnits) {
        self.non_prefixed.extend(other.non_prefixed);
        self.prefixed.extend(other.prefixed);
    }
}

// ============================================================================
// UNIT CLASSIFIER
// ============================================================================

pub struct UnitClassifier<'a> {
    prefixes: &'a PrefixIndex,
}

impl<'a> UnitClassifier<'a> {
    pub fn new(prefixes: &'a PrefixIndex) -> Self {
        UnitClassifier { prefixes }
    }

    /// Classify one comma-delimited applicable-units string
    ///
    /// A unit is prefixed iff any prefix label occurs in its lowercased
    /// identifier. Empty fragments are ignored.
    pub fn classify(&self, applicable_units: &str) -> ClassifiedUnits {
        let mut classified = ClassifiedUnits::default();

        for unit in applicable_units.split(UNIT_SEPARATOR) {
            if unit.is_empty() {
                continue;
            }
            if self.is_prefixed(unit) {
                classified.prefixed.insert(unit.to_string());
            } else {
                classified.non_prefixed.insert(unit.to_string());
            }
        }

        classified
    }

    pub fn is_prefixed(&self, unit: &str) -> bool {
        self.prefixes.first_prefix(unit).is_some()
    }

    /// Union of the partitions of every quantity kind, in record order
    pub fn classify_all(&self, quantity_kinds: &[QuantityKindRecord]) -> ClassifiedUnits {
        let mut all = ClassifiedUnits::default();
        for record in quantity_kinds {
            all.extend(self.classify(record.applicable_units()));
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PrefixIndex {
        PrefixIndex::from_labels(&["kilo", "centi"]).unwrap()
    }

    #[test]
    fn test_classify_meter_scenario() {
        let index = index();
        let classifier = UnitClassifier::new(&index);

        let classified = classifier.classify("unit/Meter, unit/KiloMeter, unit/CentiMeter");

        assert_eq!(classified.non_prefixed.iter().collect::<Vec<_>>(), vec!["unit/Meter"]);
        assert_eq!(
            classified.prefixed.iter().collect::<Vec<_>>(),
            vec!["unit/KiloMeter", "unit/CentiMeter"]
        );
    }

    #[test]
    fn test_classify_deduplicates() {
        let index = index();
        let classifier = UnitClassifier::new(&index);

        let classified = classifier.classify("unit/M, unit/KiloM, unit/M, unit/KiloM");
        assert_eq!(classified.non_prefixed.len(), 1);
        assert_eq!(classified.prefixed.len(), 1);
    }

    #[test]
    fn test_split_is_exact_on_separator() {
        let index = index();
        let classifier = UnitClassifier::new(&index);

        // "," without the trailing space does not split
        let classified = classifier.classify("unit/M,unit/S");
        assert_eq!(classified.non_prefixed.iter().collect::<Vec<_>>(), vec!["unit/M,unit/S"]);
    }

    #[test]
    fn test_empty_string_yields_nothing() {
        let index = index();
        let classifier = UnitClassifier::new(&index);
        assert!(classifier.classify("").is_empty());
    }

    #[test]
    fn test_classify_all_keeps_first_seen_order() {
        let index = index();
        let classifier = UnitClassifier::new(&index);
        let records = vec![
            QuantityKindRecord::new("qk/Length", "length", "unit/M, unit/KiloM"),
            QuantityKindRecord::new("qk/Mass", "mass", "unit/GM, unit/KiloGM, unit/M"),
        ];

        let all = classifier.classify_all(&records);

        assert_eq!(all.non_prefixed.iter().collect::<Vec<_>>(), vec!["unit/M", "unit/GM"]);
        assert_eq!(all.prefixed.iter().collect::<Vec<_>>(), vec!["unit/KiloM", "unit/KiloGM"]);
    }
}
