// 🚨 Error Taxonomy - Fatal failures of a reconciliation pass
// Recoverable lookup gaps are NOT errors: they live in data_quality.rs

use thiserror::Error;

/// Result type alias using the taxonomy error
pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// Fatal errors that abort a reconciliation pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaxonomyError {
    // Configuration errors: required input missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Data consistency errors: hierarchy invariants violated
    #[error(
        "Hierarchy count mismatch: {fundamental} fundamental characteristics but {quantity_kinds} quantity kinds, \
         {characteristics} characteristics for {records} quantity-kind records"
    )]
    HierarchyCountMismatch {
        fundamental: usize,
        quantity_kinds: usize,
        characteristics: usize,
        records: usize,
    },

    #[error("Characteristic '{characteristic}' references missing parent {parent}")]
    DanglingReference {
        characteristic: String,
        parent: String,
    },

    #[error("Subclass chain of '{characteristic}' revisits {revisited} after {depth} steps")]
    SubclassCycle {
        characteristic: String,
        revisited: String,
        depth: usize,
    },

    #[error("Quantity kind '{0}' is forced derived but has no broader quantity kind")]
    MissingBroader(String),

    #[error("{count} prefixed units are not accounted for exactly once (first: {first})")]
    UnaccountedUnits { count: usize, first: String },
}

impl TaxonomyError {
    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        TaxonomyError::Configuration(msg.into())
    }

    /// True for the DataConsistencyError family (hierarchy invariants)
    pub fn is_consistency_error(&self) -> bool {
        !matches!(self, TaxonomyError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_reports_counts() {
        let err = TaxonomyError::HierarchyCountMismatch {
            fundamental: 3,
            quantity_kinds: 2,
            characteristics: 5,
            records: 5,
        };

        let msg = err.to_string();
        assert!(msg.contains("3 fundamental"));
        assert!(msg.contains("2 quantity kinds"));
        assert!(err.is_consistency_error());
    }

    #[test]
    fn test_configuration_is_not_consistency_error() {
        let err = TaxonomyError::configuration("prefix list is empty");
        assert!(!err.is_consistency_error());
        assert_eq!(err.to_string(), "Configuration error: prefix list is empty");
    }
}
