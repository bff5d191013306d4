// ✅ Data Quality Log - Recoverable lookup gaps
//
// A gap never aborts a pass. The component that hits it falls back to a
// documented default and records an issue naming the offending entity, so
// upstream ontology problems stay visible without halting reconciliation.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// GAP KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GapKind {
    /// No unit with SI conversion factor 1.0; several candidates, first used
    NoUnitFactorUnit,

    /// Only one unit and its factor is not 1.0; used as main unit anyway
    SingleNonUnitFactor,

    /// Unit without SI conversion factor, skipped as additional unit
    MissingConversionFactor,

    /// Unit with SI conversion factor 0, skipped as additional unit
    ZeroConversionFactor,

    /// Conversion factor text that is not a number, treated as absent
    UnparsableConversionFactor,

    /// Unit identifier with no matching unit record
    UnresolvedUnit,

    /// Unit record without symbol, path tail used instead
    MissingSymbol,

    /// Fundamental characteristic whose quantity kind resolved no units
    NoApplicableUnits,

    /// Prefixed unit whose prefix label is not in the prefix index
    UnknownPrefix,
}

impl GapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapKind::NoUnitFactorUnit => "no unit with conversion factor 1.0",
            GapKind::SingleNonUnitFactor => "single unit with conversion factor != 1.0",
            GapKind::MissingConversionFactor => "missing conversion factor",
            GapKind::ZeroConversionFactor => "zero conversion factor",
            GapKind::UnparsableConversionFactor => "unparsable conversion factor",
            GapKind::UnresolvedUnit => "unresolved unit",
            GapKind::MissingSymbol => "missing symbol",
            GapKind::NoApplicableUnits => "no applicable units",
            GapKind::UnknownPrefix => "unknown prefix",
        }
    }
}

// ============================================================================
// QUALITY ISSUE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub kind: GapKind,

    /// Name or identifier of the offending entity
    pub entity: String,

    pub message: String,
}

impl std::fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.as_str(), self.entity, self.message)
    }
}

// ============================================================================
// QUALITY LOG
// ============================================================================

/// Issues collected during one pass, in the order they were hit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityLog {
    issues: Vec<QualityIssue>,
}

impl QualityLog {
    pub fn new() -> Self {
        QualityLog { issues: Vec::new() }
    }

    /// Record a gap and emit it as a warning
    pub fn record(&mut self, kind: GapKind, entity: impl Into<String>, message: impl Into<String>) {
        let issue = QualityIssue {
            kind,
            entity: entity.into(),
            message: message.into(),
        };
        warn!(kind = kind.as_str(), entity = %issue.entity, "{}", issue.message);
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[QualityIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count_of(&self, kind: GapKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Number of distinct entities a fallback policy was applied to
    pub fn fallback_entity_count(&self) -> usize {
        self.issues
            .iter()
            .map(|i| i.entity.as_str())
            .collect::<IndexSet<_>>()
            .len()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} data-quality issues across {} entities",
            self.issues.len(),
            self.fallback_entity_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut log = QualityLog::new();
        log.record(GapKind::ZeroConversionFactor, "dB", "Conversion factor for unit dB was 0");
        log.record(GapKind::MissingConversionFactor, "dB", "No conversion factor found for unit dB");
        log.record(GapKind::UnresolvedUnit, "unit/FOO", "no unit record");

        assert_eq!(log.len(), 3);
        assert_eq!(log.count_of(GapKind::ZeroConversionFactor), 1);
        assert_eq!(log.fallback_entity_count(), 2);
        assert_eq!(log.summary(), "3 data-quality issues across 2 entities");
    }

    #[test]
    fn test_issue_display_names_entity() {
        let issue = QualityIssue {
            kind: GapKind::MissingSymbol,
            entity: "unit/M".to_string(),
            message: "using path tail".to_string(),
        };
        assert_eq!(issue.to_string(), "[missing symbol] unit/M: using path tail");
    }
}
