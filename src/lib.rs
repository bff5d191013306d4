// Unit Taxonomy - Core Library
// Reconciles QUDT unit and quantity-kind records into a stable taxonomy

pub mod error;
pub mod identity;        // Stable UUID v5 identities
pub mod prefixes;        // PrefixIndex
pub mod parser;          // Query-result records and loaders
pub mod classifier;      // Prefixed / non-prefixed units
pub mod hierarchy;       // Base unit -> prefixed variants
pub mod ambiguity;       // Compound and undeterminable units
pub mod overrides;       // Named correction tables
pub mod data_quality;    // Recoverable lookup gaps
pub mod catalog;         // Unit entities
pub mod quantities;      // Fundamental / derived quantity kinds
pub mod properties;      // Quantity properties
pub mod reconciliation;  // Full pass, report, fingerprint
pub mod entities;

// Re-export commonly used types
pub use error::{Result, TaxonomyError};
pub use identity::{stable_id, StableId};
pub use prefixes::{PrefixIndex, PrefixName};
pub use parser::{
    QuantityKindRecord, UnitRecord, UnitIndex,
    load_prefixes, load_quantity_kinds, load_units,
};
pub use classifier::{ClassifiedUnits, UnitClassifier};
pub use hierarchy::{UnitHierarchy, UnitHierarchyBuilder};
pub use ambiguity::{AmbiguousUnitResolver, CompoundUnits, UnitPlacement};
pub use overrides::HierarchyOverrides;
pub use data_quality::{GapKind, QualityIssue, QualityLog};
pub use catalog::{UnitCatalog, UnitCatalogBuilder};
pub use quantities::{QuantityHierarchy, QuantityHierarchyBuilder};
pub use properties::QuantityPropertySynthesizer;
pub use reconciliation::{Reconciliation, ReconciliationEngine, ReconciliationReport, Taxonomy};
pub use entities::{
    Characteristic, CharacteristicKind,
    ComposedUnit, PrefixUnit, QuantityUnit, UnitPrefix,
    QuantityKind, QuantityProperty,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
