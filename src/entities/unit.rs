// 📏 Unit Entities - Prefixes, base units, prefixed and composed units
//
// Identity: UUID v5 of the unit IRI (prefixes: of their pid)
// Values:   symbol, labels, SI conversion factor, UCUM codes

use serde::{Deserialize, Serialize};

use super::{Description, Label};
use crate::identity::{item_title, stable_id, sub_item_title, StableId, NO_PREFIX};
use crate::prefixes::{path_tail, PrefixName};

// ============================================================================
// UNIT PREFIX
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPrefix {
    pub uuid: StableId,

    /// Prefix label, e.g. "kilo"
    pub name: String,

    pub label: Vec<Label>,

    pub symbol: String,

    pub factor: f64,

    pub exact_ontology_match: Vec<String>,
}

impl UnitPrefix {
    pub fn new(prefix: &PrefixName) -> Self {
        UnitPrefix {
            uuid: stable_id(NO_PREFIX, &prefix.pid),
            name: prefix.label.clone(),
            label: vec![Label::en(&format!("{} (unit prefix)", prefix.label))],
            symbol: prefix.symbol.clone(),
            factor: prefix.scaling_factor,
            exact_ontology_match: vec![prefix.pid.clone()],
        }
    }

    pub fn title(&self) -> String {
        item_title(&self.uuid)
    }
}

// ============================================================================
// PREFIX UNIT
// ============================================================================

/// Prefixed variant, stored as a sub-object of its base (or composed) unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixUnit {
    pub uuid: StableId,

    /// `Item:OSW<parent>#OSW<own>`
    pub osw_id: String,

    pub iri: String,

    /// Path tail of the IRI
    pub name: String,

    /// Title of the first prefix found in the IRI
    pub prefix: Option<String>,

    pub main_symbol: String,

    pub conversion_factor_from_si: Option<f64>,

    pub exact_ontology_match: Vec<String>,
}

impl PrefixUnit {
    pub fn new(parent: &StableId, iri: &str, main_symbol: String) -> Self {
        let uuid = stable_id(NO_PREFIX, iri);
        PrefixUnit {
            uuid,
            osw_id: sub_item_title(parent, &uuid),
            iri: iri.to_string(),
            name: path_tail(iri).to_string(),
            prefix: None,
            main_symbol,
            conversion_factor_from_si: None,
            exact_ontology_match: Vec::new(),
        }
    }
}

// ============================================================================
// QUANTITY UNIT
// ============================================================================

/// Base unit with its prefixed variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityUnit {
    pub uuid: StableId,

    pub iri: String,

    /// Path tail of the IRI
    pub name: String,

    pub label: Vec<Label>,

    pub main_symbol: String,

    pub description: Option<Description>,

    pub conversion_factor_from_si: Option<f64>,

    pub ucum_codes: Vec<String>,

    /// `[iri, dbpedia?, siExact?]`
    pub exact_ontology_match: Vec<String>,

    pub prefix_units: Vec<PrefixUnit>,
}

impl QuantityUnit {
    pub fn new(iri: &str, main_symbol: String) -> Self {
        QuantityUnit {
            uuid: stable_id(NO_PREFIX, iri),
            iri: iri.to_string(),
            name: path_tail(iri).to_string(),
            label: Vec::new(),
            main_symbol,
            description: None,
            conversion_factor_from_si: None,
            ucum_codes: Vec::new(),
            exact_ontology_match: vec![iri.to_string()],
            prefix_units: Vec::new(),
        }
    }

    pub fn title(&self) -> String {
        item_title(&self.uuid)
    }

    pub fn variant(&self, iri: &str) -> Option<&PrefixUnit> {
        self.prefix_units.iter().find(|p| p.iri == iri)
    }
}

// ============================================================================
// COMPOSED UNIT
// ============================================================================

/// Unit built from a compound association key
///
/// Its prefix units are the associated multi-prefixed members; an
/// undeterminable key has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedUnit {
    #[serde(flatten)]
    pub unit: QuantityUnit,

    pub undeterminable: bool,
}

impl ComposedUnit {
    pub fn title(&self) -> String {
        self.unit.title()
    }
}
