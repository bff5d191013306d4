// 🧬 Characteristic Entity - Fundamental or derived classification
//
// A Fundamental characteristic owns its quantity kind and unit enumeration.
// A Derived one subclasses the characteristic of its broader quantity kind
// and inherits units through that chain.

use serde::{Deserialize, Serialize};

use super::{Description, Label, UnitEnumerationElement};
use crate::identity::{category_title, stable_id, StableId, CHARACTERISTIC};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CharacteristicKind {
    Fundamental {
        /// Stable id of the owned quantity kind
        quantity: StableId,

        /// Main unit first, then additional units
        unit_enumeration: Vec<UnitEnumerationElement>,

        /// OSW id of the first enumeration element
        default_unit: Option<String>,
    },

    Derived {
        /// Stable id of the parent characteristic
        subclass_of: StableId,

        /// IRI of the broader quantity kind
        broader: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Characteristic {
    pub uuid: StableId,

    /// IRI of the quantity kind this characteristic was built from
    pub iri: String,

    pub name: String,

    pub label: Vec<Label>,

    pub description: Vec<Description>,

    /// `[iri, dbpedia?, siExact?]`
    pub close_ontology_match: Vec<String>,

    pub kind: CharacteristicKind,

    /// Title of the quantity property, set during property synthesis
    pub quantity_property: Option<String>,
}

impl Characteristic {
    pub fn new(iri: &str, name: String, kind: CharacteristicKind) -> Self {
        Characteristic {
            uuid: stable_id(CHARACTERISTIC, iri),
            iri: iri.to_string(),
            name,
            label: Vec::new(),
            description: Vec::new(),
            close_ontology_match: vec![iri.to_string()],
            kind,
            quantity_property: None,
        }
    }

    pub fn is_fundamental(&self) -> bool {
        matches!(self.kind, CharacteristicKind::Fundamental { .. })
    }

    /// IRI of the broader quantity kind, for derived characteristics
    pub fn broader(&self) -> Option<&str> {
        match &self.kind {
            CharacteristicKind::Derived { broader, .. } => Some(broader.as_str()),
            CharacteristicKind::Fundamental { .. } => None,
        }
    }

    pub fn title(&self) -> String {
        category_title(&self.uuid)
    }
}
