// 📐 Quantity Kind Entity - Measurable quantity of a fundamental characteristic

use serde::{Deserialize, Serialize};

use super::{Description, Label};
use crate::identity::{item_title, stable_id, StableId, NO_PREFIX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityKind {
    pub uuid: StableId,

    pub iri: String,

    /// PascalCase of the first label
    pub name: String,

    pub label: Vec<Label>,

    pub description: Vec<Description>,

    /// `[iri]`
    pub exact_ontology_match: Vec<String>,

    /// `[dbpedia?, siExact?]`
    pub close_ontology_match: Vec<String>,

    /// Resolved unit IRIs, in resolution order
    pub unit_iris: Vec<String>,

    /// Stable ids of `unit_iris`
    pub units: Vec<StableId>,
}

impl QuantityKind {
    pub fn new(iri: &str, name: String) -> Self {
        QuantityKind {
            uuid: stable_id(NO_PREFIX, iri),
            iri: iri.to_string(),
            name,
            label: Vec::new(),
            description: Vec::new(),
            exact_ontology_match: vec![iri.to_string()],
            close_ontology_match: Vec::new(),
            unit_iris: Vec::new(),
            units: Vec::new(),
        }
    }

    pub fn with_units(mut self, unit_iris: Vec<String>) -> Self {
        self.units = unit_iris.iter().map(|iri| stable_id(NO_PREFIX, iri)).collect();
        self.unit_iris = unit_iris;
        self
    }

    pub fn title(&self) -> String {
        item_title(&self.uuid)
    }
}
