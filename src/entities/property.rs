// 🔗 Quantity Property Entities - Value properties of characteristics
//
// Fundamental characteristics get a main property with a main unit and
// additional units; derived ones get a sub-property pointing at their
// parent's property and at the root fundamental property.

use serde::{Deserialize, Serialize};

use crate::identity::{stable_id, StableId, META, PROPERTY};

/// `Has<Name>Value`
pub fn property_name(characteristic_name: &str) -> String {
    format!("Has{}Value", characteristic_name)
}

/// `Property:Has<Name>Value`
pub fn property_title(characteristic_name: &str) -> String {
    format!("Property:{}", property_name(characteristic_name))
}

// ============================================================================
// UNITS OF A PROPERTY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainUnit {
    /// `id("smwunit:", unit uuid)`
    pub uuid: StableId,

    /// Stable id of the unit entity
    pub unit: StableId,

    pub name: String,

    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalUnit {
    pub uuid: StableId,

    pub unit: StableId,

    pub name: String,

    pub symbol: String,

    /// `round(1 / factor_from_si, 6)`
    pub conversion_factor_to_main_unit: f64,
}

/// One entry of a characteristic's unit enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEnumerationElement {
    /// `Item:OSW<hex>`, or `Item:OSW<parent>#OSW<own>` for prefixed units
    pub osw_id: String,

    pub name: String,

    pub symbol: String,
}

// ============================================================================
// QUANTITY PROPERTIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainQuantityProperty {
    pub uuid: StableId,

    /// `id("meta:", title)`
    pub meta_uuid: StableId,

    pub name: String,

    pub title: String,

    /// Stable id of the owning characteristic
    pub characteristic: StableId,

    /// None when the quantity kind resolved no units
    pub main_unit: Option<MainUnit>,

    pub additional_units: Vec<AdditionalUnit>,
}

impl MainQuantityProperty {
    pub fn new(characteristic_name: &str, characteristic: StableId) -> Self {
        let title = property_title(characteristic_name);
        MainQuantityProperty {
            uuid: stable_id(PROPERTY, characteristic_name),
            meta_uuid: stable_id(META, &title),
            name: property_name(characteristic_name),
            title,
            characteristic,
            main_unit: None,
            additional_units: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubQuantityProperty {
    pub uuid: StableId,

    pub name: String,

    pub title: String,

    pub characteristic: StableId,

    /// Title of the parent characteristic's property
    pub subproperty_of: String,

    /// Title of the root fundamental characteristic's property
    pub base_property: String,
}

impl SubQuantityProperty {
    pub fn new(
        characteristic_name: &str,
        characteristic: StableId,
        subproperty_of: String,
        base_property: String,
    ) -> Self {
        SubQuantityProperty {
            uuid: stable_id(PROPERTY, characteristic_name),
            name: property_name(characteristic_name),
            title: property_title(characteristic_name),
            characteristic,
            subproperty_of,
            base_property,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuantityProperty {
    Main(MainQuantityProperty),
    Sub(SubQuantityProperty),
}

impl QuantityProperty {
    pub fn uuid(&self) -> StableId {
        match self {
            QuantityProperty::Main(p) => p.uuid,
            QuantityProperty::Sub(p) => p.uuid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            QuantityProperty::Main(p) => &p.name,
            QuantityProperty::Sub(p) => &p.name,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            QuantityProperty::Main(p) => &p.title,
            QuantityProperty::Sub(p) => &p.title,
        }
    }

    pub fn as_main(&self) -> Option<&MainQuantityProperty> {
        match self {
            QuantityProperty::Main(p) => Some(p),
            QuantityProperty::Sub(_) => None,
        }
    }

    pub fn as_sub(&self) -> Option<&SubQuantityProperty> {
        match self {
            QuantityProperty::Main(_) => None,
            QuantityProperty::Sub(p) => Some(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_naming() {
        let property = MainQuantityProperty::new("Length", stable_id("characteristic:", "qk/Length"));

        assert_eq!(property.name, "HasLengthValue");
        assert_eq!(property.title, "Property:HasLengthValue");
        assert_eq!(property.uuid, stable_id("property:", "Length"));
        assert_eq!(property.meta_uuid, stable_id("meta:", "Property:HasLengthValue"));
    }
}
