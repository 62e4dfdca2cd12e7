//! Catalog resources and budget-scoped price overrides

use serde::{Deserialize, Serialize};

use crate::resource::ResourceType;

/// Cost-type classification attached to a catalog resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostType {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CostType {
    pub fn coded(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            name: None,
        }
    }

    /// Map the catalog classification onto a resource type.
    ///
    /// The code wins over the name. Anything unrecognised is costed as
    /// material.
    pub fn resource_type(&self) -> ResourceType {
        if let Some(code) = self.code.as_deref()
            && let Ok(kind) = code.parse::<ResourceType>()
        {
            return kind;
        }

        let name = self
            .name
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if name.contains("mano de obra") || name.contains("labor") {
            ResourceType::Labor
        } else if name.contains("equipo") || name.contains("equipment") {
            ResourceType::Equipment
        } else if name.contains("subcontrat") {
            ResourceType::Subcontract
        } else {
            ResourceType::Material
        }
    }
}

/// A resource as listed in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub cost_type: CostType,
    /// Current listed price
    #[serde(default)]
    pub base_price: f64,
}

/// Budget-scoped replacement for a catalog price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceOverride {
    pub id: String,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("MO"), None, ResourceType::Labor)]
    #[case(Some("EQ"), None, ResourceType::Equipment)]
    #[case(Some("SC"), None, ResourceType::Subcontract)]
    #[case(Some("MT"), None, ResourceType::Material)]
    #[case(None, Some("Mano de Obra"), ResourceType::Labor)]
    #[case(None, Some("Equipos"), ResourceType::Equipment)]
    #[case(Some("ZZ"), Some("Subcontratos"), ResourceType::Subcontract)]
    #[case(None, None, ResourceType::Material)]
    fn cost_type_maps_to_resource_type(
        #[case] code: Option<&str>,
        #[case] name: Option<&str>,
        #[case] expected: ResourceType,
    ) {
        let cost_type = CostType {
            code: code.map(String::from),
            name: name.map(String::from),
        };
        assert_eq!(cost_type.resource_type(), expected);
    }
}
