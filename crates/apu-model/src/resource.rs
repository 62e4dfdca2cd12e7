//! Resource lines and their classification
//!
//! A [`ResourceLine`] is one row of an APU. Its [`ResourceType`] and
//! [`UnitKind`] together decide which cost formula applies and which fields
//! are derived from others.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::numeric::truncate4;

/// Prefix carried by identifiers of rows that were never persisted
pub const TEMP_ID_PREFIX: &str = "new-";

/// Classification of a resource line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "MATERIAL")]
    Material,
    #[serde(rename = "MANO_OBRA", alias = "LABOR")]
    Labor,
    #[serde(rename = "EQUIPO", alias = "EQUIPMENT")]
    Equipment,
    #[serde(rename = "SUBCONTRATO", alias = "SUBCONTRACT")]
    Subcontract,
}

impl ResourceType {
    /// All resource types, in display order
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Material,
        ResourceType::Labor,
        ResourceType::Equipment,
        ResourceType::Subcontract,
    ];

    /// Two-letter abbreviation used in listings
    pub fn abbreviation(&self) -> &'static str {
        match self {
            ResourceType::Material => "MT",
            ResourceType::Labor => "MO",
            ResourceType::Equipment => "EQ",
            ResourceType::Subcontract => "SC",
        }
    }

    /// Wire name used by the persistence layer
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Material => "MATERIAL",
            ResourceType::Labor => "MANO_OBRA",
            ResourceType::Equipment => "EQUIPO",
            ResourceType::Subcontract => "SUBCONTRATO",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MATERIAL" | "MT" => Ok(ResourceType::Material),
            "MANO_OBRA" | "LABOR" | "MO" => Ok(ResourceType::Labor),
            "EQUIPO" | "EQUIPMENT" | "EQ" => Ok(ResourceType::Equipment),
            "SUBCONTRATO" | "SUBCONTRACT" | "SC" => Ok(ResourceType::Subcontract),
            _ => Err(Error::UnknownResourceType(s.to_string())),
        }
    }
}

/// Unit classes that change how a line is costed
///
/// Units are free text; comparison is case-insensitive and ignores
/// surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// `hh`: man-hours
    ManHour,
    /// `hm`: machine-hours
    MachineHour,
    /// `%mo`: percentage of the labor cost
    PercentOfLabor,
    /// Any other unit
    Other,
}

impl UnitKind {
    pub fn classify(unit: &str) -> Self {
        match unit.trim().to_lowercase().as_str() {
            "hh" => UnitKind::ManHour,
            "hm" => UnitKind::MachineHour,
            "%mo" => UnitKind::PercentOfLabor,
            _ => UnitKind::Other,
        }
    }
}

/// Identifier of a resource line
///
/// Rows created client-side carry a temporary identifier until the store
/// assigns a persisted one. Serialized as a plain string; temporary ids use
/// the [`TEMP_ID_PREFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RowId {
    Temp(String),
    Persisted(String),
}

impl RowId {
    /// Generate a fresh temporary identifier
    pub fn temp() -> Self {
        RowId::Temp(format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()))
    }

    pub fn persisted(id: impl Into<String>) -> Self {
        RowId::Persisted(id.into())
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, RowId::Temp(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            RowId::Temp(s) | RowId::Persisted(s) => s,
        }
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        if value.starts_with(TEMP_ID_PREFIX) {
            RowId::Temp(value)
        } else {
            RowId::Persisted(value)
        }
    }
}

impl From<RowId> for String {
    fn from(value: RowId) -> Self {
        match value {
            RowId::Temp(s) | RowId::Persisted(s) => s,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_resource_type() -> ResourceType {
    ResourceType::Material
}

/// One row of an APU
///
/// `partial_cost` is a cache: it is recomputed by the cost model whenever a
/// field it depends on changes and is never authoritative on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLine {
    pub id: RowId,
    /// Catalog resource this row points at; unset while the row is mid-creation
    #[serde(default)]
    pub resource_ref: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_resource_type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub crew_size: Option<f64>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub waste_percent: f64,
    #[serde(default)]
    pub partial_cost: f64,
    #[serde(default)]
    pub order: usize,
    #[serde(default)]
    pub price_override_ref: Option<String>,
}

impl ResourceLine {
    /// Create an empty row awaiting catalog selection
    pub fn blank(id: RowId, order: usize) -> Self {
        Self {
            id,
            resource_ref: None,
            code: String::new(),
            description: String::new(),
            unit: String::new(),
            resource_type: ResourceType::Material,
            unit_price: 0.0,
            crew_size: None,
            quantity: 0.0,
            waste_percent: 0.0,
            partial_cost: 0.0,
            order,
            price_override_ref: None,
        }
    }

    pub fn unit_kind(&self) -> UnitKind {
        UnitKind::classify(&self.unit)
    }

    /// Labor in man-hours or equipment in machine-hours: quantity and crew
    /// size are derived from each other.
    pub fn is_crew_paired(&self) -> bool {
        matches!(
            (self.resource_type, self.unit_kind()),
            (ResourceType::Labor, UnitKind::ManHour)
                | (ResourceType::Equipment, UnitKind::MachineHour)
        )
    }

    /// Equipment priced as a percentage of labor (`%mo`)
    pub fn is_labor_percentage(&self) -> bool {
        self.resource_type == ResourceType::Equipment
            && self.unit_kind() == UnitKind::PercentOfLabor
    }

    /// Labor measured in man-hours; these rows feed the `%mo` aggregate
    pub fn is_labor_man_hour(&self) -> bool {
        self.resource_type == ResourceType::Labor && self.unit_kind() == UnitKind::ManHour
    }

    /// Row has a catalog resource and a description
    pub fn is_resolved(&self) -> bool {
        self.resource_ref.as_deref().is_some_and(|r| !r.is_empty())
            && !self.description.trim().is_empty()
    }

    /// Crew size, counting a missing or zero value as one
    pub fn crew_or_one(&self) -> f64 {
        match self.crew_size {
            Some(c) if c != 0.0 => c,
            _ => 1.0,
        }
    }

    /// Quantity including the waste allowance
    pub fn quantity_with_waste(&self) -> f64 {
        truncate4(self.quantity * (1.0 + self.waste_percent / 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_kind_is_case_insensitive() {
        assert_eq!(UnitKind::classify("HH"), UnitKind::ManHour);
        assert_eq!(UnitKind::classify(" hm "), UnitKind::MachineHour);
        assert_eq!(UnitKind::classify("%MO"), UnitKind::PercentOfLabor);
        assert_eq!(UnitKind::classify("m3"), UnitKind::Other);
    }

    #[test]
    fn row_id_round_trips_through_string() {
        let temp = RowId::temp();
        assert!(temp.is_temp());
        let raw: String = temp.clone().into();
        assert_eq!(RowId::from(raw), temp);
        assert_eq!(RowId::from("abc".to_string()), RowId::persisted("abc"));
    }

    #[test]
    fn crew_pairing_depends_on_type_and_unit() {
        let mut line = ResourceLine::blank(RowId::persisted("1"), 0);
        line.resource_type = ResourceType::Labor;
        line.unit = "hh".into();
        assert!(line.is_crew_paired());

        line.resource_type = ResourceType::Material;
        assert!(!line.is_crew_paired());

        line.resource_type = ResourceType::Equipment;
        line.unit = "HM".into();
        assert!(line.is_crew_paired());
        line.unit = "%mo".into();
        assert!(line.is_labor_percentage());
        assert!(!line.is_crew_paired());
    }

    #[test]
    fn resource_type_parses_codes_and_names() {
        assert_eq!("mo".parse::<ResourceType>().unwrap(), ResourceType::Labor);
        assert_eq!("EQUIPO".parse::<ResourceType>().unwrap(), ResourceType::Equipment);
        assert!("XX".parse::<ResourceType>().is_err());
    }

    #[test]
    fn unresolved_without_reference_or_description() {
        let mut line = ResourceLine::blank(RowId::temp(), 0);
        assert!(!line.is_resolved());
        line.resource_ref = Some("r1".into());
        assert!(!line.is_resolved());
        line.description = "Cemento".into();
        assert!(line.is_resolved());
    }
}
