//! Draft files
//!
//! A draft is a TOML description of the working state of one APU:
//!
//! ```toml
//! [line_item]
//! id = "li-1"
//! project = "p-1"
//! budget = "b-1"
//!
//! [params]
//! rendimiento = 2.0
//! jornada = 8.0
//!
//! [[lines]]
//! id = "line-3"          # omit for a new row
//! resource = "peon"
//! description = "Peon"
//! type = "MO"
//! unit = "hh"
//! unit_price = 12.5
//! crew_size = 2.0
//! ```
//!
//! Crew-paired rows may give either `crew_size` or `quantity`; the other is
//! derived.

use std::path::Path;

use apu_core::sync::{FieldEdit, edit_line};
use apu_model::{ApuParams, LineItemRef, ResourceLine, ResourceType, RowId};
use serde::Deserialize;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Draft {
    pub line_item: LineItemRef,
    #[serde(default)]
    pub params: Option<ApuParams>,
    #[serde(default)]
    pub lines: Vec<DraftLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DraftLine {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub crew_size: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub waste_percent: f64,
    #[serde(default)]
    pub price_override: Option<String>,
}

impl Draft {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::user(format!("Draft not found: {}", path.display())));
        }
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Build resource lines, deriving crew-paired fields under `params`
    pub fn resource_lines(&self, params: &ApuParams) -> Result<Vec<ResourceLine>> {
        self.lines
            .iter()
            .enumerate()
            .map(|(order, line)| line.to_resource_line(order, params))
            .collect()
    }
}

impl DraftLine {
    fn to_resource_line(&self, order: usize, params: &ApuParams) -> Result<ResourceLine> {
        let id = match &self.id {
            Some(id) => RowId::persisted(id.clone()),
            None => RowId::temp(),
        };
        let resource_type = match &self.resource_type {
            Some(raw) => raw.parse::<ResourceType>()?,
            None => ResourceType::Material,
        };

        let mut line = ResourceLine::blank(id, order);
        line.resource_ref = self.resource.clone();
        line.code = self.code.clone();
        line.description = self.description.clone();
        line.resource_type = resource_type;
        line.unit = self.unit.clone();
        line.unit_price = self.unit_price;
        line.waste_percent = self.waste_percent;
        line.price_override_ref = self.price_override.clone();
        line.crew_size = self.crew_size;
        line.quantity = self.quantity.unwrap_or_default();

        // Route values through the field rules so they are truncated and
        // paired the same way an interactive edit would be.
        if let Some(crew) = self.crew_size {
            line = edit_line(&line, FieldEdit::CrewSize(crew), params)?;
        } else if let Some(quantity) = self.quantity {
            line = edit_line(&line, FieldEdit::Quantity(quantity), params)?;
        }
        if !line.is_labor_percentage() {
            line = edit_line(&line, FieldEdit::UnitPrice(self.unit_price), params)?;
        }
        line = edit_line(&line, FieldEdit::WastePercent(self.waste_percent), params)?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DRAFT: &str = r#"
[line_item]
id = "li-1"
project = "p-1"
budget = "b-1"

[params]
rendimiento = 2.0
jornada = 8.0

[[lines]]
id = "line-1"
resource = "peon"
description = "Peon"
type = "MO"
unit = "hh"
unit_price = 10.0
crew_size = 3.0

[[lines]]
resource = "tools"
description = "Herramientas"
type = "EQ"
unit = "%mo"
quantity = 5.0
"#;

    #[test]
    fn parses_and_derives_crew_quantities() {
        let draft = Draft::parse(DRAFT).unwrap();
        let params = draft.params.unwrap();
        let lines = draft.resource_lines(&params).unwrap();

        assert_eq!(lines[0].id, RowId::persisted("line-1"));
        assert_eq!(lines[0].resource_type, ResourceType::Labor);
        assert_eq!(lines[0].quantity, 12.0);
        assert!(lines[1].id.is_temp());
        assert_eq!(lines[1].order, 1);
        assert_eq!(lines[1].quantity, 5.0);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let content = DRAFT.replace("type = \"EQ\"", "type = \"XX\"");
        let draft = Draft::parse(&content).unwrap();
        let err = draft.resource_lines(&ApuParams::default()).unwrap_err();
        assert!(matches!(err, CliError::Model(_)));
    }

    #[test]
    fn params_are_optional() {
        let draft =
            Draft::parse("[line_item]\nid = \"x\"\nproject = \"p\"\nbudget = \"b\"\n").unwrap();
        assert_eq!(draft.params, None);
        assert!(draft.lines.is_empty());
    }
}
