//! Per-row synchronization rules

use apu_model::{ApuParams, Error as ModelError, ResourceLine, round2, truncate4};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A user edit to one numeric field of a row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldEdit {
    Quantity(f64),
    CrewSize(f64),
    UnitPrice(f64),
    WastePercent(f64),
}

impl FieldEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldEdit::Quantity(_) => "quantity",
            FieldEdit::CrewSize(_) => "crew_size",
            FieldEdit::UnitPrice(_) => "unit_price",
            FieldEdit::WastePercent(_) => "waste_percent",
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            FieldEdit::Quantity(v)
            | FieldEdit::CrewSize(v)
            | FieldEdit::UnitPrice(v)
            | FieldEdit::WastePercent(v) => v,
        }
    }
}

/// How a row keeps its fields consistent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRule {
    /// Labor in `hh` or equipment in `hm`: quantity and crew size derive
    /// from each other
    CrewPaired,
    /// Equipment in `%mo`: price follows the labor aggregate
    LaborPercentage,
    /// Every field is edited on its own
    Independent,
}

impl SyncRule {
    pub fn for_line(line: &ResourceLine) -> Self {
        if line.is_crew_paired() {
            SyncRule::CrewPaired
        } else if line.is_labor_percentage() {
            SyncRule::LaborPercentage
        } else {
            SyncRule::Independent
        }
    }
}

/// `truncate4(jornada × crew / rendimiento)`, zero when undefined
pub fn quantity_from_crew(crew: f64, params: &ApuParams) -> f64 {
    if params.rendimiento <= 0.0 || params.jornada <= 0.0 {
        return 0.0;
    }
    truncate4((params.jornada * crew) / params.rendimiento)
}

/// `truncate4(quantity × rendimiento / jornada)`, zero when undefined
pub fn crew_from_quantity(quantity: f64, params: &ApuParams) -> f64 {
    if params.rendimiento <= 0.0 || params.jornada <= 0.0 {
        return 0.0;
    }
    truncate4((quantity * params.rendimiento) / params.jornada)
}

/// Apply one field edit to a single row, deriving its paired field.
///
/// Partial costs are left to the recompute pass.
pub fn edit_line(line: &ResourceLine, edit: FieldEdit, params: &ApuParams) -> Result<ResourceLine> {
    let value = ModelError::check_field(edit.field_name(), edit.value())?;
    let mut next = line.clone();

    match (SyncRule::for_line(line), edit) {
        (SyncRule::CrewPaired, FieldEdit::CrewSize(_)) => {
            let crew = truncate4(value);
            next.crew_size = Some(crew);
            next.quantity = quantity_from_crew(crew, params);
        }
        (SyncRule::CrewPaired, FieldEdit::Quantity(_)) => {
            next.quantity = truncate4(value);
            next.crew_size = Some(crew_from_quantity(next.quantity, params));
        }
        (SyncRule::LaborPercentage, FieldEdit::UnitPrice(_)) => {
            return Err(Error::DerivedPrice {
                description: line.description.clone(),
            });
        }
        (_, FieldEdit::Quantity(_)) => next.quantity = truncate4(value),
        (_, FieldEdit::CrewSize(_)) => next.crew_size = Some(truncate4(value)),
        (_, FieldEdit::UnitPrice(_)) => next.unit_price = round2(value),
        (_, FieldEdit::WastePercent(_)) => next.waste_percent = truncate4(value),
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apu_model::{ResourceType, RowId};

    fn labor_hh() -> ResourceLine {
        let mut line = ResourceLine::blank(RowId::persisted("mo-1"), 0);
        line.resource_type = ResourceType::Labor;
        line.unit = "hh".into();
        line.description = "Operario".into();
        line.unit_price = 10.0;
        line
    }

    fn params() -> ApuParams {
        ApuParams::new(2.0, 8.0).unwrap()
    }

    #[test]
    fn crew_edit_derives_quantity() {
        let next = edit_line(&labor_hh(), FieldEdit::CrewSize(3.0), &params()).unwrap();
        assert_eq!(next.crew_size, Some(3.0));
        assert_eq!(next.quantity, 12.0);
    }

    #[test]
    fn quantity_edit_derives_crew() {
        let next = edit_line(&labor_hh(), FieldEdit::Quantity(6.0), &params()).unwrap();
        assert_eq!(next.quantity, 6.0);
        assert_eq!(next.crew_size, Some(1.5));
    }

    #[test]
    fn price_edit_leaves_pair_alone() {
        let mut line = labor_hh();
        line.crew_size = Some(2.0);
        line.quantity = 8.0;
        let next = edit_line(&line, FieldEdit::UnitPrice(12.345), &params()).unwrap();
        assert_eq!(next.unit_price, 12.35);
        assert_eq!(next.crew_size, Some(2.0));
        assert_eq!(next.quantity, 8.0);
    }

    #[test]
    fn labor_percentage_price_is_not_editable() {
        let mut line = labor_hh();
        line.resource_type = ResourceType::Equipment;
        line.unit = "%mo".into();
        let err = edit_line(&line, FieldEdit::UnitPrice(5.0), &params()).unwrap_err();
        assert!(matches!(err, Error::DerivedPrice { .. }));

        let next = edit_line(&line, FieldEdit::Quantity(3.123456), &params()).unwrap();
        assert_eq!(next.quantity, 3.1234);
    }

    #[test]
    fn independent_rows_keep_fields_apart() {
        let mut line = labor_hh();
        line.resource_type = ResourceType::Material;
        line.unit = "kg".into();
        let next = edit_line(&line, FieldEdit::CrewSize(2.0), &params()).unwrap();
        assert_eq!(next.crew_size, Some(2.0));
        assert_eq!(next.quantity, 0.0);
    }

    #[test]
    fn negative_values_are_rejected() {
        let err = edit_line(&labor_hh(), FieldEdit::Quantity(-1.0), &params()).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
        assert!(edit_line(&labor_hh(), FieldEdit::UnitPrice(f64::NAN), &params()).is_err());
    }

    #[test]
    fn derivation_guards_division() {
        let broken = ApuParams {
            rendimiento: 0.0,
            jornada: 8.0,
        };
        assert_eq!(quantity_from_crew(3.0, &broken), 0.0);
        assert_eq!(crew_from_quantity(3.0, &broken), 0.0);
    }
}
