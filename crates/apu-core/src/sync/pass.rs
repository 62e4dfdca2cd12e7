//! The recompute pass

use apu_model::{ApuParams, ResourceLine, RowId};

use super::rules::{FieldEdit, SyncRule, edit_line, quantity_from_crew};
use crate::cost::{CostContext, partial_cost};
use crate::{Error, Result};

/// Recompute derived prices and partial costs over a whole set.
///
/// The labor aggregate is taken from the input once, so a single mapping
/// settles every `%mo` row: labor rows never depend on `%mo` rows.
pub fn recompute(lines: &[ResourceLine], params: &ApuParams) -> Vec<ResourceLine> {
    let ctx = CostContext::for_lines(lines, *params);
    let labor_price = ctx.labor_percentage_price();

    lines
        .iter()
        .map(|line| {
            let mut next = line.clone();
            if line.is_labor_percentage() {
                next.unit_price = labor_price;
            }
            next.partial_cost = partial_cost(&next, &ctx);
            next
        })
        .collect()
}

/// Apply a field edit to one row, then run the recompute pass.
pub fn apply_field_edit(
    lines: &[ResourceLine],
    row: &RowId,
    edit: FieldEdit,
    params: &ApuParams,
) -> Result<Vec<ResourceLine>> {
    let position = lines
        .iter()
        .position(|l| &l.id == row)
        .ok_or_else(|| Error::RowNotFound { id: row.to_string() })?;

    let mut edited = lines.to_vec();
    edited[position] = edit_line(&lines[position], edit, params)?;
    Ok(recompute(&edited, params))
}

/// Re-derive quantities for new parameters, then run the recompute pass.
///
/// Only crew-paired rows that carry a crew size are touched.
pub fn apply_parameters(lines: &[ResourceLine], params: &ApuParams) -> Vec<ResourceLine> {
    let rederived: Vec<ResourceLine> = lines
        .iter()
        .map(|line| {
            let mut next = line.clone();
            if SyncRule::for_line(line) == SyncRule::CrewPaired
                && let Some(crew) = line.crew_size.filter(|c| *c != 0.0)
            {
                next.quantity = quantity_from_crew(crew, params);
            }
            next
        })
        .collect();
    recompute(&rederived, params)
}
