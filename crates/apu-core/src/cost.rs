//! Cost model
//!
//! Maps a resource line and the APU parameters to the line's partial cost.
//! The formula is picked by [`Formula::select`] from the resource type and
//! unit kind; every combination is covered by the match.
//!
//! Equipment measured in `%mo` depends on the whole set: its cost is a
//! percentage of the summed man-hour labor cost, carried in
//! [`CostContext`].

use apu_model::{ApuParams, ResourceLine, ResourceType, UnitKind, round2};
use serde::{Deserialize, Serialize};

/// Costing formula for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// `quantity × (1 + waste/100) × price`
    WasteAdjusted,
    /// `(1/rendimiento) × jornada × crew × price`
    CrewTime,
    /// `labor man-hour sum × quantity / 100`
    LaborPercentage,
    /// `quantity × price`
    Direct,
}

impl Formula {
    pub fn select(resource_type: ResourceType, unit: UnitKind) -> Self {
        match (resource_type, unit) {
            (ResourceType::Material, _) => Formula::WasteAdjusted,
            (ResourceType::Labor, _) => Formula::CrewTime,
            (ResourceType::Equipment, UnitKind::PercentOfLabor) => Formula::LaborPercentage,
            (ResourceType::Equipment, UnitKind::MachineHour) => Formula::CrewTime,
            (ResourceType::Equipment, UnitKind::ManHour | UnitKind::Other) => Formula::Direct,
            (ResourceType::Subcontract, _) => Formula::Direct,
        }
    }

    pub fn for_line(line: &ResourceLine) -> Self {
        Self::select(line.resource_type, line.unit_kind())
    }
}

/// Set-level inputs needed to cost a single line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostContext {
    pub params: ApuParams,
    /// Unrounded labor cost of all `hh` labor lines
    pub labor_hh_sum: f64,
}

impl CostContext {
    pub fn for_lines(lines: &[ResourceLine], params: ApuParams) -> Self {
        Self {
            params,
            labor_hh_sum: labor_hh_sum(lines, &params),
        }
    }

    /// Price every `%mo` equipment line takes
    pub fn labor_percentage_price(&self) -> f64 {
        round2(self.labor_hh_sum)
    }
}

/// Unrounded crew-time cost; zero when the parameters cannot be divided by
fn crew_time_cost(line: &ResourceLine, params: &ApuParams) -> f64 {
    match params.hours_per_unit() {
        Some(hours) => hours * line.crew_or_one() * line.unit_price,
        None => 0.0,
    }
}

/// Sum of crew-time cost over labor lines measured in man-hours
pub fn labor_hh_sum(lines: &[ResourceLine], params: &ApuParams) -> f64 {
    lines
        .iter()
        .filter(|l| l.is_labor_man_hour())
        .map(|l| crew_time_cost(l, params))
        .sum()
}

/// Partial cost of a line, rounded to money precision
pub fn partial_cost(line: &ResourceLine, ctx: &CostContext) -> f64 {
    match Formula::for_line(line) {
        Formula::WasteAdjusted => {
            let with_waste = line.quantity * (1.0 + line.waste_percent / 100.0);
            round2(with_waste * line.unit_price)
        }
        Formula::CrewTime => round2(crew_time_cost(line, &ctx.params)),
        Formula::LaborPercentage => round2(ctx.labor_hh_sum * (line.quantity / 100.0)),
        Formula::Direct => round2(line.quantity * line.unit_price),
    }
}

/// Cost breakdown of an APU by resource type
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ApuTotals {
    pub materials: f64,
    pub labor: f64,
    pub equipment: f64,
    pub subcontracts: f64,
    /// Sum of all partial costs; the line item's unit price
    pub direct: f64,
}

impl ApuTotals {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a ResourceLine>) -> Self {
        let mut totals = lines.into_iter().fold(Self::default(), |mut acc, line| {
            match line.resource_type {
                ResourceType::Material => acc.materials += line.partial_cost,
                ResourceType::Labor => acc.labor += line.partial_cost,
                ResourceType::Equipment => acc.equipment += line.partial_cost,
                ResourceType::Subcontract => acc.subcontracts += line.partial_cost,
            }
            acc.direct += line.partial_cost;
            acc
        });
        totals.materials = round2(totals.materials);
        totals.labor = round2(totals.labor);
        totals.equipment = round2(totals.equipment);
        totals.subcontracts = round2(totals.subcontracts);
        totals.direct = round2(totals.direct);
        totals
    }

    pub fn for_type(&self, resource_type: ResourceType) -> f64 {
        match resource_type {
            ResourceType::Material => self.materials,
            ResourceType::Labor => self.labor,
            ResourceType::Equipment => self.equipment,
            ResourceType::Subcontract => self.subcontracts,
        }
    }
}
