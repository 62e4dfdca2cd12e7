//! Payloads handed to the persistence layer
//!
//! Every numeric field is rounded here, before it leaves the engine: the
//! store is never relied upon to round.

use serde::{Deserialize, Serialize};

use crate::apu::{ApuParams, LineItemRef};
use crate::numeric::{round2, truncate4};
use crate::resource::{ResourceLine, ResourceType};

/// Resource line as sent to `add_resource_line` / `update_resource_line`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePayload {
    pub resource_id: String,
    pub code: String,
    pub description: String,
    pub unit: String,
    pub resource_type: ResourceType,
    pub price_override_id: Option<String>,
    pub unit_price: f64,
    pub crew_size: Option<f64>,
    pub quantity: f64,
    pub waste_percent: f64,
    pub quantity_with_waste: f64,
    pub partial_cost: f64,
    pub order: usize,
}

impl LinePayload {
    /// Build the payload for a resolved line at the given position
    pub fn from_line(line: &ResourceLine, order: usize) -> Self {
        Self {
            resource_id: line.resource_ref.clone().unwrap_or_default(),
            code: line.code.clone(),
            description: line.description.clone(),
            unit: line.unit.clone(),
            resource_type: line.resource_type,
            price_override_id: line.price_override_ref.clone(),
            unit_price: round2(line.unit_price),
            crew_size: line.crew_size.filter(|c| *c != 0.0).map(truncate4),
            quantity: truncate4(line.quantity),
            waste_percent: truncate4(line.waste_percent),
            quantity_with_waste: line.quantity_with_waste(),
            partial_cost: round2(line.partial_cost),
            order,
        }
    }
}

/// Request for the first save of an APU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateApuRequest {
    pub line_item: LineItemRef,
    #[serde(flatten)]
    pub params: ApuParams,
    pub lines: Vec<LinePayload>,
}

/// Partial update of the APU parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamsUpdate {
    pub rendimiento: Option<f64>,
    pub jornada: Option<f64>,
}

impl ParamsUpdate {
    pub fn is_empty(&self) -> bool {
        self.rendimiento.is_none() && self.jornada.is_none()
    }

    /// Apply the update on top of existing parameters
    pub fn apply_to(&self, params: ApuParams) -> ApuParams {
        ApuParams {
            rendimiento: self.rendimiento.unwrap_or(params.rendimiento),
            jornada: self.jornada.unwrap_or(params.jornada),
        }
    }
}
