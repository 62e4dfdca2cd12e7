//! APU aggregate and line-item references

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resource::ResourceLine;

/// Prefix of line items that exist only client-side
pub const UNSAVED_LINE_ITEM_PREFIX: &str = "temp_";

pub const DEFAULT_RENDIMIENTO: f64 = 1.0;
pub const DEFAULT_JORNADA: f64 = 8.0;

fn default_rendimiento() -> f64 {
    DEFAULT_RENDIMIENTO
}

fn default_jornada() -> f64 {
    DEFAULT_JORNADA
}

/// Yield and shift length of an APU
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApuParams {
    /// Output quantity per unit of labor or equipment time
    #[serde(default = "default_rendimiento")]
    pub rendimiento: f64,
    /// Shift length in hours
    #[serde(default = "default_jornada")]
    pub jornada: f64,
}

impl Default for ApuParams {
    fn default() -> Self {
        Self {
            rendimiento: DEFAULT_RENDIMIENTO,
            jornada: DEFAULT_JORNADA,
        }
    }
}

impl ApuParams {
    /// Create parameters, rejecting zero, negative or non-finite values
    pub fn new(rendimiento: f64, jornada: f64) -> Result<Self> {
        Ok(Self {
            rendimiento: check_positive("rendimiento", rendimiento)?,
            jornada: check_positive("jornada", jornada)?,
        })
    }

    /// Hours of crew time per unit of output, `(1 / rendimiento) × jornada`.
    ///
    /// `None` when either parameter is not positive; time-based formulas
    /// then cost zero instead of dividing.
    pub fn hours_per_unit(&self) -> Option<f64> {
        if self.rendimiento > 0.0 && self.jornada > 0.0 {
            Some((1.0 / self.rendimiento) * self.jornada)
        } else {
            None
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// The line item (partida) an APU belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRef {
    pub id: String,
    pub project: String,
    pub budget: String,
}

impl LineItemRef {
    pub fn new(
        id: impl Into<String>,
        project: impl Into<String>,
        budget: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project: project.into(),
            budget: budget.into(),
        }
    }

    /// Line items with a temporary id have never been stored, so they
    /// cannot own a persisted APU yet.
    pub fn is_unsaved(&self) -> bool {
        self.id.starts_with(UNSAVED_LINE_ITEM_PREFIX)
    }
}

/// An APU as known to the backing store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedApu {
    pub id: String,
    pub line_item: LineItemRef,
    #[serde(flatten)]
    pub params: ApuParams,
    #[serde(default)]
    pub lines: Vec<ResourceLine>,
}

impl PersistedApu {
    /// Sum of the stored partial costs
    pub fn direct_cost(&self) -> f64 {
        self.lines.iter().map(|l| l.partial_cost).sum()
    }
}
