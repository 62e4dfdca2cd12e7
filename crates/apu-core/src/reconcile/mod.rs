//! Reconciliation of a working set against its persisted snapshot
//!
//! This module provides:
//! - **validation**: aggregated pre-save checks that block a save
//! - **plan**: the diff turning a working set into persistence operations
//! - **executor**: running a plan against a store, row operations concurrently
//!
//! A save is planned first and executed second. Planning never touches the
//! store, so a failed validation costs no persistence call.

mod executor;
mod plan;
mod validation;

pub use executor::{SaveOutcome, execute};
pub use plan::{ApuCreation, Reconciler, RowOperation, SavePlan};
pub use validation::{ValidationReport, validate};

use apu_model::{ApuParams, PersistedApu, ResourceLine};
use serde::{Deserialize, Serialize};

/// Last persisted state of an APU, as the editor saw it
///
/// Always held as an owned deep copy, never shared with the working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub params: ApuParams,
    pub lines: Vec<ResourceLine>,
}

impl Snapshot {
    pub fn new(params: ApuParams, lines: Vec<ResourceLine>) -> Self {
        Self { params, lines }
    }

    pub fn line(&self, id: &str) -> Option<&ResourceLine> {
        self.lines.iter().find(|l| l.id.as_str() == id)
    }
}

impl From<&PersistedApu> for Snapshot {
    fn from(apu: &PersistedApu) -> Self {
        let mut lines = apu.lines.clone();
        lines.sort_by_key(|l| l.order);
        Self {
            params: apu.params,
            lines,
        }
    }
}
