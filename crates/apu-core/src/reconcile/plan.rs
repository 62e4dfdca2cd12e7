//! Planning a save
//!
//! The working rows are compared with the snapshot and turned into the
//! smallest set of persistence operations:
//!
//! - snapshot rows missing from the working set are deleted
//! - new rows (temporary id, flagged new, or unknown to the snapshot) are created
//! - existing rows are updated only when a persisted field moved
//! - parameters are updated only when they moved
//!
//! Without a persisted APU the whole set becomes a single create request.

use std::collections::HashSet;

use apu_model::numeric::within;
use apu_model::{
    ApuParams, CreateApuRequest, LineItemRef, LinePayload, ParamsUpdate, ResourceLine, RowId,
};
use serde::{Deserialize, Serialize};

use super::Snapshot;
use super::validation::validate;
use crate::config::DEFAULT_CHANGE_TOLERANCE;
use crate::set::EditableRow;
use crate::{Error, Result};

/// One persistence operation on a resource line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RowOperation {
    /// Add a line; `row` is the working id to promote once stored
    Create { row: RowId, payload: LinePayload },
    Update { id: String, payload: LinePayload },
    Delete { id: String },
}

impl RowOperation {
    pub fn kind(&self) -> &'static str {
        match self {
            RowOperation::Create { .. } => "create",
            RowOperation::Update { .. } => "update",
            RowOperation::Delete { .. } => "delete",
        }
    }
}

/// First save of an APU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApuCreation {
    pub request: CreateApuRequest,
    /// Working ids, indexed by the `order` of each payload
    pub rows: Vec<RowId>,
}

/// Everything a save will send to the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavePlan {
    pub create_apu: Option<ApuCreation>,
    pub params_update: Option<ParamsUpdate>,
    pub operations: Vec<RowOperation>,
}

impl SavePlan {
    pub fn is_empty(&self) -> bool {
        self.create_apu.is_none() && self.params_update.is_none() && self.operations.is_empty()
    }

    /// Number of store calls the plan makes
    pub fn change_count(&self) -> usize {
        usize::from(self.create_apu.is_some())
            + usize::from(self.params_update.is_some())
            + self.operations.len()
    }

    pub fn creates(&self) -> usize {
        self.count(|op| matches!(op, RowOperation::Create { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|op| matches!(op, RowOperation::Update { .. }))
    }

    pub fn deletes(&self) -> usize {
        self.count(|op| matches!(op, RowOperation::Delete { .. }))
    }

    fn count(&self, predicate: impl Fn(&RowOperation) -> bool) -> usize {
        self.operations.iter().filter(|op| predicate(op)).count()
    }
}

/// Builds [`SavePlan`]s with a fixed change tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciler {
    tolerance: f64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_TOLERANCE)
    }
}

impl Reconciler {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Validate the working set and diff it against the snapshot.
    ///
    /// Returns [`Error::Validation`] with every failing row when the set
    /// cannot be saved.
    pub fn plan(
        &self,
        line_item: &LineItemRef,
        apu_id: Option<&str>,
        params: &ApuParams,
        rows: &[EditableRow],
        baseline: Option<&Snapshot>,
    ) -> Result<SavePlan> {
        let lines: Vec<ResourceLine> = rows.iter().map(|r| r.line.clone()).collect();
        let report = validate(&lines);
        if !report.is_empty() {
            return Err(Error::Validation(report));
        }

        let Some(_apu_id) = apu_id else {
            return Ok(self.plan_creation(line_item, params, &lines));
        };

        let mut plan = SavePlan {
            params_update: self.params_update(params, baseline.map(|b| &b.params)),
            ..SavePlan::default()
        };

        // A stored row re-added as new is created again, so its old copy goes
        let working: HashSet<&str> = rows
            .iter()
            .filter(|r| !r.is_new && !r.line.id.is_temp())
            .map(|r| r.line.id.as_str())
            .collect();

        if let Some(baseline) = baseline {
            for stored in &baseline.lines {
                if !working.contains(stored.id.as_str()) {
                    plan.operations.push(RowOperation::Delete {
                        id: stored.id.to_string(),
                    });
                }
            }
        }

        for (order, row) in rows.iter().enumerate() {
            let line = &row.line;
            let stored = baseline.and_then(|b| b.line(line.id.as_str()));

            match stored {
                Some(stored) if !row.is_new && !line.id.is_temp() => {
                    if self.line_changed(stored, line, order) {
                        plan.operations.push(RowOperation::Update {
                            id: line.id.to_string(),
                            payload: LinePayload::from_line(line, order),
                        });
                    }
                }
                _ => plan.operations.push(RowOperation::Create {
                    row: line.id.clone(),
                    payload: LinePayload::from_line(line, order),
                }),
            }
        }

        tracing::debug!(
            creates = plan.creates(),
            updates = plan.updates(),
            deletes = plan.deletes(),
            params = plan.params_update.is_some(),
            "Planned save"
        );
        Ok(plan)
    }

    fn plan_creation(
        &self,
        line_item: &LineItemRef,
        params: &ApuParams,
        lines: &[ResourceLine],
    ) -> SavePlan {
        if lines.is_empty() {
            return SavePlan::default();
        }
        let request = CreateApuRequest {
            line_item: line_item.clone(),
            params: *params,
            lines: lines
                .iter()
                .enumerate()
                .map(|(order, line)| LinePayload::from_line(line, order))
                .collect(),
        };
        tracing::debug!(lines = lines.len(), "Planned APU creation");
        SavePlan {
            create_apu: Some(ApuCreation {
                request,
                rows: lines.iter().map(|l| l.id.clone()).collect(),
            }),
            ..SavePlan::default()
        }
    }

    /// Fields that moved beyond the tolerance, if any
    fn params_update(
        &self,
        params: &ApuParams,
        stored: Option<&ApuParams>,
    ) -> Option<ParamsUpdate> {
        let update = match stored {
            Some(stored) => ParamsUpdate {
                rendimiento: (!within(params.rendimiento, stored.rendimiento, self.tolerance))
                    .then_some(params.rendimiento),
                jornada: (!within(params.jornada, stored.jornada, self.tolerance))
                    .then_some(params.jornada),
            },
            None => ParamsUpdate {
                rendimiento: Some(params.rendimiento),
                jornada: Some(params.jornada),
            },
        };
        (!update.is_empty()).then_some(update)
    }

    /// Whether a persisted field differs from the stored line.
    ///
    /// `order` is the row's position in the working set, which is what
    /// will be persisted.
    fn line_changed(&self, stored: &ResourceLine, line: &ResourceLine, order: usize) -> bool {
        let moved = |a: f64, b: f64| !within(a, b, self.tolerance);

        moved(stored.quantity, line.quantity)
            || moved(stored.unit_price, line.unit_price)
            || moved(stored.partial_cost, line.partial_cost)
            || moved(stored.crew_size.unwrap_or(0.0), line.crew_size.unwrap_or(0.0))
            || moved(stored.waste_percent, line.waste_percent)
            || stored.price_override_ref != line.price_override_ref
            || stored.order != order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apu_model::ResourceType;
    use pretty_assertions::assert_eq;

    fn line(id: &str, order: usize) -> ResourceLine {
        let mut line = ResourceLine::blank(RowId::persisted(id), order);
        line.resource_ref = Some(format!("cat-{}", id));
        line.description = id.to_uppercase();
        line.resource_type = ResourceType::Material;
        line.unit = "m3".into();
        line.quantity = 2.0;
        line.unit_price = 10.0;
        line.partial_cost = 20.0;
        line
    }

    fn item() -> LineItemRef {
        LineItemRef::new("li-1", "p-1", "b-1")
    }

    fn baseline() -> Snapshot {
        Snapshot::new(ApuParams::default(), vec![line("a", 0), line("b", 1), line("c", 2)])
    }

    fn rows(lines: Vec<ResourceLine>) -> Vec<EditableRow> {
        lines.into_iter().map(EditableRow::persisted).collect()
    }

    #[test]
    fn unchanged_set_plans_nothing() {
        let snapshot = baseline();
        let plan = Reconciler::default()
            .plan(
                &item(),
                Some("apu-1"),
                &snapshot.params,
                &rows(snapshot.lines.clone()),
                Some(&snapshot),
            )
            .unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.change_count(), 0);
    }

    #[test]
    fn sub_tolerance_noise_is_ignored() {
        let snapshot = baseline();
        let mut lines = snapshot.lines.clone();
        lines[0].quantity += 0.00005;
        let plan = Reconciler::default()
            .plan(&item(), Some("apu-1"), &snapshot.params, &rows(lines), Some(&snapshot))
            .unwrap();
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn removing_a_row_renumbers_the_rest() {
        let snapshot = baseline();
        let lines = vec![snapshot.lines[1].clone(), snapshot.lines[2].clone()];
        let plan = Reconciler::default()
            .plan(&item(), Some("apu-1"), &snapshot.params, &rows(lines), Some(&snapshot))
            .unwrap();

        assert_eq!(plan.deletes(), 1);
        assert_eq!(plan.updates(), 2);
        let orders: Vec<usize> = plan
            .operations
            .iter()
            .filter_map(|op| match op {
                RowOperation::Update { payload, .. } => Some(payload.order),
                _ => None,
            })
            .collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn override_change_triggers_update() {
        let snapshot = baseline();
        let mut lines = snapshot.lines.clone();
        lines[2].price_override_ref = Some("ov-1".into());
        let plan = Reconciler::default()
            .plan(&item(), Some("apu-1"), &snapshot.params, &rows(lines), Some(&snapshot))
            .unwrap();
        assert_eq!(
            plan.operations.iter().map(RowOperation::kind).collect::<Vec<_>>(),
            vec!["update"]
        );
    }

    #[test]
    fn stored_row_readded_as_new_replaces_its_copy() {
        let snapshot = Snapshot::new(ApuParams::default(), vec![line("c", 0)]);
        let working = vec![EditableRow::fresh(line("c", 0))];
        let plan = Reconciler::default()
            .plan(&item(), Some("apu-1"), &snapshot.params, &working, Some(&snapshot))
            .unwrap();
        assert_eq!(
            plan.operations.iter().map(RowOperation::kind).collect::<Vec<_>>(),
            vec!["delete", "create"]
        );
    }

    #[test]
    fn parameters_are_diffed_per_field() {
        let snapshot = baseline();
        let params = ApuParams::new(snapshot.params.rendimiento, 9.0).unwrap();
        let plan = Reconciler::default()
            .plan(&item(), Some("apu-1"), &params, &rows(snapshot.lines.clone()), Some(&snapshot))
            .unwrap();
        assert_eq!(
            plan.params_update,
            Some(ParamsUpdate {
                rendimiento: None,
                jornada: Some(9.0),
            })
        );
    }

    #[test]
    fn no_apu_means_single_creation() {
        let lines = vec![line("a", 0), line("b", 1)];
        let plan = Reconciler::default()
            .plan(&item(), None, &ApuParams::default(), &rows(lines), None)
            .unwrap();
        let creation = plan.create_apu.as_ref().unwrap();
        assert_eq!(creation.request.lines.len(), 2);
        assert_eq!(creation.rows[1], RowId::persisted("b"));
        assert!(plan.operations.is_empty());
        assert!(plan.params_update.is_none());
    }

    #[test]
    fn empty_set_without_apu_plans_nothing() {
        let plan = Reconciler::default()
            .plan(&item(), None, &ApuParams::default(), &[], None)
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn invalid_rows_block_planning() {
        let mut bad = line("a", 0);
        bad.quantity = 0.0;
        let err = Reconciler::default()
            .plan(&item(), Some("apu-1"), &ApuParams::default(), &rows(vec![bad]), None)
            .unwrap_err();
        match err {
            Error::Validation(report) => assert_eq!(report.missing_quantity, vec!["A"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
