//! Running a plan against a store

use apu_model::RowId;
use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use super::plan::{RowOperation, SavePlan};
use crate::store::ApuStore;
use crate::{Error, Result};

/// What a successful save changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// Id of the APU created by this save, if it was the first one
    pub created_apu: Option<String>,
    /// Working id to stored id, for every created line
    pub created: Vec<(RowId, String)>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub params_updated: bool,
}

impl SaveOutcome {
    /// Number of changes applied to the store
    pub fn change_count(&self) -> usize {
        self.created.len()
            + self.updated.len()
            + self.deleted.len()
            + usize::from(self.params_updated)
    }

    pub fn is_empty(&self) -> bool {
        self.created_apu.is_none() && self.change_count() == 0
    }
}

enum Applied {
    Created(RowId, String),
    Updated(String),
    Deleted(String),
}

/// Execute a plan.
///
/// Row operations are started together and awaited as a group alongside
/// the parameter update. The first failure aborts the save; operations
/// already applied by then are not undone here.
pub async fn execute(
    plan: &SavePlan,
    apu_id: Option<&str>,
    store: &dyn ApuStore,
) -> Result<SaveOutcome> {
    let mut outcome = SaveOutcome::default();

    if let Some(creation) = &plan.create_apu {
        let apu = store.create_apu(&creation.request).await?;
        for line in &apu.lines {
            if let Some(row) = creation.rows.get(line.order) {
                outcome.created.push((row.clone(), line.id.to_string()));
            }
        }
        tracing::info!(apu = %apu.id, lines = apu.lines.len(), "Created APU");
        outcome.created_apu = Some(apu.id);
        return Ok(outcome);
    }

    if plan.params_update.is_none() && plan.operations.is_empty() {
        return Ok(outcome);
    }
    let apu_id = apu_id.ok_or_else(|| Error::store("save", "no APU to apply row operations to"))?;

    let params = async {
        match &plan.params_update {
            Some(update) => store.update_apu_parameters(apu_id, update).await.map(|()| true),
            None => Ok(false),
        }
    };

    let rows: Vec<BoxFuture<'_, Result<Applied>>> = plan
        .operations
        .iter()
        .map(|op| match op {
            RowOperation::Create { row, payload } => async move {
                let id = store.add_resource_line(apu_id, payload).await?;
                Ok(Applied::Created(row.clone(), id))
            }
            .boxed(),
            RowOperation::Update { id, payload } => async move {
                store.update_resource_line(apu_id, id, payload).await?;
                Ok(Applied::Updated(id.clone()))
            }
            .boxed(),
            RowOperation::Delete { id } => async move {
                store.remove_resource_line(apu_id, id).await?;
                Ok(Applied::Deleted(id.clone()))
            }
            .boxed(),
        })
        .collect();

    let (params_updated, applied) = future::try_join(params, future::try_join_all(rows)).await?;

    outcome.params_updated = params_updated;
    for result in applied {
        match result {
            Applied::Created(row, id) => outcome.created.push((row, id)),
            Applied::Updated(id) => outcome.updated.push(id),
            Applied::Deleted(id) => outcome.deleted.push(id),
        }
    }

    tracing::info!(
        apu = apu_id,
        created = outcome.created.len(),
        updated = outcome.updated.len(),
        deleted = outcome.deleted.len(),
        params = outcome.params_updated,
        "Applied save plan"
    );
    Ok(outcome)
}
