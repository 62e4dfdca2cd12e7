//! Store document shared by the memory and file stores

use std::collections::BTreeMap;

use apu_model::{
    CatalogResource, CreateApuRequest, LineItemRef, LinePayload, ParamsUpdate, PersistedApu,
    PriceOverride, ResourceLine, RowId, round2,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DOCUMENT_VERSION: &str = "1.0";

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// A price override bound to one budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOverride {
    pub budget: String,
    pub resource_id: String,
    #[serde(flatten)]
    pub price: PriceOverride,
}

/// Everything a store holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    pub catalog: Vec<CatalogResource>,
    #[serde(default)]
    pub overrides: Vec<BudgetOverride>,
    #[serde(default)]
    pub apus: Vec<PersistedApu>,
    /// Direct cost per line item, written on refresh
    #[serde(default)]
    pub line_item_totals: BTreeMap<String, f64>,
    /// Time of the last mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreDocument {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            next_id: 0,
            catalog: Vec::new(),
            overrides: Vec::new(),
            apus: Vec::new(),
            line_item_totals: BTreeMap::new(),
            updated_at: None,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    pub fn apu_for(&self, line_item_id: &str) -> Option<&PersistedApu> {
        self.apus.iter().find(|a| a.line_item.id == line_item_id)
    }

    pub fn apu(&self, apu_id: &str) -> Option<&PersistedApu> {
        self.apus.iter().find(|a| a.id == apu_id)
    }

    fn apu_mut(&mut self, apu_id: &str) -> Result<&mut PersistedApu> {
        self.apus
            .iter_mut()
            .find(|a| a.id == apu_id)
            .ok_or_else(|| Error::NotFound(format!("APU {}", apu_id)))
    }

    pub fn create_apu(&mut self, request: &CreateApuRequest) -> Result<PersistedApu> {
        if self.apu_for(&request.line_item.id).is_some() {
            return Err(Error::store(
                "create_apu",
                format!("line item {} already has an APU", request.line_item.id),
            ));
        }
        let apu_id = self.next_id("apu");
        let mut lines = Vec::with_capacity(request.lines.len());
        for payload in &request.lines {
            let line_id = self.next_id("line");
            lines.push(line_from_payload(line_id, payload));
        }
        let apu = PersistedApu {
            id: apu_id,
            line_item: request.line_item.clone(),
            params: request.params,
            lines,
        };
        self.apus.push(apu.clone());
        self.touch();
        Ok(apu)
    }

    pub fn update_params(&mut self, apu_id: &str, update: &ParamsUpdate) -> Result<()> {
        let apu = self.apu_mut(apu_id)?;
        apu.params = update.apply_to(apu.params);
        self.touch();
        Ok(())
    }

    pub fn add_line(&mut self, apu_id: &str, payload: &LinePayload) -> Result<String> {
        // Fail before consuming an id
        self.apu_mut(apu_id)?;
        let line_id = self.next_id("line");
        self.apu_mut(apu_id)?
            .lines
            .push(line_from_payload(line_id.clone(), payload));
        self.touch();
        Ok(line_id)
    }

    pub fn update_line(
        &mut self,
        apu_id: &str,
        line_id: &str,
        payload: &LinePayload,
    ) -> Result<()> {
        let apu = self.apu_mut(apu_id)?;
        let line = apu
            .lines
            .iter_mut()
            .find(|l| l.id.as_str() == line_id)
            .ok_or_else(|| Error::NotFound(format!("resource line {}", line_id)))?;
        *line = line_from_payload(line_id.to_string(), payload);
        self.touch();
        Ok(())
    }

    pub fn remove_line(&mut self, apu_id: &str, line_id: &str) -> Result<()> {
        let apu = self.apu_mut(apu_id)?;
        let before = apu.lines.len();
        apu.lines.retain(|l| l.id.as_str() != line_id);
        if apu.lines.len() == before {
            return Err(Error::NotFound(format!("resource line {}", line_id)));
        }
        self.touch();
        Ok(())
    }

    /// Recompute the stored total of a line item from its APU
    pub fn refresh_line_item(&mut self, line_item: &LineItemRef) {
        let total = self
            .apu_for(&line_item.id)
            .map(|apu| round2(apu.direct_cost()))
            .unwrap_or_default();
        self.line_item_totals.insert(line_item.id.clone(), total);
        self.touch();
    }

    pub fn resource(&self, id: &str) -> Result<CatalogResource> {
        self.catalog
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| Error::Lookup {
                resource: id.to_string(),
                message: "not in catalog".to_string(),
            })
    }

    pub fn price_override(&self, budget_id: &str, resource_id: &str) -> Option<PriceOverride> {
        self.overrides
            .iter()
            .find(|o| o.budget == budget_id && o.resource_id == resource_id)
            .map(|o| o.price.clone())
    }
}

fn line_from_payload(id: String, payload: &LinePayload) -> ResourceLine {
    ResourceLine {
        id: RowId::persisted(id),
        resource_ref: Some(payload.resource_id.clone()),
        code: payload.code.clone(),
        description: payload.description.clone(),
        unit: payload.unit.clone(),
        resource_type: payload.resource_type,
        unit_price: payload.unit_price,
        crew_size: payload.crew_size,
        quantity: payload.quantity,
        waste_percent: payload.waste_percent,
        partial_cost: payload.partial_cost,
        order: payload.order,
        price_override_ref: payload.price_override_id.clone(),
    }
}
