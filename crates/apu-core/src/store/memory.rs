//! In-memory store

use apu_model::{
    CatalogResource, CreateApuRequest, LineItemRef, LinePayload, ParamsUpdate, PersistedApu,
    PriceOverride,
};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ApuStore, BudgetOverride, Catalog, PriceOverrides, StoreDocument};
use crate::Result;

/// Store keeping its document behind a mutex
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: StoreDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    /// Copy of the current document
    pub fn document(&self) -> StoreDocument {
        self.doc.lock().clone()
    }

    pub fn add_resource(&self, resource: CatalogResource) {
        self.doc.lock().catalog.push(resource);
    }

    pub fn add_override(
        &self,
        budget: impl Into<String>,
        resource_id: impl Into<String>,
        price: PriceOverride,
    ) {
        self.doc.lock().overrides.push(BudgetOverride {
            budget: budget.into(),
            resource_id: resource_id.into(),
            price,
        });
    }

    pub fn line_item_total(&self, line_item_id: &str) -> Option<f64> {
        self.doc.lock().line_item_totals.get(line_item_id).copied()
    }
}

#[async_trait]
impl ApuStore for MemoryStore {
    async fn fetch_apu(&self, line_item_id: &str) -> Result<Option<PersistedApu>> {
        Ok(self.doc.lock().apu_for(line_item_id).cloned())
    }

    async fn create_apu(&self, request: &CreateApuRequest) -> Result<PersistedApu> {
        self.doc.lock().create_apu(request)
    }

    async fn update_apu_parameters(&self, apu_id: &str, update: &ParamsUpdate) -> Result<()> {
        self.doc.lock().update_params(apu_id, update)
    }

    async fn add_resource_line(&self, apu_id: &str, line: &LinePayload) -> Result<String> {
        self.doc.lock().add_line(apu_id, line)
    }

    async fn update_resource_line(
        &self,
        apu_id: &str,
        line_id: &str,
        line: &LinePayload,
    ) -> Result<()> {
        self.doc.lock().update_line(apu_id, line_id, line)
    }

    async fn remove_resource_line(&self, apu_id: &str, line_id: &str) -> Result<()> {
        self.doc.lock().remove_line(apu_id, line_id)
    }

    async fn refresh_line_item(&self, line_item: &LineItemRef) -> Result<()> {
        self.doc.lock().refresh_line_item(line_item);
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn resource(&self, id: &str) -> Result<CatalogResource> {
        self.doc.lock().resource(id)
    }
}

#[async_trait]
impl PriceOverrides for MemoryStore {
    async fn price_override(
        &self,
        budget_id: &str,
        resource_id: &str,
    ) -> Result<Option<PriceOverride>> {
        Ok(self.doc.lock().price_override(budget_id, resource_id))
    }
}
