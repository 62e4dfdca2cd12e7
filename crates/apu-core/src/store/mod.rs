//! Persistence and lookup seams
//!
//! The engine talks to three collaborators through async traits:
//! [`ApuStore`] for APUs and their lines, [`Catalog`] for resource lookup,
//! and [`PriceOverrides`] for budget-scoped prices.
//!
//! Two implementations ship with the crate. Both keep a [`StoreDocument`]:
//! [`MemoryStore`] in memory, [`FileStore`] as a locked JSON file.

mod document;
mod file;
mod memory;

pub use document::{BudgetOverride, StoreDocument};
pub use file::FileStore;
pub use memory::MemoryStore;

use apu_model::{
    CatalogResource, CreateApuRequest, LineItemRef, LinePayload, ParamsUpdate, PersistedApu,
    PriceOverride,
};
use async_trait::async_trait;

use crate::Result;

/// Persistence of APUs and their resource lines
#[async_trait]
pub trait ApuStore: Send + Sync {
    /// The APU of a line item, if one was ever saved
    async fn fetch_apu(&self, line_item_id: &str) -> Result<Option<PersistedApu>>;

    /// Create an APU with all its lines in one call
    async fn create_apu(&self, request: &CreateApuRequest) -> Result<PersistedApu>;

    async fn update_apu_parameters(&self, apu_id: &str, update: &ParamsUpdate) -> Result<()>;

    /// Add a line and return its assigned id
    async fn add_resource_line(&self, apu_id: &str, line: &LinePayload) -> Result<String>;

    async fn update_resource_line(
        &self,
        apu_id: &str,
        line_id: &str,
        line: &LinePayload,
    ) -> Result<()>;

    async fn remove_resource_line(&self, apu_id: &str, line_id: &str) -> Result<()>;

    /// Signal that the line item's totals should be recomputed
    async fn refresh_line_item(&self, _line_item: &LineItemRef) -> Result<()> {
        Ok(())
    }
}

/// Resource catalog lookup
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn resource(&self, id: &str) -> Result<CatalogResource>;
}

/// Budget-scoped price override lookup
#[async_trait]
pub trait PriceOverrides: Send + Sync {
    async fn price_override(
        &self,
        budget_id: &str,
        resource_id: &str,
    ) -> Result<Option<PriceOverride>>;
}
