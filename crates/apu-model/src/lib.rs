//! Domain model for unit-price analysis (APU)
//!
//! This crate is the bottom layer of the workspace. It provides:
//!
//! - **Numeric primitives**: [`truncate4`] for quantities and [`round2`] for money
//! - **Resource lines**: typed resource classification and unit kinds
//! - **APU aggregate**: yield/shift parameters and the persisted shape
//! - **Catalog types**: catalog entries, cost-type codes and price overrides
//! - **Payloads**: pre-rounded shapes handed to the persistence layer
//!
//! Nothing here performs I/O; the costing and reconciliation logic lives in
//! `apu-core`.

pub mod apu;
pub mod catalog;
pub mod error;
pub mod numeric;
pub mod payload;
pub mod resource;

pub use apu::{ApuParams, LineItemRef, PersistedApu};
pub use catalog::{CatalogResource, CostType, PriceOverride};
pub use error::{Error, Result};
pub use numeric::{round2, truncate4};
pub use payload::{CreateApuRequest, LinePayload, ParamsUpdate};
pub use resource::{ResourceLine, ResourceType, RowId, UnitKind};
