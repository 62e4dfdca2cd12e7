//! Costing and reconciliation engine for unit-price analysis
//!
//! This crate sits on top of `apu-model` and implements:
//!
//! - **Cost model**: partial cost per line by resource type and unit
//! - **Synchronization**: quantity/crew derivation and the single recompute pass
//! - **Price broadcast**: an explicit broker sharing prices between editors
//! - **Reconciliation**: validation, diff against the snapshot, concurrent execution
//! - **Editor session**: the working state of one APU and its save path
//! - **Stores**: async persistence traits with memory and JSON file backends
//!
//! # Architecture
//!
//! ```text
//!                     apu-cli
//!                        |
//!                    apu-core
//!     +--------+--------+---------+-----------+-------+
//!     |        |        |         |           |       |
//!   cost     sync   broadcast  reconcile   editor   store
//!                        |
//!                    apu-model
//! ```
//!
//! # Example
//!
//! ```
//! use apu_core::{ApuEditor, EngineConfig, FieldEdit};
//! use apu_model::{LineItemRef, ResourceLine, ResourceType, RowId};
//!
//! let item = LineItemRef::new("li-1", "p-1", "b-1");
//! let mut editor = ApuEditor::new(item, EngineConfig::default());
//!
//! let mut sand = ResourceLine::blank(RowId::temp(), 0);
//! sand.resource_ref = Some("sand".into());
//! sand.description = "Arena gruesa".into();
//! sand.resource_type = ResourceType::Material;
//! sand.unit = "m3".into();
//! sand.unit_price = 40.0;
//! let row = editor.push_line(sand).unwrap();
//!
//! editor.update_field(&row, FieldEdit::Quantity(0.5)).unwrap();
//! assert_eq!(editor.totals().direct, 20.0);
//! ```

pub mod broadcast;
pub mod config;
pub mod cost;
pub mod editor;
pub mod error;
pub mod reconcile;
pub mod set;
pub mod store;
pub mod sync;

pub use broadcast::{BROADCAST_TOLERANCE, PriceBroker, PriceUpdate, Subscription, should_apply};
pub use config::{DEFAULT_CHANGE_TOLERANCE, EngineConfig};
pub use cost::{ApuTotals, CostContext, Formula, labor_hh_sum, partial_cost};
pub use editor::{ApuEditor, SaveGuard, SaveRegistry};
pub use error::{Error, Result};
pub use reconcile::{
    ApuCreation, Reconciler, RowOperation, SaveOutcome, SavePlan, Snapshot, ValidationReport,
    execute, validate,
};
pub use set::{EditableRow, ResourceSet};
pub use store::{
    ApuStore, BudgetOverride, Catalog, FileStore, MemoryStore, PriceOverrides, StoreDocument,
};
pub use sync::{FieldEdit, SyncRule, apply_field_edit, apply_parameters, recompute};
