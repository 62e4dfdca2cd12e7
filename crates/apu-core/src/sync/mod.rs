//! Synchronization of derived fields
//!
//! This module provides:
//! - **rules**: which fields of a row derive from which, by type and unit
//! - **pass**: the single recompute pass run after every mutation
//!
//! Derived fields are never updated by setters that trigger further
//! setters. A mutation produces a new set of lines, and one full pass
//! recomputes `%mo` prices and every partial cost from that set.

mod pass;
mod rules;

pub use pass::{apply_field_edit, apply_parameters, recompute};
pub use rules::{FieldEdit, SyncRule, crew_from_quantity, edit_line, quantity_from_crew};
