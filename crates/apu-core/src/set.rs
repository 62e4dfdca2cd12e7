//! Editable resource set
//!
//! The working, order-preserving list of rows an editor mutates. Each row
//! carries two ephemeral flags that never reach the store: `in_edit` while
//! it waits for a catalog selection, and `is_new` until it is persisted.

use std::collections::BTreeSet;

use apu_model::{ResourceLine, RowId};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A resource line plus its edit state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableRow {
    pub line: ResourceLine,
    #[serde(default)]
    pub in_edit: bool,
    #[serde(default)]
    pub is_new: bool,
}

impl EditableRow {
    /// A row loaded from the store
    pub fn persisted(line: ResourceLine) -> Self {
        Self {
            line,
            in_edit: false,
            is_new: false,
        }
    }

    /// A row that has never been stored
    pub fn fresh(line: ResourceLine) -> Self {
        Self {
            line,
            in_edit: false,
            is_new: true,
        }
    }
}

/// Ordered working set of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    rows: Vec<EditableRow>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from stored lines, sorted by their stored order
    pub fn from_persisted(lines: &[ResourceLine]) -> Self {
        let mut lines = lines.to_vec();
        lines.sort_by_key(|l| l.order);
        Self {
            rows: lines.into_iter().map(EditableRow::persisted).collect(),
        }
    }

    pub fn rows(&self) -> &[EditableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy of the lines, in working order
    pub fn lines(&self) -> Vec<ResourceLine> {
        self.rows.iter().map(|r| r.line.clone()).collect()
    }

    pub fn get(&self, id: &RowId) -> Option<&EditableRow> {
        self.rows.iter().find(|r| &r.line.id == id)
    }

    fn get_mut(&mut self, id: &RowId) -> Result<&mut EditableRow> {
        self.rows
            .iter_mut()
            .find(|r| &r.line.id == id)
            .ok_or_else(|| Error::RowNotFound { id: id.to_string() })
    }

    /// Append an empty row awaiting catalog selection
    pub fn append_blank(&mut self) -> RowId {
        let id = RowId::temp();
        let mut row = EditableRow::fresh(ResourceLine::blank(id.clone(), self.rows.len()));
        row.in_edit = true;
        self.rows.push(row);
        id
    }

    /// Append a row built elsewhere; it is treated as new
    pub fn push_new(&mut self, mut line: ResourceLine) -> RowId {
        line.order = self.rows.len();
        let id = line.id.clone();
        self.rows.push(EditableRow::fresh(line));
        id
    }

    /// Append a row that already exists in the store
    pub fn push_persisted(&mut self, mut line: ResourceLine) {
        line.order = self.rows.len();
        self.rows.push(EditableRow::persisted(line));
    }

    /// Fill a row from a catalog selection and leave edit mode
    pub fn resolve(&mut self, id: &RowId, resolved: ResourceLine) -> Result<()> {
        let row = self.get_mut(id)?;
        row.line = ResourceLine {
            id: row.line.id.clone(),
            order: row.line.order,
            ..resolved
        };
        row.in_edit = false;
        Ok(())
    }

    pub fn remove(&mut self, id: &RowId) -> Result<EditableRow> {
        let position = self
            .rows
            .iter()
            .position(|r| &r.line.id == id)
            .ok_or_else(|| Error::RowNotFound { id: id.to_string() })?;
        Ok(self.rows.remove(position))
    }

    /// Replace line contents after a recompute pass, keeping row flags.
    ///
    /// Lines are matched by identifier, so the pass may not add or drop rows.
    pub fn replace_lines(&mut self, lines: Vec<ResourceLine>) {
        for (row, line) in self.rows.iter_mut().zip(lines) {
            debug_assert_eq!(row.line.id, line.id);
            row.line = line;
        }
    }

    /// Rewrite `order` to match positions
    pub fn renumber(&mut self) {
        for (index, row) in self.rows.iter_mut().enumerate() {
            row.line.order = index;
        }
    }

    /// Swap temporary ids for the ids the store assigned
    pub fn promote(&mut self, assigned: &[(RowId, String)]) {
        for (temp, persisted) in assigned {
            if let Some(row) = self.rows.iter_mut().find(|r| &r.line.id == temp) {
                row.line.id = RowId::persisted(persisted.clone());
            }
        }
        for row in &mut self.rows {
            row.is_new = false;
            row.in_edit = false;
        }
    }

    /// Catalog resources referenced by the set
    pub fn resource_refs(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter_map(|r| r.line.resource_ref.clone())
            .filter(|r| !r.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apu_model::ResourceType;

    fn stored(id: &str, order: usize) -> ResourceLine {
        let mut line = ResourceLine::blank(RowId::persisted(id), order);
        line.resource_ref = Some(format!("cat-{}", id));
        line.description = id.to_string();
        line
    }

    #[test]
    fn seeding_sorts_by_stored_order() {
        let set = ResourceSet::from_persisted(&[stored("b", 1), stored("a", 0)]);
        let ids: Vec<_> = set.rows().iter().map(|r| r.line.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(set.rows().iter().all(|r| !r.is_new && !r.in_edit));
    }

    #[test]
    fn append_blank_assigns_temp_id_and_order() {
        let mut set = ResourceSet::from_persisted(&[stored("a", 0)]);
        let id = set.append_blank();
        assert!(id.is_temp());
        let row = set.get(&id).unwrap();
        assert_eq!(row.line.order, 1);
        assert!(row.in_edit);
        assert!(row.is_new);
    }

    #[test]
    fn resolve_keeps_identity_and_order() {
        let mut set = ResourceSet::new();
        let id = set.append_blank();
        let mut resolved = stored("ignored", 9);
        resolved.resource_type = ResourceType::Labor;
        set.resolve(&id, resolved).unwrap();

        let row = set.get(&id).unwrap();
        assert_eq!(row.line.id, id);
        assert_eq!(row.line.order, 0);
        assert_eq!(row.line.resource_type, ResourceType::Labor);
        assert!(!row.in_edit);
    }

    #[test]
    fn promote_swaps_temp_ids() {
        let mut set = ResourceSet::new();
        let id = set.append_blank();
        set.promote(&[(id.clone(), "L-77".to_string())]);
        assert!(set.get(&id).is_none());
        let row = set.get(&RowId::persisted("L-77")).unwrap();
        assert!(!row.is_new);
    }

    #[test]
    fn remove_unknown_row_fails() {
        let mut set = ResourceSet::new();
        assert!(set.remove(&RowId::persisted("nope")).is_err());
    }

    #[test]
    fn resource_refs_are_deduplicated() {
        let mut a = stored("a", 0);
        let mut b = stored("b", 1);
        a.resource_ref = Some("cement".into());
        b.resource_ref = Some("cement".into());
        let set = ResourceSet::from_persisted(&[a, b]);
        assert_eq!(set.resource_refs().len(), 1);
    }
}
