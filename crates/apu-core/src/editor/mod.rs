//! APU editing session
//!
//! An [`ApuEditor`] owns the working state of one line item's APU: its
//! parameters, the editable rows and the last persisted snapshot. Every
//! mutation runs the recompute pass before returning, so the working set is
//! always internally consistent. Only [`ApuEditor::save`] and
//! [`ApuEditor::load`] touch the store.
//!
//! When a [`PriceBroker`] is attached, the editor publishes prices the user
//! sets and queues prices published by other editors. Queued prices are
//! taken in by [`ApuEditor::apply_price_updates`].
//!
//! An editor can also start from a copy of another line item's APU
//! ([`ApuEditor::from_template`]) or be opened read-only, in which case every
//! mutating operation returns [`Error::ReadOnly`].

mod guard;

pub use guard::{SaveGuard, SaveRegistry};

use std::collections::HashMap;
use std::sync::Arc;

use apu_model::{
    ApuParams, CatalogResource, LineItemRef, PersistedApu, PriceOverride, ResourceLine, RowId,
    round2,
};
use parking_lot::Mutex;

use crate::broadcast::{PriceBroker, PriceUpdate, Subscription, should_apply};
use crate::config::EngineConfig;
use crate::cost::ApuTotals;
use crate::reconcile::{Reconciler, SaveOutcome, SavePlan, Snapshot, execute};
use crate::set::{EditableRow, ResourceSet};
use crate::store::{ApuStore, Catalog, PriceOverrides};
use crate::sync::{FieldEdit, apply_field_edit, apply_parameters, recompute};
use crate::{Error, Result};

/// Working state of one APU
pub struct ApuEditor {
    line_item: LineItemRef,
    config: EngineConfig,
    reconciler: Reconciler,
    apu_id: Option<String>,
    params: ApuParams,
    rows: ResourceSet,
    baseline: Option<Snapshot>,
    dirty: bool,
    read_only: bool,
    saves: SaveRegistry,
    broker: Option<PriceBroker>,
    source_tag: String,
    subscriptions: HashMap<String, Subscription>,
    inbox: Arc<Mutex<Vec<PriceUpdate>>>,
}

impl std::fmt::Debug for ApuEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApuEditor")
            .field("line_item", &self.line_item.id)
            .field("apu_id", &self.apu_id)
            .field("rows", &self.rows.len())
            .field("dirty", &self.dirty)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl ApuEditor {
    pub fn new(line_item: LineItemRef, config: EngineConfig) -> Self {
        let source_tag = format!("editor:{}", line_item.id);
        Self {
            params: config.default_params(),
            reconciler: Reconciler::new(config.tolerance.change),
            line_item,
            config,
            apu_id: None,
            rows: ResourceSet::new(),
            baseline: None,
            dirty: false,
            read_only: false,
            saves: SaveRegistry::new(),
            broker: None,
            source_tag,
            subscriptions: HashMap::new(),
            inbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start an unsaved APU from a copy of an existing one.
    ///
    /// Parameters carry over and every row is copied under a fresh temporary
    /// id, so saving creates new lines and never touches the source APU.
    pub fn from_template(
        source: &PersistedApu,
        line_item: LineItemRef,
        config: EngineConfig,
    ) -> Self {
        let mut editor = Self::new(line_item, config);
        editor.params = source.params;

        let mut lines = source.lines.clone();
        lines.sort_by_key(|l| l.order);
        for line in lines {
            editor.rows.push_new(ResourceLine {
                id: RowId::temp(),
                ..line
            });
        }
        editor.recompute_all();
        editor.dirty = !editor.rows.is_empty();

        tracing::debug!(
            source = %source.id,
            line_item = %editor.line_item.id,
            rows = editor.rows.len(),
            "Seeded editor from template"
        );
        editor
    }

    /// Open the editor for reading only
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Share prices with other editors through `broker`
    pub fn with_broker(mut self, broker: PriceBroker, source_tag: impl Into<String>) -> Self {
        self.broker = Some(broker);
        self.source_tag = source_tag.into();
        self.refresh_subscriptions();
        self
    }

    /// Share the in-flight save guard with other editors
    pub fn with_save_registry(mut self, saves: SaveRegistry) -> Self {
        self.saves = saves;
        self
    }

    pub fn line_item(&self) -> &LineItemRef {
        &self.line_item
    }

    pub fn apu_id(&self) -> Option<&str> {
        self.apu_id.as_deref()
    }

    pub fn params(&self) -> ApuParams {
        self.params
    }

    pub fn rows(&self) -> &[EditableRow] {
        self.rows.rows()
    }

    pub fn lines(&self) -> Vec<ResourceLine> {
        self.rows.lines()
    }

    pub fn row(&self, id: &RowId) -> Option<&EditableRow> {
        self.rows.get(id)
    }

    pub fn baseline(&self) -> Option<&Snapshot> {
        self.baseline.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.saves.is_saving(&self.line_item.id)
    }

    pub fn totals(&self) -> ApuTotals {
        ApuTotals::from_lines(self.rows.rows().iter().map(|r| &r.line))
    }

    /// Unit price of the line item, which is the direct cost of the APU
    pub fn unit_price(&self) -> f64 {
        self.totals().direct
    }

    /// Load the persisted APU of the line item.
    ///
    /// Unsaved line items cannot own an APU, so no fetch is made for them.
    pub async fn load(&mut self, store: &dyn ApuStore) -> Result<()> {
        if self.line_item.is_unsaved() {
            tracing::debug!(line_item = %self.line_item.id, "Unsaved line item, skipping fetch");
            self.seed(None);
            return Ok(());
        }
        let apu = store.fetch_apu(&self.line_item.id).await?;
        self.seed(apu);
        Ok(())
    }

    /// Replace all working state with a persisted APU, or with an empty one.
    ///
    /// Stored values are taken as they are; seeding never marks the editor
    /// dirty.
    pub fn seed(&mut self, apu: Option<PersistedApu>) {
        match apu {
            Some(apu) => {
                let snapshot = Snapshot::from(&apu);
                self.apu_id = Some(apu.id);
                self.params = snapshot.params;
                self.rows = ResourceSet::from_persisted(&snapshot.lines);
                self.baseline = Some(snapshot);
            }
            None => {
                self.apu_id = None;
                self.params = self.config.default_params();
                self.rows = ResourceSet::new();
                self.baseline = None;
            }
        }
        self.dirty = false;
        self.refresh_subscriptions();
        tracing::debug!(
            line_item = %self.line_item.id,
            apu = ?self.apu_id,
            rows = self.rows.len(),
            "Seeded editor"
        );
    }

    pub fn append_blank_row(&mut self) -> Result<RowId> {
        self.ensure_writable()?;
        self.dirty = true;
        Ok(self.rows.append_blank())
    }

    /// Append a fully built line, for callers that do not go through the
    /// catalog.
    ///
    /// The line is always added as a new row. An id already used in the set
    /// or in the snapshot is replaced by a temporary one.
    pub fn push_line(&mut self, mut line: ResourceLine) -> Result<RowId> {
        self.ensure_writable()?;
        let taken = self.rows.get(&line.id).is_some()
            || self
                .baseline
                .as_ref()
                .is_some_and(|b| b.line(line.id.as_str()).is_some());
        if taken {
            line.id = RowId::temp();
        }

        let id = self.rows.push_new(line);
        self.recompute_all();
        self.dirty = true;
        self.refresh_subscriptions();
        Ok(id)
    }

    /// Fill a row from a catalog resource.
    ///
    /// The budget override price wins over the catalog price. A `%mo` row
    /// takes the labor aggregate instead of either.
    pub fn select_catalog_resource(
        &mut self,
        row: &RowId,
        resource: &CatalogResource,
        price_override: Option<PriceOverride>,
    ) -> Result<()> {
        self.ensure_writable()?;
        let current = self
            .rows
            .get(row)
            .ok_or_else(|| Error::RowNotFound { id: row.to_string() })?
            .line
            .clone();

        let (price, override_ref) = match price_override {
            Some(o) => (o.price, Some(o.id)),
            None => (resource.base_price, None),
        };

        let resolved = ResourceLine {
            resource_ref: Some(resource.id.clone()),
            code: resource.code.clone(),
            description: resource.name.clone(),
            unit: resource.unit.clone(),
            resource_type: resource.cost_type.resource_type(),
            unit_price: round2(price),
            price_override_ref: override_ref,
            ..current
        };
        let publishes = !resolved.is_labor_percentage();

        self.rows.resolve(row, resolved)?;
        self.recompute_all();
        self.dirty = true;
        self.refresh_subscriptions();

        if publishes
            && let Some(line) = self.rows.get(row).map(|r| r.line.clone())
        {
            self.publish(&line);
        }
        Ok(())
    }

    /// Look up a resource and its budget override, then select it.
    ///
    /// A failing override lookup falls back to the catalog price.
    pub async fn select_resource(
        &mut self,
        row: &RowId,
        resource_id: &str,
        catalog: &dyn Catalog,
        overrides: &dyn PriceOverrides,
    ) -> Result<()> {
        self.ensure_writable()?;
        let resource = catalog.resource(resource_id).await?;
        let price_override = match overrides
            .price_override(&self.line_item.budget, resource_id)
            .await
        {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    resource = resource_id,
                    budget = %self.line_item.budget,
                    error = %e,
                    "Price override lookup failed, using catalog price"
                );
                None
            }
        };
        self.select_catalog_resource(row, &resource, price_override)
    }

    /// Edit one numeric field of a row
    pub fn update_field(&mut self, row: &RowId, edit: FieldEdit) -> Result<()> {
        self.ensure_writable()?;
        let lines = apply_field_edit(&self.rows.lines(), row, edit, &self.params)?;
        self.rows.replace_lines(lines);
        self.dirty = true;

        if matches!(edit, FieldEdit::UnitPrice(_))
            && let Some(line) = self.rows.get(row).map(|r| r.line.clone())
        {
            self.publish(&line);
        }
        Ok(())
    }

    pub fn remove_row(&mut self, row: &RowId) -> Result<()> {
        self.ensure_writable()?;
        self.rows.remove(row)?;
        self.rows.renumber();
        self.recompute_all();
        self.dirty = true;
        self.refresh_subscriptions();
        Ok(())
    }

    /// Change yield and shift length, re-deriving crew-paired quantities.
    ///
    /// Only marks the editor dirty when a persisted snapshot exists.
    pub fn set_parameters(&mut self, rendimiento: f64, jornada: f64) -> Result<()> {
        self.ensure_writable()?;
        let params = ApuParams::new(rendimiento, jornada)?;
        let lines = apply_parameters(&self.rows.lines(), &params);
        self.params = params;
        self.rows.replace_lines(lines);
        if self.baseline.is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    /// Replace parameters and rows wholesale.
    ///
    /// Rows whose id is in the snapshot keep their identity; every other
    /// row is treated as new.
    pub fn replace_working(&mut self, params: ApuParams, lines: Vec<ResourceLine>) -> Result<()> {
        self.ensure_writable()?;
        let params = ApuParams::new(params.rendimiento, params.jornada)?;
        let mut rows = ResourceSet::new();
        for line in lines {
            let known = self
                .baseline
                .as_ref()
                .is_some_and(|b| b.line(line.id.as_str()).is_some());
            if known {
                rows.push_persisted(line);
            } else {
                rows.push_new(line);
            }
        }
        rows.renumber();
        self.params = params;
        self.rows = rows;
        self.recompute_all();
        self.dirty = true;
        self.refresh_subscriptions();
        Ok(())
    }

    /// Discard every edit since the last load or save
    pub fn cancel(&mut self) {
        match &self.baseline {
            Some(snapshot) => {
                self.params = snapshot.params;
                self.rows = ResourceSet::from_persisted(&snapshot.lines);
            }
            None => {
                self.params = self.config.default_params();
                self.rows = ResourceSet::new();
            }
        }
        self.dirty = false;
        self.refresh_subscriptions();
    }

    /// Take in prices queued from the broker.
    ///
    /// Only the latest price queued for each resource is considered, so
    /// earlier echoes of the editor's own publications are never replayed.
    /// Returns the number of rows whose price changed. A read-only editor
    /// drops the queue.
    pub fn apply_price_updates(&mut self) -> usize {
        let updates: Vec<PriceUpdate> = std::mem::take(&mut *self.inbox.lock());
        if updates.is_empty() || self.read_only {
            return 0;
        }

        let latest: HashMap<&str, f64> = updates
            .iter()
            .map(|u| (u.resource_ref.as_str(), u.price))
            .collect();

        let tolerance = self.config.tolerance.broadcast;
        let mut lines = self.rows.lines();
        let mut applied = 0;
        for line in lines.iter_mut().filter(|l| !l.is_labor_percentage()) {
            let Some(&price) = line.resource_ref.as_deref().and_then(|r| latest.get(r)) else {
                continue;
            };
            if should_apply(line.unit_price, price, tolerance) {
                line.unit_price = round2(price);
                applied += 1;
            }
        }

        if applied > 0 {
            self.rows.replace_lines(recompute(&lines, &self.params));
            self.dirty = true;
            tracing::debug!(
                source = %self.source_tag,
                received = updates.len(),
                applied,
                "Applied broadcast prices"
            );
        }
        applied
    }

    /// Validate and diff the working set without touching the store
    pub fn plan(&self) -> Result<SavePlan> {
        self.reconciler.plan(
            &self.line_item,
            self.apu_id.as_deref(),
            &self.params,
            self.rows.rows(),
            self.baseline.as_ref(),
        )
    }

    /// Persist the working set.
    ///
    /// Validation failures return before any store call. A persistence
    /// failure re-fetches the APU and resets the working set to it, then
    /// returns [`Error::SaveFailed`].
    pub async fn save(&mut self, store: &dyn ApuStore) -> Result<SaveOutcome> {
        let _guard = self
            .saves
            .try_acquire(&self.line_item.id)
            .ok_or(Error::SaveInFlight)?;
        self.ensure_writable()?;

        if self.line_item.is_unsaved() {
            return Err(Error::UnsavedLineItem {
                id: self.line_item.id.clone(),
            });
        }

        let plan = self.plan()?;
        if plan.is_empty() {
            self.dirty = false;
            return Ok(SaveOutcome::default());
        }

        tracing::info!(
            line_item = %self.line_item.id,
            changes = plan.change_count(),
            "Saving APU"
        );

        match execute(&plan, self.apu_id.as_deref(), store).await {
            Ok(outcome) => {
                self.commit(&outcome);
                if let Err(e) = store.refresh_line_item(&self.line_item).await {
                    tracing::warn!(
                        line_item = %self.line_item.id,
                        error = %e,
                        "Line item refresh failed"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    line_item = %self.line_item.id,
                    error = %e,
                    "Save failed, resetting"
                );
                self.recover(store).await;
                Err(Error::SaveFailed { source: Box::new(e) })
            }
        }
    }

    fn commit(&mut self, outcome: &SaveOutcome) {
        if let Some(apu_id) = &outcome.created_apu {
            self.apu_id = Some(apu_id.clone());
        }
        self.rows.promote(&outcome.created);
        self.rows.renumber();
        self.baseline = Some(Snapshot::new(self.params, self.rows.lines()));
        self.dirty = false;
        self.refresh_subscriptions();
    }

    /// Reset to the authoritative state after a failed save
    async fn recover(&mut self, store: &dyn ApuStore) {
        match store.fetch_apu(&self.line_item.id).await {
            Ok(apu) => self.seed(apu),
            Err(e) => {
                tracing::warn!(
                    line_item = %self.line_item.id,
                    error = %e,
                    "Re-fetch failed, restoring last snapshot"
                );
                self.cancel();
            }
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly {
                line_item: self.line_item.id.clone(),
            });
        }
        Ok(())
    }

    fn recompute_all(&mut self) {
        let lines = recompute(&self.rows.lines(), &self.params);
        self.rows.replace_lines(lines);
    }

    fn publish(&self, line: &ResourceLine) {
        if let (Some(broker), Some(resource_ref)) =
            (&self.broker, line.resource_ref.as_deref())
        {
            broker.publish(resource_ref, line.unit_price, &self.source_tag);
        }
    }

    /// Hold exactly one subscription per resource in the set
    fn refresh_subscriptions(&mut self) {
        let Some(broker) = &self.broker else {
            return;
        };
        let wanted = self.rows.resource_refs();
        self.subscriptions.retain(|resource_ref, _| wanted.contains(resource_ref));
        for resource_ref in wanted {
            if self.subscriptions.contains_key(&resource_ref) {
                continue;
            }
            let inbox = Arc::clone(&self.inbox);
            let subscription = broker.subscribe(resource_ref.clone(), move |update| {
                inbox.lock().push(update.clone());
            });
            self.subscriptions.insert(resource_ref, subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apu_model::{CostType, ResourceType};
    use pretty_assertions::assert_eq;

    fn editor() -> ApuEditor {
        ApuEditor::new(LineItemRef::new("li-1", "p-1", "b-1"), EngineConfig::default())
    }

    fn resource(id: &str, code: &str, unit: &str, price: f64) -> CatalogResource {
        CatalogResource {
            id: id.into(),
            name: id.to_uppercase(),
            code: format!("{}-01", code),
            unit: unit.into(),
            cost_type: CostType::coded(code),
            base_price: price,
        }
    }

    #[test]
    fn new_editor_is_clean_with_default_params() {
        let editor = editor();
        assert!(!editor.is_dirty());
        assert_eq!(editor.params(), ApuParams::default());
        assert!(editor.rows().is_empty());
    }

    #[test]
    fn selecting_resource_uses_override_price() {
        let mut editor = editor();
        let row = editor.append_blank_row().unwrap();
        let price = PriceOverride {
            id: "ov-1".into(),
            price: 27.456,
        };
        editor
            .select_catalog_resource(&row, &resource("cement", "MT", "bls", 25.0), Some(price))
            .unwrap();

        let line = &editor.row(&row).unwrap().line;
        assert_eq!(line.unit_price, 27.46);
        assert_eq!(line.price_override_ref.as_deref(), Some("ov-1"));
        assert_eq!(line.resource_type, ResourceType::Material);
        assert!(!editor.row(&row).unwrap().in_edit);
    }

    #[test]
    fn labor_percentage_row_takes_labor_aggregate() {
        let mut editor = editor();
        editor.set_parameters(2.0, 8.0).unwrap();

        let labor = editor.append_blank_row().unwrap();
        editor
            .select_catalog_resource(&labor, &resource("peon", "MO", "hh", 10.0), None)
            .unwrap();
        editor.update_field(&labor, FieldEdit::CrewSize(3.0)).unwrap();

        let tools = editor.append_blank_row().unwrap();
        editor
            .select_catalog_resource(&tools, &resource("tools", "EQ", "%mo", 99.0), None)
            .unwrap();
        editor.update_field(&tools, FieldEdit::Quantity(50.0)).unwrap();

        let tools_line = &editor.row(&tools).unwrap().line;
        assert_eq!(tools_line.unit_price, 120.0);
        assert_eq!(tools_line.partial_cost, 60.0);
        assert_eq!(editor.totals().direct, 180.0);
    }

    #[test]
    fn parameters_do_not_dirty_without_snapshot() {
        let mut editor = editor();
        editor.set_parameters(3.0, 8.0).unwrap();
        assert!(!editor.is_dirty());
        assert!(editor.set_parameters(0.0, 8.0).is_err());
    }

    #[test]
    fn cancel_restores_snapshot() {
        let mut editor = editor();
        let mut line = ResourceLine::blank(RowId::persisted("l-1"), 0);
        line.resource_ref = Some("sand".into());
        line.description = "Arena".into();
        line.quantity = 2.0;
        line.unit_price = 5.0;
        line.partial_cost = 10.0;
        editor.seed(Some(PersistedApu {
            id: "apu-1".into(),
            line_item: editor.line_item().clone(),
            params: ApuParams::default(),
            lines: vec![line],
        }));

        editor
            .update_field(&RowId::persisted("l-1"), FieldEdit::Quantity(4.0))
            .unwrap();
        editor.set_parameters(5.0, 8.0).unwrap();
        assert!(editor.is_dirty());

        editor.cancel();
        assert!(!editor.is_dirty());
        assert_eq!(editor.params(), ApuParams::default());
        assert_eq!(editor.lines()[0].quantity, 2.0);
    }

    #[test]
    fn removing_row_renumbers_and_recomputes() {
        let mut editor = editor();
        let first = editor.append_blank_row().unwrap();
        let second = editor.append_blank_row().unwrap();
        editor.remove_row(&first).unwrap();
        assert_eq!(editor.row(&second).unwrap().line.order, 0);
        assert!(editor.remove_row(&first).is_err());
    }

    #[test]
    fn broker_prices_are_applied_once() {
        let broker = PriceBroker::new();
        let mut a = editor().with_broker(broker.clone(), "a");
        let mut b = editor().with_broker(broker.clone(), "b");

        let cement = resource("cement", "MT", "bls", 25.0);
        let row_a = a.append_blank_row().unwrap();
        a.select_catalog_resource(&row_a, &cement, None).unwrap();
        let row_b = b.append_blank_row().unwrap();
        b.select_catalog_resource(&row_b, &cement, None).unwrap();
        assert_eq!(broker.subscriber_count("cement"), 2);

        a.update_field(&row_a, FieldEdit::UnitPrice(30.0)).unwrap();
        assert_eq!(b.apply_price_updates(), 1);
        assert_eq!(b.row(&row_b).unwrap().line.unit_price, 30.0);

        // Self-notifications fall under the tolerance
        assert_eq!(a.apply_price_updates(), 0);
        assert_eq!(b.apply_price_updates(), 0);
    }

    #[test]
    fn own_earlier_prices_are_not_replayed() {
        let broker = PriceBroker::new();
        let mut editor = editor().with_broker(broker.clone(), "solo");

        let row = editor.append_blank_row().unwrap();
        editor
            .select_catalog_resource(&row, &resource("cement", "MT", "bls", 25.0), None)
            .unwrap();
        editor.update_field(&row, FieldEdit::UnitPrice(30.0)).unwrap();

        assert_eq!(editor.apply_price_updates(), 0);
        assert_eq!(editor.row(&row).unwrap().line.unit_price, 30.0);
    }

    #[test]
    fn latest_broadcast_price_wins() {
        let broker = PriceBroker::new();
        let mut a = editor().with_broker(broker.clone(), "a");
        let mut b = editor().with_broker(broker.clone(), "b");

        let cement = resource("cement", "MT", "bls", 25.0);
        let row_a = a.append_blank_row().unwrap();
        a.select_catalog_resource(&row_a, &cement, None).unwrap();
        let row_b = b.append_blank_row().unwrap();
        b.select_catalog_resource(&row_b, &cement, None).unwrap();

        a.update_field(&row_a, FieldEdit::UnitPrice(30.0)).unwrap();
        a.update_field(&row_a, FieldEdit::UnitPrice(35.0)).unwrap();
        assert_eq!(b.apply_price_updates(), 1);
        assert_eq!(b.row(&row_b).unwrap().line.unit_price, 35.0);
    }

    fn source_apu() -> PersistedApu {
        let mut sand = ResourceLine::blank(RowId::persisted("l-1"), 1);
        sand.resource_ref = Some("sand".into());
        sand.description = "Arena".into();
        sand.unit = "m3".into();
        sand.quantity = 2.0;
        sand.unit_price = 5.0;
        sand.partial_cost = 10.0;

        let mut peon = ResourceLine::blank(RowId::persisted("l-2"), 0);
        peon.resource_ref = Some("peon".into());
        peon.description = "Peon".into();
        peon.resource_type = ResourceType::Labor;
        peon.unit = "hh".into();
        peon.crew_size = Some(1.0);
        peon.quantity = 2.0;
        peon.unit_price = 10.0;
        peon.partial_cost = 20.0;

        PersistedApu {
            id: "apu-9".into(),
            line_item: LineItemRef::new("li-9", "p-1", "b-1"),
            params: ApuParams::new(4.0, 8.0).unwrap(),
            lines: vec![sand, peon],
        }
    }

    #[test]
    fn template_copies_rows_under_fresh_ids() {
        let source = source_apu();
        let editor = ApuEditor::from_template(
            &source,
            LineItemRef::new("temp_1", "p-1", "b-1"),
            EngineConfig::default(),
        );

        assert_eq!(editor.params(), source.params);
        assert!(editor.apu_id().is_none());
        assert!(editor.baseline().is_none());
        assert!(editor.is_dirty());
        assert!(editor.rows().iter().all(|r| r.is_new && r.line.id.is_temp()));

        let lines = editor.lines();
        assert_eq!(lines[0].description, "Peon");
        assert_eq!(lines[1].description, "Arena");
        assert_eq!(lines[1].order, 1);
        assert_eq!(editor.unit_price(), 30.0);
    }

    #[test]
    fn template_plans_a_new_apu() {
        let editor = ApuEditor::from_template(
            &source_apu(),
            LineItemRef::new("li-10", "p-1", "b-1"),
            EngineConfig::default(),
        );
        let plan = editor.plan().unwrap();
        let creation = plan.create_apu.unwrap();
        assert_eq!(creation.request.line_item.id, "li-10");
        assert_eq!(creation.request.params.rendimiento, 4.0);
        assert_eq!(creation.request.lines.len(), 2);
    }

    #[test]
    fn read_only_editor_refuses_edits() {
        let mut editor = ApuEditor::from_template(
            &source_apu(),
            LineItemRef::new("li-10", "p-1", "b-1"),
            EngineConfig::default(),
        )
        .read_only();
        let row = editor.rows()[0].line.id.clone();
        let before = editor.lines();

        assert!(matches!(editor.append_blank_row(), Err(Error::ReadOnly { .. })));
        assert!(matches!(
            editor.update_field(&row, FieldEdit::Quantity(9.0)),
            Err(Error::ReadOnly { .. })
        ));
        assert!(matches!(editor.remove_row(&row), Err(Error::ReadOnly { .. })));
        assert!(matches!(editor.set_parameters(2.0, 8.0), Err(Error::ReadOnly { .. })));
        assert!(matches!(
            editor.push_line(before[0].clone()),
            Err(Error::ReadOnly { .. })
        ));
        assert_eq!(editor.lines(), before);

        editor.set_read_only(false);
        assert!(editor.append_blank_row().is_ok());
    }

    #[test]
    fn pushing_a_known_id_mints_a_new_row() {
        let mut editor = editor();
        editor.seed(Some(source_apu()));
        let stored = editor.row(&RowId::persisted("l-1")).unwrap().line.clone();

        editor.remove_row(&RowId::persisted("l-1")).unwrap();
        let row = editor.push_line(stored).unwrap();
        assert!(row.is_temp());

        let plan = editor.plan().unwrap();
        let mut kinds: Vec<&str> = plan.operations.iter().map(|op| op.kind()).collect();
        kinds.sort();
        assert_eq!(kinds, vec!["create", "delete"]);
    }
}
