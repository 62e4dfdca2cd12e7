//! [`FlakyStore`]: a memory store that fails on demand.

use std::collections::HashSet;

use apu_core::{ApuStore, Error, MemoryStore, Result};
use apu_model::{CreateApuRequest, LineItemRef, LinePayload, ParamsUpdate, PersistedApu};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Wraps a [`MemoryStore`], logging every call and failing the operations
/// named with [`FlakyStore::fail_on`].
///
/// Failed calls are logged but do not reach the inner store.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Make every call of `operation` fail until cleared
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().clear();
    }

    /// Every call so far, as `operation` or `operation:target`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.split(':').next() == Some(operation))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, operation: &'static str, target: &str) -> Result<()> {
        self.calls.lock().push(format!("{}:{}", operation, target));
        if self.failing.lock().contains(operation) {
            return Err(Error::store(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ApuStore for FlakyStore {
    async fn fetch_apu(&self, line_item_id: &str) -> Result<Option<PersistedApu>> {
        self.record("fetch_apu", line_item_id)?;
        self.inner.fetch_apu(line_item_id).await
    }

    async fn create_apu(&self, request: &CreateApuRequest) -> Result<PersistedApu> {
        self.record("create_apu", &request.line_item.id)?;
        self.inner.create_apu(request).await
    }

    async fn update_apu_parameters(&self, apu_id: &str, update: &ParamsUpdate) -> Result<()> {
        self.record("update_apu_parameters", apu_id)?;
        self.inner.update_apu_parameters(apu_id, update).await
    }

    async fn add_resource_line(&self, apu_id: &str, line: &LinePayload) -> Result<String> {
        self.record("add_resource_line", &line.resource_id)?;
        self.inner.add_resource_line(apu_id, line).await
    }

    async fn update_resource_line(
        &self,
        apu_id: &str,
        line_id: &str,
        line: &LinePayload,
    ) -> Result<()> {
        self.record("update_resource_line", line_id)?;
        self.inner.update_resource_line(apu_id, line_id, line).await
    }

    async fn remove_resource_line(&self, apu_id: &str, line_id: &str) -> Result<()> {
        self.record("remove_resource_line", line_id)?;
        self.inner.remove_resource_line(apu_id, line_id).await
    }

    async fn refresh_line_item(&self, line_item: &LineItemRef) -> Result<()> {
        self.record("refresh_line_item", &line_item.id)?;
        self.inner.refresh_line_item(line_item).await
    }
}
