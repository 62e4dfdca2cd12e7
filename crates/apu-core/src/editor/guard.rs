//! In-flight save tracking

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

/// Line items with a save currently running
///
/// Editors opened on the same line item must share one registry for the
/// guard to span them. Cloning yields another handle to the same set.
#[derive(Debug, Clone, Default)]
pub struct SaveRegistry {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SaveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as saving, or `None` when a save is already running
    pub fn try_acquire(&self, key: &str) -> Option<SaveGuard> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(key.to_string()) {
            return None;
        }
        Some(SaveGuard {
            registry: self.clone(),
            key: key.to_string(),
        })
    }

    pub fn is_saving(&self, key: &str) -> bool {
        self.in_flight.lock().contains(key)
    }
}

/// Held for the duration of a save; releases the key on drop
#[derive(Debug)]
pub struct SaveGuard {
    registry: SaveRegistry,
    key: String,
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        self.registry.in_flight.lock().remove(&self.key);
    }
}
