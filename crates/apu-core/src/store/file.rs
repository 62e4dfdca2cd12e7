//! JSON file store
//!
//! Every call reads the document under a shared lock. Mutations write it
//! back under an exclusive lock through a temporary file and a rename, so
//! readers never observe a half-written document.

use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use apu_model::{
    CatalogResource, CreateApuRequest, LineItemRef, LinePayload, ParamsUpdate, PersistedApu,
    PriceOverride,
};
use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::Mutex;

use super::{ApuStore, Catalog, PriceOverrides, StoreDocument};
use crate::{Error, Result};

/// Store persisted as a single JSON document
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open an existing store file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::NotFound(format!("store file {}", path.display())));
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Create a store file holding `doc`, replacing any existing one
    pub fn create(path: impl Into<PathBuf>, doc: &StoreDocument) -> Result<Self> {
        let path = path.into();
        save_document(&path, doc)?;
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<StoreDocument> {
        load_document(&self.path)
    }

    fn mutate<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut StoreDocument) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock();
        let mut doc = load_document(&self.path)?;
        let value = apply(&mut doc)?;
        save_document(&self.path, &doc)?;
        tracing::trace!(path = %self.path.display(), operation, "Store document written");
        Ok(value)
    }
}

fn load_document(path: &Path) -> Result<StoreDocument> {
    let file = File::open(path)?;
    file.lock_shared().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let mut content = String::new();
    (&file).read_to_string(&mut content)?;
    let doc: StoreDocument = serde_json::from_str(&content)?;
    Ok(doc)
}

fn save_document(path: &Path, doc: &StoreDocument) -> Result<()> {
    let content = serde_json::to_string_pretty(doc)?;

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    lock_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[async_trait]
impl ApuStore for FileStore {
    async fn fetch_apu(&self, line_item_id: &str) -> Result<Option<PersistedApu>> {
        Ok(self.load()?.apu_for(line_item_id).cloned())
    }

    async fn create_apu(&self, request: &CreateApuRequest) -> Result<PersistedApu> {
        self.mutate("create_apu", |doc| doc.create_apu(request))
    }

    async fn update_apu_parameters(&self, apu_id: &str, update: &ParamsUpdate) -> Result<()> {
        self.mutate("update_apu_parameters", |doc| doc.update_params(apu_id, update))
    }

    async fn add_resource_line(&self, apu_id: &str, line: &LinePayload) -> Result<String> {
        self.mutate("add_resource_line", |doc| doc.add_line(apu_id, line))
    }

    async fn update_resource_line(
        &self,
        apu_id: &str,
        line_id: &str,
        line: &LinePayload,
    ) -> Result<()> {
        self.mutate("update_resource_line", |doc| doc.update_line(apu_id, line_id, line))
    }

    async fn remove_resource_line(&self, apu_id: &str, line_id: &str) -> Result<()> {
        self.mutate("remove_resource_line", |doc| doc.remove_line(apu_id, line_id))
    }

    async fn refresh_line_item(&self, line_item: &LineItemRef) -> Result<()> {
        self.mutate("refresh_line_item", |doc| {
            doc.refresh_line_item(line_item);
            Ok(())
        })
    }
}

#[async_trait]
impl Catalog for FileStore {
    async fn resource(&self, id: &str) -> Result<CatalogResource> {
        self.load()?.resource(id)
    }
}

#[async_trait]
impl PriceOverrides for FileStore {
    async fn price_override(
        &self,
        budget_id: &str,
        resource_id: &str,
    ) -> Result<Option<PriceOverride>> {
        Ok(self.load()?.price_override(budget_id, resource_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::create(&path, &StoreDocument::new()).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), StoreDocument::new());

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"version\": \"1.0\""));
    }

    #[test]
    fn open_requires_existing_file() {
        let dir = tempdir().unwrap();
        let err = FileStore::open(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn failed_mutation_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::create(&path, &StoreDocument::new()).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let result = store.mutate("remove_resource_line", |doc| doc.remove_line("apu-1", "line-1"));
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
