//! JSON file-based document store.
//!
//! Stores every user's collection in a single human-readable JSON file. The
//! whole file is kept in memory and rewritten atomically (write-to-temp +
//! rename) on each modification.
//!
//! # Change Feed
//!
//! Opening a store primes the change feed with an `Added` entry for every
//! document already in the collection, so the first drain delivers the
//! initial snapshot. Every later write queues the matching change, including
//! writes made by this client; the engine reconciles echoes by id.

use crate::domain::error::{Result, ShoplistError};
use crate::storage::backend::DocumentStore;
use crate::storage::models::{DocumentChange, ItemDocument};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// JSON storage container format.
///
/// ```json
/// {
///   "version": 1,
///   "collections": {
///     "UserID-0000": {
///       "1700000000000": {
///         "id": 1700000000000,
///         "text": "milk",
///         "importance": "IMPORTANT",
///         "isNewEntry": false,
///         "isOptionsExpanded": false
///       }
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    version: u32,

    /// Documents per user, keyed by document id.
    #[serde(default)]
    collections: HashMap<String, BTreeMap<String, ItemDocument>>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            collections: HashMap::new(),
        }
    }
}

/// JSON file document store scoped to one user's collection.
///
/// `Send` but not `Sync`; owned by the sync worker thread.
pub struct JsonStore {
    file_path: PathBuf,
    user_id: String,
    data: StorageData,
    pending: Vec<DocumentChange>,
    dirty: bool,
}

impl std::fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("file_path", &self.file_path)
            .field("user_id", &self.user_id)
            .field("pending", &self.pending.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl JsonStore {
    /// Opens (or creates) the store file and selects `user_id`'s collection.
    ///
    /// Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - The file exists but contains invalid JSON
    /// - The file cannot be read
    pub fn open(file_path: PathBuf, user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        tracing::debug!(path = ?file_path, user_id = %user_id, "opening JSON store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty store");
            StorageData::default()
        };

        let mut initial: Vec<ItemDocument> = data
            .collections
            .get(&user_id)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        initial.sort_by_key(|doc| doc.id);
        let pending: Vec<DocumentChange> = initial.into_iter().map(DocumentChange::Added).collect();

        tracing::debug!(documents = pending.len(), "store opened, initial snapshot queued");

        Ok(Self {
            file_path,
            user_id,
            data,
            pending,
            dirty: false,
        })
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the selected user's collection id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| ShoplistError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version != FORMAT_VERSION {
            return Err(ShoplistError::Storage(format!(
                "unsupported store version {} (expected {FORMAT_VERSION})",
                data.version
            )));
        }

        tracing::debug!(collections = data.collections.len(), "loaded store data");
        Ok(data)
    }

    /// Writes the file atomically if anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, the temporary write, or the rename
    /// fails.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| ShoplistError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "store saved");
        Ok(())
    }

    fn collection(&self) -> Option<&BTreeMap<String, ItemDocument>> {
        self.data.collections.get(&self.user_id)
    }

    fn collection_mut(&mut self) -> &mut BTreeMap<String, ItemDocument> {
        self.data.collections.entry(self.user_id.clone()).or_default()
    }

    fn commit(&mut self, change: DocumentChange) -> Result<()> {
        self.pending.push(change);
        self.dirty = true;
        self.flush()
    }
}

impl DocumentStore for JsonStore {
    fn upsert(&mut self, document: &ItemDocument) -> Result<()> {
        let _span = tracing::debug_span!("json_upsert", id = document.id).entered();

        let previous = self.collection_mut().insert(document.key(), document.clone());
        let change = if previous.is_some() {
            DocumentChange::Modified(document.clone())
        } else {
            DocumentChange::Added(document.clone())
        };
        tracing::debug!(replaced = previous.is_some(), "document upserted");
        self.commit(change)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ItemDocument>> {
        Ok(self.collection().and_then(|docs| docs.get(&id.to_string())).cloned())
    }

    fn update_text(&mut self, id: i64, text: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_update_text", id).entered();

        let document = self
            .collection_mut()
            .get_mut(&id.to_string())
            .ok_or_else(|| ShoplistError::Storage(format!("document not found: {id}")))?;
        document.text = text.to_string();
        let updated = document.clone();

        self.commit(DocumentChange::Modified(updated))
    }

    fn remove(&mut self, id: i64) -> Result<bool> {
        let _span = tracing::debug_span!("json_remove", id).entered();

        if self.collection_mut().remove(&id.to_string()).is_none() {
            tracing::debug!("document already absent");
            return Ok(false);
        }
        self.commit(DocumentChange::Removed { id })?;
        Ok(true)
    }

    fn get_all(&self) -> Result<Vec<ItemDocument>> {
        let mut documents: Vec<ItemDocument> = self
            .collection()
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();
        documents.sort_by_key(|doc| doc.id);
        Ok(documents)
    }

    fn take_changes(&mut self) -> Result<Vec<DocumentChange>> {
        let changes = std::mem::take(&mut self.pending);
        tracing::trace!(count = changes.len(), "change feed drained");
        Ok(changes)
    }
}

impl Drop for JsonStore {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = self.flush() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}
