//! Document store abstraction.
//!
//! This module defines the [`DocumentStore`] trait, the boundary between the
//! list engine and whatever remote store mirrors it. The trait covers exactly
//! what the sync worker needs: keyed upserts, a targeted text patch, removal,
//! a full read, and a change feed.

use crate::domain::error::Result;
use crate::storage::models::{DocumentChange, ItemDocument};

/// Abstraction over a per-user document collection.
///
/// Implementations are driven from the single sync worker thread, so they
/// only need to be `Send`.
///
/// # Implementations
///
/// - [`JsonStore`](crate::storage::JsonStore): JSON file with atomic writes
///
/// # Examples
///
/// ```no_run
/// use shoplist::storage::{DocumentStore, JsonStore};
/// use std::path::PathBuf;
///
/// let mut store = JsonStore::open(PathBuf::from("/tmp/shoplist.json"), "UserID-0000")?;
/// let documents = store.get_all()?;
/// let changes = store.take_changes()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait DocumentStore: Send {
    /// Creates or replaces the document keyed by `document.id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert(&mut self, document: &ItemDocument) -> Result<()>;

    /// Looks up a document by item id. Returns `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn find_by_id(&self, id: i64) -> Result<Option<ItemDocument>>;

    /// Replaces only the text of an existing document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist or the write fails.
    fn update_text(&mut self, id: i64, text: &str) -> Result<()>;

    /// Deletes a document. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn remove(&mut self, id: i64) -> Result<bool>;

    /// Returns every document in the collection, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_all(&self) -> Result<Vec<ItemDocument>>;

    /// Drains pending change-feed entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed cannot be read.
    fn take_changes(&mut self) -> Result<Vec<DocumentChange>>;
}
