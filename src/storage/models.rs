//! Storage record models for the document store.
//!
//! [`ItemDocument`] is the wire shape of an item in the remote store, kept
//! separate from the domain [`ItemRecord`] so the store can hold records the
//! engine would reject. Conversion into the domain validates; conversion out
//! of it drops view-only state.

use crate::domain::{Importance, ItemId, ItemRecord, RemoteChange, Result, ShoplistError};
use serde::{Deserialize, Serialize};

/// An item as stored in a user's collection.
///
/// ```json
/// {"id": 1700000000000, "text": "milk", "importance": "IMPORTANT",
///  "isNewEntry": false, "isOptionsExpanded": false}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    pub id: i64,
    #[serde(default)]
    pub text: String,
    /// Importance name; validated when converted to a domain record.
    pub importance: String,
    #[serde(default)]
    pub is_new_entry: bool,
    #[serde(default)]
    pub is_options_expanded: bool,
}

impl ItemDocument {
    /// Returns the document key within a collection.
    #[must_use]
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

impl From<&ItemRecord> for ItemDocument {
    fn from(record: &ItemRecord) -> Self {
        Self {
            id: record.id.get(),
            text: record.text.clone(),
            importance: record.importance.as_str().to_string(),
            is_new_entry: record.is_new_entry,
            is_options_expanded: false,
        }
    }
}

impl TryFrom<ItemDocument> for ItemRecord {
    type Error = ShoplistError;

    /// Validates a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::InvalidRecord`] if the importance name is not
    /// one of the known levels.
    fn try_from(doc: ItemDocument) -> Result<Self> {
        let importance: Importance = doc
            .importance
            .parse()
            .map_err(|_| ShoplistError::InvalidRecord(format!("document {} has importance {:?}", doc.id, doc.importance)))?;

        Ok(Self {
            id: ItemId(doc.id),
            text: doc.text,
            importance,
            is_new_entry: doc.is_new_entry,
            options_expanded: false,
        })
    }
}

/// A change-feed entry emitted by a document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentChange {
    Added(ItemDocument),
    Modified(ItemDocument),
    Removed { id: i64 },
}

impl TryFrom<DocumentChange> for RemoteChange {
    type Error = ShoplistError;

    /// Validates the carried document, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::InvalidRecord`] for malformed documents.
    fn try_from(change: DocumentChange) -> Result<Self> {
        Ok(match change {
            DocumentChange::Added(doc) => Self::Added(doc.try_into()?),
            DocumentChange::Modified(doc) => Self::Modified(doc.try_into()?),
            DocumentChange::Removed { id } => Self::Removed(ItemId(id)),
        })
    }
}
