//! Change-feed events as seen by the list engine.
//!
//! The document store reports changes in its own record shape; these are
//! validated and converted into [`RemoteChange`] before they reach the engine,
//! so the engine only ever reconciles well-formed records.

use super::item::{ItemId, ItemRecord};

/// A single add/modify/remove notification from the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    /// A record appeared remotely.
    Added(ItemRecord),
    /// An existing record was replaced remotely.
    Modified(ItemRecord),
    /// A record was deleted remotely.
    Removed(ItemId),
}

impl RemoteChange {
    /// Returns the id of the affected record.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        match self {
            Self::Added(record) | Self::Modified(record) => record.id,
            Self::Removed(id) => *id,
        }
    }
}
