//! Change notification for engine observers.
//!
//! Observers are injected into the engine as [`ListObserver`] trait objects
//! and receive one [`ListChange`] per logical operation, after the mutation,
//! the history update, and the re-sort have all happened. Each change carries
//! an immutable [`Snapshot`] of the ordered list; observers never see the
//! engine's own storage.

use crate::domain::{ItemId, ItemRecord};
use std::ops::Deref;
use std::sync::Arc;

/// Immutable, cheaply clonable copy of the ordered item sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    items: Arc<[ItemRecord]>,
}

impl Snapshot {
    pub(crate) fn new(items: &[ItemRecord]) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    /// Returns the item ids in list order.
    #[must_use]
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.id == id)
    }
}

impl Deref for Snapshot {
    type Target = [ItemRecord];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    ItemAdded,
    ItemRemoved,
    ImportanceChanged,
    TextEdited,
    TextCommitted,
    OptionsToggled,
    Undone,
    RemoteSynced,
}

/// A single notification delivered to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChange {
    pub snapshot: Snapshot,
    pub cause: ChangeCause,
    /// Set when a new placeholder was appended and the view should scroll to
    /// the end of the list.
    pub scroll_to_bottom: bool,
}

/// Receiver of engine notifications.
///
/// Implemented for any `FnMut(&ListChange)` closure.
pub trait ListObserver {
    fn on_change(&mut self, change: &ListChange);
}

impl<F> ListObserver for F
where
    F: FnMut(&ListChange),
{
    fn on_change(&mut self, change: &ListChange) {
        self(change);
    }
}

/// Handle returned by `ListEngine::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);
