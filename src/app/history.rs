//! Bounded undo history.
//!
//! The [`ActionLog`] is a LIFO stack of [`ActionLogEntry`] values, one per
//! reversible mutation. Only single-step undo is supported: entries are popped
//! and reversed, never replayed. The depth is capped; once full, the oldest
//! entry is dropped to make room for the newest.

use crate::domain::{Importance, ItemId, ItemRecord};
use std::collections::VecDeque;

/// Default number of entries kept by [`ActionLog`].
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// A reversible mutation recorded for undo.
///
/// Text and importance entries refer to the item by id; the engine looks it up
/// again at undo time. `Remove` keeps the removed record itself since the list
/// no longer holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionLogEntry {
    /// An item was deleted.
    Remove(ItemRecord),

    /// An item's text was committed; `previous_text` is the text it had when
    /// the edit started.
    UpdateText { id: ItemId, previous_text: String },

    /// An item's importance was changed from `previous`.
    UpdateImportance { id: ItemId, previous: Importance },
}

impl ActionLogEntry {
    /// Returns the id of the item the entry refers to.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        match self {
            Self::Remove(record) => record.id,
            Self::UpdateText { id, .. } | Self::UpdateImportance { id, .. } => *id,
        }
    }
}

/// Capped LIFO history of reversible mutations.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    capacity: usize,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_DEPTH)
    }
}

impl ActionLog {
    /// Creates an empty log holding at most `capacity` entries.
    ///
    /// A capacity of zero disables history: every push is discarded.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_DEPTH)),
            capacity,
        }
    }

    /// Records an entry, evicting the oldest one if the log is full.
    pub fn push(&mut self, entry: ActionLogEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(item_id = %evicted.id(), "history full, evicted oldest entry");
            }
        }
        self.entries.push_back(entry);
    }

    /// Removes and returns the most recent entry.
    pub fn pop_last(&mut self) -> Option<ActionLogEntry> {
        self.entries.pop_back()
    }

    /// Returns the most recent entry without removing it.
    #[must_use]
    pub fn last(&self) -> Option<&ActionLogEntry> {
        self.entries.back()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
