//! Item domain model.
//!
//! This module defines [`ItemRecord`], a single shopping-list entry, together
//! with its [`Importance`] level and the explicit entry lifecycle
//! ([`EntryState`]) that decides when a fresh entry is committed and a new
//! placeholder has to follow it.

use super::error::ShoplistError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique, immutable identifier of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Priority of a shopping-list item.
///
/// Variants are declared in rank order, so the derived `Ord` sorts
/// `Important` before `Normal` before `Unimportant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Importance {
    Important,
    #[default]
    Normal,
    Unimportant,
}

impl Importance {
    /// All levels in rank order.
    pub const ALL: [Self; 3] = [Self::Important, Self::Normal, Self::Unimportant];

    /// Returns the upper-case wire name used by the document store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Important => "IMPORTANT",
            Self::Normal => "NORMAL",
            Self::Unimportant => "UNIMPORTANT",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = ShoplistError;

    /// Parses a level name case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::InvalidRecord`] for anything but the three
    /// level names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ShoplistError::InvalidRecord(format!("unknown importance: {s:?}")))
    }
}

/// Lifecycle of a list entry.
///
/// Mirrors [`ItemRecord::is_new_entry`]: `Fresh` while the entry is still the
/// one being typed, `Committed` forever after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Fresh,
    Committed,
}

/// User actions that can commit a fresh entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTrigger {
    /// An importance level was picked for the entry.
    ImportanceChosen,
    /// An edit of the entry's text reached its commit boundary.
    TextFinalized,
}

/// Result of feeding a trigger into [`EntryState::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: EntryState,
    /// Whether a new trailing placeholder must be appended.
    pub spawn_placeholder: bool,
}

impl EntryState {
    /// Transition table for entry triggers.
    ///
    /// | state | trigger | next | spawn placeholder |
    /// |---|---|---|---|
    /// | `Fresh` | any | `Committed` | yes |
    /// | `Committed` | any | `Committed` | no |
    #[must_use]
    pub const fn on(self, trigger: EntryTrigger) -> Transition {
        match (self, trigger) {
            (Self::Fresh, EntryTrigger::ImportanceChosen | EntryTrigger::TextFinalized) => Transition {
                next: Self::Committed,
                spawn_placeholder: true,
            },
            (Self::Committed, _) => Transition {
                next: Self::Committed,
                spawn_placeholder: false,
            },
        }
    }
}

/// A single shopping-list entry.
///
/// # Fields
///
/// - `id`: unique identifier, never changes after creation
/// - `text`: item content; empty text marks the trailing placeholder
/// - `importance`: priority used by the ordering policy
/// - `is_new_entry`: true until the entry is committed (see [`EntryState`])
/// - `options_expanded`: view state only, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub text: String,
    pub importance: Importance,
    pub is_new_entry: bool,
    #[serde(skip)]
    pub options_expanded: bool,
}

impl ItemRecord {
    /// Creates a fresh placeholder: empty text, normal importance.
    ///
    /// # Examples
    ///
    /// ```
    /// use shoplist::domain::{Importance, ItemId, ItemRecord};
    ///
    /// let item = ItemRecord::placeholder(ItemId(7));
    /// assert!(item.is_placeholder());
    /// assert!(item.is_new_entry);
    /// assert_eq!(item.importance, Importance::Normal);
    /// ```
    #[must_use]
    pub const fn placeholder(id: ItemId) -> Self {
        Self {
            id,
            text: String::new(),
            importance: Importance::Normal,
            is_new_entry: true,
            options_expanded: false,
        }
    }

    /// Creates a committed item with the given text and importance.
    pub fn new(id: ItemId, text: impl Into<String>, importance: Importance) -> Self {
        Self {
            id,
            text: text.into(),
            importance,
            is_new_entry: false,
            options_expanded: false,
        }
    }

    /// Returns true if the item has no text yet.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the lifecycle state encoded by `is_new_entry`.
    #[must_use]
    pub const fn entry_state(&self) -> EntryState {
        if self.is_new_entry {
            EntryState::Fresh
        } else {
            EntryState::Committed
        }
    }

    /// Feeds a trigger into the lifecycle and stores the resulting state.
    ///
    /// Returns whether a placeholder must be spawned.
    pub fn apply_trigger(&mut self, trigger: EntryTrigger) -> bool {
        let transition = self.entry_state().on(trigger);
        self.is_new_entry = transition.next == EntryState::Fresh;
        transition.spawn_placeholder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_parses_case_insensitively() {
        assert_eq!("important".parse::<Importance>().unwrap(), Importance::Important);
        assert_eq!("Normal".parse::<Importance>().unwrap(), Importance::Normal);
        assert_eq!(" UNIMPORTANT ".parse::<Importance>().unwrap(), Importance::Unimportant);
    }

    #[test]
    fn importance_rejects_unknown_names() {
        let err = "urgent".parse::<Importance>().unwrap_err();
        assert!(matches!(err, ShoplistError::InvalidRecord(_)));
    }

    #[test]
    fn importance_ranks_important_first() {
        assert!(Importance::Important < Importance::Normal);
        assert!(Importance::Normal < Importance::Unimportant);
        assert_eq!(Importance::default(), Importance::Normal);
    }

    #[test]
    fn importance_display_matches_wire_name() {
        for level in Importance::ALL {
            assert_eq!(level.to_string().parse::<Importance>().unwrap(), level);
        }
        assert_eq!(Importance::Unimportant.to_string(), "UNIMPORTANT");
    }

    #[test]
    fn fresh_entry_commits_once() {
        let mut item = ItemRecord::placeholder(ItemId(1));
        item.text = "milk".into();

        assert!(item.apply_trigger(EntryTrigger::ImportanceChosen));
        assert!(!item.is_new_entry);
        assert!(!item.apply_trigger(EntryTrigger::TextFinalized));
        assert_eq!(item.entry_state(), EntryState::Committed);
    }

    #[test]
    fn transition_table_is_exhaustive() {
        for trigger in [EntryTrigger::ImportanceChosen, EntryTrigger::TextFinalized] {
            let fresh = EntryState::Fresh.on(trigger);
            assert_eq!(fresh.next, EntryState::Committed);
            assert!(fresh.spawn_placeholder);

            let committed = EntryState::Committed.on(trigger);
            assert_eq!(committed.next, EntryState::Committed);
            assert!(!committed.spawn_placeholder);
        }
    }
}
