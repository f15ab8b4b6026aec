//! The list state engine.
//!
//! [`ListEngine`] owns the authoritative, ordered item list and is the only
//! place it is mutated. Each public operation is atomic from the caller's
//! point of view: the mutation, the history entry, the re-sort, and a single
//! observer notification all happen inside one call, in that order.
//!
//! # Failure Semantics
//!
//! Operations naming an unknown id are no-ops. Host events can race with list
//! mutations (a remote removal arriving while a stale id is still in flight),
//! so the engine logs and ignores instead of failing.
//!
//! # Example
//!
//! ```rust
//! use shoplist::app::{EngineOptions, IdStrategy, ListEngine};
//! use shoplist::domain::Importance;
//!
//! let mut engine = ListEngine::new(EngineOptions {
//!     id_strategy: IdStrategy::Sequential,
//!     ..EngineOptions::default()
//! });
//! let id = engine.add_item();
//! engine.change_text(id, "milk");
//! engine.change_importance(id, Importance::Important);
//!
//! assert_eq!(engine.len(), 2);
//! assert!(engine.undo().is_some());
//! ```

use super::history::{ActionLog, ActionLogEntry, DEFAULT_HISTORY_DEPTH};
use super::observer::{ChangeCause, ListChange, ListObserver, Snapshot, SubscriptionId};
use super::ordering::sort_items;
use crate::domain::{EntryTrigger, Importance, ItemId, ItemRecord, RemoteChange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How new item ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Creation time in epoch milliseconds, bumped past every id seen.
    #[default]
    Timestamp,
    /// One past the largest id seen.
    Sequential,
}

/// Construction options for [`ListEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum number of undo entries kept.
    pub history_depth: usize,
    pub id_strategy: IdStrategy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            id_strategy: IdStrategy::Timestamp,
        }
    }
}

/// Result of an operation that may commit a fresh entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    /// The placeholder appended because a fresh entry was committed.
    pub placeholder: Option<ItemId>,
}

/// Result of [`ListEngine::undo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Undone {
    /// The history entry that was reversed.
    pub entry: ActionLogEntry,
    /// Empty items removed because the restored item is empty again.
    pub dropped: Vec<ItemId>,
}

/// Issues ids that never collide with ids already seen.
#[derive(Debug, Clone)]
struct IdGenerator {
    strategy: IdStrategy,
    last: i64,
}

impl IdGenerator {
    const fn new(strategy: IdStrategy) -> Self {
        Self { strategy, last: 0 }
    }

    fn observe(&mut self, id: ItemId) {
        self.last = self.last.max(id.get());
    }

    fn next(&mut self) -> ItemId {
        let floor = self.last.saturating_add(1);
        let id = match self.strategy {
            IdStrategy::Timestamp => chrono::Utc::now().timestamp_millis().max(floor),
            IdStrategy::Sequential => floor,
        };
        self.last = id;
        ItemId(id)
    }
}

/// Owner of the ordered item list, its undo history, and its observers.
pub struct ListEngine {
    items: Vec<ItemRecord>,
    history: ActionLog,
    ids: IdGenerator,
    observers: Vec<(SubscriptionId, Box<dyn ListObserver>)>,
    next_subscription: u64,
}

impl fmt::Debug for ListEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListEngine")
            .field("items", &self.items)
            .field("history", &self.history)
            .field("ids", &self.ids)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for ListEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl ListEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new(options: EngineOptions) -> Self {
        Self {
            items: Vec::new(),
            history: ActionLog::with_capacity(options.history_depth),
            ids: IdGenerator::new(options.id_strategy),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Creates an engine seeded with `items`, ordered by the ordering policy.
    ///
    /// Records sharing an id with an earlier record are dropped.
    #[must_use]
    pub fn with_items(options: EngineOptions, items: Vec<ItemRecord>) -> Self {
        let mut engine = Self::new(options);
        for item in items {
            if engine.position(item.id).is_some() {
                tracing::debug!(item_id = %item.id, "dropping duplicate seed item");
                continue;
            }
            engine.ids.observe(item.id);
            engine.items.push(item);
        }
        sort_items(&mut engine.items);
        engine
    }

    /// Registers an observer for future changes.
    pub fn subscribe(&mut self, observer: impl ListObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Appends a fresh placeholder to the end of the list.
    ///
    /// The list is not re-sorted: an empty item already belongs at the end.
    /// Observers are told to scroll to the bottom.
    pub fn add_item(&mut self) -> ItemId {
        let _span = tracing::debug_span!("add_item").entered();

        let id = self.push_placeholder();
        self.notify(ChangeCause::ItemAdded, true);
        id
    }

    /// Adds a placeholder only if the list has no empty item yet.
    ///
    /// Used at startup so a restored list does not end up with two.
    pub fn ensure_placeholder(&mut self) -> Option<ItemId> {
        if self.has_empty_item() {
            tracing::debug!("placeholder already present");
            None
        } else {
            Some(self.add_item())
        }
    }

    /// Deletes an item and records it for undo.
    pub fn remove_item(&mut self, id: ItemId) -> Option<ItemRecord> {
        let _span = tracing::debug_span!("remove_item", item_id = %id).entered();

        let Some(pos) = self.position(id) else {
            tracing::debug!("remove ignored, unknown item");
            return None;
        };

        let removed = self.items.remove(pos);
        self.history.push(ActionLogEntry::Remove(removed.clone()));
        self.notify(ChangeCause::ItemRemoved, false);
        Some(removed)
    }

    /// Sets an item's importance and re-sorts.
    ///
    /// Picking an importance commits a fresh entry and appends a new
    /// placeholder, unless the list still has an empty item (the entry itself
    /// when it has no text yet).
    pub fn change_importance(&mut self, id: ItemId, importance: Importance) -> Option<Committed> {
        let _span = tracing::debug_span!("change_importance", item_id = %id, importance = %importance).entered();

        let Some(pos) = self.position(id) else {
            tracing::debug!("importance change ignored, unknown item");
            return None;
        };

        let item = &mut self.items[pos];
        self.history.push(ActionLogEntry::UpdateImportance {
            id,
            previous: item.importance,
        });
        let spawn = item.apply_trigger(EntryTrigger::ImportanceChosen);
        item.importance = importance;

        let placeholder = self.spawn_placeholder_if(spawn);
        sort_items(&mut self.items);
        self.notify(ChangeCause::ImportanceChanged, placeholder.is_some());
        Some(Committed { placeholder })
    }

    /// Updates an item's text while it is being typed.
    ///
    /// Nothing is recorded and the list is not re-sorted, so items do not
    /// jump around on every keystroke. See [`Self::record_text_change`].
    pub fn change_text(&mut self, id: ItemId, text: impl Into<String>) -> bool {
        let Some(item) = self.find_mut(id) else {
            tracing::debug!(item_id = %id, "text edit ignored, unknown item");
            return false;
        };

        item.text = text.into();
        self.notify(ChangeCause::TextEdited, false);
        true
    }

    /// Commits a text edit at its boundary (focus loss, explicit finalize).
    ///
    /// `original_text` is the text the item had when editing started and is
    /// what undo restores. A commit that leaves the text as it was is skipped
    /// so a plain focus change does not fill the history.
    pub fn record_text_change(&mut self, id: ItemId, original_text: &str) -> Option<Committed> {
        let _span = tracing::debug_span!("record_text_change", item_id = %id).entered();

        let Some(pos) = self.position(id) else {
            tracing::debug!("text commit ignored, unknown item");
            return None;
        };

        let item = &mut self.items[pos];
        if item.text == original_text {
            tracing::debug!("text unchanged, nothing to commit");
            return None;
        }

        self.history.push(ActionLogEntry::UpdateText {
            id,
            previous_text: original_text.to_owned(),
        });
        let spawn = !item.is_placeholder() && item.apply_trigger(EntryTrigger::TextFinalized);

        let placeholder = self.spawn_placeholder_if(spawn);
        sort_items(&mut self.items);
        self.notify(ChangeCause::TextCommitted, placeholder.is_some());
        Some(Committed { placeholder })
    }

    /// Shows or hides an item's importance options. View state only.
    pub fn set_options_expanded(&mut self, id: ItemId, expanded: bool) -> bool {
        let Some(item) = self.find_mut(id) else {
            tracing::debug!(item_id = %id, "options toggle ignored, unknown item");
            return false;
        };

        item.options_expanded = expanded;
        self.notify(ChangeCause::OptionsToggled, false);
        true
    }

    /// Reverses the most recent recorded mutation.
    ///
    /// Returns what was undone, or `None` if the history is empty. A removed
    /// item is re-inserted at the end and then sorted into place. When the
    /// restored item has empty text, every other empty item is dropped so the
    /// list keeps a single one.
    pub fn undo(&mut self) -> Option<Undone> {
        let _span = tracing::debug_span!("undo", history_len = self.history.len()).entered();

        let Some(entry) = self.history.pop_last() else {
            tracing::debug!("nothing to undo");
            return None;
        };

        match &entry {
            ActionLogEntry::Remove(record) => {
                self.ids.observe(record.id);
                if let Some(existing) = self.find_mut(record.id) {
                    existing.clone_from(record);
                } else {
                    self.items.push(record.clone());
                }
            }
            ActionLogEntry::UpdateText { id, previous_text } => {
                if let Some(item) = self.find_mut(*id) {
                    item.text.clone_from(previous_text);
                } else {
                    tracing::debug!(item_id = %id, "text undo skipped, item gone");
                }
            }
            ActionLogEntry::UpdateImportance { id, previous } => {
                if let Some(item) = self.find_mut(*id) {
                    item.importance = *previous;
                } else {
                    tracing::debug!(item_id = %id, "importance undo skipped, item gone");
                }
            }
        }

        let dropped = self.drop_extra_empties(entry.id());
        sort_items(&mut self.items);
        self.notify(ChangeCause::Undone, false);
        Some(Undone { entry, dropped })
    }

    /// Reconciles a batch of change-feed events by id.
    ///
    /// Added records are appended (or replace a record with the same id),
    /// modified records replace in place, removed ids are filtered out. Local
    /// view state and entry lifecycle survive a replacement. Remote changes
    /// are not undoable. Returns how many changes had an effect.
    pub fn apply_remote<I>(&mut self, changes: I) -> usize
    where
        I: IntoIterator<Item = RemoteChange>,
    {
        let _span = tracing::debug_span!("apply_remote").entered();

        let mut applied = 0;
        for change in changes {
            self.ids.observe(change.id());
            let effective = match change {
                RemoteChange::Added(record) => {
                    if let Some(existing) = self.find_mut(record.id) {
                        Self::merge_remote(existing, record);
                    } else {
                        self.items.push(record);
                    }
                    true
                }
                RemoteChange::Modified(record) => {
                    if let Some(existing) = self.find_mut(record.id) {
                        Self::merge_remote(existing, record);
                        true
                    } else {
                        tracing::debug!(item_id = %record.id, "modification for unknown item ignored");
                        false
                    }
                }
                RemoteChange::Removed(id) => {
                    let before = self.items.len();
                    self.items.retain(|item| item.id != id);
                    self.items.len() != before
                }
            };
            applied += usize::from(effective);
        }

        if applied > 0 {
            sort_items(&mut self.items);
            self.notify(ChangeCause::RemoteSynced, false);
        }

        tracing::debug!(applied, "remote changes reconciled");
        applied
    }

    /// Returns true if any item has empty text.
    #[must_use]
    pub fn has_empty_item(&self) -> bool {
        self.items.iter().any(ItemRecord::is_placeholder)
    }

    /// Returns an immutable copy of the current ordered list.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.items)
    }

    /// Returns the current ordered list.
    #[must_use]
    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[must_use]
    pub fn history(&self) -> &ActionLog {
        &self.history
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    fn find_mut(&mut self, id: ItemId) -> Option<&mut ItemRecord> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn push_placeholder(&mut self) -> ItemId {
        let id = self.ids.next();
        self.items.push(ItemRecord::placeholder(id));
        tracing::debug!(item_id = %id, "placeholder appended");
        id
    }

    /// Appends a placeholder when a commit asks for one, unless the list
    /// already has an empty item.
    fn spawn_placeholder_if(&mut self, spawn: bool) -> Option<ItemId> {
        (spawn && !self.has_empty_item()).then(|| self.push_placeholder())
    }

    /// Removes empty items other than `keep` if `keep` is itself empty.
    fn drop_extra_empties(&mut self, keep: ItemId) -> Vec<ItemId> {
        if !self.get(keep).is_some_and(ItemRecord::is_placeholder) {
            return Vec::new();
        }

        let dropped: Vec<ItemId> = self
            .items
            .iter()
            .filter(|item| item.id != keep && item.is_placeholder())
            .map(|item| item.id)
            .collect();
        if !dropped.is_empty() {
            self.items.retain(|item| !dropped.contains(&item.id));
            tracing::debug!(?dropped, "redundant placeholders dropped");
        }
        dropped
    }

    fn merge_remote(local: &mut ItemRecord, remote: ItemRecord) {
        local.text = remote.text;
        local.importance = remote.importance;
    }

    fn notify(&mut self, cause: ChangeCause, scroll_to_bottom: bool) {
        if self.observers.is_empty() {
            return;
        }

        let change = ListChange {
            snapshot: self.snapshot(),
            cause,
            scroll_to_bottom,
        };
        for (_, observer) in &mut self.observers {
            observer.on_change(&change);
        }
        tracing::trace!(?cause, observers = self.observers.len(), "observers notified");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sequential() -> EngineOptions {
        EngineOptions {
            id_strategy: IdStrategy::Sequential,
            ..EngineOptions::default()
        }
    }

    fn engine_with(items: Vec<ItemRecord>) -> ListEngine {
        ListEngine::with_items(sequential(), items)
    }

    fn ids(engine: &ListEngine) -> Vec<i64> {
        engine.items().iter().map(|item| item.id.get()).collect()
    }

    fn empty_ids(engine: &ListEngine) -> Vec<i64> {
        engine
            .items()
            .iter()
            .filter(|item| item.is_placeholder())
            .map(|item| item.id.get())
            .collect()
    }

    fn record_changes(engine: &mut ListEngine) -> Rc<RefCell<Vec<ListChange>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.subscribe(move |change: &ListChange| sink.borrow_mut().push(change.clone()));
        seen
    }

    #[test]
    fn milk_scenario() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);

        assert!(engine.change_text(ItemId(1), "milk"));
        let committed = engine.change_importance(ItemId(1), Importance::Important).unwrap();

        assert_eq!(committed.placeholder, Some(ItemId(2)));
        assert_eq!(ids(&engine), vec![1, 2]);

        let milk = engine.get(ItemId(1)).unwrap();
        assert_eq!(milk.text, "milk");
        assert_eq!(milk.importance, Importance::Important);
        assert!(!milk.is_new_entry);

        let placeholder = engine.get(ItemId(2)).unwrap();
        assert!(placeholder.is_placeholder());
        assert!(placeholder.is_new_entry);
    }

    #[test]
    fn seeded_items_are_ordered() {
        let engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::new(ItemId(2), "soap", Importance::Important),
            ItemRecord::new(ItemId(3), "", Importance::Normal),
        ]);
        assert_eq!(ids(&engine), vec![2, 1, 3]);
    }

    #[test]
    fn duplicate_seed_ids_are_dropped() {
        let engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::new(ItemId(1), "soap", Importance::Important),
        ]);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.get(ItemId(1)).unwrap().text, "eggs");
    }

    #[test]
    fn remove_then_undo_restores_item() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::new(ItemId(2), "soap", Importance::Important),
            ItemRecord::placeholder(ItemId(3)),
        ]);
        let original = engine.get(ItemId(2)).cloned().unwrap();

        assert_eq!(engine.remove_item(ItemId(2)), Some(original.clone()));
        assert!(engine.get(ItemId(2)).is_none());

        let undone = engine.undo().unwrap();
        assert_eq!(undone.entry, ActionLogEntry::Remove(original.clone()));
        assert!(undone.dropped.is_empty());
        assert_eq!(engine.get(ItemId(2)), Some(&original));
        assert_eq!(ids(&engine), vec![2, 1, 3]);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn undo_restores_previous_importance() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Unimportant),
            ItemRecord::new(ItemId(2), "soap", Importance::Normal),
        ]);

        engine.change_importance(ItemId(1), Importance::Important);
        assert_eq!(ids(&engine), vec![1, 2]);

        engine.undo();
        assert_eq!(engine.get(ItemId(1)).unwrap().importance, Importance::Unimportant);
        assert_eq!(ids(&engine), vec![2, 1]);
    }

    #[test]
    fn importance_on_committed_item_spawns_nothing() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::placeholder(ItemId(2)),
        ]);

        let committed = engine.change_importance(ItemId(1), Importance::Unimportant).unwrap();
        assert_eq!(committed.placeholder, None);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn importance_on_empty_fresh_entry_commits_it() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);

        let committed = engine.change_importance(ItemId(1), Importance::Important).unwrap();
        let item = engine.get(ItemId(1)).unwrap();
        assert!(!item.is_new_entry);
        assert_eq!(item.importance, Importance::Important);
        assert_eq!(committed.placeholder, None);
        assert_eq!(empty_ids(&engine), vec![1]);
    }

    #[test]
    fn undoing_first_text_commit_keeps_one_empty_item() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);
        engine.change_text(ItemId(1), "rice");
        engine.record_text_change(ItemId(1), "").unwrap();
        assert_eq!(empty_ids(&engine), vec![2]);

        let undone = engine.undo().unwrap();
        assert_eq!(undone.dropped, vec![ItemId(2)]);
        assert_eq!(ids(&engine), vec![1]);
        assert_eq!(empty_ids(&engine), vec![1]);
    }

    #[test]
    fn undoing_placeholder_removal_keeps_one_empty_item() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::placeholder(ItemId(2)),
        ]);
        engine.remove_item(ItemId(2));
        assert_eq!(engine.add_item(), ItemId(3));

        let undone = engine.undo().unwrap();
        assert_eq!(undone.dropped, vec![ItemId(3)]);
        assert_eq!(ids(&engine), vec![1, 2]);
        assert_eq!(empty_ids(&engine), vec![2]);
    }

    #[test]
    fn undoing_importance_commit_keeps_spawned_placeholder() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);
        engine.change_text(ItemId(1), "milk");
        engine.change_importance(ItemId(1), Importance::Important);

        let undone = engine.undo().unwrap();
        assert!(undone.dropped.is_empty());
        assert_eq!(engine.get(ItemId(1)).unwrap().importance, Importance::Normal);
        assert_eq!(empty_ids(&engine), vec![2]);
    }

    #[test]
    fn undoing_text_commit_to_nonempty_text_drops_nothing() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::placeholder(ItemId(2)),
        ]);
        engine.change_text(ItemId(1), "eggs x6");
        engine.record_text_change(ItemId(1), "eggs");

        let undone = engine.undo().unwrap();
        assert!(undone.dropped.is_empty());
        assert_eq!(empty_ids(&engine), vec![2]);
    }

    #[test]
    fn new_entry_importance_spawns_exactly_one_trailing_placeholder() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "bread", Importance::Normal),
            ItemRecord::placeholder(ItemId(2)),
        ]);
        engine.change_text(ItemId(2), "butter");
        engine.change_importance(ItemId(2), Importance::Unimportant);

        let empties: Vec<&ItemRecord> = engine.items().iter().filter(|i| i.is_placeholder()).collect();
        assert_eq!(empties.len(), 1);
        assert_eq!(engine.items().last().map(|i| i.id), Some(empties[0].id));
        assert!(!engine.get(ItemId(2)).unwrap().is_new_entry);
    }

    #[test]
    fn text_edits_do_not_reorder_or_log() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::placeholder(ItemId(2)),
        ]);

        engine.change_text(ItemId(1), "");
        assert_eq!(ids(&engine), vec![1, 2]);
        assert!(!engine.can_undo());
    }

    #[test]
    fn text_commit_is_undoable() {
        let mut engine = engine_with(vec![ItemRecord::new(ItemId(1), "eggs", Importance::Normal)]);

        engine.change_text(ItemId(1), "egg");
        engine.change_text(ItemId(1), "eggplant");
        assert!(engine.record_text_change(ItemId(1), "eggs").is_some());
        assert_eq!(engine.history().len(), 1);

        engine.undo();
        assert_eq!(engine.get(ItemId(1)).unwrap().text, "eggs");
    }

    #[test]
    fn unchanged_text_commit_records_nothing() {
        let mut engine = engine_with(vec![ItemRecord::new(ItemId(1), "eggs", Importance::Normal)]);
        assert!(engine.record_text_change(ItemId(1), "eggs").is_none());
        assert!(!engine.can_undo());
    }

    #[test]
    fn committing_placeholder_text_spawns_next_placeholder() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);

        engine.change_text(ItemId(1), "rice");
        let committed = engine.record_text_change(ItemId(1), "").unwrap();

        assert_eq!(committed.placeholder, Some(ItemId(2)));
        assert_eq!(ids(&engine), vec![1, 2]);
        assert!(!engine.get(ItemId(1)).unwrap().is_new_entry);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);
        let seen = record_changes(&mut engine);

        assert!(engine.remove_item(ItemId(42)).is_none());
        assert!(engine.change_importance(ItemId(42), Importance::Important).is_none());
        assert!(!engine.change_text(ItemId(42), "x"));
        assert!(engine.record_text_change(ItemId(42), "").is_none());
        assert!(!engine.set_options_expanded(ItemId(42), true));

        assert!(!engine.can_undo());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);
        assert!(engine.undo().is_none());
        assert_eq!(ids(&engine), vec![1]);
    }

    #[test]
    fn undo_of_edit_to_removed_item_is_skipped() {
        let mut engine = engine_with(vec![ItemRecord::new(ItemId(1), "eggs", Importance::Normal)]);
        engine.change_importance(ItemId(1), Importance::Important);
        engine.apply_remote([RemoteChange::Removed(ItemId(1))]);

        let undone = engine.undo().unwrap();
        assert_eq!(undone.entry.id(), ItemId(1));
        assert!(engine.is_empty());
    }

    #[test]
    fn options_toggle_is_view_state_only() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::new(ItemId(2), "soap", Importance::Important),
        ]);
        let before = ids(&engine);

        assert!(engine.set_options_expanded(ItemId(1), true));
        assert!(engine.get(ItemId(1)).unwrap().options_expanded);
        assert_eq!(ids(&engine), before);
        assert!(!engine.can_undo());
    }

    #[test]
    fn one_notification_per_operation() {
        let mut engine = engine_with(vec![ItemRecord::placeholder(ItemId(1))]);
        let seen = record_changes(&mut engine);

        engine.change_text(ItemId(1), "milk");
        engine.change_importance(ItemId(1), Importance::Important);
        engine.undo();

        let seen = seen.borrow();
        let causes: Vec<ChangeCause> = seen.iter().map(|c| c.cause).collect();
        assert_eq!(
            causes,
            vec![ChangeCause::TextEdited, ChangeCause::ImportanceChanged, ChangeCause::Undone]
        );
        assert!(seen[1].scroll_to_bottom);
        assert_eq!(seen[1].snapshot.ids(), vec![ItemId(1), ItemId(2)]);
        assert_eq!(seen[2].snapshot.ids(), vec![ItemId(1), ItemId(2)]);
        assert_eq!(empty_ids(&engine), vec![2]);
    }

    #[test]
    fn add_item_scrolls_to_bottom() {
        let mut engine = ListEngine::new(sequential());
        let seen = record_changes(&mut engine);

        let id = engine.add_item();
        assert_eq!(id, ItemId(1));
        assert!(engine.has_empty_item());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].scroll_to_bottom);
        assert_eq!(seen[0].cause, ChangeCause::ItemAdded);
    }

    #[test]
    fn ensure_placeholder_only_adds_when_missing() {
        let mut engine = ListEngine::new(sequential());
        assert_eq!(engine.ensure_placeholder(), Some(ItemId(1)));
        assert_eq!(engine.ensure_placeholder(), None);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() {
        let mut engine = ListEngine::new(sequential());
        let seen = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&seen);
        let sub = engine.subscribe(move |_: &ListChange| *counter.borrow_mut() += 1);

        engine.add_item();
        assert!(engine.unsubscribe(sub));
        engine.add_item();

        assert_eq!(*seen.borrow(), 1);
        assert!(!engine.unsubscribe(sub));
    }

    #[test]
    fn remote_changes_reconcile_by_id() {
        let mut engine = engine_with(vec![
            ItemRecord::new(ItemId(1), "eggs", Importance::Normal),
            ItemRecord::placeholder(ItemId(2)),
        ]);
        engine.set_options_expanded(ItemId(1), true);

        let applied = engine.apply_remote([
            RemoteChange::Added(ItemRecord::new(ItemId(5), "soap", Importance::Important)),
            RemoteChange::Modified(ItemRecord::new(ItemId(1), "eggs x12", Importance::Unimportant)),
            RemoteChange::Modified(ItemRecord::new(ItemId(9), "ghost", Importance::Normal)),
            RemoteChange::Removed(ItemId(7)),
        ]);

        assert_eq!(applied, 2);
        assert_eq!(ids(&engine), vec![5, 1, 2]);
        let eggs = engine.get(ItemId(1)).unwrap();
        assert_eq!(eggs.text, "eggs x12");
        assert!(eggs.options_expanded);
        assert!(!engine.can_undo());
    }

    #[test]
    fn remote_echo_of_local_item_does_not_duplicate() {
        let mut engine = ListEngine::new(sequential());
        let id = engine.add_item();

        engine.apply_remote([RemoteChange::Added(ItemRecord::placeholder(id))]);
        assert_eq!(engine.len(), 1);
        assert!(engine.get(id).unwrap().is_new_entry);
    }

    #[test]
    fn ids_never_collide_with_remote_ids() {
        let mut engine = ListEngine::new(sequential());
        engine.apply_remote([RemoteChange::Added(ItemRecord::new(ItemId(40), "tea", Importance::Normal))]);
        assert_eq!(engine.add_item(), ItemId(41));
    }

    #[test]
    fn timestamp_ids_are_strictly_increasing() {
        let mut engine = ListEngine::default();
        let first = engine.add_item();
        let second = engine.add_item();
        assert!(second > first);
        assert!(first.get() > 1_600_000_000_000);
    }

    #[test]
    fn history_depth_bounds_undo() {
        let mut engine = ListEngine::with_items(
            EngineOptions {
                history_depth: 2,
                id_strategy: IdStrategy::Sequential,
            },
            vec![ItemRecord::new(ItemId(1), "eggs", Importance::Normal)],
        );
        for level in [Importance::Important, Importance::Unimportant, Importance::Normal] {
            engine.change_importance(ItemId(1), level);
        }

        assert_eq!(engine.history().capacity(), 2);
        assert_eq!(engine.history().len(), 2);
        engine.undo();
        engine.undo();
        assert!(engine.undo().is_none());
        assert_eq!(engine.get(ItemId(1)).unwrap().importance, Importance::Important);
    }
}
