//! Event handling and state transition logic.
//!
//! This module implements the single entry point through which every change
//! reaches the list engine: user edits from the host and responses from the
//! sync worker alike. Each event becomes one engine operation plus the
//! actions that mirror it to the document store.
//!
//! # Architecture
//!
//! 1. Events arrive from the host loop or the sync worker
//! 2. [`handle_event`] pattern-matches the event type
//! 3. The engine mutates, re-sorts, and notifies observers once
//! 4. Actions are collected and returned for execution
//!
//! # Example
//!
//! ```rust
//! use shoplist::app::{handle_event, Action, Event, ListEngine};
//!
//! let mut engine = ListEngine::default();
//! let actions = handle_event(&mut engine, &Event::AddItem);
//! assert!(matches!(actions.as_slice(), [Action::PostToSync(_)]));
//! ```

use crate::app::history::ActionLogEntry;
use crate::app::{Action, ListEngine};
use crate::domain::{Importance, ItemId, ItemRecord, RemoteChange};
use crate::storage::models::{DocumentChange, ItemDocument};
use crate::worker::{SyncMessage, SyncResponse};

/// Events triggered by user input or sync worker responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Appends a new placeholder item.
    AddItem,
    /// Appends a placeholder only if no empty item exists.
    EnsurePlaceholder,
    /// Deletes an item.
    RemoveItem { id: ItemId },
    /// Sets an item's importance.
    ChangeImportance { id: ItemId, importance: Importance },
    /// Live text edit; not undoable and not synced.
    EditText { id: ItemId, text: String },
    /// Commit boundary for a text edit that started from `original_text`.
    CommitText { id: ItemId, original_text: String },
    /// Shows or hides an item's options row.
    SetOptionsExpanded { id: ItemId, expanded: bool },
    /// Reverses the most recent recorded mutation.
    Undo,
    /// Wraps a response from the sync worker thread.
    SyncResponse(SyncResponse),
}

/// Processes an event against the engine and returns actions to execute.
///
/// Local mutations are never rolled back because of a sync failure; failures
/// surface as [`Action::ReportSyncFailure`].
pub fn handle_event(engine: &mut ListEngine, event: &Event) -> Vec<Action> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::AddItem => {
            let id = engine.add_item();
            upsert(engine, id).into_iter().collect()
        }
        Event::EnsurePlaceholder => engine
            .ensure_placeholder()
            .and_then(|id| upsert(engine, id))
            .into_iter()
            .collect(),
        Event::RemoveItem { id } => match engine.remove_item(*id) {
            Some(_) => vec![Action::PostToSync(SyncMessage::remove(id.get()))],
            None => vec![],
        },
        Event::ChangeImportance { id, importance } => {
            let Some(committed) = engine.change_importance(*id, *importance) else {
                return vec![];
            };
            upsert(engine, *id)
                .into_iter()
                .chain(committed.placeholder.and_then(|placeholder| upsert(engine, placeholder)))
                .collect()
        }
        Event::EditText { id, text } => {
            engine.change_text(*id, text.clone());
            vec![]
        }
        Event::CommitText { id, original_text } => {
            let was_fresh = engine.get(*id).is_some_and(|item| item.is_new_entry);
            let Some(committed) = engine.record_text_change(*id, original_text) else {
                return vec![];
            };
            let Some(item) = engine.get(*id) else {
                return vec![];
            };

            // A finalized fresh entry also changes its stored lifecycle flag.
            let primary = if was_fresh && !item.is_new_entry {
                upsert_record(item)
            } else {
                Action::PostToSync(SyncMessage::update_text(id.get(), item.text.clone()))
            };
            std::iter::once(primary)
                .chain(committed.placeholder.and_then(|placeholder| upsert(engine, placeholder)))
                .collect()
        }
        Event::SetOptionsExpanded { id, expanded } => {
            engine.set_options_expanded(*id, *expanded);
            vec![]
        }
        Event::Undo => {
            let Some(undone) = engine.undo() else {
                return vec![];
            };
            let restored = match undone.entry {
                ActionLogEntry::Remove(record) => upsert(engine, record.id),
                ActionLogEntry::UpdateImportance { id, .. } => upsert(engine, id),
                ActionLogEntry::UpdateText { id, .. } => engine
                    .get(id)
                    .map(|item| Action::PostToSync(SyncMessage::update_text(id.get(), item.text.clone()))),
            };
            restored
                .into_iter()
                .chain(
                    undone
                        .dropped
                        .iter()
                        .map(|id| Action::PostToSync(SyncMessage::remove(id.get()))),
                )
                .collect()
        }
        Event::SyncResponse(response) => handle_sync_response(engine, response),
    }
}

fn handle_sync_response(engine: &mut ListEngine, response: &SyncResponse) -> Vec<Action> {
    match response {
        SyncResponse::Changes { changes } => {
            let remote: Vec<RemoteChange> = changes.iter().cloned().filter_map(convert_change).collect();
            if !remote.is_empty() {
                engine.apply_remote(remote);
            }
            vec![]
        }
        SyncResponse::Upserted { id } | SyncResponse::TextUpdated { id } => {
            tracing::debug!(item_id = id, "sync write acknowledged");
            vec![]
        }
        SyncResponse::Removed { id, existed } => {
            tracing::debug!(item_id = id, existed, "sync removal acknowledged");
            vec![]
        }
        SyncResponse::Error { message } => {
            tracing::error!(error = %message, "sync worker error");
            vec![Action::ReportSyncFailure {
                message: message.clone(),
            }]
        }
    }
}

fn convert_change(change: DocumentChange) -> Option<RemoteChange> {
    match RemoteChange::try_from(change) {
        Ok(change) => Some(change),
        Err(e) => {
            tracing::warn!(error = %e, "rejecting malformed remote record");
            None
        }
    }
}

fn upsert(engine: &ListEngine, id: ItemId) -> Option<Action> {
    engine.get(id).map(upsert_record)
}

fn upsert_record(item: &ItemRecord) -> Action {
    Action::PostToSync(SyncMessage::upsert(ItemDocument::from(item)))
}
