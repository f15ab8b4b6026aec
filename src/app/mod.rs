//! Application layer: the list engine and the event flow around it.
//!
//! This module sits between the host loop (main.rs) and the
//! domain/storage/worker layers.
//!
//! # Architecture
//!
//! ```text
//! User Input → Events → Event Handler → Engine Mutation → Actions → Sync Worker
//!                           ↑                                           ↓
//!                           └──────────── Sync Responses ───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`handler`]: Event processing and action mapping
//! - [`history`]: Bounded undo log
//! - [`observer`]: Snapshot notifications for views
//! - [`ordering`]: Display ordering policy
//! - [`state`]: The list state engine

pub mod actions;
pub mod handler;
pub mod history;
pub mod observer;
pub mod ordering;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use history::{ActionLog, ActionLogEntry, DEFAULT_HISTORY_DEPTH};
pub use observer::{ChangeCause, ListChange, ListObserver, Snapshot, SubscriptionId};
pub use ordering::{order, sort_items};
pub use state::{Committed, EngineOptions, IdStrategy, ListEngine, Undone};
