//! Side effects requested by the event handler.
//!
//! The handler never talks to the sync worker directly. It returns a
//! `Vec<Action>` after each event and the host executes them in order.
//!
//! # Example
//!
//! ```rust
//! use shoplist::app::Action;
//! use shoplist::worker::SyncMessage;
//!
//! let actions = vec![Action::PostToSync(SyncMessage::poll())];
//! ```

use crate::worker::SyncMessage;

/// Commands the host executes after an event has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Posts a message to the sync worker thread.
    PostToSync(SyncMessage),

    /// A sync operation failed. Local state is kept as is; the host decides
    /// how to surface the failure.
    ReportSyncFailure {
        /// Error message from the worker.
        message: String,
    },
}
