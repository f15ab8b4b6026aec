//! Background sync worker.
//!
//! The worker thread owns the document store and mirrors local mutations to
//! it, returning change-feed batches to the host on request. Messages carry
//! tracing context so worker spans join the host's trace.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation, thread spawn, and host handle

pub mod handler;
pub mod messages;

pub use handler::{SyncHandle, SyncWorker};
pub use messages::{SyncMessage, SyncResponse, TraceContext};
