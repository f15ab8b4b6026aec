//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where the store, log, and span files live, honoring the
//! configured data directory and the platform's conventions otherwise.

pub mod paths;

pub use paths::{data_dir, expand_tilde, log_path, spans_path, store_path};
