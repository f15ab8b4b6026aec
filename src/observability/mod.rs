//! Logging and tracing with file-based export.
//!
//! ```text
//! tracing macros ─┬─ fmt layer ─────────────────────→ shoplist.log
//!                 └─ tracing-opentelemetry → SDK → FileSpanExporter → shoplist-spans.json
//! ```
//!
//! Both files live in the data directory and rotate at 10 MiB with three
//! backups. Spans opened on the sync worker are parented to the host span
//! that posted the message, so one trace covers an operation end to end.
//!
//! # Configuration
//!
//! The filter is resolved from:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - [`init`]: Subscriber setup
//! - [`tracer`]: OpenTelemetry tracer provider with file export
//! - [`file_writer`]: Rotating file writer

mod file_writer;
mod init;
mod tracer;

pub use file_writer::{FileWriter, LogFile};
pub use init::init_tracing;
