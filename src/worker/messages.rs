//! Sync worker message types for cross-thread communication.
//!
//! This module defines the request and response protocol between the host
//! thread that owns the list engine and the background thread that owns the
//! document store. It also implements tracing context propagation across the
//! thread boundary.

use crate::storage::models::{DocumentChange, ItemDocument};
use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-thread span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry so spans
/// opened by the worker are parented to the host operation that posted the
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` if no OpenTelemetry layer is installed or the current
    /// span context is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shoplist::worker::TraceContext;
    ///
    /// let span = tracing::debug_span!("commit").entered();
    /// if let Some(ctx) = TraceContext::from_current() {
    ///     println!("trace {}", ctx.trace_id);
    /// }
    /// ```
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();

        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if span_context.is_valid() {
            let trace_id = format!("{:032x}", span_context.trace_id());
            let parent_span_id = format!("{:016x}", span_context.span_id());

            tracing::trace!(
                trace_id = %trace_id,
                parent_span_id = %parent_span_id,
                "capturing trace context"
            );

            Some(Self {
                trace_id,
                parent_span_id,
            })
        } else {
            None
        }
    }
}

/// Generates builder methods for `SyncMessage` variants that attach the
/// current trace context.
macro_rules! sync_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl SyncMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

sync_message_builders! {
    upsert(Upsert { document: ItemDocument }),
    update_text(UpdateText { id: i64, text: String }),
    remove(Remove { id: i64 }),
    poll(Poll {}),
}

/// Messages sent from the host thread to the sync worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// Create or replace a document keyed by its id.
    Upsert {
        document: ItemDocument,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Patch the text of an existing document.
    UpdateText {
        id: i64,
        text: String,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Delete a document.
    Remove {
        id: i64,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Drain the store's change feed.
    Poll {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl SyncMessage {
    /// Returns the attached trace context, if any.
    #[must_use]
    pub fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::Upsert { trace_context, .. }
            | Self::UpdateText { trace_context, .. }
            | Self::Remove { trace_context, .. }
            | Self::Poll { trace_context } => trace_context.as_ref(),
        }
    }

    /// Short operation name used in spans and error messages.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Upsert { .. } => "upsert",
            Self::UpdateText { .. } => "update text",
            Self::Remove { .. } => "remove",
            Self::Poll { .. } => "poll",
        }
    }
}

/// Responses sent from the sync worker back to the host thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncResponse {
    /// A document was written.
    Upserted { id: i64 },

    /// A document's text was patched.
    TextUpdated { id: i64 },

    /// A removal was processed; `existed` is false when the document was
    /// already gone.
    Removed { id: i64, existed: bool },

    /// Pending change-feed entries, oldest first.
    Changes { changes: Vec<DocumentChange> },

    /// The operation failed.
    Error {
        /// Human-readable error message.
        message: String,
    },
}
