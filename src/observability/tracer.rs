//! OpenTelemetry tracer provider with file-based span export.
//!
//! Finished spans are written one per line as compact JSON to a rotating
//! file, so traces spanning the host and the sync worker can be inspected
//! offline without a collector.

use super::file_writer::FileWriter;
use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::{Key, Value};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Span exporter appending one JSON object per finished span.
///
/// ```json
/// {"service":"shoplist","traceId":"…","spanId":"…","parentSpanId":"…",
///  "name":"change_importance","startUnixNano":"…","durationMicros":"41",
///  "attributes":{"item_id":"2","importance":"IMPORTANT"},"status":"unset"}
/// ```
struct FileSpanExporter {
    writer: FileWriter,
    service: String,
    is_shutdown: AtomicBool,
}

impl FileSpanExporter {
    fn new(file_path: PathBuf, resource: &Resource) -> Self {
        let service = resource
            .get(Key::from_static_str("service.name"))
            .map_or_else(|| "unknown".to_string(), |value| value.to_string());

        Self {
            writer: FileWriter::new(file_path),
            service,
            is_shutdown: AtomicBool::new(false),
        }
    }

    fn format_span(&self, span: &SpanData) -> JsonValue {
        let attributes: serde_json::Map<String, JsonValue> = span
            .attributes
            .iter()
            .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
            .collect();

        let parent = if span.parent_span_id == SpanId::INVALID {
            String::new()
        } else {
            format!("{:016x}", span.parent_span_id)
        };

        let status = match &span.status {
            Status::Unset => "unset".to_string(),
            Status::Ok => "ok".to_string(),
            Status::Error { description } => format!("error: {description}"),
        };

        let duration_micros = span
            .end_time
            .duration_since(span.start_time)
            .map_or(0, |elapsed| elapsed.as_micros());

        serde_json::json!({
            "service": self.service,
            "traceId": format!("{:032x}", span.span_context.trace_id()),
            "spanId": format!("{:016x}", span.span_context.span_id()),
            "parentSpanId": parent,
            "name": span.name,
            "startUnixNano": unix_nanos(span.start_time).to_string(),
            "durationMicros": duration_micros.to_string(),
            "attributes": attributes,
            "status": status,
        })
    }
}

fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH).map_or(0, |since| since.as_nanos())
}

fn attribute_value(value: &Value) -> JsonValue {
    match value {
        Value::Bool(b) => JsonValue::from(*b),
        Value::I64(i) => JsonValue::from(*i),
        Value::F64(f) => JsonValue::from(*f),
        other => JsonValue::from(other.to_string()),
    }
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        for span in &batch {
            let line = self.format_span(span).to_string();
            if let Err(e) = self.writer.write_line(&line) {
                return Box::pin(std::future::ready(Err(TraceError::from(e.to_string()))));
            }
        }
        Box::pin(std::future::ready(Ok(())))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for FileSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSpanExporter")
            .field("writer", &self.writer)
            .field("service", &self.service)
            .field("is_shutdown", &self.is_shutdown)
            .finish()
    }
}

/// Creates a tracer provider exporting every span to `file_path` as soon as
/// it ends (simple, non-batched export).
pub fn create_tracer_provider(file_path: PathBuf, resource: Resource) -> TracerProvider {
    let exporter = FileSpanExporter::new(file_path, &resource);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
