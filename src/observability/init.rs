//! Tracing initialization and subscriber setup.

use super::file_writer::{FileWriter, LogFile};
use super::tracer;
use crate::infrastructure::paths;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::resource::Resource;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVICE_NAME: &str = "shoplist";

/// Installs the global tracing subscriber.
///
/// The pipeline is:
/// 1. An `EnvFilter` built from `RUST_LOG`, else `config.trace_level`, else
///    `info`
/// 2. A `fmt` layer writing plain text to `shoplist.log` in the data directory
/// 3. An OpenTelemetry layer exporting spans to `shoplist-spans.json`
///
/// Both files rotate at 10 MiB and keep three backups.
///
/// Silently does nothing if the data directory cannot be created, and only
/// the first call in a process takes effect.
///
/// # Example
///
/// ```no_run
/// use shoplist::observability::init_tracing;
/// use shoplist::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let data_dir = paths::data_dir(config);
    if std::fs::create_dir_all(&data_dir).is_err() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.trace_level.as_deref().unwrap_or("info");
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let resource = Resource::new(vec![opentelemetry::KeyValue::new("service.name", SERVICE_NAME)]);
    let provider = tracer::create_tracer_provider(paths::spans_path(config), resource);
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    let log_file = LogFile::new(FileWriter::new(paths::log_path(config)));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(move || log_file.clone());

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer);

    let _ = subscriber.try_init();
}
