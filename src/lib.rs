//! Shoplist: the list-state core of a shopping-list app.
//!
//! Shoplist keeps an ordered list of editable items and provides:
//! - Importance levels with automatic reordering (important first, empty last)
//! - A trailing placeholder item that is always there to type into
//! - Single-step undo of removals, text commits, and importance changes
//! - Optional mirroring to a per-user document store on a background thread

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Host loop (main.rs)                                │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - Event handling and action dispatching            │
//! │  - List engine, ordering, undo history              │
//! │  - Snapshot notifications                           │
//! └─────────────────────────────────────────────────────┘
//!                  │                    │
//!         ┌───────────────┐   ┌───────────────┐
//!         │ Worker Layer  │   │ Storage Layer │
//!         │ (worker/)     │ → │ (storage/)    │
//!         │ - Sync thread │   │ - JSON store  │
//!         │ - Messages    │   │ - Change feed │
//!         └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data paths (infrastructure/)                     │
//! │  - Items, importance, errors (domain/)              │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - Rotating text log                                │
//! │  - OpenTelemetry spans exported to file             │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: List engine with event/action model
//! - [`domain`]: Core domain types (items, importance, errors)
//! - [`infrastructure`]: Data directory and file locations
//! - [`storage`]: Document store boundary and JSON implementation
//! - [`worker`]: Background sync worker
//! - [`observability`]: Logging and tracing setup
//!
//! # Configuration
//!
//! ```toml
//! user_id = "UserID-0000"
//! data_dir = "~/.local/share/shoplist"
//! history_depth = 50
//! id_strategy = "timestamp"
//! sync_enabled = true
//! trace_level = "debug"
//! ```
//!
//! # Example
//!
//! ```rust
//! use shoplist::{handle_event, initialize, Config, Event, Importance};
//!
//! let mut engine = initialize(&Config::default());
//! handle_event(&mut engine, &Event::AddItem);
//!
//! let id = engine.snapshot().ids()[0];
//! handle_event(&mut engine, &Event::EditText { id, text: "milk".into() });
//! handle_event(&mut engine, &Event::ChangeImportance { id, importance: Importance::Important });
//!
//! // The committed item now has a fresh placeholder after it.
//! assert_eq!(engine.len(), 2);
//! assert!(engine.has_empty_item());
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod storage;
pub mod worker;

pub use app::{handle_event, Action, EngineOptions, Event, IdStrategy, ListEngine, Snapshot};
pub use domain::{Importance, ItemId, ItemRecord, Result, ShoplistError};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Runtime configuration.
///
/// Loaded from a TOML file, from `key=value` pairs, or left at defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Collection the store reads and writes. Default: `"UserID-0000"`
    pub user_id: String,

    /// Directory for the store, log, and span files.
    ///
    /// A leading `~` is expanded. Default: the platform data directory
    /// joined with `shoplist`.
    pub data_dir: Option<PathBuf>,

    /// Number of undo steps kept; 0 disables undo. Default: 50
    pub history_depth: usize,

    /// How new item ids are generated. Default: `timestamp`
    pub id_strategy: IdStrategy,

    /// Whether to open the store and run the sync worker. Default: `true`
    pub sync_enabled: bool,

    /// Tracing filter directive, used when `RUST_LOG` is unset.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or a full
    /// `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: "UserID-0000".to_string(),
            data_dir: None,
            history_depth: app::DEFAULT_HISTORY_DEPTH,
            id_strategy: IdStrategy::Timestamp,
            sync_enabled: true,
            trace_level: None,
        }
    }
}

impl Config {
    /// Builds a configuration from loose `key=value` pairs.
    ///
    /// Lenient: unknown keys are ignored and a value that does not parse
    /// falls back to that key's default. See [`Self::with_overrides`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use shoplist::{Config, IdStrategy};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("history_depth".to_string(), "10".to_string());
    /// map.insert("id_strategy".to_string(), "sequential".to_string());
    /// map.insert("sync_enabled".to_string(), "maybe".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.history_depth, 10);
    /// assert_eq!(config.id_strategy, IdStrategy::Sequential);
    /// assert!(config.sync_enabled);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self::default().with_overrides(map)
    }

    /// Overrides fields with the values present in `map`.
    ///
    /// Keys that are absent, empty, or fail to parse leave the current value
    /// in place.
    ///
    /// # Parsing Rules
    ///
    /// - `user_id`, `trace_level`: taken as is
    /// - `data_dir`: path, `~` expanded at use
    /// - `history_depth`: `usize`
    /// - `id_strategy`: `timestamp` or `sequential`, case-insensitive
    /// - `sync_enabled`: `true`/`false`
    #[must_use]
    pub fn with_overrides(mut self, map: &BTreeMap<String, String>) -> Self {
        let value = |key: &str| map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(user_id) = value("user_id") {
            self.user_id = user_id.to_string();
        }
        if let Some(dir) = value("data_dir") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(depth) = value("history_depth").and_then(|s| s.parse().ok()) {
            self.history_depth = depth;
        }
        match value("id_strategy").map(str::to_ascii_lowercase).as_deref() {
            Some("timestamp") => self.id_strategy = IdStrategy::Timestamp,
            Some("sequential") => self.id_strategy = IdStrategy::Sequential,
            Some(other) => tracing::debug!(value = %other, "unknown id_strategy, ignoring"),
            None => {}
        }
        if let Some(enabled) = value("sync_enabled").and_then(|s| s.parse().ok()) {
            self.sync_enabled = enabled;
        }
        if let Some(level) = value("trace_level") {
            self.trace_level = Some(level.to_string());
        }
        self
    }

    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::Config`] on malformed TOML, unknown keys, or
    /// values of the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ShoplistError::Config(format!("failed to parse config TOML: {e}")))
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ShoplistError::Config`] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ShoplistError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Engine options derived from this configuration.
    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            history_depth: self.history_depth,
            id_strategy: self.id_strategy,
        }
    }
}

/// Creates an empty engine configured from `config`.
///
/// The list is populated by the first change-feed batch from the sync
/// worker, or stays local when sync is disabled.
#[must_use]
pub fn initialize(config: &Config) -> ListEngine {
    tracing::debug!(
        user_id = %config.user_id,
        history_depth = config.history_depth,
        id_strategy = ?config.id_strategy,
        "initializing list engine"
    );
    ListEngine::new(config.engine_options())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.user_id, "UserID-0000");
        assert_eq!(config.history_depth, 50);
        assert_eq!(config.id_strategy, IdStrategy::Timestamp);
        assert!(config.sync_enabled);
        assert!(config.data_dir.is_none());
        assert!(config.trace_level.is_none());
    }

    #[test]
    fn map_ignores_unparseable_values() {
        let map: BTreeMap<String, String> = [
            ("user_id", "alice"),
            ("history_depth", "lots"),
            ("id_strategy", "random"),
            ("sync_enabled", "false"),
            ("trace_level", "  "),
            ("colour", "blue"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = Config::from_map(&map);
        assert_eq!(
            config,
            Config {
                user_id: "alice".to_string(),
                sync_enabled: false,
                ..Config::default()
            }
        );
    }

    #[test]
    fn overrides_apply_on_top_of_loaded_config() {
        let base = Config::from_toml_str("user_id = \"bob\"\nhistory_depth = 5").unwrap();
        let map = BTreeMap::from([("history_depth".to_string(), "7".to_string())]);

        let config = base.with_overrides(&map);
        assert_eq!(config.user_id, "bob");
        assert_eq!(config.history_depth, 7);
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let config = Config::from_toml_str(
            r#"
            user_id = "bob"
            id_strategy = "sequential"
            history_depth = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.user_id, "bob");
        assert_eq!(config.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.history_depth, 5);
        assert!(config.sync_enabled);
    }

    #[test]
    fn toml_is_strict() {
        assert!(matches!(
            Config::from_toml_str("history_depth = \"ten\""),
            Err(ShoplistError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("colour = \"blue\""),
            Err(ShoplistError::Config(_))
        ));
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ShoplistError::Config(_)));
    }

    #[test]
    fn initialize_applies_engine_options() {
        let config = Config {
            history_depth: 0,
            id_strategy: IdStrategy::Sequential,
            ..Config::default()
        };
        let mut engine = initialize(&config);
        let id = engine.add_item();
        assert_eq!(id, ItemId(1));
        engine.remove_item(id);
        assert!(!engine.can_undo());
    }
}
