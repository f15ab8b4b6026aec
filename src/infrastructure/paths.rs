//! Path resolution for on-disk state.
//!
//! Everything shoplist writes lives under one data directory: the configured
//! `data_dir` if set, otherwise `<platform data dir>/shoplist` (for example
//! `~/.local/share/shoplist` on Linux).

use crate::Config;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "shoplist";
const STORE_FILE: &str = "shoplist.json";
const LOG_FILE: &str = "shoplist.log";
const SPANS_FILE: &str = "shoplist-spans.json";

/// Returns the directory holding the store and log files.
///
/// Falls back to the current directory when the platform reports no data
/// directory.
///
/// # Examples
///
/// ```
/// use shoplist::{infrastructure::data_dir, Config};
/// use std::path::PathBuf;
///
/// let config = Config {
///     data_dir: Some(PathBuf::from("/var/lib/shoplist")),
///     ..Config::default()
/// };
/// assert_eq!(data_dir(&config), PathBuf::from("/var/lib/shoplist"));
/// ```
#[must_use]
pub fn data_dir(config: &Config) -> PathBuf {
    match &config.data_dir {
        Some(dir) => expand_tilde(dir),
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR),
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~` component, or any path when the home
/// directory is unknown, are returned unchanged.
///
/// # Examples
///
/// ```
/// use shoplist::infrastructure::expand_tilde;
/// use std::path::Path;
///
/// assert_eq!(expand_tilde(Path::new("/absolute/path")), Path::new("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Location of the JSON document store.
#[must_use]
pub fn store_path(config: &Config) -> PathBuf {
    data_dir(config).join(STORE_FILE)
}

/// Location of the text log written by the `fmt` layer.
#[must_use]
pub fn log_path(config: &Config) -> PathBuf {
    data_dir(config).join(LOG_FILE)
}

/// Location of the exported OpenTelemetry spans.
#[must_use]
pub fn spans_path(config: &Config) -> PathBuf {
    data_dir(config).join(SPANS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_is_used_verbatim() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/lists")),
            ..Config::default()
        };
        assert_eq!(store_path(&config), PathBuf::from("/tmp/lists/shoplist.json"));
        assert_eq!(log_path(&config), PathBuf::from("/tmp/lists/shoplist.log"));
        assert_eq!(spans_path(&config), PathBuf::from("/tmp/lists/shoplist-spans.json"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde(Path::new("~/lists")), home.join("lists"));
        assert_eq!(expand_tilde(Path::new("~")), home);
    }

    #[test]
    fn tilde_inside_name_is_kept() {
        assert_eq!(expand_tilde(Path::new("~lists/a")), PathBuf::from("~lists/a"));
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        assert!(data_dir(&Config::default()).ends_with("shoplist"));
    }
}
