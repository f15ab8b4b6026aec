//! Rotating file writer with size-based rotation and backup retention.
//!
//! Both the text log and the span export go through a [`FileWriter`], so
//! neither can grow without bound.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Maximum file size before rotation (10 MiB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
const MAX_BACKUP_FILES: usize = 3;

/// Thread-safe rotating file writer.
///
/// Before each write the current file size is checked. Past the limit the
/// file is renamed to `<name>.<unix millis>`, a fresh file is started, and
/// all but the newest backups are removed.
///
/// The file is opened lazily on first write.
pub struct FileWriter {
    file_path: PathBuf,
    max_bytes: u64,
    max_backups: usize,
    writer: Mutex<Option<fs::File>>,
}

impl FileWriter {
    /// Creates a writer with the default limits (10 MiB, 3 backups).
    #[must_use]
    pub const fn new(file_path: PathBuf) -> Self {
        Self::with_limits(file_path, MAX_FILE_SIZE_BYTES, MAX_BACKUP_FILES)
    }

    #[must_use]
    pub const fn with_limits(file_path: PathBuf, max_bytes: u64, max_backups: usize) -> Self {
        Self {
            file_path,
            max_bytes,
            max_backups,
            writer: Mutex::new(None),
        }
    }

    /// Writes `line` followed by a newline.
    ///
    /// # Errors
    ///
    /// Fails on rotation, open, or write errors, or if the lock is poisoned.
    pub fn write_line(&self, line: &str) -> std::io::Result<()> {
        self.with_file(|file| {
            writeln!(file, "{line}")?;
            file.flush()
        })
    }

    /// Appends raw bytes, as produced by a `fmt` layer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::write_line`].
    pub fn append(&self, bytes: &[u8]) -> std::io::Result<()> {
        self.with_file(|file| {
            file.write_all(bytes)?;
            file.flush()
        })
    }

    fn with_file<F>(&self, write: F) -> std::io::Result<()>
    where
        F: FnOnce(&mut fs::File) -> std::io::Result<()>,
    {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("Mutex poisoned: {e}")))?;

        self.check_and_rotate(&mut writer)?;

        if writer.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.file_path)?;
            *writer = Some(file);
        }

        let file = writer
            .as_mut()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No file available"))?;
        write(file)
    }

    fn check_and_rotate(&self, writer: &mut Option<fs::File>) -> std::io::Result<()> {
        if let Ok(metadata) = fs::metadata(&self.file_path) {
            if metadata.len() > self.max_bytes {
                *writer = None;
                self.rotate_files()?;
            }
        }
        Ok(())
    }

    fn rotate_files(&self) -> std::io::Result<()> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let mut backup = self.file_path.clone().into_os_string();
        backup.push(format!(".{stamp}"));

        if self.file_path.exists() {
            fs::rename(&self.file_path, PathBuf::from(backup))?;
        }

        self.cleanup_old_backups()
    }

    /// Removes backups beyond the retention limit, newest kept.
    ///
    /// Individual deletion errors are ignored.
    fn cleanup_old_backups(&self) -> std::io::Result<()> {
        let parent_dir = self
            .file_path
            .parent()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "No parent directory"))?;

        let prefix = self
            .file_path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|name| format!("{name}."))
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "Invalid file name"))?;

        let mut backups: Vec<(i64, PathBuf)> = fs::read_dir(parent_dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter_map(|path| {
                let stamp = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_prefix(&prefix))
                    .and_then(|suffix| suffix.parse::<i64>().ok())?;
                Some((stamp, path))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, old_backup) in backups.iter().skip(self.max_backups) {
            let _ = fs::remove_file(old_backup);
        }

        Ok(())
    }
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

/// Cloneable `io::Write` handle onto a shared [`FileWriter`].
///
/// Handed to `tracing_subscriber::fmt` as its writer.
#[derive(Debug, Clone)]
pub struct LogFile(Arc<FileWriter>);

impl LogFile {
    #[must_use]
    pub fn new(writer: FileWriter) -> Self {
        Self(Arc::new(writer))
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.append(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
