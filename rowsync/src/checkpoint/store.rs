use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{ErrorKind, RowsyncResult};
use crate::rowsync_error;

/// File name of the checkpoint log inside the checkpoint directory.
pub const CHECKPOINT_FILE_NAME: &str = "rowsync.pos";

/// Staging file the log is written to before the atomic rename.
const CHECKPOINT_TMP_FILE_NAME: &str = "rowsync.pos.tmp";

/// Number of recent segment identifiers retained in the log.
///
/// Two generations tolerate a crash during write: if the newest entry is torn, the
/// previous one is still a valid resume point.
const RETAINED_ENTRIES: usize = 2;

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    tmp_path: PathBuf,
}

/// Durable store for the most recently seen binlog segment identifiers.
///
/// The on-disk format is a newline-delimited text file with at most
/// [`RETAINED_ENTRIES`] lines, the last line being the most recent identifier. Every
/// save rewrites the file in full through a temp-file-then-rename sequence, so readers
/// never observe a half-written log. All file access is serialized by an internal
/// mutex; cloning shares the same lock.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    inner: Arc<Mutex<Inner>>,
}

impl CheckpointStore {
    /// Creates a store rooted at `directory`, creating the directory if needed.
    pub async fn new(directory: impl AsRef<Path>) -> RowsyncResult<Self> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory).await.map_err(|err| {
            rowsync_error!(
                ErrorKind::CheckpointIo,
                "Failed to create the checkpoint directory",
                format!("{}: {err}", directory.display())
            )
        })?;

        let inner = Inner {
            path: directory.join(CHECKPOINT_FILE_NAME),
            tmp_path: directory.join(CHECKPOINT_TMP_FILE_NAME),
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Returns the most recently saved segment identifier.
    ///
    /// Returns [`None`] when the log is missing, empty, or unreadable; an unreadable
    /// log is logged and treated like an absent one, so startup falls back to the
    /// configured position instead of failing.
    pub async fn load(&self) -> Option<String> {
        let inner = self.inner.lock().await;

        let content = match fs::read_to_string(&inner.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(
                    path = %inner.path.display(),
                    error = %err,
                    "checkpoint log is unreadable, ignoring it"
                );
                return None;
            }
        };

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .next_back()
            .map(str::to_owned)
    }

    /// Appends `segment` to the log, trimming it to the most recent entries.
    ///
    /// The retained entries are written to a staging file in the same directory and
    /// renamed over the log atomically. Identifiers are kept as given; saving the same
    /// identifier twice keeps both copies (bounded by the retention limit).
    pub async fn save(&self, segment: &str) -> RowsyncResult<()> {
        let inner = self.inner.lock().await;

        let mut entries: Vec<String> = match fs::read_to_string(&inner.path).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
            // A missing or unreadable log starts a fresh one; the write below
            // replaces whatever was there.
            Err(_) => Vec::new(),
        };
        entries.push(segment.to_owned());

        let first_retained = entries.len().saturating_sub(RETAINED_ENTRIES);
        let mut content = entries[first_retained..].join("\n");
        content.push('\n');

        fs::write(&inner.tmp_path, content).await.map_err(|err| {
            rowsync_error!(
                ErrorKind::CheckpointIo,
                "Failed to stage the checkpoint log",
                format!("{}: {err}", inner.tmp_path.display())
            )
        })?;
        fs::rename(&inner.tmp_path, &inner.path).await.map_err(|err| {
            rowsync_error!(
                ErrorKind::CheckpointIo,
                "Failed to commit the checkpoint log",
                format!("{}: {err}", inner.path.display())
            )
        })?;

        debug!(segment, "checkpoint saved");

        Ok(())
    }
}
