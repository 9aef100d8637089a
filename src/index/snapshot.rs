use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{IndexEntry, IndexError, VectorIndex};

/// File name of the snapshot inside the snapshot directory
pub const SNAPSHOT_FILE: &str = "index.json";
/// Snapshot layout version; anything else is rejected as corrupt
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    embedding_model: &'a str,
    dimension: usize,
    created_at: DateTime<Utc>,
    entries: &'a [IndexEntry],
}

#[derive(Deserialize)]
struct Snapshot {
    format_version: u32,
    embedding_model: String,
    dimension: usize,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Path of the snapshot file inside `dir`
    #[inline]
    pub fn snapshot_file(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    /// Whether a snapshot has been written to `dir`
    #[inline]
    pub fn snapshot_exists(dir: &Path) -> bool {
        Self::snapshot_file(dir).is_file()
    }

    /// Write the whole index to `dir`, replacing any previous snapshot.
    ///
    /// The snapshot is written to a temporary file in the same directory and
    /// renamed into place, so readers see either the old or the new snapshot.
    #[inline]
    pub fn save(&self, dir: &Path) -> Result<(), IndexError> {
        fs::create_dir_all(dir)?;
        let target = Self::snapshot_file(dir);

        let snapshot = SnapshotRef {
            format_version: SNAPSHOT_FORMAT_VERSION,
            embedding_model: &self.embedding_model,
            dimension: self.dimension,
            created_at: Utc::now(),
            entries: &self.entries,
        };

        let temp_file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            serde_json::to_writer(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;
        temp_file.persist(&target).map_err(|e| e.error)?;

        info!(
            "Saved index snapshot with {} passages to {}",
            self.entries.len(),
            target.display()
        );
        Ok(())
    }

    /// Read a snapshot from `dir`.
    ///
    /// Fails with [`IndexError::NotFound`] when there is no snapshot and with
    /// [`IndexError::Corrupt`] when it cannot be read or its vectors do not
    /// have `expected_dimension` entries.
    #[inline]
    pub fn load(dir: &Path, expected_dimension: usize) -> Result<Self, IndexError> {
        let path = Self::snapshot_file(dir);
        let corrupt = |reason: String| IndexError::Corrupt {
            path: path.clone(),
            reason,
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(IndexError::NotFound { path: path.clone() });
            }
            Err(e) => return Err(corrupt(format!("unreadable: {}", e))),
        };

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|e| corrupt(format!("malformed: {}", e)))?;

        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                snapshot.format_version
            )));
        }

        if snapshot.dimension != expected_dimension {
            return Err(corrupt(format!(
                "embedding dimension {} does not match embedder dimension {}",
                snapshot.dimension, expected_dimension
            )));
        }

        if let Some(position) = snapshot
            .entries
            .iter()
            .position(|entry| entry.vector.len() != snapshot.dimension)
        {
            return Err(corrupt(format!(
                "entry {} has {} dimensions, expected {}",
                position,
                snapshot.entries[position].vector.len(),
                snapshot.dimension
            )));
        }

        debug!(
            "Snapshot at {} was created {} with model {}",
            path.display(),
            snapshot.created_at,
            snapshot.embedding_model
        );

        Ok(Self {
            dimension: snapshot.dimension,
            embedding_model: snapshot.embedding_model,
            entries: snapshot.entries,
        })
    }

    /// Like [`VectorIndex::load`], warning when the snapshot was built with
    /// a different model of the same dimension
    #[inline]
    pub fn load_for_model(
        dir: &Path,
        expected_dimension: usize,
        model: &str,
    ) -> Result<Self, IndexError> {
        let index = Self::load(dir, expected_dimension)?;
        if index.embedding_model != model {
            warn!(
                "Snapshot was built with model {} but the embedder uses {}",
                index.embedding_model, model
            );
        }
        Ok(index)
    }
}
