//! Storage for the current schedule snapshot on disk.
//!
//! Exactly one snapshot exists at a time: a pretty-printed JSON array of rows.
//! Saves are serialized behind a write lock and land through a temporary file
//! renamed over the old snapshot, so readers see either the previous or the new
//! schedule, never a partial one.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::{Row, Schedule};

/// Indentation of the persisted JSON.
const JSON_INDENT: &[u8] = b"    ";

/// Errors that can occur while reading or writing the snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid schedule file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize schedule: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to replace schedule file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Schedule store lock poisoned")]
    Poisoned,
}

/// The single persisted schedule.
pub struct ScheduleStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl ScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot with `schedule`.
    pub fn save(&self, schedule: &[Row]) -> Result<(), StoreError> {
        let json = to_pretty_json(schedule)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;

        std::fs::create_dir_all(dir)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&json)?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;

        tracing::info!(
            "Saved schedule with {} rows to {}",
            schedule.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Load the snapshot. A store that was never written holds an empty schedule.
    pub fn load(&self) -> Result<Schedule, StoreError> {
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;

        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No schedule at {}, treating as empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Hold the store as an in-progress save would.
    #[cfg(test)]
    pub(crate) fn hold_for_save(&self) -> std::sync::RwLockWriteGuard<'_, ()> {
        self.lock.write().unwrap()
    }
}

/// Serialize with 4-space indentation; non-ASCII text is written as-is.
fn to_pretty_json(schedule: &[Row]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    schedule.serialize(&mut serializer)?;
    Ok(out)
}
