use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact directory missing or not writable: {0}")]
    Directory(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Directory-backed key→value store: one file per artifact.
///
/// Concurrency discipline: one writer per key, and readers start only after
/// the producer pool for the phase has drained. No locking is needed under
/// that sequencing.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Ensure the artifact directory exists; create if missing.
    fn ensure_dir(&self) -> Result<(), StoreError> {
        if self.dir.exists() {
            let meta = fs::metadata(&self.dir).map_err(|e| StoreError::Directory(e.to_string()))?;
            if !meta.is_dir() {
                return Err(StoreError::Directory("path is not a directory".into()));
            }
        } else {
            fs::create_dir_all(&self.dir).map_err(|e| StoreError::Directory(e.to_string()))?;
        }
        // Basic writability probe: try creating a temp file.
        NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::Directory(e.to_string()))?;
        Ok(())
    }

    /// Atomically write an artifact by writing a temp file then renaming.
    /// Overwrites any existing artifact under the same name.
    pub fn put(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        self.ensure_dir()?;

        let target = self.dir.join(name);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace existing file if present to keep determinism.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        Ok(target)
    }

    /// Read an artifact's raw content.
    pub fn get(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        Ok(fs::read(self.dir.join(name))?)
    }

    /// Names currently present, in directory listing order.
    ///
    /// The order is unspecified and the listing is not scoped to any run:
    /// whatever is on disk is returned, and callers decide what matches
    /// their naming convention. A missing directory reads as empty.
    pub fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        let names = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        Ok(names)
    }
}
