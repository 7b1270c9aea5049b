//! Per-run staging directory lifecycle.
//!
//! Each pipeline invocation gets its own directory under the system temp
//! root. It holds the persisted record files and the archive while the run
//! is in flight, and the orchestrator's finalizer removes it unconditionally
//! at run end.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ProductRecord;
use crate::pipeline::{dedup, naming};

/// Process-local staging directory owning one run's artifacts.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create a fresh staging directory `{temp}/{prefix}{uuid}`.
    pub fn create(prefix: &str) -> Result<Self> {
        let root = std::env::temp_dir().join(format!("{prefix}{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create staging dir {}", root.display()))?;
        info!(dir = %root.display(), "staging area created");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a record as pretty-printed JSON unless its content is already
    /// staged. Returns the written path, or `None` for a duplicate.
    pub fn persist(&self, record: &ProductRecord) -> Result<Option<PathBuf>> {
        if dedup::is_duplicate(record, &self.root)? {
            return Ok(None);
        }

        let path = self.root.join(naming::unique_filename(record));
        let json = serde_json::to_string_pretty(record).context("failed to serialize record")?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write record file {}", path.display()))?;
        debug!(file = %path.display(), "record staged");
        Ok(Some(path))
    }

    /// Remove the staging directory only if it is empty. A directory that
    /// still has content is left alone.
    pub fn remove_if_empty(&self) -> bool {
        match std::fs::remove_dir(&self.root) {
            Ok(()) => true,
            Err(e) => {
                debug!(dir = %self.root.display(), "staging dir not removed: {e}");
                false
            }
        }
    }

    /// Finalizer: recursively remove the staging root if it still exists.
    /// Never fails; a leftover directory is only worth a warning.
    pub fn cleanup(&self) {
        if !self.root.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            warn!(dir = %self.root.display(), "failed to remove staging dir: {e}");
        } else {
            debug!(dir = %self.root.display(), "staging dir removed");
        }
    }
}
