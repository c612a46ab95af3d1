use crate::types::{Document, GathererError, Result};
use crate::utils::write_json_atomic;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What the previous run left behind.
#[derive(Debug, Clone)]
pub enum SnapshotState {
    NoPriorSnapshot,
    HasPriorSnapshot(Vec<Document>),
}

/// Previous-run snapshot plus the new-only diff file for one source.
///
/// The snapshot is replaced by the full current list after every diff, so
/// an item that disappears for a run and comes back is reported again.
/// Only one process may use a store at a time.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshot_path: PathBuf,
    diff_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(snapshot_path: impl Into<PathBuf>, diff_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            diff_path: diff_path.into(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn diff_path(&self) -> &Path {
        &self.diff_path
    }

    pub fn load(&self) -> SnapshotState {
        let raw = match std::fs::read_to_string(&self.snapshot_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No previous snapshot at {}", self.snapshot_path.display());
                return SnapshotState::NoPriorSnapshot;
            }
            Err(e) => {
                warn!("Failed to read snapshot {}: {}", self.snapshot_path.display(), e);
                return SnapshotState::NoPriorSnapshot;
            }
        };

        match serde_json::from_str::<Vec<Document>>(&raw) {
            Ok(documents) => {
                SnapshotState::HasPriorSnapshot(documents.into_iter().map(Document::normalized).collect())
            }
            Err(e) => {
                warn!("Ignoring malformed snapshot {}: {}", self.snapshot_path.display(), e);
                SnapshotState::NoPriorSnapshot
            }
        }
    }

    /// Documents in `current` whose URL is absent from the snapshot, in order.
    pub fn diff(state: &SnapshotState, current: &[Document]) -> Vec<Document> {
        match state {
            SnapshotState::NoPriorSnapshot => current.to_vec(),
            SnapshotState::HasPriorSnapshot(previous) => {
                let previous_urls = previous.iter().map(|d| d.url.as_str()).collect::<HashSet<_>>();
                current
                    .iter()
                    .filter(|d| !previous_urls.contains(d.url.as_str()))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Write the diff file, then replace the snapshot with `current`.
    /// Failures come back as [`GathererError::Persistence`].
    pub fn store(&self, current: &[Document], new: &[Document]) -> Result<()> {
        write_json_atomic(&self.diff_path, new).map_err(|e| GathererError::persistence(&self.diff_path, e))?;
        info!("Saved {} new documents to {}", new.len(), self.diff_path.display());
        write_json_atomic(&self.snapshot_path, current)
            .map_err(|e| GathererError::persistence(&self.snapshot_path, e))?;
        Ok(())
    }

    pub fn diff_and_store(&self, current: &[Document]) -> Result<Vec<Document>> {
        let state = self.load();
        let new = Self::diff(&state, current);
        info!("Found {} new documents out of {} total", new.len(), current.len());
        self.store(current, &new)?;
        Ok(new)
    }
}
