//! Snapshot persistence
//!
//! The stores live in memory; a snapshot is their JSON image. Writes go
//! to a sibling temp file first and are renamed into place.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use types::slot::Slot;
use types::swap::SwapRequest;
use types::user::UserProfile;

use crate::events::SwapEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub slots: Vec<Slot>,
    pub requests: Vec<SwapRequest>,
    #[serde(default)]
    pub users: Vec<UserProfile>,
    /// Retained tail of the event log, oldest first
    #[serde(default)]
    pub events: Vec<SwapEvent>,
    /// Highest event sequence ever issued, evicted events included
    #[serde(default)]
    pub last_event_sequence: u64,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Write `snapshot` to `path`
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(snapshot)?;

    // Atomic write: write to tmp, fsync, rename
    {
        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a snapshot; `Ok(None)` when the file does not exist yet
pub fn load(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}
