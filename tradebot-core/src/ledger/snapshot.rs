//! Crash-safe ledger persistence.
//!
//! The whole ledger state is one JSON document, rewritten wholesale on every
//! mutation. A missing file is a fresh start; a corrupt file is logged and
//! treated as empty rather than taking the bot down. Write failures are not
//! swallowed: trading on state that cannot be persisted is worse than
//! stopping.

use crate::domain::{DailyStats, Position};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger persistence failed at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("ledger state could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Serialized ledger state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub open_positions: Vec<Position>,
    pub closed_positions: Vec<Position>,
    pub daily: Option<DailyStats>,
}

/// File-backed snapshot storage.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot. Missing file means a fresh ledger; unreadable or
    /// malformed content is logged and also yields a fresh ledger.
    pub fn load(&self) -> LedgerSnapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger snapshot, starting empty");
                return LedgerSnapshot::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ledger snapshot unreadable, starting empty");
                return LedgerSnapshot::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ledger snapshot corrupt, starting empty");
                LedgerSnapshot::default()
            }
        }
    }

    /// Overwrite the snapshot file with `snapshot`.
    pub fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| LedgerError::Persistence {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&self.path, json).map_err(|source| LedgerError::Persistence {
            path: self.path.clone(),
            source,
        })
    }
}
