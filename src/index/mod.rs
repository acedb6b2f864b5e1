//! Persistent Index
//!
//! Durable store of nodes, transforms, spaces, pins, and visit counters.
//! Renderers read it; the world generator is its only structural writer.

pub mod persistence;

pub use persistence::PersistentIndex;

use crate::error::StorageError;
use crate::types::{NodeId, NodeKind};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A node as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub seed: Option<String>,
    pub theme: Option<String>,
    /// Unix timestamp in milliseconds of the last upsert.
    pub last_seen: i64,
}

impl NodeRecord {
    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.last_seen).single()
    }

    /// Final path component, or the whole path for roots.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Input for an upsert
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub id: NodeId,
    pub path: PathBuf,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub seed: Option<String>,
    pub theme: Option<String>,
}

impl NewNode {
    pub fn new(id: NodeId, path: impl Into<PathBuf>, kind: NodeKind) -> Self {
        Self {
            id,
            path: path.into(),
            kind,
            parent: None,
            seed: None,
            theme: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<NodeId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }
}

/// Visit telemetry for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub count: u64,
    /// Unix timestamp in milliseconds of the latest visit.
    pub last: i64,
}

/// Outcome of an orphan sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub pins_removed: usize,
    pub visits_removed: usize,
}

/// Where the index was actually opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Primary(PathBuf),
    Fallback {
        wanted: PathBuf,
        used: PathBuf,
        reason: String,
    },
}

impl StorageLocation {
    pub fn path(&self) -> &Path {
        match self {
            StorageLocation::Primary(path) => path,
            StorageLocation::Fallback { used, .. } => used,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StorageLocation::Fallback { .. })
    }
}

/// An opened index together with the location that was used
pub struct OpenedIndex {
    pub index: PersistentIndex,
    pub location: StorageLocation,
}

/// Two-phase open: try `primary`, then `fallback`.
///
/// A fallback open is reported through [`StorageLocation::Fallback`] and a
/// warning; only when both locations fail is an error returned.
pub fn open_with_fallback(primary: &Path, fallback: &Path) -> Result<OpenedIndex, StorageError> {
    let primary_err = match PersistentIndex::open(primary) {
        Ok(index) => {
            return Ok(OpenedIndex {
                index,
                location: StorageLocation::Primary(primary.to_path_buf()),
            })
        }
        Err(e) => e,
    };

    warn!(
        wanted = %primary.display(),
        fallback = %fallback.display(),
        error = %primary_err,
        "Could not open index at primary location; falling back"
    );

    match PersistentIndex::open(fallback) {
        Ok(index) => Ok(OpenedIndex {
            index,
            location: StorageLocation::Fallback {
                wanted: primary.to_path_buf(),
                used: fallback.to_path_buf(),
                reason: primary_err.to_string(),
            },
        }),
        Err(e) => Err(StorageError::Unavailable {
            wanted: primary.to_path_buf(),
            primary: primary_err.to_string(),
            fallback: fallback.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}
