//! One-level directory scanner
//!
//! Lists the immediate children of a single directory and classifies them.
//! The scan is lazy and keeps no state between calls; a directory that cannot
//! be listed produces no children instead of an error.

use crate::identity;
use crate::types::{NodeId, NodeKind};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Name of the per-directory metadata file, never reported as a child.
pub const METADATA_FILE_NAME: &str = ".rogueos";

/// A scanned child entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub id: NodeId,
    pub path: PathBuf,
    pub kind: NodeKind,
}

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Exact file names to skip
    pub ignore_names: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            ignore_names: vec![METADATA_FILE_NAME.to_string()],
        }
    }
}

/// Directory scanner
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Lazily list the immediate children of `directory`.
    ///
    /// Entries are yielded in file-name order. Symlinks are never followed.
    pub fn list_children(&self, directory: &Path) -> Children<'_> {
        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();
        Children {
            walker,
            ignore_names: &self.config.ignore_names,
        }
    }
}

/// Iterator over the children of one directory.
pub struct Children<'a> {
    walker: walkdir::IntoIter,
    ignore_names: &'a [String],
}

impl Children<'_> {
    fn is_ignored(&self, name: &std::ffi::OsStr) -> bool {
        let name = name.to_string_lossy();
        self.ignore_names.iter().any(|ignored| *ignored == name)
    }
}

impl Iterator for Children<'_> {
    type Item = ScanEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    // Unreadable directory (permission denied, vanished root)
                    // or an entry that disappeared mid-listing.
                    debug!(error = %e, "Skipping unreadable scan entry");
                    continue;
                }
            };

            if self.is_ignored(entry.file_name()) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    trace!(path = %entry.path().display(), error = %e, "Entry vanished during scan");
                    continue;
                }
            };

            let file_type = entry.file_type();
            let kind = if file_type.is_symlink() {
                NodeKind::Symlink
            } else if file_type.is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };

            let path = entry.into_path();
            let id = identity::node_id_for_metadata(&path, &metadata);
            return Some(ScanEntry { id, path, kind });
        }
    }
}
