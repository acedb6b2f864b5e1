//! In-memory metadata store

use super::{LoadedMetadata, MetadataStore, RoomMetadata};
use crate::error::MetadataError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Entry {
    Stored(RoomMetadata),
    Malformed,
}

/// Metadata kept in a map keyed by directory path
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    entries: Mutex<HashMap<PathBuf, Entry>>,
    saves: Mutex<usize>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, directory: impl Into<PathBuf>, metadata: RoomMetadata) {
        self.entries
            .lock()
            .insert(directory.into(), Entry::Stored(metadata));
    }

    /// Make `directory` behave as if its stored metadata could not be parsed.
    pub fn insert_malformed(&self, directory: impl Into<PathBuf>) {
        self.entries.lock().insert(directory.into(), Entry::Malformed);
    }

    pub fn get(&self, directory: &Path) -> Option<RoomMetadata> {
        match self.entries.lock().get(directory) {
            Some(Entry::Stored(meta)) => Some(meta.clone()),
            _ => None,
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn load(&self, directory: &Path) -> LoadedMetadata {
        match self.entries.lock().get(directory) {
            Some(Entry::Stored(meta)) => LoadedMetadata {
                metadata: meta.clone(),
                malformed: false,
            },
            Some(Entry::Malformed) => LoadedMetadata {
                metadata: RoomMetadata::default(),
                malformed: true,
            },
            None => LoadedMetadata::default(),
        }
    }

    fn save(&self, directory: &Path, metadata: &RoomMetadata) -> Result<(), MetadataError> {
        self.entries
            .lock()
            .insert(directory.to_path_buf(), Entry::Stored(metadata.clone()));
        *self.saves.lock() += 1;
        Ok(())
    }
}
