//! `.rogueos` JSON file store

use super::{LoadedMetadata, MetadataStore, RoomMetadata};
use crate::error::MetadataError;
use crate::scanner::METADATA_FILE_NAME;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Stores metadata as a pretty-printed JSON file inside each directory.
///
/// Object keys are written in sorted order so files diff cleanly.
#[derive(Debug, Clone, Default)]
pub struct JsonMetadataStore;

impl JsonMetadataStore {
    pub fn new() -> Self {
        Self
    }

    pub fn file_path(directory: &Path) -> PathBuf {
        directory.join(METADATA_FILE_NAME)
    }
}

impl MetadataStore for JsonMetadataStore {
    fn load(&self, directory: &Path) -> LoadedMetadata {
        let path = Self::file_path(directory);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadedMetadata::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable metadata; using defaults");
                return LoadedMetadata {
                    metadata: RoomMetadata::default(),
                    malformed: true,
                };
            }
        };

        match serde_json::from_str::<RoomMetadata>(&raw) {
            Ok(metadata) => LoadedMetadata {
                metadata,
                malformed: false,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed metadata; using defaults");
                LoadedMetadata {
                    metadata: RoomMetadata::default(),
                    malformed: true,
                }
            }
        }
    }

    fn save(&self, directory: &Path, metadata: &RoomMetadata) -> Result<(), MetadataError> {
        let path = Self::file_path(directory);
        // Going through Value sorts every object's keys.
        let value = serde_json::to_value(metadata).map_err(|e| MetadataError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let mut text = serde_json::to_string_pretty(&value).map_err(|e| MetadataError::Serialize {
            path: path.clone(),
            message: e.to_string(),
        })?;
        text.push('\n');
        fs::write(&path, text).map_err(|source| MetadataError::Write { path, source })
    }
}
