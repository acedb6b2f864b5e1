//! Metadata writes that target a directory other than the one being generated

use crate::metadata::RoomMetadata;
use std::path::{Path, PathBuf};

/// A metadata change emitted by one generation pass for another directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataEffect {
    /// Make sure `directory`'s entry for `child` has access and state set.
    EnsureChildAccess {
        directory: PathBuf,
        child: String,
        access: String,
        state: String,
    },
}

impl MetadataEffect {
    /// Directory whose metadata this effect modifies.
    pub fn target(&self) -> &Path {
        match self {
            MetadataEffect::EnsureChildAccess { directory, .. } => directory,
        }
    }

    /// Apply to already-loaded metadata; returns true when it changed.
    pub fn apply_to(&self, metadata: &mut RoomMetadata) -> bool {
        match self {
            MetadataEffect::EnsureChildAccess {
                child,
                access,
                state,
                ..
            } => metadata.ensure_child_metadata(child, access, state),
        }
    }
}
