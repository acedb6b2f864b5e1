//! Node identity derivation using BLAKE3
//!
//! Real entries are keyed by `(device, inode)` so identity survives renames.
//! When no inode is available the key falls back to
//! `(canonical_path, size, mtime)`, and for paths that no longer exist to
//! `(canonical_path, "missing")`. Virtual entities are keyed by their parent,
//! category, and declared name.

pub mod path;

use crate::types::NodeId;
use blake3::Hasher;
use std::fs::Metadata;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Default salt for the general seeded scatter.
pub const LAYOUT_SALT: &str = "layout_v1";

/// Salt for the scatter of non-directory items in chambers rooms.
pub const LAYOUT_SALT_OTHERS: &str = "layout_v1_others";

const SEED_CONTEXT: &str = "roguefs layout seed v1";

/// Category of a virtual (metadata-declared) entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualCategory {
    Container,
    Npc,
}

impl VirtualCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            VirtualCategory::Container => "container",
            VirtualCategory::Npc => "npc",
        }
    }
}

/// Compute the identity key digest for a filesystem path.
///
/// Metadata is read without following symlinks.
pub fn node_key(entry_path: &Path) -> blake3::Hash {
    match std::fs::symlink_metadata(entry_path) {
        Ok(metadata) => node_key_from_metadata(entry_path, &metadata),
        Err(_) => missing_key(entry_path),
    }
}

/// Compute the identity key digest from already-fetched metadata.
pub fn node_key_from_metadata(entry_path: &Path, metadata: &Metadata) -> blake3::Hash {
    if let Some((dev, ino)) = device_inode(metadata) {
        let mut hasher = Hasher::new();
        hasher.update(b"inode:");
        hasher.update(&dev.to_be_bytes());
        hasher.update(&ino.to_be_bytes());
        return hasher.finalize();
    }

    let canonical = path::canonical_entry_path(entry_path);
    let path_string = canonical.to_string_lossy();
    let mtime_ns = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    let mut hasher = Hasher::new();
    hasher.update(b"path:");
    hasher.update(&(path_string.len() as u64).to_be_bytes());
    hasher.update(path_string.as_bytes());
    hasher.update(&metadata.len().to_be_bytes());
    hasher.update(&mtime_ns.to_be_bytes());
    hasher.finalize()
}

fn missing_key(entry_path: &Path) -> blake3::Hash {
    let canonical = path::canonical_entry_path(entry_path);
    let path_string = canonical.to_string_lossy();

    let mut hasher = Hasher::new();
    hasher.update(b"path:");
    hasher.update(&(path_string.len() as u64).to_be_bytes());
    hasher.update(path_string.as_bytes());
    hasher.update(b"missing");
    hasher.finalize()
}

#[cfg(unix)]
fn device_inode(metadata: &Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    match metadata.ino() {
        0 => None,
        ino => Some((metadata.dev(), ino)),
    }
}

#[cfg(not(unix))]
fn device_inode(_metadata: &Metadata) -> Option<(u64, u64)> {
    None
}

/// Stable node id for a real filesystem path.
pub fn node_id_for_path(entry_path: &Path) -> NodeId {
    NodeId::from_digest(&node_key(entry_path))
}

/// Stable node id for a real entry whose metadata was already read.
pub fn node_id_for_metadata(entry_path: &Path, metadata: &Metadata) -> NodeId {
    NodeId::from_digest(&node_key_from_metadata(entry_path, metadata))
}

/// Stable node id for a declared virtual entity.
///
/// Identity depends only on the parent, category, and declared name.
pub fn virtual_node_id(parent: &NodeId, category: VirtualCategory, name: &str) -> NodeId {
    let mut hasher = Hasher::new();
    hasher.update(b"virtual:");
    hasher.update(parent.as_bytes());
    hasher.update(b":");
    hasher.update(category.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(&(name.len() as u64).to_be_bytes());
    hasher.update(name.as_bytes());
    NodeId::from_digest(&hasher.finalize())
}

/// Fold a keyed hash of `(id, salt)` into a `u64` layout seed.
pub fn layout_seed(id: &NodeId, salt: &str) -> u64 {
    let mut hasher = Hasher::new_derive_key(SEED_CONTEXT);
    hasher.update(id.as_bytes());
    hasher.update(b"|");
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_be_bytes(head)
}
