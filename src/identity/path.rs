//! Path canonicalization and normalization utilities

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize and normalize a path for deterministic hashing
///
/// This function:
/// 1. Canonicalizes the path (resolves symlinks, `..`, `.`)
/// 2. Normalizes Unicode to NFC
/// 3. Removes trailing slashes (except root)
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, StorageError> {
    let canonical = dunce::canonicalize(path)
        .map_err(|e| StorageError::InvalidPath(format!("Failed to canonicalize path: {}", e)))?;

    Ok(PathBuf::from(normalize_path_string(&canonical.to_string_lossy())))
}

/// Canonical form of a path whether or not it currently exists.
///
/// Existing paths go through [`canonicalize_path`]. Missing paths are made
/// absolute against the working directory and cleaned lexically, so a
/// last-known node still maps to a stable string.
pub fn canonical_or_absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = canonicalize_path(path) {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    PathBuf::from(normalize_path_string(
        &lexical_clean(&absolute).to_string_lossy(),
    ))
}

/// Canonical form of an entry's *location* without resolving the entry itself.
///
/// The parent directory is canonicalized and the final component appended
/// verbatim, so a symlink maps to its own path rather than its target.
pub fn canonical_entry_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            let joined = canonical_or_absolute(parent).join(name);
            PathBuf::from(normalize_path_string(&joined.to_string_lossy()))
        }
        _ => canonical_or_absolute(path),
    }
}

/// Normalize a path string for hashing (without filesystem access)
pub fn normalize_path_string(path: &str) -> String {
    let mut result: String = path.nfc().collect();
    if result.len() > 1 {
        while result.len() > 1 && (result.ends_with('/') || result.ends_with('\\')) {
            result.pop();
        }
    }
    result
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
