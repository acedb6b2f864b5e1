//! Error types for the RogueFS identity, index, and world generation layers.

use crate::types::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage engine error: {0}")]
    Engine(#[from] sled::Error),

    #[error("Failed to encode {what}: {message}")]
    Codec { what: &'static str, message: String },

    #[error("Index unavailable: primary {wanted:?} failed ({primary}), fallback {fallback:?} failed ({reason})")]
    Unavailable {
        wanted: PathBuf,
        primary: String,
        fallback: PathBuf,
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn codec(what: &'static str, err: impl std::fmt::Display) -> Self {
        StorageError::Codec {
            what,
            message: err.to_string(),
        }
    }
}

impl From<sled::transaction::TransactionError<StorageError>> for StorageError {
    fn from(err: sled::transaction::TransactionError<StorageError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(e) => StorageError::Engine(e),
        }
    }
}

/// Errors raised by the per-directory metadata collaborator
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Failed to write metadata for {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metadata for {path:?}: {message}")]
    Serialize { path: PathBuf, message: String },
}

/// Errors surfaced by world generation and reflow
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Path is not indexed: {0:?}")]
    PathNotIndexed(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for WorldError {
    fn from(err: config::ConfigError) -> Self {
        WorldError::ConfigError(err.to_string())
    }
}
