//! RogueFS: a filesystem rendered as a procedurally laid out world
//!
//! Every file and directory gets a stable identity that survives renames, a
//! row in a persistent spatial index, and a seeded position inside its
//! directory's room. Generation is incremental and idempotent: rescanning an
//! unchanged directory reproduces the same ids and the same layout.

pub mod cli;
pub mod config;
pub mod error;
pub mod identity;
pub mod index;
pub mod layout;
pub mod library;
pub mod logging;
pub mod metadata;
pub mod nav;
pub mod scanner;
pub mod types;
pub mod world;

pub use error::{MetadataError, StorageError, WorldError};
pub use index::PersistentIndex;
pub use types::{NodeId, NodeKind, Space, Transform};
pub use world::WorldGenerator;
