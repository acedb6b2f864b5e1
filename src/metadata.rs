//! Per-directory room metadata.
//!
//! Every directory may carry a `.rogueos` file describing how it is presented
//! (hall or chambers), how its subdirectories are reached, and which virtual
//! containers and NPCs live in it. Missing fields are filled with defaults at
//! load time; fields this crate does not know about are carried through
//! unchanged on save.

pub mod json_store;
mod lenient;
pub mod memory_store;

pub use json_store::JsonMetadataStore;
pub use memory_store::MemoryMetadataStore;

use crate::error::MetadataError;
use crate::layout::DoorSide;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const ACCESS_STAIRS: &str = "stairs";
pub const STATE_OPEN: &str = "open";
pub const DEFAULT_CONTAINER_TYPE: &str = "magic_library";

/// Whether a directory is the top of the world or an ordinary room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Level,
    #[default]
    Room,
}

/// How a room arranges its contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    #[default]
    Hall,
    Chambers,
}

/// Access description of one subdirectory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildMeta {
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub access: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    /// Unrecognised sides read as unset.
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub door_side: Option<DoorSide>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// An item listed in a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub name: String,
    pub relpath: String,
    pub size: u64,
}

/// One entry of a container's item list
///
/// Lists may be written by other tools; entries that are not library items
/// are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContainerItem {
    Book(LibraryItem),
    Other(serde_json::Value),
}

impl ContainerItem {
    pub fn as_book(&self) -> Option<&LibraryItem> {
        match self {
            ContainerItem::Book(item) => Some(item),
            ContainerItem::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerMeta {
    #[serde(
        rename = "type",
        default = "default_container_type",
        deserialize_with = "lenient_container_type"
    )]
    pub container_type: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub items: Vec<ContainerItem>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_container_type() -> String {
    DEFAULT_CONTAINER_TYPE.to_string()
}

fn lenient_container_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value: Option<String> = lenient::or_default(deserializer)?;
    Ok(value.unwrap_or_else(default_container_type))
}

impl Default for ContainerMeta {
    fn default() -> Self {
        Self {
            container_type: default_container_type(),
            items: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NpcMeta {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub present: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Typed contents of a `.rogueos` file
///
/// Fields are read independently: a value of the wrong shape falls back to
/// its default and an unreadable child, container, or NPC entry is dropped
/// without affecting its siblings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomMetadata {
    #[serde(rename = "type", default, deserialize_with = "lenient::or_default")]
    pub room_type: RoomType,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub presentation: Presentation,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub children: BTreeMap<String, ChildMeta>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub containers: BTreeMap<String, ContainerMeta>,
    #[serde(default, deserialize_with = "lenient::entries")]
    pub npcs: BTreeMap<String, NpcMeta>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RoomMetadata {
    /// Fill in `access` and `state` for `name` where they are missing.
    ///
    /// Returns true when anything changed.
    pub fn ensure_child_metadata(&mut self, name: &str, access: &str, state: &str) -> bool {
        let child = self.children.entry(name.to_string()).or_default();
        let mut changed = false;
        if child.access.is_none() {
            child.access = Some(access.to_string());
            changed = true;
        }
        if child.state.is_none() {
            child.state = Some(state.to_string());
            changed = true;
        }
        changed
    }

    /// Overwrite the state of `name`, creating the entry if needed.
    pub fn mark_child_state(&mut self, name: &str, state: &str) -> bool {
        let child = self.children.entry(name.to_string()).or_default();
        if child.state.as_deref() == Some(state) {
            return false;
        }
        child.state = Some(state.to_string());
        true
    }

    /// Record a door side for `name` unless one is already set.
    pub fn set_door_side_if_absent(&mut self, name: &str, side: DoorSide) -> bool {
        let child = self.children.entry(name.to_string()).or_default();
        if child.door_side.is_some() {
            return false;
        }
        child.door_side = Some(side);
        true
    }

    pub fn ensure_container(&mut self, name: &str) -> &mut ContainerMeta {
        self.containers.entry(name.to_string()).or_default()
    }

    pub fn ensure_npc(&mut self, name: &str) -> &mut NpcMeta {
        self.npcs.entry(name.to_string()).or_default()
    }

    /// Names of NPCs currently marked present, in name order.
    pub fn present_npcs(&self) -> impl Iterator<Item = &str> {
        self.npcs
            .iter()
            .filter(|(_, npc)| npc.present)
            .map(|(name, _)| name.as_str())
    }
}

/// Result of loading metadata for one directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedMetadata {
    pub metadata: RoomMetadata,
    /// The stored file existed but could not be parsed; defaults were used
    /// and the file must not be overwritten.
    pub malformed: bool,
}

/// Per-directory metadata collaborator
pub trait MetadataStore: Send + Sync {
    /// Load metadata for `directory`, merged over defaults. Never fails:
    /// unreadable or malformed data yields defaults with `malformed` set.
    fn load(&self, directory: &Path) -> LoadedMetadata;

    /// Persist metadata for `directory`.
    fn save(&self, directory: &Path, metadata: &RoomMetadata) -> Result<(), MetadataError>;
}
