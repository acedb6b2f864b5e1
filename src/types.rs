//! Core value types shared by the index, layout, and world layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable node identifier: fixed-width lowercase hex of a BLAKE3 digest prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Width of the hex form in characters.
    pub const HEX_LEN: usize = 32;

    pub(crate) fn from_digest(digest: &blake3::Hash) -> Self {
        NodeId(hex::encode(&digest.as_bytes()[..Self::HEX_LEN / 2]))
    }

    /// Parse a node id from user input. Rejects anything that is not
    /// `HEX_LEN` lowercase hex characters.
    pub fn parse(s: &str) -> Option<Self> {
        let valid = s.len() == Self::HEX_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| NodeId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of entity kinds tracked by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Directory,
    File,
    Symlink,
    Mount,
    Container,
    #[serde(rename = "NPC")]
    Npc,
}

impl NodeKind {
    /// Virtual kinds are materialized from declared metadata only.
    pub fn is_virtual(self) -> bool {
        matches!(self, NodeKind::Container | NodeKind::Npc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Directory => "Directory",
            NodeKind::File => "File",
            NodeKind::Symlink => "Symlink",
            NodeKind::Mount => "Mount",
            NodeKind::Container => "Container",
            NodeKind::Npc => "NPC",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

/// A placed node's pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Pose on the floor plane at `(x, y, 0)` with identity rotation and unit scale.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// A directory's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Space {
    pub origin: Vec3,
    pub size: Vec3,
}

impl Space {
    pub fn width(&self) -> f64 {
        self.size.x
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }
}

impl Default for Space {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            size: Vec3::new(40.0, 20.0, 8.0),
        }
    }
}
