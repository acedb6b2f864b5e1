//! Sled-backed persistence for the index
//!
//! Layout (one sled tree each, values bincode-encoded):
//! - `nodes`: id -> NodeRecord
//! - `paths`: path -> id
//! - `children`: parent id || 0x00 || path -> id, so a prefix scan yields a
//!   directory's children in path order
//! - `transforms`, `spaces`, `pins`, `visits`: id -> record
//!
//! Multi-key writes run as sled transactions while holding the index write
//! lock; multi-key reads hold the read lock, so readers never observe a
//! half-applied node set.

use crate::error::StorageError;
use crate::index::{NewNode, NodeRecord, PruneReport, VisitRecord};
use crate::types::{NodeId, Space, Transform};
use chrono::Utc;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionalTree};
use sled::Transactional;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistent index over sled
pub struct PersistentIndex {
    db: sled::Db,
    nodes: sled::Tree,
    paths: sled::Tree,
    children: sled::Tree,
    transforms: sled::Tree,
    spaces: sled::Tree,
    pins: sled::Tree,
    visits: sled::Tree,
    write_lock: RwLock<()>,
}

fn encode<T: Serialize>(what: &'static str, value: &T) -> Result<Vec<u8>, StorageError> {
    bincode::serialize(value).map_err(|e| StorageError::codec(what, e))
}

fn decode<T: DeserializeOwned>(what: &'static str, bytes: &[u8]) -> Result<T, StorageError> {
    bincode::deserialize(bytes).map_err(|e| StorageError::codec(what, e))
}

fn path_key(path: &Path) -> Vec<u8> {
    path.to_string_lossy().as_bytes().to_vec()
}

fn child_prefix(parent: &NodeId) -> Vec<u8> {
    let mut key = parent.as_bytes().to_vec();
    key.push(0);
    key
}

fn child_key(parent: &NodeId, path: &Path) -> Vec<u8> {
    let mut key = child_prefix(parent);
    key.extend_from_slice(&path_key(path));
    key
}

fn id_from_bytes(bytes: &[u8]) -> Result<NodeId, StorageError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(NodeId::parse)
        .ok_or_else(|| StorageError::codec("node id", "stored id is not valid hex"))
}

type TxResult<T> = Result<T, ConflictableTransactionError<StorageError>>;

/// Remove `key` only while it still points at `id`.
fn remove_if_points_to(tree: &TransactionalTree, key: Vec<u8>, id: &NodeId) -> TxResult<()> {
    if let Some(current) = tree.get(key.as_slice())? {
        if current.as_ref() == id.as_bytes() {
            tree.remove(key)?;
        }
    }
    Ok(())
}

/// Trees touched when nodes are written or evicted.
struct NodeTxTrees<'a> {
    nodes: &'a TransactionalTree,
    paths: &'a TransactionalTree,
    children: &'a TransactionalTree,
    transforms: &'a TransactionalTree,
    spaces: &'a TransactionalTree,
}

impl NodeTxTrees<'_> {
    fn evict(&self, record: &NodeRecord) -> TxResult<()> {
        let id = record.id.as_bytes();
        self.nodes.remove(id)?;
        self.transforms.remove(id)?;
        self.spaces.remove(id)?;
        remove_if_points_to(self.paths, path_key(&record.path), &record.id)?;
        if let Some(parent) = &record.parent {
            remove_if_points_to(self.children, child_key(parent, &record.path), &record.id)?;
        }
        Ok(())
    }

    fn write(&self, record: &NodeRecord, encoded: &[u8]) -> TxResult<()> {
        if let Some(old_bytes) = self.nodes.get(record.id.as_bytes())? {
            let old: NodeRecord =
                decode("node record", &old_bytes).map_err(ConflictableTransactionError::Abort)?;
            if old.path != record.path || old.parent != record.parent {
                remove_if_points_to(self.paths, path_key(&old.path), &old.id)?;
                if let Some(parent) = &old.parent {
                    remove_if_points_to(self.children, child_key(parent, &old.path), &old.id)?;
                }
            }
        }

        self.nodes.insert(record.id.as_bytes(), encoded)?;
        self.paths
            .insert(path_key(&record.path), record.id.as_bytes())?;
        if let Some(parent) = &record.parent {
            self.children
                .insert(child_key(parent, &record.path), record.id.as_bytes())?;
        }
        Ok(())
    }
}

impl PersistentIndex {
    /// Open (or create) the index at `path`.
    ///
    /// Missing parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory index that is discarded on drop.
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    /// Wrap an already-open sled database.
    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            nodes: db.open_tree("nodes")?,
            paths: db.open_tree("paths")?,
            children: db.open_tree("children")?,
            transforms: db.open_tree("transforms")?,
            spaces: db.open_tree("spaces")?,
            pins: db.open_tree("pins")?,
            visits: db.open_tree("visits")?,
            db,
            write_lock: RwLock::new(()),
        })
    }

    /// Insert or replace a node, refreshing `last_seen`.
    pub fn upsert_node(&self, node: &NewNode) -> Result<(), StorageError> {
        self.upsert_nodes(std::slice::from_ref(node))
    }

    /// Insert or replace several nodes as one atomic unit.
    ///
    /// A stored node that currently owns one of the target paths under a
    /// different id (the entry was replaced on disk) is evicted together with
    /// its indexed subtree, keeping paths unique.
    pub fn upsert_nodes(&self, batch: &[NewNode]) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.write();
        let now = Utc::now().timestamp_millis();

        let batch_ids: HashSet<&NodeId> = batch.iter().map(|n| &n.id).collect();
        let mut displaced = Vec::new();
        for node in batch {
            if let Some(owner) = self.id_for_path(&node.path)? {
                if owner != node.id && !batch_ids.contains(&owner) {
                    debug!(path = %node.path.display(), old = %owner, new = %node.id, "Path changed identity");
                    displaced.extend(self.subtree_records(&owner)?);
                }
            }
        }

        let mut records = Vec::with_capacity(batch.len());
        for node in batch {
            let record = NodeRecord {
                id: node.id.clone(),
                path: node.path.clone(),
                kind: node.kind,
                parent: node.parent.clone(),
                seed: node.seed.clone(),
                theme: node.theme.clone(),
                last_seen: now,
            };
            let encoded = encode("node record", &record)?;
            records.push((record, encoded));
        }

        (
            &self.nodes,
            &self.paths,
            &self.children,
            &self.transforms,
            &self.spaces,
        )
            .transaction(|(nodes, paths, children, transforms, spaces)| -> TxResult<()> {
                let trees = NodeTxTrees {
                    nodes,
                    paths,
                    children,
                    transforms,
                    spaces,
                };
                for record in &displaced {
                    trees.evict(record)?;
                }
                for (record, encoded) in &records {
                    trees.write(record, encoded)?;
                }
                Ok(())
            })?;
        Ok(())
    }

    /// Point lookup by id.
    pub fn get_node(&self, id: &NodeId) -> Result<Option<NodeRecord>, StorageError> {
        match self.nodes.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode("node record", &bytes)?)),
            None => Ok(None),
        }
    }

    /// Point lookup by stored path.
    pub fn get_node_by_path(&self, path: &Path) -> Result<Option<NodeRecord>, StorageError> {
        let _guard = self.write_lock.read();
        match self.id_for_path(path)? {
            Some(id) => self.get_node(&id),
            None => Ok(None),
        }
    }

    fn id_for_path(&self, path: &Path) -> Result<Option<NodeId>, StorageError> {
        match self.paths.get(path_key(path))? {
            Some(bytes) => Ok(Some(id_from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All nodes whose parent is `parent`, ordered by path ascending.
    pub fn children_of(&self, parent: &NodeId) -> Result<Vec<NodeRecord>, StorageError> {
        let _guard = self.write_lock.read();
        self.children_unlocked(parent)
    }

    fn children_unlocked(&self, parent: &NodeId) -> Result<Vec<NodeRecord>, StorageError> {
        let mut out = Vec::new();
        for item in self.children.scan_prefix(child_prefix(parent)) {
            let (_, id_bytes) = item?;
            let id = id_from_bytes(&id_bytes)?;
            if let Some(record) = self.get_node(&id)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// Record for `id` plus every indexed descendant, breadth first.
    fn subtree_records(&self, id: &NodeId) -> Result<Vec<NodeRecord>, StorageError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        if let Some(root) = self.get_node(id)? {
            queue.push_back(root);
        }
        while let Some(record) = queue.pop_front() {
            if !seen.insert(record.id.clone()) {
                continue;
            }
            queue.extend(self.children_unlocked(&record.id)?);
            out.push(record);
        }
        Ok(out)
    }

    /// Resolve the stored parent of `id`; `None` for roots and unknown ids.
    pub fn parent_of(&self, id: &NodeId) -> Result<Option<NodeRecord>, StorageError> {
        match self.get_node(id)?.and_then(|n| n.parent) {
            Some(parent) => self.get_node(&parent),
            None => Ok(None),
        }
    }

    /// Evict every child of `parent` whose path is not in `existing_paths`,
    /// together with its transform and indexed subtree, as one atomic unit.
    ///
    /// Pin and visit rows of evicted ids are kept. Returns the evicted ids.
    pub fn remove_missing_children(
        &self,
        parent: &NodeId,
        existing_paths: &HashSet<PathBuf>,
    ) -> Result<Vec<NodeId>, StorageError> {
        let _guard = self.write_lock.write();

        let mut doomed = Vec::new();
        for child in self.children_unlocked(parent)? {
            if !existing_paths.contains(&child.path) {
                doomed.extend(self.subtree_records(&child.id)?);
            }
        }
        if doomed.is_empty() {
            return Ok(Vec::new());
        }

        (
            &self.nodes,
            &self.paths,
            &self.children,
            &self.transforms,
            &self.spaces,
        )
            .transaction(|(nodes, paths, children, transforms, spaces)| -> TxResult<()> {
                let trees = NodeTxTrees {
                    nodes,
                    paths,
                    children,
                    transforms,
                    spaces,
                };
                for record in &doomed {
                    trees.evict(record)?;
                }
                Ok(())
            })?;

        debug!(parent = %parent, evicted = doomed.len(), "Evicted stale children");
        Ok(doomed.into_iter().map(|r| r.id).collect())
    }

    pub fn set_transform(&self, id: &NodeId, transform: &Transform) -> Result<(), StorageError> {
        let _guard = self.write_lock.write();
        self.transforms
            .insert(id.as_bytes(), encode("transform", transform)?)?;
        Ok(())
    }

    /// Write several transforms as one atomic batch.
    pub fn set_transforms(&self, placed: &[(NodeId, Transform)]) -> Result<(), StorageError> {
        let _guard = self.write_lock.write();
        let mut batch = sled::Batch::default();
        for (id, transform) in placed {
            batch.insert(id.as_bytes(), encode("transform", transform)?);
        }
        self.transforms.apply_batch(batch)?;
        Ok(())
    }

    pub fn get_transform(&self, id: &NodeId) -> Result<Option<Transform>, StorageError> {
        match self.transforms.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode("transform", &bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set_space(&self, id: &NodeId, space: &Space) -> Result<(), StorageError> {
        let _guard = self.write_lock.write();
        self.spaces.insert(id.as_bytes(), encode("space", space)?)?;
        Ok(())
    }

    pub fn get_space(&self, id: &NodeId) -> Result<Option<Space>, StorageError> {
        match self.spaces.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode("space", &bytes)?)),
            None => Ok(None),
        }
    }

    /// Return the stored space, creating the default one if absent.
    pub fn ensure_space(&self, id: &NodeId) -> Result<Space, StorageError> {
        let _guard = self.write_lock.write();
        if let Some(bytes) = self.spaces.get(id.as_bytes())? {
            return decode("space", &bytes);
        }
        let space = Space::default();
        self.spaces.insert(id.as_bytes(), encode("space", &space)?)?;
        Ok(space)
    }

    pub fn is_pinned(&self, id: &NodeId) -> Result<bool, StorageError> {
        Ok(self.pins.contains_key(id.as_bytes())?)
    }

    /// Flip pin membership; returns the new state.
    pub fn toggle_pin(&self, id: &NodeId) -> Result<bool, StorageError> {
        let _guard = self.write_lock.write();
        if self.pins.remove(id.as_bytes())?.is_some() {
            Ok(false)
        } else {
            self.pins.insert(id.as_bytes(), &[1u8])?;
            Ok(true)
        }
    }

    /// Bump the visit counter and timestamp for `id`.
    pub fn visit(&self, id: &NodeId) -> Result<VisitRecord, StorageError> {
        let _guard = self.write_lock.write();
        let now = Utc::now().timestamp_millis();
        let record = match self.visits.get(id.as_bytes())? {
            Some(bytes) => {
                let prev: VisitRecord = decode("visit", &bytes)?;
                VisitRecord {
                    count: prev.count.saturating_add(1),
                    last: now,
                }
            }
            None => VisitRecord { count: 1, last: now },
        };
        self.visits.insert(id.as_bytes(), encode("visit", &record)?)?;
        Ok(record)
    }

    pub fn get_visit(&self, id: &NodeId) -> Result<Option<VisitRecord>, StorageError> {
        match self.visits.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode("visit", &bytes)?)),
            None => Ok(None),
        }
    }

    /// Nodes whose path contains `needle` (ASCII case-insensitive), in path
    /// order, at most `limit` of them.
    pub fn search_paths_like(
        &self,
        needle: &str,
        limit: usize,
    ) -> Result<Vec<NodeRecord>, StorageError> {
        let _guard = self.write_lock.read();
        let needle = needle.to_ascii_lowercase();
        let mut out = Vec::new();
        for item in self.paths.iter() {
            if out.len() >= limit {
                break;
            }
            let (path_bytes, id_bytes) = item?;
            let path = String::from_utf8_lossy(&path_bytes).to_ascii_lowercase();
            if !path.contains(&needle) {
                continue;
            }
            if let Some(record) = self.get_node(&id_from_bytes(&id_bytes)?)? {
                out.push(record);
            }
        }
        Ok(out)
    }

    /// Delete pin and visit rows whose node no longer exists.
    pub fn prune_orphans(&self) -> Result<PruneReport, StorageError> {
        let _guard = self.write_lock.write();
        let mut report = PruneReport::default();
        for (tree, counter) in [
            (&self.pins, &mut report.pins_removed),
            (&self.visits, &mut report.visits_removed),
        ] {
            for item in tree.iter() {
                let (key, _) = item?;
                if !self.nodes.contains_key(&key)? {
                    tree.remove(&key)?;
                    *counter += 1;
                }
            }
        }
        Ok(report)
    }

    /// Number of stored nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
