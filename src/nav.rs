//! Navigation over indexed rooms.

use crate::error::StorageError;
use crate::index::{NodeRecord, PersistentIndex};
use crate::types::{NodeId, NodeKind};

/// Longest parent chain followed by [`LocationSystem::breadcrumbs`].
pub const MAX_BREADCRUMB_DEPTH: usize = 128;

/// Moves between directory rooms using only the index
pub struct LocationSystem<'a> {
    index: &'a PersistentIndex,
}

impl<'a> LocationSystem<'a> {
    pub fn new(index: &'a PersistentIndex) -> Self {
        Self { index }
    }

    /// Room containing `node`: the node itself for directories, its parent
    /// otherwise.
    pub fn current_dir(&self, node: &NodeId) -> Result<Option<NodeId>, StorageError> {
        Ok(self.index.get_node(node)?.and_then(|record| {
            if record.kind == NodeKind::Directory {
                Some(record.id)
            } else {
                record.parent
            }
        }))
    }

    /// Directory children of `dir`'s parent, including `dir` itself.
    pub fn siblings(&self, dir: &NodeId) -> Result<Vec<NodeId>, StorageError> {
        match self.index.parent_of(dir)? {
            Some(parent) => children_by_kind(self.index, &parent.id, NodeKind::Directory),
            None => Ok(Vec::new()),
        }
    }

    pub fn up(&self, dir: &NodeId) -> Result<Option<NodeId>, StorageError> {
        Ok(self.index.parent_of(dir)?.map(|p| p.id))
    }

    /// `child` if it is a directory directly inside `dir`.
    pub fn down(&self, dir: &NodeId, child: &NodeId) -> Result<Option<NodeId>, StorageError> {
        let found = self
            .index
            .children_of(dir)?
            .into_iter()
            .any(|c| &c.id == child && c.kind == NodeKind::Directory);
        Ok(found.then(|| child.clone()))
    }

    /// Chain from the root down to `node`, inclusive.
    ///
    /// Stops after [`MAX_BREADCRUMB_DEPTH`] hops or on a repeated id.
    pub fn breadcrumbs(&self, node: &NodeId) -> Result<Vec<NodeRecord>, StorageError> {
        let mut chain: Vec<NodeRecord> = Vec::new();
        let mut next = self.index.get_node(node)?;
        while let Some(record) = next {
            if chain.len() >= MAX_BREADCRUMB_DEPTH || chain.iter().any(|c| c.id == record.id) {
                break;
            }
            next = match &record.parent {
                Some(parent) => self.index.get_node(parent)?,
                None => None,
            };
            chain.push(record);
        }
        chain.reverse();
        Ok(chain)
    }
}

/// Ids of the children of `dir` with the given kind, in path order.
pub fn children_by_kind(
    index: &PersistentIndex,
    dir: &NodeId,
    kind: NodeKind,
) -> Result<Vec<NodeId>, StorageError> {
    Ok(index
        .children_of(dir)?
        .into_iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.id)
        .collect())
}
