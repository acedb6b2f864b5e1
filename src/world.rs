//! World generation
//!
//! [`WorldGenerator`] reconciles one directory at a time against the index:
//! it scans the directory, materializes declared containers and NPCs, evicts
//! whatever disappeared, and lays the survivors out on the room floor.

pub mod effects;
pub mod lock;
pub mod placement;

pub use effects::MetadataEffect;
pub use lock::RoomLockManager;
pub use placement::{plan_placement, PlacementPlan};

use crate::error::WorldError;
use crate::identity::{self, path, VirtualCategory};
use crate::index::{NewNode, NodeRecord, PersistentIndex};
use crate::layout::ScatterParams;
use crate::metadata::{MetadataStore, RoomMetadata, RoomType, ACCESS_STAIRS, STATE_OPEN};
use crate::scanner::{Scanner, METADATA_FILE_NAME};
use crate::types::{NodeId, NodeKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Theme given to every generated directory node.
pub const ROOM_THEME: &str = "room";

/// Outcome of one [`WorldGenerator::generate_room`] pass
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub dir_id: NodeId,
    pub path: PathBuf,
    /// Real plus virtual children after reconciliation.
    pub children: usize,
    pub virtual_children: usize,
    pub evicted: Vec<NodeId>,
    pub placed: usize,
    /// Pinned children whose existing transform was kept.
    pub kept_pinned: usize,
    pub chambers: bool,
    pub effects: Vec<MetadataEffect>,
    pub effects_applied: usize,
    pub metadata_saved: bool,
}

/// Outcome of one [`WorldGenerator::reflow_room`] pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReflowReport {
    pub dir_id: NodeId,
    pub children: usize,
    pub placed: usize,
    pub skipped_pinned: usize,
    pub chambers: bool,
}

/// Builds and maintains rooms in the persistent index
pub struct WorldGenerator {
    index: Arc<PersistentIndex>,
    metadata: Arc<dyn MetadataStore>,
    scanner: Scanner,
    params: ScatterParams,
    locks: RoomLockManager,
}

fn virtual_path(directory: &Path, category: VirtualCategory, name: &str) -> PathBuf {
    directory.join(format!(
        "{}::{}::{}",
        METADATA_FILE_NAME,
        category.as_str(),
        name.replace(' ', "_")
    ))
}

impl WorldGenerator {
    pub fn new(index: Arc<PersistentIndex>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            index,
            metadata,
            scanner: Scanner::new(),
            params: ScatterParams::default(),
            locks: RoomLockManager::new(),
        }
    }

    pub fn with_scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_scatter_params(mut self, params: ScatterParams) -> Self {
        self.params = params;
        self
    }

    pub fn index(&self) -> &Arc<PersistentIndex> {
        &self.index
    }

    pub fn metadata_store(&self) -> &Arc<dyn MetadataStore> {
        &self.metadata
    }

    /// Generate `directory`, attaching it to its parent directory when that
    /// parent is already indexed and treating it as a root otherwise.
    pub fn generate_attached(&self, directory: &Path) -> Result<GenerationReport, WorldError> {
        let dir = self.resolve_directory(directory)?;
        let parent_id = match dir.parent() {
            Some(parent) => self
                .index
                .get_node_by_path(parent)?
                .filter(|p| p.kind == NodeKind::Directory)
                .map(|p| p.id),
            None => None,
        };
        self.generate_room(&dir, parent_id.as_ref())
    }

    fn resolve_directory(&self, directory: &Path) -> Result<PathBuf, WorldError> {
        let dir = path::canonicalize_path(directory)
            .map_err(|_| WorldError::NotADirectory(directory.to_path_buf()))?;
        if !dir.is_dir() {
            return Err(WorldError::NotADirectory(dir));
        }
        Ok(dir)
    }

    /// Reconcile `directory` with the index and lay out its children.
    ///
    /// Idempotent: running it again over unchanged content keeps every id and
    /// every unpinned transform.
    #[instrument(skip(self), fields(dir = %directory.display()))]
    pub fn generate_room(
        &self,
        directory: &Path,
        parent_id: Option<&NodeId>,
    ) -> Result<GenerationReport, WorldError> {
        let start = Instant::now();
        let dir = self.resolve_directory(directory)?;
        let dir_id = identity::node_id_for_path(&dir);

        let lease = self.locks.lease(&dir_id);
        let _room_guard = lease.lock();

        // Step 1: Load metadata; the scan root is always a level
        let loaded = self.metadata.load(&dir);
        let mut meta = loaded.metadata.clone();
        if parent_id.is_none() {
            meta.room_type = RoomType::Level;
        }

        // Step 2: Make the parent's entry for this directory walkable
        let mut effects = Vec::new();
        if let Some(parent_id) = parent_id {
            if let Some(effect) = self.parent_access_effect(&dir, parent_id)? {
                effects.push(effect);
            }
        }
        let mut effects_applied = 0;
        for effect in &effects {
            if self.apply_effect(effect)? {
                effects_applied += 1;
            }
        }

        // Step 3: Own node and space
        self.index.upsert_node(
            &NewNode::new(dir_id.clone(), dir.clone(), NodeKind::Directory)
                .with_parent(parent_id.cloned())
                .with_theme(ROOM_THEME),
        )?;
        let space = self.index.ensure_space(&dir_id)?;

        // Step 4: Real children
        let mut batch = Vec::new();
        for entry in self.scanner.list_children(&dir) {
            let mut node = NewNode::new(entry.id, entry.path, entry.kind).with_parent(Some(dir_id.clone()));
            if entry.kind == NodeKind::Directory {
                if let Some(name) = node.path.file_name() {
                    meta.ensure_child_metadata(&name.to_string_lossy(), ACCESS_STAIRS, STATE_OPEN);
                }
                node = node.with_theme(ROOM_THEME);
            }
            batch.push(node);
        }
        let real_count = batch.len();

        // Step 5: Declared virtual entities
        let mut seen_paths: HashSet<PathBuf> = batch.iter().map(|n| n.path.clone()).collect();
        for node in self.virtual_children(&dir, &dir_id, &meta) {
            if seen_paths.insert(node.path.clone()) {
                batch.push(node);
            } else {
                warn!(path = %node.path.display(), "Duplicate virtual entity path; skipping");
            }
        }
        let virtual_count = batch.len() - real_count;

        // Step 6: Evict children that no longer exist
        let evicted = self.index.remove_missing_children(&dir_id, &seen_paths)?;
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Evicted vanished children");
        }

        // Step 7: Upsert the reconciled child set in one unit
        self.index.upsert_nodes(&batch)?;

        // Steps 8-9: Placement
        let children = self.index.children_of(&dir_id)?;
        let plan = plan_placement(&dir_id, &children, meta.presentation, &space, &self.params);
        for (name, side) in &plan.door_sides {
            meta.set_door_side_if_absent(name, *side);
        }
        let mut placements = Vec::with_capacity(plan.transforms.len());
        let mut kept_pinned = 0;
        for (id, transform) in plan.transforms {
            if self.index.is_pinned(&id)? && self.index.get_transform(&id)?.is_some() {
                kept_pinned += 1;
                continue;
            }
            placements.push((id, transform));
        }
        self.index.set_transforms(&placements)?;

        // Step 10: Persist our own metadata when it changed
        let metadata_saved = self.persist_metadata(&dir, &loaded.metadata, &meta, loaded.malformed)?;

        info!(
            dir_id = %dir_id,
            children = children.len(),
            evicted = evicted.len(),
            placed = placements.len(),
            duration_ms = start.elapsed().as_millis(),
            "Room generated"
        );

        Ok(GenerationReport {
            dir_id,
            path: dir,
            children: children.len(),
            virtual_children: virtual_count,
            evicted,
            placed: placements.len(),
            kept_pinned,
            chambers: plan.chambers,
            effects,
            effects_applied,
            metadata_saved,
        })
    }

    /// Re-derive positions for the indexed children of `dir_id`.
    ///
    /// Touches transforms only. Pinned children keep their pose unless
    /// `include_pins` is set.
    #[instrument(skip(self), fields(dir_id = %dir_id))]
    pub fn reflow_room(&self, dir_id: &NodeId, include_pins: bool) -> Result<ReflowReport, WorldError> {
        let record = self
            .index
            .get_node(dir_id)?
            .ok_or_else(|| WorldError::NodeNotFound(dir_id.clone()))?;
        if record.kind != NodeKind::Directory {
            return Err(WorldError::NotADirectory(record.path));
        }

        let lease = self.locks.lease(dir_id);
        let _room_guard = lease.lock();

        let meta = self.metadata.load(&record.path).metadata;
        let space = self.index.get_space(dir_id)?.unwrap_or_default();
        let children = self.index.children_of(dir_id)?;
        let plan = plan_placement(dir_id, &children, meta.presentation, &space, &self.params);

        let mut placements = Vec::with_capacity(plan.transforms.len());
        let mut skipped_pinned = 0;
        for (id, transform) in plan.transforms {
            if !include_pins && self.index.is_pinned(&id)? {
                skipped_pinned += 1;
                continue;
            }
            placements.push((id, transform));
        }
        self.index.set_transforms(&placements)?;

        info!(placed = placements.len(), skipped_pinned, "Room reflowed");
        Ok(ReflowReport {
            dir_id: dir_id.clone(),
            children: children.len(),
            placed: placements.len(),
            skipped_pinned,
            chambers: plan.chambers,
        })
    }

    fn parent_access_effect(
        &self,
        dir: &Path,
        parent_id: &NodeId,
    ) -> Result<Option<MetadataEffect>, WorldError> {
        let Some(name) = dir.file_name() else {
            return Ok(None);
        };
        let parent_dir = match self.index.get_node(parent_id)? {
            Some(NodeRecord { path, .. }) => path,
            None => match dir.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return Ok(None),
            },
        };
        Ok(Some(MetadataEffect::EnsureChildAccess {
            directory: parent_dir,
            child: name.to_string_lossy().to_string(),
            access: ACCESS_STAIRS.to_string(),
            state: STATE_OPEN.to_string(),
        }))
    }

    /// Apply one effect under the target room's lock. Returns true when the
    /// target's metadata was changed and saved.
    pub fn apply_effect(&self, effect: &MetadataEffect) -> Result<bool, WorldError> {
        let target = effect.target();
        let target_id = identity::node_id_for_path(target);
        let target_lease = self.locks.lease(&target_id);
        let _target_guard = target_lease.lock();

        let loaded = self.metadata.load(target);
        if loaded.malformed {
            warn!(dir = %target.display(), "Skipping metadata effect on malformed metadata");
            return Ok(false);
        }
        let mut meta = loaded.metadata;
        if !effect.apply_to(&mut meta) {
            return Ok(false);
        }
        self.metadata.save(target, &meta)?;
        debug!(dir = %target.display(), ?effect, "Applied metadata effect");
        Ok(true)
    }

    fn virtual_children(&self, dir: &Path, dir_id: &NodeId, meta: &RoomMetadata) -> Vec<NewNode> {
        let containers = meta.containers.iter().map(|(name, container)| {
            NewNode::new(
                identity::virtual_node_id(dir_id, VirtualCategory::Container, name),
                virtual_path(dir, VirtualCategory::Container, name),
                NodeKind::Container,
            )
            .with_seed(name.as_str())
            .with_theme(container.container_type.as_str())
        });
        let npcs = meta.present_npcs().map(|name| {
            NewNode::new(
                identity::virtual_node_id(dir_id, VirtualCategory::Npc, name),
                virtual_path(dir, VirtualCategory::Npc, name),
                NodeKind::Npc,
            )
            .with_seed(name)
            .with_theme(name)
        });
        containers
            .chain(npcs)
            .map(|node| node.with_parent(Some(dir_id.clone())))
            .collect()
    }

    fn persist_metadata(
        &self,
        dir: &Path,
        loaded: &RoomMetadata,
        updated: &RoomMetadata,
        malformed: bool,
    ) -> Result<bool, WorldError> {
        if malformed {
            warn!(dir = %dir.display(), "Leaving malformed metadata untouched");
            return Ok(false);
        }
        if loaded == updated {
            return Ok(false);
        }
        self.metadata.save(dir, updated)?;
        Ok(true)
    }
}
