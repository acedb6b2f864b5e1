//! Shared fixtures: a temporary world directory plus a generator over a
//! temporary index.

use roguefs::identity::path::canonicalize_path;
use roguefs::index::{NodeRecord, PersistentIndex};
use roguefs::metadata::JsonMetadataStore;
use roguefs::scanner::METADATA_FILE_NAME;
use roguefs::types::NodeId;
use roguefs::world::GenerationReport;
use roguefs::WorldGenerator;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestWorld {
    _temp: TempDir,
    pub outside: PathBuf,
    pub root: PathBuf,
    pub generator: WorldGenerator,
}

impl TestWorld {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("world");
        let outside = temp.path().join("outside");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&outside).unwrap();
        let root = canonicalize_path(&root).unwrap();
        let outside = canonicalize_path(&outside).unwrap();

        let index = Arc::new(PersistentIndex::temporary().unwrap());
        let generator = WorldGenerator::new(index, Arc::new(JsonMetadataStore::new()));
        Self {
            _temp: temp,
            outside,
            root,
            generator,
        }
    }

    pub fn index(&self) -> &PersistentIndex {
        self.generator.index()
    }

    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn dir(&self, rel: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn write_metadata(&self, dir: &Path, json: &str) {
        fs::write(dir.join(METADATA_FILE_NAME), json).unwrap();
    }

    pub fn read_metadata(&self, dir: &Path) -> serde_json::Value {
        let raw = fs::read_to_string(dir.join(METADATA_FILE_NAME)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    pub fn generate_root(&self) -> GenerationReport {
        self.generator.generate_room(&self.root, None).unwrap()
    }

    pub fn children(&self, dir_id: &NodeId) -> Vec<NodeRecord> {
        self.index().children_of(dir_id).unwrap()
    }

    pub fn child_named(&self, dir_id: &NodeId, name: &str) -> NodeRecord {
        self.children(dir_id)
            .into_iter()
            .find(|c| c.display_name() == name)
            .unwrap_or_else(|| panic!("no child named {}", name))
    }
}
