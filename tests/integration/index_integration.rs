//! Index opening and durability

use roguefs::index::{open_with_fallback, NewNode, PersistentIndex, StorageLocation};
use roguefs::identity::node_id_for_path;
use roguefs::types::{NodeKind, Transform};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_fallback_when_primary_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let primary = blocker.join("index");
    let fallback = temp.path().join("ws").join(".roguefs").join("index");

    let opened = open_with_fallback(&primary, &fallback).unwrap();
    assert!(opened.location.is_fallback());
    assert_eq!(opened.location.path(), fallback.as_path());
    match &opened.location {
        StorageLocation::Fallback { wanted, .. } => assert_eq!(wanted, &primary),
        other => panic!("unexpected location {:?}", other),
    }
}

#[test]
fn test_index_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("index");
    let file = temp.path().join("thing.txt");
    fs::write(&file, "x").unwrap();
    let id = node_id_for_path(&file);

    {
        let index = PersistentIndex::open(&db_path).unwrap();
        index
            .upsert_node(&NewNode::new(id.clone(), file.clone(), NodeKind::File))
            .unwrap();
        index.set_transform(&id, &Transform::at(1.0, 2.0)).unwrap();
        assert!(index.toggle_pin(&id).unwrap());
        index.visit(&id).unwrap();
        index.visit(&id).unwrap();
        index.flush().unwrap();
    }

    let index = PersistentIndex::open(&db_path).unwrap();
    let record = index.get_node_by_path(&file).unwrap().unwrap();
    assert_eq!(record.id, id);
    assert!(record.last_seen_at().is_some());
    assert_eq!(
        index.get_transform(&id).unwrap(),
        Some(Transform::at(1.0, 2.0))
    );
    assert!(index.is_pinned(&id).unwrap());
    assert_eq!(index.get_visit(&id).unwrap().unwrap().count, 2);
}

#[test]
fn test_search_is_case_insensitive_and_bounded() {
    let index = PersistentIndex::temporary().unwrap();
    let temp = TempDir::new().unwrap();
    for name in ["Dragon.txt", "dragonfly.txt", "wyrm.txt", "DRAGONS"] {
        let path = temp.path().join(name);
        fs::write(&path, name).unwrap();
        index
            .upsert_node(&NewNode::new(node_id_for_path(&path), path, NodeKind::File))
            .unwrap();
    }

    assert_eq!(index.search_paths_like("dragon", 10).unwrap().len(), 3);
    assert_eq!(index.search_paths_like("DRAGON", 2).unwrap().len(), 2);
    assert!(index.search_paths_like("basilisk", 10).unwrap().is_empty());
}
