//! End-to-end room generation

use super::test_utils::TestWorld;
use roguefs::types::{NodeKind, Space};
use roguefs::world::ROOM_THEME;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

fn inside(space: &Space, x: f64, y: f64) -> bool {
    x.abs() <= space.width() / 2.0 && y.abs() <= space.height() / 2.0
}

#[test]
fn test_hall_room_places_every_child() {
    let world = TestWorld::new();
    world.file("a.txt", "a");
    world.file("b.txt", "bb");
    world.file("c.txt", "ccc");
    world.dir("north");
    world.dir("south");

    let report = world.generate_root();
    assert_eq!(report.children, 5);
    assert_eq!(report.placed, 5);
    assert!(!report.chambers);

    let space = world.index().get_space(&report.dir_id).unwrap().unwrap();
    assert_eq!(space, Space::default());

    let mut before = HashMap::new();
    for child in world.children(&report.dir_id) {
        let t = world.index().get_transform(&child.id).unwrap().unwrap();
        assert_eq!(t.position.z, 0.0);
        assert!(inside(&space, t.position.x, t.position.y));
        before.insert(child.id, t);
    }
    assert_eq!(before.len(), 5);

    let reflow = world.generator.reflow_room(&report.dir_id, false).unwrap();
    assert_eq!(reflow.placed, 5);
    for (id, t) in &before {
        assert_eq!(world.index().get_transform(id).unwrap().as_ref(), Some(t));
    }
}

#[test]
fn test_generation_is_idempotent() {
    let world = TestWorld::new();
    for i in 0..20 {
        world.file(&format!("file{:02}.txt", i), "x");
    }
    world.dir("sub");

    let first = world.generate_root();
    let snapshot: Vec<_> = world
        .children(&first.dir_id)
        .into_iter()
        .map(|c| (c.id.clone(), world.index().get_transform(&c.id).unwrap()))
        .collect();

    let second = world.generate_root();
    assert_eq!(first.dir_id, second.dir_id);
    assert!(second.evicted.is_empty());
    assert!(!second.metadata_saved);

    let again: Vec<_> = world
        .children(&second.dir_id)
        .into_iter()
        .map(|c| (c.id.clone(), world.index().get_transform(&c.id).unwrap()))
        .collect();
    assert_eq!(snapshot, again);
}

#[test]
fn test_virtual_entities_are_stable() {
    let world = TestWorld::new();
    world.write_metadata(
        &world.root,
        r#"{
            "npcs": {"dead_librarian": {"present": true}, "ghost": {"present": false}},
            "containers": {"Magic Library": {"type": "magic_library", "items": [
                {"name": "a.pdf", "relpath": "a.pdf", "size": 1},
                {"name": "b.pdf", "relpath": "b.pdf", "size": 2}
            ]}}
        }"#,
    );

    let first = world.generate_root();
    let second = world.generate_root();
    assert_eq!(first.virtual_children, 2);

    let virtuals = |report: &roguefs::world::GenerationReport| {
        let mut out: Vec<_> = world
            .children(&report.dir_id)
            .into_iter()
            .filter(|c| c.kind.is_virtual())
            .collect();
        out.sort_by_key(|c| c.kind.as_str());
        out
    };
    let a = virtuals(&first);
    let b = virtuals(&second);
    assert_eq!(a.len(), 2);
    assert_eq!(
        a.iter().map(|c| &c.id).collect::<Vec<_>>(),
        b.iter().map(|c| &c.id).collect::<Vec<_>>()
    );

    let container = a.iter().find(|c| c.kind == NodeKind::Container).unwrap();
    assert!(container
        .path
        .ends_with(".rogueos::container::Magic_Library"));
    assert_eq!(container.seed.as_deref(), Some("Magic Library"));
    assert_eq!(container.theme.as_deref(), Some("magic_library"));

    let npc = a.iter().find(|c| c.kind == NodeKind::Npc).unwrap();
    assert!(npc.path.ends_with(".rogueos::npc::dead_librarian"));
    assert_eq!(npc.theme.as_deref(), Some("dead_librarian"));
    assert!(world.index().get_transform(&npc.id).unwrap().is_some());
}

#[test]
fn test_absent_npc_is_evicted() {
    let world = TestWorld::new();
    world.write_metadata(&world.root, r#"{"npcs": {"ghost": {"present": true}}}"#);
    let first = world.generate_root();
    assert_eq!(first.virtual_children, 1);

    world.write_metadata(&world.root, r#"{"type": "level", "npcs": {"ghost": {"present": false}}}"#);
    let second = world.generate_root();
    assert_eq!(second.virtual_children, 0);
    assert_eq!(second.evicted.len(), 1);
    assert!(world.children(&second.dir_id).is_empty());
}

#[test]
fn test_root_is_level_and_children_get_stairs() {
    let world = TestWorld::new();
    world.dir("cellar");
    let report = world.generate_root();
    assert!(report.metadata_saved);

    let meta = world.read_metadata(&world.root);
    assert_eq!(meta["type"], "level");
    assert_eq!(meta["presentation"], "hall");
    assert_eq!(meta["children"]["cellar"]["access"], "stairs");
    assert_eq!(meta["children"]["cellar"]["state"], "open");

    let root = world.index().get_node(&report.dir_id).unwrap().unwrap();
    assert_eq!(root.theme.as_deref(), Some(ROOM_THEME));
    assert!(root.parent.is_none());
}

#[test]
fn test_chambers_layout() {
    let world = TestWorld::new();
    world.write_metadata(&world.root, r#"{"presentation": "chambers"}"#);
    for name in ["a", "b", "c", "d", "e"] {
        world.dir(name);
    }
    world.file("loose.txt", "x");

    let report = world.generate_root();
    assert!(report.chambers);
    assert_eq!(report.placed, 6);

    // 5 chambers: 3 columns, 2 rows; the bottom row opens north.
    let meta = world.read_metadata(&world.root);
    for name in ["a", "b", "c"] {
        assert_eq!(meta["children"][name]["door_side"], "south", "{}", name);
    }
    for name in ["d", "e"] {
        assert_eq!(meta["children"][name]["door_side"], "north", "{}", name);
    }

    let space = Space::default();
    let a = world.child_named(&report.dir_id, "a");
    let t = world.index().get_transform(&a.id).unwrap().unwrap();
    assert!((t.position.x - (1.0 / 6.0 - 0.5) * space.width()).abs() < 1e-9);
    assert!((t.position.y - (0.25 - 0.5) * space.height()).abs() < 1e-9);
}

#[test]
fn test_chambers_keep_existing_door_side() {
    let world = TestWorld::new();
    world.write_metadata(
        &world.root,
        r#"{"presentation": "chambers", "children": {"a": {"door_side": "north"}}}"#,
    );
    world.dir("a");
    world.generate_root();

    let meta = world.read_metadata(&world.root);
    assert_eq!(meta["children"]["a"]["door_side"], "north");
    assert_eq!(meta["children"]["a"]["access"], "stairs");
}

#[test]
fn test_child_generation_updates_parent_metadata() {
    let world = TestWorld::new();
    let root = world.generate_root();
    // Created after the root was generated, so the root has no entry yet.
    let vault = world.dir("vault");
    world.file("vault/gold.txt", "$");

    let report = world
        .generator
        .generate_room(&vault, Some(&root.dir_id))
        .unwrap();
    assert_eq!(report.effects.len(), 1);
    assert_eq!(report.effects_applied, 1);

    let meta = world.read_metadata(&world.root);
    assert_eq!(meta["children"]["vault"]["access"], "stairs");

    let node = world.index().get_node(&report.dir_id).unwrap().unwrap();
    assert_eq!(node.parent.as_ref(), Some(&root.dir_id));
    // Nothing in the vault itself needed recording.
    assert!(!report.metadata_saved);
}

#[test]
fn test_generate_attached_finds_parent() {
    let world = TestWorld::new();
    let sub = world.dir("sub");
    let root = world.generate_root();

    let report = world.generator.generate_attached(&sub).unwrap();
    let node = world.index().get_node(&report.dir_id).unwrap().unwrap();
    assert_eq!(node.parent, Some(root.dir_id));
}

#[test]
fn test_not_a_directory() {
    let world = TestWorld::new();
    let file = world.file("plain.txt", "x");
    assert!(matches!(
        world.generator.generate_room(&file, None),
        Err(roguefs::WorldError::NotADirectory(_))
    ));
    assert!(matches!(
        world.generator.generate_room(&world.root.join("missing"), None),
        Err(roguefs::WorldError::NotADirectory(_))
    ));
}

#[test]
fn test_reflow_unknown_directory() {
    let world = TestWorld::new();
    let unknown = roguefs::NodeId::parse(&"0".repeat(32)).unwrap();
    assert!(matches!(
        world.generator.reflow_room(&unknown, false),
        Err(roguefs::WorldError::NodeNotFound(_))
    ));
}

#[test]
fn test_concurrent_rooms() {
    let world = TestWorld::new();
    let dirs: Vec<_> = (0..4)
        .map(|i| {
            let dir = world.dir(&format!("room{}", i));
            for j in 0..15 {
                std::fs::write(dir.join(format!("f{}.txt", j)), "x").unwrap();
            }
            dir
        })
        .collect();
    let root = world.generate_root();

    let generator = Arc::new(world.generator);
    let handles: Vec<_> = dirs
        .into_iter()
        .map(|dir| {
            let generator = Arc::clone(&generator);
            let parent = root.dir_id.clone();
            thread::spawn(move || generator.generate_room(&dir, Some(&parent)).unwrap())
        })
        .collect();
    for handle in handles {
        let report = handle.join().unwrap();
        assert_eq!(report.children, 15);
        assert_eq!(report.placed, 15);
    }
}
