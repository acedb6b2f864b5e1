//! Reconciliation of the index against a changing directory

use super::test_utils::TestWorld;
use std::fs;

#[test]
fn test_deleted_file_is_evicted() {
    let world = TestWorld::new();
    let doomed = world.file("doomed.txt", "x");
    world.file("keeper.txt", "y");

    let first = world.generate_root();
    let doomed_id = world.child_named(&first.dir_id, "doomed.txt").id;
    assert!(world.index().get_transform(&doomed_id).unwrap().is_some());

    fs::remove_file(&doomed).unwrap();
    let second = world.generate_root();

    assert_eq!(second.evicted, vec![doomed_id.clone()]);
    assert_eq!(second.children, 1);
    assert!(world.index().get_node(&doomed_id).unwrap().is_none());
    assert!(world.index().get_transform(&doomed_id).unwrap().is_none());
    assert!(world.index().get_node_by_path(&doomed).unwrap().is_none());
}

#[test]
fn test_new_entries_appear() {
    let world = TestWorld::new();
    world.file("one.txt", "1");
    let first = world.generate_root();
    assert_eq!(first.children, 1);

    world.file("two.txt", "2");
    world.dir("three");
    let second = world.generate_root();
    assert_eq!(second.children, 3);
    assert!(second.evicted.is_empty());

    let three = world.child_named(&second.dir_id, "three");
    assert_eq!(three.theme.as_deref(), Some(roguefs::world::ROOM_THEME));
    assert!(world.index().get_transform(&three.id).unwrap().is_some());
    assert_eq!(
        world.read_metadata(&world.root)["children"]["three"]["access"],
        "stairs"
    );
}

#[cfg(unix)]
#[test]
fn test_rename_keeps_identity() {
    let world = TestWorld::new();
    let before = world.file("draft.txt", "words");
    let first = world.generate_root();
    let id = world.child_named(&first.dir_id, "draft.txt").id;

    let after = world.root.join("final.txt");
    fs::rename(&before, &after).unwrap();
    let second = world.generate_root();

    let renamed = world.child_named(&second.dir_id, "final.txt");
    assert_eq!(renamed.id, id);
    assert_eq!(renamed.path, after);
    assert!(world.index().get_node_by_path(&before).unwrap().is_none());
    assert!(world.index().get_transform(&id).unwrap().is_some());
}

#[test]
fn test_deleted_subdirectory_cascades() {
    let world = TestWorld::new();
    let cave = world.dir("cave");
    world.file("cave/bat.txt", "b");
    world.file("cave/rock.txt", "r");

    let root = world.generate_root();
    let cave_report = world
        .generator
        .generate_room(&cave, Some(&root.dir_id))
        .unwrap();
    let inner: Vec<_> = world
        .children(&cave_report.dir_id)
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(inner.len(), 2);
    assert!(world.index().get_space(&cave_report.dir_id).unwrap().is_some());

    fs::remove_dir_all(&cave).unwrap();
    let second = world.generate_root();

    assert_eq!(second.evicted.len(), 3);
    assert!(second.evicted.contains(&cave_report.dir_id));
    for id in inner.iter().chain(std::iter::once(&cave_report.dir_id)) {
        assert!(world.index().get_node(id).unwrap().is_none());
        assert!(world.index().get_transform(id).unwrap().is_none());
    }
    assert!(world.index().get_space(&cave_report.dir_id).unwrap().is_none());
    assert_eq!(world.index().node_count(), 1);
}

#[test]
fn test_ignored_metadata_file_is_not_a_child() {
    let world = TestWorld::new();
    world.write_metadata(&world.root, "{}");
    world.file("visible.txt", "v");
    let report = world.generate_root();
    assert_eq!(report.children, 1);
    assert_eq!(world.children(&report.dir_id)[0].display_name(), "visible.txt");
}
