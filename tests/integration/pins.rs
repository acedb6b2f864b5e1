//! Pinned nodes across generation, reflow, and eviction

use super::test_utils::TestWorld;
use roguefs::types::Transform;
use std::fs;

fn pinned_world() -> (TestWorld, roguefs::NodeId, roguefs::NodeId) {
    let world = TestWorld::new();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
        world.file(name, name);
    }
    let report = world.generate_root();
    let pinned = world.child_named(&report.dir_id, "b.txt").id;
    assert!(world.index().toggle_pin(&pinned).unwrap());
    (world, report.dir_id, pinned)
}

#[test]
fn test_generation_keeps_pinned_pose() {
    let (world, dir_id, pinned) = pinned_world();
    let moved = Transform::at(3.0, -4.0);
    world.index().set_transform(&pinned, &moved).unwrap();

    let report = world.generate_root();
    assert_eq!(report.dir_id, dir_id);
    assert_eq!(report.kept_pinned, 1);
    assert_eq!(report.placed, 3);
    assert_eq!(world.index().get_transform(&pinned).unwrap(), Some(moved));
}

#[test]
fn test_reflow_respects_pins_unless_asked() {
    let (world, dir_id, pinned) = pinned_world();
    let original = world.index().get_transform(&pinned).unwrap().unwrap();
    let moved = Transform::at(3.0, -4.0);
    world.index().set_transform(&pinned, &moved).unwrap();

    let report = world.generator.reflow_room(&dir_id, false).unwrap();
    assert_eq!(report.skipped_pinned, 1);
    assert_eq!(report.placed, 3);
    assert_eq!(world.index().get_transform(&pinned).unwrap(), Some(moved));

    let report = world.generator.reflow_room(&dir_id, true).unwrap();
    assert_eq!(report.skipped_pinned, 0);
    assert_eq!(report.placed, 4);
    assert_eq!(world.index().get_transform(&pinned).unwrap(), Some(original));
}

#[cfg(unix)]
#[test]
fn test_pin_survives_eviction_and_return() {
    let (world, _dir_id, pinned) = pinned_world();
    let inside = world.root.join("b.txt");
    let parked = world.outside.join("b.txt");
    world.index().visit(&pinned).unwrap();

    fs::rename(&inside, &parked).unwrap();
    let gone = world.generate_root();
    assert_eq!(gone.evicted, vec![pinned.clone()]);
    assert!(world.index().is_pinned(&pinned).unwrap());
    assert_eq!(world.index().get_visit(&pinned).unwrap().unwrap().count, 1);

    fs::rename(&parked, &inside).unwrap();
    let back = world.generate_root();
    let returned = world.child_named(&back.dir_id, "b.txt");
    assert_eq!(returned.id, pinned);
    assert!(world.index().is_pinned(&pinned).unwrap());
    // The old pose went with the eviction, so a fresh one is placed.
    assert!(world.index().get_transform(&pinned).unwrap().is_some());
    assert_eq!(back.kept_pinned, 0);
}

#[test]
fn test_prune_removes_orphaned_rows() {
    let (world, _dir_id, pinned) = pinned_world();
    world.index().visit(&pinned).unwrap();
    fs::remove_file(world.root.join("b.txt")).unwrap();
    world.generate_root();

    let report = world.index().prune_orphans().unwrap();
    assert_eq!(report.pins_removed, 1);
    assert_eq!(report.visits_removed, 1);
    assert!(!world.index().is_pinned(&pinned).unwrap());
    assert!(world.index().get_visit(&pinned).unwrap().is_none());

    let again = world.index().prune_orphans().unwrap();
    assert_eq!(again, roguefs::index::PruneReport::default());
}
