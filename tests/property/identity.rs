//! Property-based tests for identity determinism

use proptest::prelude::*;
use roguefs::identity::{layout_seed, virtual_node_id, VirtualCategory, LAYOUT_SALT, LAYOUT_SALT_OTHERS};
use roguefs::types::NodeId;

fn node_id() -> impl Strategy<Value = NodeId> {
    "[0-9a-f]{32}".prop_map(|s| NodeId::parse(&s).unwrap())
}

/// Test that layout seeds depend only on the id and salt
#[test]
fn test_layout_seed_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(node_id(), node_id()), |(a, b)| {
            prop_assert_eq!(layout_seed(&a, LAYOUT_SALT), layout_seed(&a, LAYOUT_SALT));
            prop_assert_ne!(
                layout_seed(&a, LAYOUT_SALT),
                layout_seed(&a, LAYOUT_SALT_OTHERS)
            );
            if a != b {
                prop_assert_ne!(layout_seed(&a, LAYOUT_SALT), layout_seed(&b, LAYOUT_SALT));
            }
            Ok(())
        })
        .unwrap();
}

/// Test that virtual ids are stable and well-formed
#[test]
fn test_virtual_node_id_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(node_id(), ".{0,40}", ".{0,40}"), |(parent, name, other)| {
            let id = virtual_node_id(&parent, VirtualCategory::Npc, &name);
            prop_assert_eq!(&id, &virtual_node_id(&parent, VirtualCategory::Npc, &name));
            prop_assert_eq!(id.as_str().len(), NodeId::HEX_LEN);
            prop_assert_eq!(NodeId::parse(id.as_str()), Some(id.clone()));

            prop_assert_ne!(&id, &virtual_node_id(&parent, VirtualCategory::Container, &name));
            if name != other {
                prop_assert_ne!(&id, &virtual_node_id(&parent, VirtualCategory::Npc, &other));
            }
            Ok(())
        })
        .unwrap();
}
