//! Turns a directory's indexed children into transforms

use crate::identity::{layout_seed, LAYOUT_SALT, LAYOUT_SALT_OTHERS};
use crate::index::NodeRecord;
use crate::layout::{chamber_cells, scatter, DoorSide, Point, ScatterParams};
use crate::metadata::Presentation;
use crate::types::{NodeId, NodeKind, Space, Transform};

/// Computed layout for one room
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementPlan {
    /// One transform per child, in child order.
    pub transforms: Vec<(NodeId, Transform)>,
    /// Door side per subdirectory name; empty unless chambers were used.
    pub door_sides: Vec<(String, DoorSide)>,
    pub chambers: bool,
}

fn to_transform(point: Point) -> Transform {
    Transform::at(point.x, point.y)
}

/// Lay out `children` (in `children_of` order) inside `space`.
///
/// Chambers apply only when the room asks for them and has at least one
/// subdirectory; subdirectories then take chamber centers and everything else
/// is scattered with the secondary salt.
pub fn plan_placement(
    dir_id: &NodeId,
    children: &[NodeRecord],
    presentation: Presentation,
    space: &Space,
    params: &ScatterParams,
) -> PlacementPlan {
    let width = space.width();
    let height = space.height();

    let subdir_count = children
        .iter()
        .filter(|c| c.kind == NodeKind::Directory)
        .count();

    if presentation != Presentation::Chambers || subdir_count == 0 {
        let seed = layout_seed(dir_id, LAYOUT_SALT);
        let points = scatter(children.len(), width, height, params, seed);
        return PlacementPlan {
            transforms: children
                .iter()
                .zip(points)
                .map(|(child, point)| (child.id.clone(), to_transform(point)))
                .collect(),
            door_sides: Vec::new(),
            chambers: false,
        };
    }

    let (subdirs, others): (Vec<&NodeRecord>, Vec<&NodeRecord>) = children
        .iter()
        .partition(|c| c.kind == NodeKind::Directory);

    let mut plan = PlacementPlan {
        chambers: true,
        ..PlacementPlan::default()
    };

    for (child, cell) in subdirs.iter().zip(chamber_cells(subdirs.len())) {
        let center = Point::new((cell.center.x - 0.5) * width, (cell.center.y - 0.5) * height);
        plan.transforms.push((child.id.clone(), to_transform(center)));
        plan.door_sides.push((child.display_name(), cell.door_side));
    }

    let seed = layout_seed(dir_id, LAYOUT_SALT_OTHERS);
    let points = scatter(others.len(), width, height, params, seed);
    for (child, point) in others.iter().zip(points) {
        plan.transforms.push((child.id.clone(), to_transform(point)));
    }

    plan
}
