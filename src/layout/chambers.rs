//! Chamber partitioning for the "chambers" presentation
//!
//! Splits the unit square into a row-major grid of padded cells, one per
//! subdirectory, each with a single door on its north or south edge.

use super::Point;
use serde::{Deserialize, Serialize};

/// Inset applied to every side of a cell, as a fraction of the cell size.
pub const CELL_PADDING: f64 = 0.12;

/// Edge of a chamber holding its door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorSide {
    North,
    South,
}

/// One chamber in normalized `[0, 1]^2` coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChamberCell {
    pub min: Point,
    pub max: Point,
    pub center: Point,
    pub door_side: DoorSide,
    pub door: Point,
}

/// Partition the unit square into `n` padded cells.
///
/// `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`. Cells in the last row open
/// to the north; every other row opens to the south.
pub fn chamber_cells(n: usize) -> Vec<ChamberCell> {
    if n == 0 {
        return Vec::new();
    }
    let cols = ((n as f64).sqrt().ceil() as usize).max(1);
    let rows = n.div_ceil(cols).max(1);
    let cell_w = 1.0 / cols as f64;
    let cell_h = 1.0 / rows as f64;
    let pad_x = cell_w * CELL_PADDING;
    let pad_y = cell_h * CELL_PADDING;

    (0..n)
        .map(|idx| {
            let (r, c) = (idx / cols, idx % cols);
            let min = Point::new(c as f64 * cell_w + pad_x, r as f64 * cell_h + pad_y);
            let max = Point::new((c + 1) as f64 * cell_w - pad_x, (r + 1) as f64 * cell_h - pad_y);
            let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);

            let (door_side, door) = if r > 0 && r == rows - 1 {
                (DoorSide::North, Point::new(center.x, min.y))
            } else {
                (DoorSide::South, Point::new(center.x, max.y))
            };

            ChamberCell {
                min,
                max,
                center,
                door_side,
                door,
            }
        })
        .collect()
}
