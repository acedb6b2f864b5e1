//! Property-based tests for layout bounds and tiling

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use roguefs::layout::{blue_noise, chamber_cells, phyllotaxis, scatter, DoorSide, ScatterParams};

fn in_room(x: f64, y: f64, width: f64, height: f64) -> bool {
    x.abs() <= width / 2.0 + 1e-9 && y.abs() <= height / 2.0 + 1e-9
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every strategy keeps its points on the room floor.
    #[test]
    fn scatter_stays_inside_room(
        n in 0usize..320,
        width in 4.0f64..120.0,
        height in 4.0f64..120.0,
        seed in any::<u64>(),
    ) {
        let params = ScatterParams::default();
        let points = scatter(n, width, height, &params, seed);
        prop_assert_eq!(points.len(), n);
        for p in &points {
            prop_assert!(in_room(p.x, p.y, width, height), "{:?} outside {}x{}", p, width, height);
        }
    }

    #[test]
    fn scatter_is_seed_deterministic(n in 0usize..250, seed in any::<u64>()) {
        let params = ScatterParams::default();
        prop_assert_eq!(
            scatter(n, 40.0, 20.0, &params, seed),
            scatter(n, 40.0, 20.0, &params, seed)
        );
    }

    /// Either every accepted pair keeps its distance or the grid fill took over.
    #[test]
    fn blue_noise_keeps_min_distance(
        n in 13usize..=200,
        width in 4.0f64..120.0,
        height in 4.0f64..120.0,
        min_dist in 0.1f64..6.0,
        seed in any::<u64>(),
    ) {
        let result = blue_noise(n, width, height, min_dist, &mut ChaCha8Rng::seed_from_u64(seed));
        prop_assert_eq!(result.points.len(), n);
        if !result.grid_fallback {
            let min_dist_sq = min_dist * min_dist;
            for (i, p) in result.points.iter().enumerate() {
                prop_assert!(in_room(p.x, p.y, width, height));
                for q in &result.points[i + 1..] {
                    prop_assert!(
                        p.distance_squared(q) >= min_dist_sq,
                        "{:?} and {:?} closer than {}", p, q, min_dist
                    );
                }
            }
        }
    }

    #[test]
    fn phyllotaxis_respects_radius(n in 0usize..64, radius in 0.5f64..50.0) {
        for p in phyllotaxis(n, radius) {
            prop_assert!((p.x * p.x + p.y * p.y).sqrt() <= radius + 1e-9);
        }
    }

    /// Chambers tile the unit square without overlapping.
    #[test]
    fn chambers_tile_unit_square(n in 1usize..80) {
        let cells = chamber_cells(n);
        prop_assert_eq!(cells.len(), n);

        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        for (i, cell) in cells.iter().enumerate() {
            prop_assert!(cell.min.x >= 0.0 && cell.min.y >= 0.0);
            prop_assert!(cell.max.x <= 1.0 + 1e-12 && cell.max.y <= 1.0 + 1e-12);
            prop_assert!(cell.min.x < cell.center.x && cell.center.x < cell.max.x);
            prop_assert!(cell.min.y < cell.center.y && cell.center.y < cell.max.y);

            let last_row = rows > 1 && i / cols == rows - 1;
            let expected = if last_row { DoorSide::North } else { DoorSide::South };
            prop_assert_eq!(cell.door_side, expected);

            for other in &cells[i + 1..] {
                let overlap = cell.min.x < other.max.x
                    && other.min.x < cell.max.x
                    && cell.min.y < other.max.y
                    && other.min.y < cell.max.y;
                prop_assert!(!overlap);
            }
        }
    }
}
