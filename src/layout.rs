//! Procedural point placement
//!
//! Pure, deterministic placement strategies. Anything random takes an explicit
//! RNG; [`scatter`] builds that RNG from a caller-provided seed so identical
//! inputs always reproduce identical points.

pub mod chambers;

pub use chambers::{chamber_cells, ChamberCell, DoorSide};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Largest count laid out by phyllotaxis.
pub const PHYLLOTAXIS_MAX: usize = 12;

/// Largest count laid out by blue-noise rejection sampling.
pub const BLUE_NOISE_MAX: usize = 200;

/// Rejection-sampling attempts allowed per requested point.
pub const BLUE_NOISE_ATTEMPTS_PER_POINT: usize = 40;

/// A 2D point on the room floor, centered on the room origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Placement strategy chosen by item count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    Phyllotaxis,
    BlueNoise,
    BucketedGrid,
}

/// Select a strategy for `n` items.
pub fn choose_layout(n: usize) -> LayoutStrategy {
    if n <= PHYLLOTAXIS_MAX {
        LayoutStrategy::Phyllotaxis
    } else if n <= BLUE_NOISE_MAX {
        LayoutStrategy::BlueNoise
    } else {
        LayoutStrategy::BucketedGrid
    }
}

/// Sunflower spiral: point `i` at radius `radius * sqrt(i / n)` and angle
/// `i * golden_angle`.
pub fn phyllotaxis(n: usize, radius: f64) -> Vec<Point> {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    let denom = n.max(1) as f64;
    (0..n)
        .map(|i| {
            let r = radius * (i as f64 / denom).sqrt();
            let theta = i as f64 * golden_angle;
            Point::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

/// Result of blue-noise sampling
#[derive(Debug, Clone, PartialEq)]
pub struct BlueNoise {
    pub points: Vec<Point>,
    /// True when rejection sampling gave up and the grid fill was used.
    pub grid_fallback: bool,
}

/// Rejection-sampled points inside the centered `width x height` rectangle,
/// pairwise at least `min_dist` apart.
///
/// Attempts are capped at `40 * n`. If fewer than `n` points are accepted the
/// whole set is replaced by a regular grid fill, so exactly `n` points are
/// always returned.
pub fn blue_noise<R: Rng + ?Sized>(
    n: usize,
    width: f64,
    height: f64,
    min_dist: f64,
    rng: &mut R,
) -> BlueNoise {
    let min_dist_sq = min_dist * min_dist;
    let max_attempts = n * BLUE_NOISE_ATTEMPTS_PER_POINT;
    let mut points: Vec<Point> = Vec::with_capacity(n);
    let mut attempts = 0;

    while points.len() < n && attempts < max_attempts {
        attempts += 1;
        let candidate = Point::new(
            (rng.gen::<f64>() - 0.5) * width,
            (rng.gen::<f64>() - 0.5) * height,
        );
        if points
            .iter()
            .all(|p| p.distance_squared(&candidate) >= min_dist_sq)
        {
            points.push(candidate);
        }
    }

    if points.len() < n {
        return BlueNoise {
            points: grid_fill(n, width, height),
            grid_fallback: true,
        };
    }
    BlueNoise {
        points,
        grid_fallback: false,
    }
}

/// Row-major grid of cell centers with `cols = ceil(sqrt(n * width / height))`.
pub fn bucketed_grid(n: usize, width: f64, height: f64) -> Vec<Point> {
    grid_fill(n, width, height)
}

fn grid_fill(n: usize, width: f64, height: f64) -> Vec<Point> {
    if n == 0 {
        return Vec::new();
    }
    let aspect = if height > 0.0 { width / height } else { 1.0 };
    let cols = ((n as f64 * aspect).sqrt().ceil() as usize).max(1);
    let rows = n.div_ceil(cols).max(1);
    let cell_w = width / cols as f64;
    let cell_h = height / rows as f64;

    (0..n)
        .map(|i| {
            let (r, c) = (i / cols, i % cols);
            Point::new(
                -width / 2.0 + c as f64 * cell_w + cell_w / 2.0,
                -height / 2.0 + r as f64 * cell_h + cell_h / 2.0,
            )
        })
        .collect()
}

/// Tuning for the general seeded scatter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterParams {
    /// Phyllotaxis radius is `min(width, height) / radius_divisor`.
    pub radius_divisor: f64,
    /// Fraction of the room used by blue noise and the grid.
    pub fill_ratio: f64,
    /// Minimum spacing between blue-noise points.
    pub min_dist: f64,
}

impl Default for ScatterParams {
    fn default() -> Self {
        Self {
            radius_divisor: 2.5,
            fill_ratio: 0.9,
            min_dist: 2.0,
        }
    }
}

/// Lay out `n` items in a `width x height` room using the strategy chosen by
/// [`choose_layout`], seeding any randomness from `seed`.
pub fn scatter(n: usize, width: f64, height: f64, params: &ScatterParams, seed: u64) -> Vec<Point> {
    if n == 0 {
        return Vec::new();
    }
    let inner_w = width * params.fill_ratio;
    let inner_h = height * params.fill_ratio;
    match choose_layout(n) {
        LayoutStrategy::Phyllotaxis => {
            phyllotaxis(n, width.min(height) / params.radius_divisor)
        }
        LayoutStrategy::BlueNoise => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            blue_noise(n, inner_w, inner_h, params.min_dist, &mut rng).points
        }
        LayoutStrategy::BucketedGrid => bucketed_grid(n, inner_w, inner_h),
    }
}
