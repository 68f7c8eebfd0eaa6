//! Axis-aligned bounding box of the node set

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl BoundingBox {
    /// Compute the bounding box of a non-empty point set. Returns `None` for
    /// an empty set.
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
            min_z: first.z,
            max_z: first.z,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
            bounds.min_z = bounds.min_z.min(p.z);
            bounds.max_z = bounds.max_z.max(p.z);
        }
        Some(bounds)
    }

    /// Volume as the strict product of the three axis extents. A structure
    /// that collapses onto a plane legitimately has volume 0.
    pub fn volume(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y) * (self.max_z - self.min_z)
    }
}

/// Check the bounding-box growth criterion.
///
/// Returns `(exploded, current_volume)`. Exploded iff the current volume
/// exceeds `volume_ratio` times the initial volume. The check is one-sided:
/// only growth triggers it, a collapsing structure never does.
pub fn check_bounding_box(
    positions: &[Point3<f64>],
    initial: &BoundingBox,
    volume_ratio: f64,
) -> (bool, f64) {
    let current_volume = BoundingBox::from_points(positions)
        .map(|b| b.volume())
        .unwrap_or(0.0);
    let exploded = current_volume > volume_ratio * initial.volume();
    (exploded, current_volume)
}
