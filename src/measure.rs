//! Model weight and height measurements

use nalgebra::Point3;

use crate::structure::{BeamElement, StrandMaterial};

/// Total strand mass in kg, summed as ρ·A·L over all beams at their current
/// lengths
pub fn model_weight_kg(
    beams: &[BeamElement],
    positions: &[Point3<f64>],
    material: &StrandMaterial,
) -> f64 {
    let area = material.cross_section_area();
    beams
        .iter()
        .map(|beam| {
            let length = (positions[beam.b] - positions[beam.a]).norm();
            material.density * area * length
        })
        .sum()
}

/// Vertical extent of the node set in m
pub fn model_height(positions: &[Point3<f64>]) -> f64 {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in positions {
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if min_y > max_y {
        return 0.0;
    }
    max_y - min_y
}
