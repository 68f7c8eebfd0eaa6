//! Beam strain monitor with lazily-captured rest lengths

use nalgebra::Point3;

use crate::structure::BeamElement;

/// Tracks per-beam rest lengths and flags excessive elongation.
///
/// Rest lengths live in an arena indexed by beam number and are captured the
/// first time a beam is seen. That first sight defines the strain baseline
/// for the remainder of the run, so the caller must invoke [`prime`] (or the
/// first [`check`]) before any load has deformed the structure.
///
/// [`prime`]: StrainMonitor::prime
/// [`check`]: StrainMonitor::check
#[derive(Debug, Clone)]
pub struct StrainMonitor {
    rest_lengths: Vec<Option<f64>>,
}

impl StrainMonitor {
    /// Create a monitor for `beam_count` beams with no baselines captured yet
    pub fn new(beam_count: usize) -> Self {
        Self {
            rest_lengths: vec![None; beam_count],
        }
    }

    /// Capture rest lengths for all beams from the current positions. Beams
    /// that already have a baseline keep it.
    pub fn prime(&mut self, beams: &[BeamElement], positions: &[Point3<f64>]) {
        for (beam_no, beam) in beams.iter().enumerate() {
            if self.rest_lengths[beam_no].is_none() {
                let length = (positions[beam.b] - positions[beam.a]).norm();
                self.rest_lengths[beam_no] = Some(length);
            }
        }
    }

    /// Evaluate all beams against `strain_threshold`.
    ///
    /// Returns `(exceeded, max_strain)` where `max_strain` is the largest
    /// elongation ratio seen this call. Zero-rest-length beams are skipped.
    pub fn check(
        &mut self,
        beams: &[BeamElement],
        positions: &[Point3<f64>],
        strain_threshold: f64,
    ) -> (bool, f64) {
        let mut exceeded = false;
        let mut max_strain = 0.0_f64;

        for (beam_no, beam) in beams.iter().enumerate() {
            let current_length = (positions[beam.b] - positions[beam.a]).norm();
            let rest_length = *self.rest_lengths[beam_no].get_or_insert(current_length);
            if rest_length <= 0.0 {
                continue;
            }
            let strain = ((current_length - rest_length) / rest_length).abs();
            if strain > max_strain {
                max_strain = strain;
            }
            if strain > strain_threshold {
                exceeded = true;
            }
        }

        (exceeded, max_strain)
    }

    /// Forget all captured rest lengths
    pub fn reset(&mut self) {
        for rest in &mut self.rest_lengths {
            *rest = None;
        }
    }
}
