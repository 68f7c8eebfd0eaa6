//! Node velocity-spike monitor

use nalgebra::Point3;

use crate::structure::BeamElement;

/// Flags nodes whose per-step displacement exceeds a threshold.
///
/// "Velocity" here is the displacement magnitude between consecutive calls,
/// not divided by the timestep - the timestep is constant within a run, so
/// the threshold is expressed in position units. The first observation of a
/// node produces no velocity and is skipped.
#[derive(Debug, Clone)]
pub struct VelocityMonitor {
    last_positions: Vec<Option<Point3<f64>>>,
}

impl VelocityMonitor {
    /// Create a monitor for `node_count` nodes with no history
    pub fn new(node_count: usize) -> Self {
        Self {
            last_positions: vec![None; node_count],
        }
    }

    /// Evaluate every beam endpoint against `velocity_threshold`.
    ///
    /// Nodes shared between beams are visited once per endpoint; only the
    /// stored position matters, so repeated visits within one call are
    /// harmless. Returns `(spike_detected, max_velocity)`.
    pub fn check(
        &mut self,
        beams: &[BeamElement],
        positions: &[Point3<f64>],
        velocity_threshold: f64,
    ) -> (bool, f64) {
        let mut spike_detected = false;
        let mut max_velocity = 0.0_f64;

        for beam in beams {
            for node in [beam.a, beam.b] {
                let position = positions[node];
                if let Some(last) = self.last_positions[node] {
                    let velocity = (position - last).norm();
                    if velocity > max_velocity {
                        max_velocity = velocity;
                    }
                    if velocity > velocity_threshold {
                        spike_detected = true;
                    }
                }
                self.last_positions[node] = Some(position);
            }
        }

        (spike_detected, max_velocity)
    }

    /// Forget all position history
    pub fn reset(&mut self) {
        for last in &mut self.last_positions {
            *last = None;
        }
    }
}
