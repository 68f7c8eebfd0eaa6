//! Combined integrity evaluation with latched breach times

use log::warn;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::integrity::{
    check_bounding_box, BoundingBox, FailureThresholds, StrainMonitor, VelocityMonitor,
};
use crate::structure::BeamElement;

/// Snapshot of the integrity state after one evaluation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Largest bounding-box volume observed so far in the run
    pub max_volume: f64,
    /// Largest beam strain observed so far in the run
    pub max_strain: f64,
    /// Largest node velocity observed so far in the run
    pub max_velocity: f64,
    /// Bounding-box volume of this step
    pub step_volume: f64,
    /// Maximum beam strain of this step
    pub step_strain: f64,
    /// Maximum node velocity of this step
    pub step_velocity: f64,
    /// Simulation time of the first bounding-box breach, if any
    pub time_to_bounding_box_explosion: Option<f64>,
    /// Simulation time of the first beam-strain breach, if any
    pub time_to_strain_explosion: Option<f64>,
    /// Simulation time of the first velocity-spike breach, if any
    pub time_to_velocity_explosion: Option<f64>,
}

impl IntegrityReport {
    /// True if any of the three criteria has ever fired this run
    pub fn any_explosion(&self) -> bool {
        self.time_to_bounding_box_explosion.is_some()
            || self.time_to_strain_explosion.is_some()
            || self.time_to_velocity_explosion.is_some()
    }
}

/// Per-run integrity state: both stateful monitors, running maxima, and the
/// three first-breach latches.
///
/// One instance belongs to exactly one experiment run. Runs that share a
/// process must either construct a fresh aggregator or call [`reset`];
/// carrying latches across runs cross-contaminates their results.
///
/// [`reset`]: IntegrityAggregator::reset
pub struct IntegrityAggregator {
    strain_monitor: StrainMonitor,
    velocity_monitor: VelocityMonitor,
    max_volume: f64,
    max_strain: f64,
    max_velocity: f64,
    time_to_bounding_box_explosion: Option<f64>,
    time_to_strain_explosion: Option<f64>,
    time_to_velocity_explosion: Option<f64>,
}

impl IntegrityAggregator {
    /// Create a fresh aggregator for a structure with the given arena sizes
    pub fn new(node_count: usize, beam_count: usize) -> Self {
        Self {
            strain_monitor: StrainMonitor::new(beam_count),
            velocity_monitor: VelocityMonitor::new(node_count),
            max_volume: 0.0,
            max_strain: 0.0,
            max_velocity: 0.0,
            time_to_bounding_box_explosion: None,
            time_to_strain_explosion: None,
            time_to_velocity_explosion: None,
        }
    }

    /// Capture strain baselines from the current (pre-load) positions
    pub fn prime(&mut self, beams: &[BeamElement], positions: &[Point3<f64>]) {
        self.strain_monitor.prime(beams, positions);
    }

    /// Run all three monitors for the step at simulation time `time_passed`.
    ///
    /// Running maxima never decrease, and each breach latch freezes at the
    /// first time its criterion fired - a structure that destabilizes and
    /// then transiently re-stabilizes is still recorded as exploded.
    pub fn evaluate(
        &mut self,
        time_passed: f64,
        beams: &[BeamElement],
        positions: &[Point3<f64>],
        initial_bounds: &BoundingBox,
        thresholds: &FailureThresholds,
    ) -> IntegrityReport {
        let (box_exploded, volume) =
            check_bounding_box(positions, initial_bounds, thresholds.bounding_box_volume_ratio);
        let (strain_exceeded, strain) =
            self.strain_monitor
                .check(beams, positions, thresholds.beam_strain);
        let (velocity_spike, velocity) =
            self.velocity_monitor
                .check(beams, positions, thresholds.node_velocity);

        self.max_volume = self.max_volume.max(volume);
        self.max_strain = self.max_strain.max(strain);
        self.max_velocity = self.max_velocity.max(velocity);

        if box_exploded && self.time_to_bounding_box_explosion.is_none() {
            warn!(
                "bounding box exploded at t={:.3}s: volume {:.6} m³",
                time_passed, volume
            );
            self.time_to_bounding_box_explosion = Some(time_passed);
        }
        if strain_exceeded && self.time_to_strain_explosion.is_none() {
            warn!(
                "beam strain exceeded at t={:.3}s: {:.4} > {:.4}",
                time_passed, strain, thresholds.beam_strain
            );
            self.time_to_strain_explosion = Some(time_passed);
        }
        if velocity_spike && self.time_to_velocity_explosion.is_none() {
            warn!(
                "node velocity spike at t={:.3}s: {:.4} > {:.4}",
                time_passed, velocity, thresholds.node_velocity
            );
            self.time_to_velocity_explosion = Some(time_passed);
        }

        IntegrityReport {
            max_volume: self.max_volume,
            max_strain: self.max_strain,
            max_velocity: self.max_velocity,
            step_volume: volume,
            step_strain: strain,
            step_velocity: velocity,
            time_to_bounding_box_explosion: self.time_to_bounding_box_explosion,
            time_to_strain_explosion: self.time_to_strain_explosion,
            time_to_velocity_explosion: self.time_to_velocity_explosion,
        }
    }

    /// Clear all monitor state, maxima, and latches for the next run
    pub fn reset(&mut self) {
        self.strain_monitor.reset();
        self.velocity_monitor.reset();
        self.max_volume = 0.0;
        self.max_strain = 0.0;
        self.max_velocity = 0.0;
        self.time_to_bounding_box_explosion = None;
        self.time_to_strain_explosion = None;
        self.time_to_velocity_explosion = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn beam() -> Vec<BeamElement> {
        vec![BeamElement { a: 0, b: 1 }]
    }

    fn positions(length: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(length, 0.5, 0.5),
        ]
    }

    fn initial_bounds() -> BoundingBox {
        BoundingBox::from_points(&positions(1.0)).unwrap()
    }

    #[test]
    fn test_latch_is_monotone() {
        let beams = beam();
        let bounds = initial_bounds();
        let thresholds = FailureThresholds {
            bounding_box_volume_ratio: 1.8,
            beam_strain: 0.25,
            node_velocity: 10.0,
        };
        let mut aggregator = IntegrityAggregator::new(2, 1);
        aggregator.prime(&beams, &positions(1.0));

        aggregator.evaluate(0.1, &beams, &positions(1.0), &bounds, &thresholds);
        // Strain breach at t=0.2.
        let report = aggregator.evaluate(0.2, &beams, &positions(1.4), &bounds, &thresholds);
        assert_eq!(report.time_to_strain_explosion, Some(0.2));

        // Condition recovers, latch does not.
        let report = aggregator.evaluate(0.3, &beams, &positions(1.0), &bounds, &thresholds);
        assert_eq!(report.time_to_strain_explosion, Some(0.2));
        let report = aggregator.evaluate(0.4, &beams, &positions(1.5), &bounds, &thresholds);
        assert_eq!(report.time_to_strain_explosion, Some(0.2));
    }

    #[test]
    fn test_running_maxima_never_decrease() {
        let beams = beam();
        let bounds = initial_bounds();
        let thresholds = FailureThresholds::default();
        let mut aggregator = IntegrityAggregator::new(2, 1);
        aggregator.prime(&beams, &positions(1.0));

        let lengths = [1.0, 1.3, 1.1, 1.6, 1.2, 1.0];
        let mut previous: Option<IntegrityReport> = None;
        for (step, &length) in lengths.iter().enumerate() {
            let report = aggregator.evaluate(
                step as f64 * 0.01,
                &beams,
                &positions(length),
                &bounds,
                &thresholds,
            );
            if let Some(previous) = previous {
                assert!(report.max_volume >= previous.max_volume);
                assert!(report.max_strain >= previous.max_strain);
                assert!(report.max_velocity >= previous.max_velocity);
            }
            previous = Some(report);
        }
        // The running max keeps the elongation peak even after recovery.
        let rest = (positions(1.0)[1] - positions(1.0)[0]).norm();
        let peak = (positions(1.6)[1] - positions(1.6)[0]).norm();
        assert_relative_eq!(
            previous.unwrap().max_strain,
            (peak - rest) / rest,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_criteria_are_independent() {
        let beams = beam();
        let bounds = initial_bounds();
        let thresholds = FailureThresholds {
            bounding_box_volume_ratio: 1.8,
            beam_strain: 0.25,
            node_velocity: 0.5,
        };
        let mut aggregator = IntegrityAggregator::new(2, 1);
        aggregator.prime(&beams, &positions(1.0));
        aggregator.evaluate(0.1, &beams, &positions(1.0), &bounds, &thresholds);

        // One big jump breaches strain, velocity, and the bounding box at once.
        let report = aggregator.evaluate(0.2, &beams, &positions(4.0), &bounds, &thresholds);
        assert_eq!(report.time_to_bounding_box_explosion, Some(0.2));
        assert_eq!(report.time_to_strain_explosion, Some(0.2));
        assert_eq!(report.time_to_velocity_explosion, Some(0.2));
        assert!(report.any_explosion());
    }

    #[test]
    fn test_reset_gives_fresh_first_call_behavior() {
        let beams = beam();
        let bounds = initial_bounds();
        let thresholds = FailureThresholds {
            bounding_box_volume_ratio: 1.8,
            beam_strain: 0.25,
            node_velocity: 0.5,
        };
        let mut aggregator = IntegrityAggregator::new(2, 1);
        aggregator.prime(&beams, &positions(1.0));
        aggregator.evaluate(0.1, &beams, &positions(1.0), &bounds, &thresholds);
        aggregator.evaluate(0.2, &beams, &positions(4.0), &bounds, &thresholds);

        aggregator.reset();
        aggregator.prime(&beams, &positions(1.0));
        let report = aggregator.evaluate(0.1, &beams, &positions(1.0), &bounds, &thresholds);
        assert!(!report.any_explosion());
        assert_relative_eq!(report.max_strain, 0.0);
        assert_relative_eq!(report.max_velocity, 0.0);
    }
}
