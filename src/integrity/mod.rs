//! Structural-integrity monitoring
//!
//! Three independent failure criteria are evaluated once per simulation
//! step: bounding-box growth (geometric), beam strain (elastic), and node
//! velocity spikes (kinematic). The aggregator latches the first breach time
//! of each criterion for the lifetime of one experiment run.

mod aggregator;
mod bounding_box;
mod strain;
mod velocity;

pub use aggregator::{IntegrityAggregator, IntegrityReport};
pub use bounding_box::{check_bounding_box, BoundingBox};
pub use strain::StrainMonitor;
pub use velocity::VelocityMonitor;

use serde::{Deserialize, Serialize};

/// Failure thresholds for the three explosion criteria
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FailureThresholds {
    /// Current/initial bounding-box volume ratio above which the structure
    /// counts as exploded
    pub bounding_box_volume_ratio: f64,
    /// Beam elongation ratio |L − L₀| / L₀ above which a beam counts as failed
    pub beam_strain: f64,
    /// Per-step node displacement magnitude above which a velocity spike is
    /// flagged
    pub node_velocity: f64,
}

impl Default for FailureThresholds {
    fn default() -> Self {
        Self {
            bounding_box_volume_ratio: 1.8,
            beam_strain: 0.08,
            node_velocity: 3.0,
        }
    }
}
