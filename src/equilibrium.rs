//! Equilibrium detection
//!
//! A structure is considered settled once its strain stops changing (and,
//! optionally, its nodes stop moving) for a sustained run of consecutive
//! steps. Thresholds are a per-material tuning concern: rubber-like
//! materials settle with `stability_timesteps` around 10, stiff materials
//! may need hundreds of steps to confirm.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Equilibrium criteria for one material/structure profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquilibriumThresholds {
    /// Maximum strain that still counts as settled - should match the
    /// material's elastic limit
    pub target_strain: f64,
    /// Maximum strain change per step that still counts as settled
    pub strain_tolerance: f64,
    /// Required number of consecutive qualifying steps
    pub stability_timesteps: usize,
    /// Optional velocity criterion: every sample in a sliding window of
    /// `stability_timesteps` recent per-step max velocities must stay below
    /// this value
    pub max_node_velocity: Option<f64>,
}

impl Default for EquilibriumThresholds {
    fn default() -> Self {
        Self {
            target_strain: 0.05,
            strain_tolerance: 1e-6,
            stability_timesteps: 1000,
            max_node_velocity: None,
        }
    }
}

/// Stateful settled-state detector, one instance per experiment run
#[derive(Debug, Clone)]
pub struct EquilibriumDetector {
    thresholds: EquilibriumThresholds,
    previous_strain: Option<f64>,
    consecutive_stable_steps: usize,
    velocity_window: VecDeque<f64>,
}

impl EquilibriumDetector {
    /// Create a detector. A `stability_timesteps` of 0 is clamped to 1.
    pub fn new(mut thresholds: EquilibriumThresholds) -> Self {
        if thresholds.stability_timesteps < 1 {
            thresholds.stability_timesteps = 1;
        }
        Self {
            thresholds,
            previous_strain: None,
            consecutive_stable_steps: 0,
            velocity_window: VecDeque::new(),
        }
    }

    /// Feed one step's maximum strain (and, for the velocity-window variant,
    /// maximum node velocity). Returns true once equilibrium is confirmed.
    ///
    /// A step is stable iff the strain is within the elastic target AND its
    /// change since the previous step is within tolerance AND (when the
    /// velocity criterion is configured) the whole velocity window is below
    /// the limit. Any unstable step resets the consecutive counter to zero.
    ///
    /// Non-finite inputs are rejected as unstable without touching the
    /// stored previous strain or the window.
    pub fn update(&mut self, max_strain: f64, max_velocity: Option<f64>) -> bool {
        if !max_strain.is_finite() || max_velocity.is_some_and(|v| !v.is_finite()) {
            self.consecutive_stable_steps = 0;
            return false;
        }

        let previous = *self.previous_strain.get_or_insert(max_strain);
        let strain_delta = (max_strain - previous).abs();
        let strain_stable = max_strain <= self.thresholds.target_strain
            && strain_delta <= self.thresholds.strain_tolerance;

        let velocity_stable = match (self.thresholds.max_node_velocity, max_velocity) {
            (Some(limit), Some(velocity)) => {
                self.push_velocity(velocity);
                self.velocity_window.iter().all(|&v| v < limit)
            }
            // No velocity criterion configured, or no sample supplied.
            _ => true,
        };

        if strain_stable && velocity_stable {
            self.consecutive_stable_steps += 1;
        } else {
            self.consecutive_stable_steps = 0;
        }

        self.previous_strain = Some(max_strain);

        self.consecutive_stable_steps >= self.thresholds.stability_timesteps
    }

    /// Clear previous strain, the stable-step counter, and the velocity
    /// window - required between runs sharing a process
    pub fn reset(&mut self) {
        self.previous_strain = None;
        self.consecutive_stable_steps = 0;
        self.velocity_window.clear();
    }

    fn push_velocity(&mut self, velocity: f64) {
        // Seed the whole window with the first observation.
        if self.velocity_window.is_empty() {
            self.velocity_window =
                VecDeque::from(vec![velocity; self.thresholds.stability_timesteps]);
            return;
        }
        self.velocity_window.push_back(velocity);
        while self.velocity_window.len() > self.thresholds.stability_timesteps {
            self.velocity_window.pop_front();
        }
    }
}
