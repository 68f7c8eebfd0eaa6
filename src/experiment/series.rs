//! Experiment series - one sweep definition

use serde::{Deserialize, Serialize};

use crate::equilibrium::EquilibriumThresholds;
use crate::error::{BraidError, BraidResult};
use crate::integrity::FailureThresholds;
use crate::structure::{BraidGeometry, StrandMaterial};

/// A parameter sweep: one structural configuration plus force sweep
/// endpoints, expanded into `num_experiments` individual experiments.
///
/// Created and edited externally; read-only while a sweep runs. The store
/// flags a series as outdated whenever it is edited after experiments have
/// been persisted against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentSeries {
    pub name: String,
    pub description: String,

    // Simulation configuration
    pub num_experiments: usize,
    pub max_simulation_time: f64,
    pub timestep: f64,

    // Failure and equilibrium thresholds
    pub failure_thresholds: FailureThresholds,
    pub equilibrium: EquilibriumThresholds,

    // Force sweep endpoints: initial is applied to the first experiment of
    // the series, final to the last.
    pub initial_force_y: f64,
    pub final_force_y: f64,
    pub initial_top_force_y: f64,
    pub final_top_force_y: f64,
    pub initial_force_x: f64,
    pub final_force_x: f64,
    pub initial_force_z: f64,
    pub final_force_z: f64,
    pub initial_torsional_force: f64,
    pub final_torsional_force: f64,
    /// Release all applied forces this many simulated seconds into each run
    pub release_forces_after: Option<f64>,

    // Braided structure configuration
    pub geometry: BraidGeometry,
    /// Strand cross-section radius in m
    pub material_thickness: f64,
    /// Strand Young's modulus in Pa
    pub material_youngs_modulus: f64,

    // Measurements written back by the measurement pass
    pub weight_kg: Option<f64>,
    pub height_m: Option<f64>,

    /// Set when the series definition changed after experiments were run
    pub experiments_outdated: bool,
}

impl Default for ExperimentSeries {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            num_experiments: 50,
            max_simulation_time: 10.0,
            timestep: 0.01,
            failure_thresholds: FailureThresholds::default(),
            equilibrium: EquilibriumThresholds::default(),
            initial_force_y: 0.0,
            final_force_y: 0.0,
            initial_top_force_y: 0.0,
            final_top_force_y: 0.0,
            initial_force_x: 0.0,
            final_force_x: 0.0,
            initial_force_z: 0.0,
            final_force_z: 0.0,
            initial_torsional_force: 0.0,
            final_torsional_force: 0.0,
            release_forces_after: None,
            geometry: BraidGeometry::default(),
            material_thickness: 0.005,
            material_youngs_modulus: 1.72e10,
            weight_kg: None,
            height_m: None,
            experiments_outdated: false,
        }
    }
}

impl ExperimentSeries {
    /// Create a series with the given name and defaults everywhere else
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// The strand material of this series (GRP density)
    pub fn material(&self) -> StrandMaterial {
        StrandMaterial::new(
            self.material_youngs_modulus,
            1200.0,
            self.material_thickness,
        )
    }

    /// Validate parameter sanity. Collects every violation, and must pass
    /// before any worker is spawned.
    pub fn validate(&self) -> BraidResult<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.name.is_empty() {
            errors.push("series name must not be empty".to_string());
        }
        if self.geometry.num_layers < 2 {
            errors.push("number of layers must be at least 2".to_string());
        }
        if self.geometry.num_strands < 2 {
            errors.push("number of strands must be at least 2".to_string());
        }
        if self.geometry.num_strands % 2 != 0 {
            errors.push("number of strands must be divisible by 2 for symmetry".to_string());
        }
        if self.geometry.radius <= 0.0 {
            errors.push("radius must be greater than 0".to_string());
        }
        if self.geometry.pitch <= 0.0 {
            errors.push("pitch must be greater than 0".to_string());
        }
        if self.geometry.radius_taper * self.geometry.num_layers as f64 > self.geometry.radius {
            errors.push(
                "radius taper times number of layers must not exceed radius".to_string(),
            );
        }
        if self.material_thickness <= 0.0 {
            errors.push("material thickness must be greater than 0".to_string());
        }
        if self.material_youngs_modulus <= 0.0 {
            errors.push("material Young's modulus must be greater than 0".to_string());
        }
        if self.num_experiments < 1 {
            errors.push("number of experiments must be at least 1".to_string());
        }
        if self.max_simulation_time <= 0.0 {
            errors.push("max simulation time must be greater than 0".to_string());
        }
        if self.timestep <= 0.0 {
            errors.push("timestep must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BraidError::InvalidSeries(errors.join("; ")))
        }
    }
}
