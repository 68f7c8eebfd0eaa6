//! Per-experiment configuration and sweep interpolation

use serde::{Deserialize, Serialize};

use crate::experiment::ExperimentSeries;
use crate::loads::ResolvedForces;

/// One concrete point of a sweep, consumed by exactly one worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Index of this experiment within the series, used to re-sort results
    /// into sweep order after parallel completion
    pub experiment_id: usize,
    /// The resolved per-axis forces for this index
    pub forces: ResolvedForces,
    /// Simulated-clock budget in seconds
    pub max_simulation_time: f64,
    /// Integration timestep in seconds
    pub timestep: f64,
    /// Visualization flags, disabled for batch sweeps
    pub will_visualize: bool,
    pub will_record_video: bool,
}

/// Linear interpolation with exact endpoints: index 0 yields `initial`,
/// index `n - 1` yields exactly `final`. A single-experiment sweep yields
/// `initial` without dividing by zero.
fn lerp_force(initial: f64, final_value: f64, index: usize, count: usize) -> f64 {
    if index == 0 || count <= 1 {
        return initial;
    }
    if index == count - 1 {
        return final_value;
    }
    let ratio = index as f64 / (count - 1) as f64;
    initial + (final_value - initial) * ratio
}

/// Expand a series into its `num_experiments` per-experiment configurations
pub fn expand_series(series: &ExperimentSeries) -> Vec<ExperimentConfig> {
    let count = series.num_experiments;
    (0..count)
        .map(|index| ExperimentConfig {
            experiment_id: index,
            forces: ResolvedForces {
                force_y: lerp_force(series.initial_force_y, series.final_force_y, index, count),
                top_force_y: lerp_force(
                    series.initial_top_force_y,
                    series.final_top_force_y,
                    index,
                    count,
                ),
                force_x: lerp_force(series.initial_force_x, series.final_force_x, index, count),
                force_z: lerp_force(series.initial_force_z, series.final_force_z, index, count),
                torsional: lerp_force(
                    series.initial_torsional_force,
                    series.final_torsional_force,
                    index,
                    count,
                ),
            },
            max_simulation_time: series.max_simulation_time,
            timestep: series.timestep,
            will_visualize: false,
            will_record_video: false,
        })
        .collect()
}
