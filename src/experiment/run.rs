//! One experiment run: build, load, step, terminate

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::equilibrium::EquilibriumDetector;
use crate::error::{BraidError, BraidResult};
use crate::experiment::{ExperimentConfig, ExperimentSeries};
use crate::integrity::{BoundingBox, IntegrityAggregator, IntegrityReport};
use crate::loads::{apply_loads, release_loads, ResolvedForces};
use crate::measure::model_height;
use crate::physics::{LatticeEngine, LatticeParams, PhysicsEngine};
use crate::structure::BraidStructure;

/// How an experiment run terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentOutcome {
    /// The structure settled before the budget ran out
    Equilibrium,
    /// An explosion criterion latched
    Exploded,
    /// The simulated-clock budget was exhausted
    TimedOut,
}

/// Terminal record of one experiment, persisted exactly once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub experiment_id: usize,
    pub series_name: String,
    pub forces: ResolvedForces,

    pub time_to_bounding_box_explosion: Option<f64>,
    pub max_bounding_box_volume: f64,
    pub time_to_strain_explosion: Option<f64>,
    pub max_beam_strain: f64,
    pub time_to_velocity_explosion: Option<f64>,
    pub max_node_velocity: f64,

    pub equilibrium_time: Option<f64>,
    pub height_under_load_m: Option<f64>,
    pub final_height_m: Option<f64>,
    pub outcome: ExperimentOutcome,
}

/// Run one experiment to termination.
///
/// Builds an independent physics system, structure, and monitor state, then
/// steps until one of the termination predicates holds: equilibrium reached
/// (and the optional force-release window elapsed), any explosion latch set,
/// or the simulated-time budget exhausted. The caller persists the returned
/// record.
pub fn run_experiment(
    series: &ExperimentSeries,
    config: &ExperimentConfig,
) -> BraidResult<ExperimentRecord> {
    let material = series.material();
    let structure = BraidStructure::build(&series.geometry, &material)?;
    let mut engine = LatticeEngine::new(&structure, &material, LatticeParams::default());

    let mut aggregator = IntegrityAggregator::new(structure.node_count(), structure.beam_count());
    let mut detector = EquilibriumDetector::new(series.equilibrium);

    // Baselines are captured before any load touches the structure: the
    // initial bounding box, and the strain monitor's rest lengths.
    let initial_bounds = BoundingBox::from_points(engine.positions()).ok_or_else(|| {
        BraidError::InvalidGeometry("structure has no nodes".to_string())
    })?;
    aggregator.prime(structure.beams(), engine.positions());

    if config.will_visualize || config.will_record_video {
        debug!(
            "experiment {}: visualization flags set but this build is headless",
            config.experiment_id
        );
    }

    apply_loads(&mut engine, &structure, &config.forces);
    info!(
        "experiment {} of series '{}': force_y={:.3} N, top_y={:.3} N, x={:.3} N, z={:.3} N, torsion={:.3} N·m",
        config.experiment_id,
        series.name,
        config.forces.force_y,
        config.forces.top_force_y,
        config.forces.force_x,
        config.forces.force_z,
        config.forces.torsional,
    );

    let mut released_at: Option<f64> = None;
    let mut height_under_load = None;
    let mut equilibrium_time = None;
    let mut last_report: Option<IntegrityReport> = None;

    let outcome = loop {
        engine.advance(config.timestep);
        let time_passed = engine.time();

        let report = aggregator.evaluate(
            time_passed,
            structure.beams(),
            engine.positions(),
            &initial_bounds,
            &series.failure_thresholds,
        );
        let in_equilibrium = detector.update(report.step_strain, Some(report.step_velocity));
        last_report = Some(report);

        if let Some(after) = series.release_forces_after {
            if released_at.is_none() && time_passed >= after {
                if height_under_load.is_none() {
                    height_under_load = Some(model_height(engine.positions()));
                }
                release_loads(&mut engine);
                released_at = Some(time_passed);
                debug!(
                    "experiment {}: forces released at t={:.3}s",
                    config.experiment_id, time_passed
                );
            }
        }

        if in_equilibrium && equilibrium_time.is_none() {
            equilibrium_time = Some(time_passed);
            if height_under_load.is_none() {
                height_under_load = Some(model_height(engine.positions()));
            }
        }

        if report.any_explosion() {
            break ExperimentOutcome::Exploded;
        }
        // Strictly past the release step: the rebound after a release must
        // be simulated and re-settle before the run can end in equilibrium,
        // otherwise the final height would still be the loaded height.
        let release_elapsed = match series.release_forces_after {
            None => true,
            Some(_) => released_at.is_some_and(|at| time_passed > at),
        };
        if in_equilibrium && release_elapsed {
            break ExperimentOutcome::Equilibrium;
        }
        if time_passed > config.max_simulation_time {
            break ExperimentOutcome::TimedOut;
        }
    };

    let final_height = model_height(engine.positions());
    let report = last_report.expect("loop ran at least one step");

    info!(
        "experiment {} of series '{}' terminated: {:?} at t={:.3}s",
        config.experiment_id,
        series.name,
        outcome,
        engine.time()
    );

    Ok(ExperimentRecord {
        experiment_id: config.experiment_id,
        series_name: series.name.clone(),
        forces: config.forces,
        time_to_bounding_box_explosion: report.time_to_bounding_box_explosion,
        max_bounding_box_volume: report.max_volume,
        time_to_strain_explosion: report.time_to_strain_explosion,
        max_beam_strain: report.max_strain,
        time_to_velocity_explosion: report.time_to_velocity_explosion,
        max_node_velocity: report.max_velocity,
        equilibrium_time,
        height_under_load_m: height_under_load,
        final_height_m: Some(final_height),
        outcome,
    })
}
