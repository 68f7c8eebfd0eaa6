//! Series dispatch over a fixed-size worker pool
//!
//! Experiments are embarrassingly parallel: every worker owns its full
//! dependency graph (store handle, series row, physics system, structure,
//! monitor state) and reports through a channel. The pool is sized to the
//! machine's parallelism and shares nothing but the job queue.

use std::path::Path;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use log::{info, warn};

use crate::error::{BraidError, BraidResult};
use crate::experiment::{expand_series, run_experiment, ExperimentConfig};
use crate::loads::ResolvedForces;
use crate::measure::{model_height, model_weight_kg};
use crate::physics::{LatticeEngine, LatticeParams, PhysicsEngine};
use crate::store::{JsonStore, ResultStore};
use crate::structure::BraidStructure;

/// Simulated seconds the measurement pass lets the unloaded structure settle
const MEASUREMENT_SETTLE_TIME: f64 = 1.0;

fn available_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run a full sweep for the named series.
///
/// Validates the series, drops stale experiment rows, clears the outdated
/// flag, then dispatches all `num_experiments` configs to the pool. Blocks
/// until every job finished. The first worker failure propagates after the
/// remaining jobs drained (no retry); a series that ends with fewer
/// persisted rows than `num_experiments` is reported as incomplete rather
/// than silently accepted.
pub fn run_series(store_dir: impl AsRef<Path>, series_name: &str) -> BraidResult<()> {
    let store_dir = store_dir.as_ref();
    let store = JsonStore::open(store_dir)?;
    let series = store.fetch_series(series_name)?;
    series.validate()?;

    store.delete_experiments(series_name)?;
    store.mark_series_current(series_name)?;

    let configs = expand_series(&series);
    let worker_count = available_workers().min(configs.len()).max(1);
    info!(
        "running series '{}': {} experiments on {} workers",
        series_name,
        configs.len(),
        worker_count
    );

    let expected = configs.len();
    let completed = dispatch(configs, worker_count, series_name, |config| {
        run_one_experiment(store_dir, series_name, config)
    })?;

    if completed != expected {
        return Err(BraidError::SeriesIncomplete {
            series: series_name.to_string(),
            completed,
            expected,
        });
    }

    info!("series '{}' complete: {} experiments", series_name, expected);
    Ok(())
}

/// The companion no-sweep path: a single zero-force run that settles the
/// structure, measures weight and height, and writes them back onto the
/// series row. Uses the same dispatch machinery with a pool of one.
pub fn run_measurement(store_dir: impl AsRef<Path>, series_name: &str) -> BraidResult<()> {
    let store_dir = store_dir.as_ref();
    let store = JsonStore::open(store_dir)?;
    let series = store.fetch_series(series_name)?;
    series.validate()?;

    let config = ExperimentConfig {
        experiment_id: 0,
        forces: ResolvedForces::default(),
        max_simulation_time: MEASUREMENT_SETTLE_TIME,
        timestep: series.timestep,
        will_visualize: false,
        will_record_video: false,
    };

    let completed = dispatch(vec![config], 1, series_name, |config| {
        measure_one_structure(store_dir, series_name, config)
    })?;

    if completed != 1 {
        return Err(BraidError::SeriesIncomplete {
            series: series_name.to_string(),
            completed,
            expected: 1,
        });
    }
    Ok(())
}

/// Drain `configs` through `worker_count` scoped threads, returning how many
/// jobs succeeded. Worker errors are collected; the first one is returned
/// after all jobs finished so one crash cannot swallow the others' results.
fn dispatch(
    configs: Vec<ExperimentConfig>,
    worker_count: usize,
    series_name: &str,
    job: impl Fn(&ExperimentConfig) -> BraidResult<()> + Sync,
) -> BraidResult<usize> {
    let pending = Mutex::new(configs);
    let (result_tx, result_rx) = mpsc::channel::<(usize, BraidResult<()>)>();

    thread::scope(|scope| {
        for _ in 0..worker_count {
            let pending = &pending;
            let job = &job;
            let result_tx = result_tx.clone();
            scope.spawn(move || loop {
                let next = pending.lock().unwrap().pop();
                let Some(config) = next else { break };
                let experiment_id = config.experiment_id;
                let outcome = job(&config);
                if result_tx.send((experiment_id, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(result_tx);
    });

    let mut completed = 0;
    let mut first_error: Option<BraidError> = None;
    for (experiment_id, outcome) in result_rx {
        match outcome {
            Ok(()) => completed += 1,
            Err(err) => {
                warn!(
                    "experiment {} of series '{}' failed: {}",
                    experiment_id, series_name, err
                );
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(completed),
    }
}

/// One worker job: own store handle, re-fetched series, one run, one row.
fn run_one_experiment(
    store_dir: &Path,
    series_name: &str,
    config: &ExperimentConfig,
) -> BraidResult<()> {
    let store = JsonStore::open(store_dir)?;
    let series = store.fetch_series(series_name)?;
    let record = run_experiment(&series, config)?;
    store.insert_experiment(&record)
}

fn measure_one_structure(
    store_dir: &Path,
    series_name: &str,
    config: &ExperimentConfig,
) -> BraidResult<()> {
    let store = JsonStore::open(store_dir)?;
    let series = store.fetch_series(series_name)?;

    let material = series.material();
    let structure = BraidStructure::build(&series.geometry, &material)?;
    let mut engine = LatticeEngine::new(&structure, &material, LatticeParams::default());

    while engine.time() < config.max_simulation_time {
        engine.advance(config.timestep);
    }

    let weight_kg = model_weight_kg(structure.beams(), engine.positions(), &material);
    let height_m = model_height(engine.positions());
    info!(
        "series '{}': weight {:.4} kg, height {:.4} m",
        series_name, weight_kg, height_m
    );

    store.update_series_measurements(series_name, weight_kg, height_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn configs(count: usize) -> Vec<ExperimentConfig> {
        (0..count)
            .map(|experiment_id| ExperimentConfig {
                experiment_id,
                forces: ResolvedForces::default(),
                max_simulation_time: 1.0,
                timestep: 0.01,
                will_visualize: false,
                will_record_video: false,
            })
            .collect()
    }

    #[test]
    fn test_dispatch_runs_every_job() {
        let seen = AtomicUsize::new(0);
        let completed = dispatch(configs(20), 4, "pool", |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        assert_eq!(completed, 20);
        assert_eq!(seen.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_one_failure_does_not_swallow_the_rest() {
        let seen = AtomicUsize::new(0);
        let result = dispatch(configs(10), 2, "pool", |config| {
            seen.fetch_add(1, Ordering::SeqCst);
            if config.experiment_id == 3 {
                Err(BraidError::Store("worker crash".to_string()))
            } else {
                Ok(())
            }
        });
        // All jobs still ran; the failure surfaced afterwards.
        assert_eq!(seen.load(Ordering::SeqCst), 10);
        assert!(result.is_err());
    }

    #[test]
    fn test_pool_of_one_preserves_contract() {
        let completed = dispatch(configs(3), 1, "pool", |_| Ok(())).unwrap();
        assert_eq!(completed, 3);
    }
}
