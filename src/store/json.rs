//! File-backed JSON store
//!
//! One directory holds all series: `<name>.series.json` for the definition,
//! `<name>.experiments.jsonl` with one JSON record per line. Appends are
//! whole-line writes, so concurrent workers with independent handles stay
//! safe without store-side locking.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{BraidError, BraidResult};
use crate::experiment::{ExperimentRecord, ExperimentSeries};
use crate::store::ResultStore;

const SERIES_SUFFIX: &str = ".series.json";
const EXPERIMENTS_SUFFIX: &str = ".experiments.jsonl";

/// Store over a directory of JSON files. Cheap to open; every worker opens
/// its own.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> BraidResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn series_path(&self, name: &str) -> BraidResult<PathBuf> {
        Ok(self.dir.join(format!("{}{}", checked_name(name)?, SERIES_SUFFIX)))
    }

    fn experiments_path(&self, name: &str) -> BraidResult<PathBuf> {
        Ok(self
            .dir
            .join(format!("{}{}", checked_name(name)?, EXPERIMENTS_SUFFIX)))
    }

    fn has_experiments(&self, name: &str) -> BraidResult<bool> {
        let path = self.experiments_path(name)?;
        Ok(path.exists() && fs::metadata(&path)?.len() > 0)
    }

    fn rewrite_series(
        &self,
        name: &str,
        mutate: impl FnOnce(&mut ExperimentSeries),
    ) -> BraidResult<()> {
        let mut series = self.fetch_series(name)?;
        mutate(&mut series);
        let path = self.series_path(name)?;
        fs::write(&path, serde_json::to_string_pretty(&series)?)?;
        Ok(())
    }
}

/// Series names double as file stems, so path-like names are rejected.
fn checked_name(name: &str) -> BraidResult<&str> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(BraidError::Store(format!(
            "invalid series name: '{}'",
            name
        )));
    }
    Ok(name)
}

impl ResultStore for JsonStore {
    fn fetch_series(&self, name: &str) -> BraidResult<ExperimentSeries> {
        let path = self.series_path(name)?;
        if !path.exists() {
            return Err(BraidError::SeriesNotFound(name.to_string()));
        }
        let series: ExperimentSeries = serde_json::from_reader(File::open(&path)?)?;
        Ok(series)
    }

    fn put_series(&self, series: &ExperimentSeries) -> BraidResult<()> {
        let path = self.series_path(&series.name)?;

        // Editing a series whose sweep already ran invalidates those results.
        let mut to_write = series.clone();
        if self.has_experiments(&series.name)? {
            to_write.experiments_outdated = true;
            debug!(
                "series '{}' edited after experiments ran, flagging outdated",
                series.name
            );
        }

        fs::write(&path, serde_json::to_string_pretty(&to_write)?)?;
        Ok(())
    }

    fn list_series(&self) -> BraidResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if let Some(stem) = file_name.strip_suffix(SERIES_SUFFIX) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn mark_series_current(&self, name: &str) -> BraidResult<()> {
        self.rewrite_series(name, |series| series.experiments_outdated = false)
    }

    fn update_series_measurements(
        &self,
        name: &str,
        weight_kg: f64,
        height_m: f64,
    ) -> BraidResult<()> {
        self.rewrite_series(name, |series| {
            series.weight_kg = Some(weight_kg);
            series.height_m = Some(height_m);
        })
    }

    fn insert_experiment(&self, record: &ExperimentRecord) -> BraidResult<()> {
        let path = self.experiments_path(&record.series_name)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn load_experiments(&self, series_name: &str) -> BraidResult<Vec<ExperimentRecord>> {
        let path = self.experiments_path(series_name)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for line in BufReader::new(File::open(&path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        records.sort_by_key(|r: &ExperimentRecord| r.experiment_id);
        Ok(records)
    }

    fn delete_experiments(&self, series_name: &str) -> BraidResult<()> {
        let path = self.experiments_path(series_name)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentOutcome;
    use crate::loads::ResolvedForces;

    fn record(series: &str, experiment_id: usize) -> ExperimentRecord {
        ExperimentRecord {
            experiment_id,
            series_name: series.to_string(),
            forces: ResolvedForces {
                force_y: -(experiment_id as f64),
                ..ResolvedForces::default()
            },
            time_to_bounding_box_explosion: None,
            max_bounding_box_volume: 0.1,
            time_to_strain_explosion: None,
            max_beam_strain: 0.01,
            time_to_velocity_explosion: None,
            max_node_velocity: 0.001,
            equilibrium_time: Some(1.25),
            height_under_load_m: Some(0.05),
            final_height_m: Some(0.05),
            outcome: ExperimentOutcome::Equilibrium,
        }
    }

    #[test]
    fn test_series_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();

        let mut series = ExperimentSeries::named("round-trip");
        series.num_experiments = 7;
        series.final_force_y = -3.0;
        store.put_series(&series).unwrap();

        let loaded = store.fetch_series("round-trip").unwrap();
        assert_eq!(loaded.num_experiments, 7);
        assert_eq!(loaded.final_force_y, -3.0);
        assert!(!loaded.experiments_outdated);
    }

    #[test]
    fn test_missing_series() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.fetch_series("nope"),
            Err(BraidError::SeriesNotFound(_))
        ));
    }

    #[test]
    fn test_experiments_sort_into_sweep_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        store.put_series(&ExperimentSeries::named("sorted")).unwrap();

        // Parallel workers persist out of order.
        for id in [3, 0, 2, 1] {
            store.insert_experiment(&record("sorted", id)).unwrap();
        }

        let records = store.load_experiments("sorted").unwrap();
        let ids: Vec<usize> = records.iter().map(|r| r.experiment_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_editing_a_run_series_flags_outdated() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();

        let series = ExperimentSeries::named("edited");
        store.put_series(&series).unwrap();
        store.insert_experiment(&record("edited", 0)).unwrap();

        store.put_series(&series).unwrap();
        assert!(store.fetch_series("edited").unwrap().experiments_outdated);

        store.mark_series_current("edited").unwrap();
        assert!(!store.fetch_series("edited").unwrap().experiments_outdated);
    }

    #[test]
    fn test_delete_experiments() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        store.put_series(&ExperimentSeries::named("wipe")).unwrap();
        store.insert_experiment(&record("wipe", 0)).unwrap();

        store.delete_experiments("wipe").unwrap();
        assert!(store.load_experiments("wipe").unwrap().is_empty());
        // Deleting again is a no-op.
        store.delete_experiments("wipe").unwrap();
    }

    #[test]
    fn test_measurements_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        store.put_series(&ExperimentSeries::named("measured")).unwrap();

        store
            .update_series_measurements("measured", 0.45, 0.12)
            .unwrap();
        let series = store.fetch_series("measured").unwrap();
        assert_eq!(series.weight_kg, Some(0.45));
        assert_eq!(series.height_m, Some(0.12));
    }

    #[test]
    fn test_path_like_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        let series = ExperimentSeries::named("../escape");
        assert!(store.put_series(&series).is_err());
    }

    #[test]
    fn test_independent_handles_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let writer = JsonStore::open(dir.path()).unwrap();
        let reader = JsonStore::open(dir.path()).unwrap();

        writer.put_series(&ExperimentSeries::named("shared")).unwrap();
        writer.insert_experiment(&record("shared", 0)).unwrap();

        assert_eq!(reader.load_experiments("shared").unwrap().len(), 1);
    }
}
