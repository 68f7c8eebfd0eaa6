//! Run one experiment series end to end
//!
//! Usage:
//!   braid-sweep <store-dir> <series-name>
//!   braid-sweep <store-dir> <series-definition.json>
//!
//! Passing a JSON file imports (or updates) the series definition first,
//! then runs the sweep under the name found in the file.

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use braid_lab::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(store_dir), Some(target)) = (args.next(), args.next()) else {
        bail!("usage: braid-sweep <store-dir> <series-name | series-definition.json>");
    };

    let store = JsonStore::open(&store_dir)?;

    let series_name = if target.ends_with(".json") && Path::new(&target).exists() {
        let file = File::open(&target).with_context(|| format!("opening {}", target))?;
        let series: ExperimentSeries =
            serde_json::from_reader(file).with_context(|| format!("parsing {}", target))?;
        series.validate()?;
        store.put_series(&series)?;
        println!("imported series '{}'", series.name);
        series.name
    } else {
        target
    };

    run_series(&store_dir, &series_name)?;

    let records = store.load_experiments(&series_name)?;
    println!("\nseries '{}': {} experiments", series_name, records.len());
    println!(
        "{:>4}  {:>10}  {:>10}  {:>12}  {:>12}  {:>12}  outcome",
        "id", "force_y", "top_y", "t_box", "t_strain", "t_velocity"
    );
    for record in &records {
        println!(
            "{:>4}  {:>10.3}  {:>10.3}  {:>12}  {:>12}  {:>12}  {:?}",
            record.experiment_id,
            record.forces.force_y,
            record.forces.top_force_y,
            format_time(record.time_to_bounding_box_explosion),
            format_time(record.time_to_strain_explosion),
            format_time(record.time_to_velocity_explosion),
            record.outcome,
        );
    }

    Ok(())
}

fn format_time(time: Option<f64>) -> String {
    match time {
        Some(t) => format!("{:.3}s", t),
        None => "-".to_string(),
    }
}
