//! Measure weight and height of a series' structural configuration
//!
//! Usage: braid-measure <store-dir> <series-name>
//!
//! Runs the zero-force measurement pass and writes the results back onto
//! the series definition.

use anyhow::{bail, Result};
use braid_lab::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(store_dir), Some(series_name)) = (args.next(), args.next()) else {
        bail!("usage: braid-measure <store-dir> <series-name>");
    };

    run_measurement(&store_dir, &series_name)?;

    let store = JsonStore::open(&store_dir)?;
    let series = store.fetch_series(&series_name)?;
    println!(
        "series '{}': weight {:.4} kg, height {:.4} m",
        series_name,
        series.weight_kg.unwrap_or(0.0),
        series.height_m.unwrap_or(0.0),
    );

    Ok(())
}
