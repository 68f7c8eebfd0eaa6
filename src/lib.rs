//! braid-lab - parametric load-sweep experiments on braided lattices
//!
//! This library automates structural experiments on a helically interwoven
//! lattice of elastic strands: it sweeps load parameters across many
//! structural configurations, runs each as an independent physics
//! simulation, detects catastrophic failure ("explosion") and mechanical
//! equilibrium in real time, and persists one result record per experiment.
//!
//! - Failure detection: three independent criteria (bounding-box growth,
//!   beam strain, node velocity spikes) with latched first-breach times
//! - Equilibrium detection: strain-rate criterion, optionally combined with
//!   a sliding velocity window
//! - Sweeps: linear force interpolation across a series, dispatched to a
//!   worker pool sized to the machine
//!
//! ## Example
//! ```rust
//! use braid_lab::prelude::*;
//!
//! let mut series = ExperimentSeries::named("axial-sweep");
//! series.num_experiments = 5;
//! series.initial_force_y = 0.0;
//! series.final_force_y = -2.0;
//!
//! let configs = expand_series(&series);
//! assert_eq!(configs.len(), 5);
//! assert_eq!(configs[2].forces.force_y, -1.0);
//! assert_eq!(configs[4].forces.force_y, -2.0);
//! ```

pub mod equilibrium;
pub mod error;
pub mod experiment;
pub mod integrity;
pub mod loads;
pub mod measure;
pub mod physics;
pub mod store;
pub mod structure;

// Re-export common types
pub mod prelude {
    pub use crate::equilibrium::{EquilibriumDetector, EquilibriumThresholds};
    pub use crate::error::{BraidError, BraidResult};
    pub use crate::experiment::{
        expand_series, run_experiment, run_measurement, run_series, ExperimentConfig,
        ExperimentOutcome, ExperimentRecord, ExperimentSeries,
    };
    pub use crate::integrity::{
        check_bounding_box, BoundingBox, FailureThresholds, IntegrityAggregator,
        IntegrityReport, StrainMonitor, VelocityMonitor,
    };
    pub use crate::loads::{apply_loads, release_loads, ResolvedForces};
    pub use crate::measure::{model_height, model_weight_kg};
    pub use crate::physics::{LatticeEngine, LatticeParams, PhysicsEngine};
    pub use crate::store::{JsonStore, ResultStore};
    pub use crate::structure::{
        BeamElement, BraidGeometry, BraidStructure, LatticeNode, StrandMaterial,
    };
}
