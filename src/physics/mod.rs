//! Physics engine seam
//!
//! The experiment loop and the integrity monitors only ever read node
//! positions and the simulation clock through this trait, so the stepping
//! core is swappable. `LatticeEngine` is the built-in implementation.

mod lattice;

pub use lattice::{LatticeEngine, LatticeParams};

use nalgebra::{Point3, Vector3};

/// A deterministic, synchronously-stepped physics simulation of the lattice.
pub trait PhysicsEngine {
    /// Advance the simulation by one timestep. Blocking and deterministic.
    fn advance(&mut self, dt: f64);

    /// Current simulation time in seconds
    fn time(&self) -> f64;

    /// Current node positions, in structure arena order
    fn positions(&self) -> &[Point3<f64>];

    /// Set the external force applied to one node. Replaces any previous
    /// force on that node.
    fn set_node_force(&mut self, node: usize, force: Vector3<f64>);

    /// Zero all external node forces (force release)
    fn clear_node_forces(&mut self);
}
