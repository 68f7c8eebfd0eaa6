//! Built-in spring-lattice stepper
//!
//! Semi-implicit Euler over the beam network: axial spring forces with
//! stiffness E·A/L₀ per beam, viscous node damping, gravity, a penalty floor
//! plane, and per-node external forces. Base-layer nodes are pinned.

use nalgebra::{Point3, Vector3};

use crate::physics::PhysicsEngine;
use crate::structure::{BeamElement, BraidStructure, StrandMaterial};

/// Tunables of the lattice stepper
#[derive(Debug, Clone, Copy)]
pub struct LatticeParams {
    /// Gravitational acceleration in m/s²
    pub gravity: Vector3<f64>,
    /// Viscous damping coefficient per node in N·s/m
    pub damping: f64,
    /// Penalty stiffness of the floor plane in N/m
    pub floor_stiffness: f64,
    /// Height of the floor plane in m
    pub floor_y: f64,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, -9.81, 0.0),
            damping: 2.0,
            floor_stiffness: 1.0e5,
            floor_y: 0.0,
        }
    }
}

/// Spring-mass simulation of a braided lattice
pub struct LatticeEngine {
    params: LatticeParams,
    beams: Vec<BeamElement>,
    rest_lengths: Vec<f64>,
    stiffness: Vec<f64>,
    masses: Vec<f64>,
    fixed: Vec<bool>,
    positions: Vec<Point3<f64>>,
    velocities: Vec<Vector3<f64>>,
    external: Vec<Vector3<f64>>,
    forces: Vec<Vector3<f64>>,
    time: f64,
}

impl LatticeEngine {
    /// Create an engine over the as-built structure. Spring rest lengths are
    /// the as-built beam lengths.
    pub fn new(
        structure: &BraidStructure,
        material: &StrandMaterial,
        params: LatticeParams,
    ) -> Self {
        let positions = structure.initial_positions();
        let beams = structure.beams().to_vec();

        let mut rest_lengths = Vec::with_capacity(beams.len());
        let mut stiffness = Vec::with_capacity(beams.len());
        for beam in &beams {
            let length = (positions[beam.b] - positions[beam.a]).norm();
            rest_lengths.push(length);
            stiffness.push(material.axial_stiffness(length));
        }

        let node_count = structure.node_count();
        Self {
            params,
            beams,
            rest_lengths,
            stiffness,
            masses: structure.nodes().iter().map(|n| n.mass).collect(),
            fixed: structure.nodes().iter().map(|n| n.fixed).collect(),
            positions,
            velocities: vec![Vector3::zeros(); node_count],
            external: vec![Vector3::zeros(); node_count],
            forces: vec![Vector3::zeros(); node_count],
            time: 0.0,
        }
    }

    /// Current node velocities, in structure arena order
    pub fn velocities(&self) -> &[Vector3<f64>] {
        &self.velocities
    }

    fn accumulate_forces(&mut self) {
        for i in 0..self.positions.len() {
            self.forces[i] =
                self.params.gravity * self.masses[i] + self.external[i]
                    - self.velocities[i] * self.params.damping;

            // Floor penalty: push penetrating nodes back up.
            let penetration = self.params.floor_y - self.positions[i].y;
            if penetration > 0.0 {
                self.forces[i].y += self.params.floor_stiffness * penetration;
            }
        }

        for (beam_no, beam) in self.beams.iter().enumerate() {
            let delta = self.positions[beam.b] - self.positions[beam.a];
            let length = delta.norm();
            if length <= 0.0 || self.rest_lengths[beam_no] <= 0.0 {
                continue;
            }
            let axial = self.stiffness[beam_no] * (length - self.rest_lengths[beam_no]);
            let direction = delta / length;
            self.forces[beam.a] += direction * axial;
            self.forces[beam.b] -= direction * axial;
        }
    }
}

impl PhysicsEngine for LatticeEngine {
    fn advance(&mut self, dt: f64) {
        self.accumulate_forces();

        for i in 0..self.positions.len() {
            if self.fixed[i] || self.masses[i] <= 0.0 {
                continue;
            }
            self.velocities[i] += self.forces[i] * (dt / self.masses[i]);
            self.positions[i] += self.velocities[i] * dt;
        }

        self.time += dt;
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    fn set_node_force(&mut self, node: usize, force: Vector3<f64>) {
        self.external[node] = force;
    }

    fn clear_node_forces(&mut self) {
        for force in &mut self.external {
            *force = Vector3::zeros();
        }
    }
}
