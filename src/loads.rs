//! Force application to the lattice
//!
//! Forces are composed per node from the experiment's resolved components
//! (axial on all nodes, axial on the top layer only, lateral, torsional) and
//! written through the engine seam in one pass. Releasing loads zeroes every
//! node force.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::physics::PhysicsEngine;
use crate::structure::BraidStructure;

/// The force components applied during one experiment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResolvedForces {
    /// Vertical force per node, applied to every node, in N
    pub force_y: f64,
    /// Additional vertical force per node, applied to top-layer nodes only, in N
    pub top_force_y: f64,
    /// Lateral force per node along x, in N
    pub force_x: f64,
    /// Lateral force per node along z, in N
    pub force_z: f64,
    /// Torsional load magnitude about the braid axis, in N·m
    pub torsional: f64,
}

impl ResolvedForces {
    /// True if no component is set
    pub fn is_zero(&self) -> bool {
        self.force_y == 0.0
            && self.top_force_y == 0.0
            && self.force_x == 0.0
            && self.force_z == 0.0
            && self.torsional == 0.0
    }
}

/// Compose and apply all configured force components.
///
/// The torsional component acts tangentially about the vertical axis through
/// the braid center, scaled by 1/r so the applied moment is independent of a
/// node's distance from the axis; nodes on the axis are skipped.
pub fn apply_loads(
    engine: &mut dyn PhysicsEngine,
    structure: &BraidStructure,
    forces: &ResolvedForces,
) {
    let top_height = structure
        .top_layer()
        .first()
        .map(|&idx| structure.nodes()[idx].position.y)
        .unwrap_or(0.0);
    let center_y = Vector3::new(0.0, top_height, 0.0);
    let up = Vector3::new(0.0, 1.0, 0.0);

    let top_layer = structure.top_layer();

    for (idx, node) in structure.nodes().iter().enumerate() {
        let mut force = Vector3::new(forces.force_x, forces.force_y, forces.force_z);

        if top_layer.contains(&idx) {
            force.y += forces.top_force_y;
        }

        if forces.torsional != 0.0 {
            let radial = node.position.coords - center_y;
            let radius = radial.norm();
            if radius > 0.0 {
                let tangential = radial.cross(&up).normalize();
                force += tangential * (forces.torsional / radius);
            }
        }

        engine.set_node_force(idx, force);
    }
}

/// Zero every node force (force release at the configured time)
pub fn release_loads(engine: &mut dyn PhysicsEngine) {
    engine.clear_node_forces();
}
