//! Helical braid builder - generates the node layers and strand beams

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{BraidError, BraidResult};
use crate::structure::StrandMaterial;

/// Parameters of the braided lattice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BraidGeometry {
    /// Number of strands (must be even - two strands intersect at each point)
    pub num_strands: usize,
    /// Number of node layers along the braid axis
    pub num_layers: usize,
    /// Braid radius at the base in m
    pub radius: f64,
    /// Vertical distance advanced per full strand revolution in m
    pub pitch: f64,
    /// Radius reduction per layer (conicity) in m
    pub radius_taper: f64,
}

impl Default for BraidGeometry {
    fn default() -> Self {
        Self {
            num_strands: 8,
            num_layers: 5,
            radius: 0.1,
            pitch: 0.1,
            radius_taper: 0.0,
        }
    }
}

/// One node of the lattice
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LatticeNode {
    /// As-built position
    pub position: Point3<f64>,
    /// Lumped mass from adjacent beam segments in kg
    pub mass: f64,
    /// Fixed nodes (the base layer) never move
    pub fixed: bool,
    /// Layer index, 0 at the base
    pub layer: usize,
}

/// A beam element between two nodes, identified by arena indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamElement {
    /// Index of the start node
    pub a: usize,
    /// Index of the end node
    pub b: usize,
}

/// The built braided structure: node arena, beam arena, layer index lists
#[derive(Debug, Clone)]
pub struct BraidStructure {
    nodes: Vec<LatticeNode>,
    beams: Vec<BeamElement>,
    layers: Vec<Vec<usize>>,
}

impl BraidStructure {
    /// Build the helical lattice for the given geometry and material.
    ///
    /// Two strand families connect consecutive layers: a counter-clockwise
    /// family running straight up its own intersection column, and a
    /// clockwise family shifted one column (wrapping at column 0). Base-layer
    /// nodes are fixed.
    pub fn build(geometry: &BraidGeometry, material: &StrandMaterial) -> BraidResult<Self> {
        if geometry.num_strands < 2 || geometry.num_strands % 2 != 0 {
            return Err(BraidError::InvalidGeometry(format!(
                "number of strands must be even and at least 2, got {}",
                geometry.num_strands
            )));
        }
        if geometry.num_layers < 2 {
            return Err(BraidError::InvalidGeometry(format!(
                "number of layers must be at least 2, got {}",
                geometry.num_layers
            )));
        }
        if geometry.radius <= 0.0 || geometry.pitch <= 0.0 {
            return Err(BraidError::InvalidGeometry(
                "radius and pitch must be positive".to_string(),
            ));
        }
        let top_radius =
            geometry.radius - geometry.radius_taper * (geometry.num_layers - 1) as f64;
        if top_radius <= 0.0 {
            return Err(BraidError::InvalidGeometry(format!(
                "radius taper collapses the braid: top-layer radius {:.4} m",
                top_radius
            )));
        }

        let intersections = geometry.num_strands / 2;
        let tau = std::f64::consts::TAU;

        let mut nodes = Vec::with_capacity(geometry.num_layers * intersections);
        let mut layers = Vec::with_capacity(geometry.num_layers);

        for layer_no in 0..geometry.num_layers {
            let layer_radius = geometry.radius - geometry.radius_taper * layer_no as f64;
            let layer_height = layer_no as f64 * geometry.pitch / geometry.num_strands as f64;
            let mut layer_nodes = Vec::with_capacity(intersections);

            for point_no in 0..intersections {
                let angle = layer_no as f64 * tau / geometry.num_strands as f64
                    + point_no as f64 / intersections as f64 * tau;
                let position = Point3::new(
                    layer_radius * angle.cos(),
                    layer_height,
                    layer_radius * angle.sin(),
                );
                layer_nodes.push(nodes.len());
                nodes.push(LatticeNode {
                    position,
                    mass: 0.0,
                    fixed: layer_no == 0,
                    layer: layer_no,
                });
            }
            layers.push(layer_nodes);
        }

        let mut beams = Vec::with_capacity(2 * intersections * (geometry.num_layers - 1));
        for column in 0..intersections {
            // counter clock-wise family
            for layer_no in 0..geometry.num_layers - 1 {
                beams.push(BeamElement {
                    a: layers[layer_no][column],
                    b: layers[layer_no + 1][column],
                });
            }
            // clock-wise family, shifted one column with wrap-around
            let shifted = if column > 0 { column - 1 } else { intersections - 1 };
            for layer_no in 0..geometry.num_layers - 1 {
                beams.push(BeamElement {
                    a: layers[layer_no][column],
                    b: layers[layer_no + 1][shifted],
                });
            }
        }

        // Lump half of each beam segment's mass onto each endpoint.
        let area = material.cross_section_area();
        for beam in &beams {
            let length = (nodes[beam.b].position - nodes[beam.a].position).norm();
            let half_mass = material.density * area * length / 2.0;
            nodes[beam.a].mass += half_mass;
            nodes[beam.b].mass += half_mass;
        }

        Ok(Self {
            nodes,
            beams,
            layers,
        })
    }

    /// All nodes, in arena order
    pub fn nodes(&self) -> &[LatticeNode] {
        &self.nodes
    }

    /// All beam elements, in arena order
    pub fn beams(&self) -> &[BeamElement] {
        &self.beams
    }

    /// Node index lists per layer, base layer first
    pub fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    /// Node indices of the top layer
    pub fn top_layer(&self) -> &[usize] {
        self.layers.last().map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// As-built node positions, in arena order
    pub fn initial_positions(&self) -> Vec<Point3<f64>> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_braid() -> BraidStructure {
        let geometry = BraidGeometry {
            num_strands: 4,
            num_layers: 3,
            radius: 0.1,
            pitch: 0.1,
            radius_taper: 0.0,
        };
        BraidStructure::build(&geometry, &StrandMaterial::default()).unwrap()
    }

    #[test]
    fn test_node_and_beam_counts() {
        let structure = small_braid();
        // 2 intersections per layer, 3 layers
        assert_eq!(structure.node_count(), 6);
        // two beam families, 2 columns, 2 layer gaps
        assert_eq!(structure.beam_count(), 8);
    }

    #[test]
    fn test_base_layer_is_fixed() {
        let structure = small_braid();
        for &idx in &structure.layers()[0] {
            assert!(structure.nodes()[idx].fixed);
        }
        for &idx in structure.top_layer() {
            assert!(!structure.nodes()[idx].fixed);
        }
    }

    #[test]
    fn test_layer_heights_follow_pitch() {
        let structure = small_braid();
        for (layer_no, layer) in structure.layers().iter().enumerate() {
            for &idx in layer {
                assert_relative_eq!(
                    structure.nodes()[idx].position.y,
                    layer_no as f64 * 0.1 / 4.0,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_odd_strand_count_rejected() {
        let geometry = BraidGeometry {
            num_strands: 5,
            ..BraidGeometry::default()
        };
        assert!(BraidStructure::build(&geometry, &StrandMaterial::default()).is_err());
    }

    #[test]
    fn test_excessive_taper_rejected() {
        let geometry = BraidGeometry {
            num_strands: 4,
            num_layers: 5,
            radius: 0.1,
            pitch: 0.1,
            radius_taper: 0.05,
        };
        assert!(BraidStructure::build(&geometry, &StrandMaterial::default()).is_err());
    }

    #[test]
    fn test_nodes_carry_lumped_mass() {
        let structure = small_braid();
        for node in structure.nodes() {
            assert!(node.mass > 0.0);
        }
    }
}
