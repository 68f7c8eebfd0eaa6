//! Braided lattice geometry - nodes, beams, and the helical builder

mod braid;
mod material;

pub use braid::{BeamElement, BraidGeometry, BraidStructure, LatticeNode};
pub use material::StrandMaterial;
