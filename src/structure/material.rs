//! Strand material properties

use serde::{Deserialize, Serialize};

/// Material properties of one elastic strand
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrandMaterial {
    /// Modulus of elasticity (Young's modulus) in Pa
    pub youngs_modulus: f64,
    /// Density in kg/m³
    pub density: f64,
    /// Radius of the circular strand cross-section in m
    pub strand_radius: f64,
}

impl StrandMaterial {
    /// Create a new material with given properties
    pub fn new(youngs_modulus: f64, density: f64, strand_radius: f64) -> Self {
        Self {
            youngs_modulus,
            density,
            strand_radius,
        }
    }

    /// Glass-reinforced polyester (GRP) strand, the default braid material
    pub fn grp(strand_radius: f64) -> Self {
        Self {
            youngs_modulus: 1.72e10, // 17.2 GPa
            density: 1200.0,         // kg/m³
            strand_radius,
        }
    }

    /// Soft rubber-like strand, useful for quickly-settling simulations
    pub fn rubber(strand_radius: f64) -> Self {
        Self {
            youngs_modulus: 1.0e7, // 10 MPa
            density: 1100.0,       // kg/m³
            strand_radius,
        }
    }

    /// Cross-sectional area of the strand in m²
    pub fn cross_section_area(&self) -> f64 {
        std::f64::consts::PI * self.strand_radius * self.strand_radius
    }

    /// Axial stiffness E·A/L of a strand segment with rest length `length`
    pub fn axial_stiffness(&self, length: f64) -> f64 {
        if length <= 0.0 {
            return 0.0;
        }
        self.youngs_modulus * self.cross_section_area() / length
    }
}

impl Default for StrandMaterial {
    fn default() -> Self {
        Self::grp(0.008)
    }
}
