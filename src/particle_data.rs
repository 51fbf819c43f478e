// src/particle_data.rs
// Static particle property table. Masses are PDG central values in GeV,
// rounded as needed.

use crate::spin::SpinType;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Properties of one particle species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleProperties {
    /// Nominal mass in GeV
    pub mass: f64,
    pub spin: SpinType,
    /// Electric charge in units of e
    pub charge: i32,
}

impl ParticleProperties {
    pub const fn new(mass: f64, spin: SpinType, charge: i32) -> Self {
        Self { mass, spin, charge }
    }
}

/// Map from species name (e.g. `"J/psi"`) to its properties.
///
/// `vpho` is the virtual photon produced in e+e- annihilation. Its nominal
/// mass is the Upsilon(4S) centre-of-mass energy; individual events may
/// carry any mass above the channel threshold.
pub static PARTICLE_TABLE: Lazy<HashMap<&'static str, ParticleProperties>> = Lazy::new(|| {
    use SpinType::*;
    let mut m = HashMap::new();
    m.insert("vpho", ParticleProperties::new(10.5794, Vector, 0));
    m.insert("gamma", ParticleProperties::new(0.0, Photon, 0));
    m.insert("Upsilon(4S)", ParticleProperties::new(10.5794, Vector, 0));
    m.insert("J/psi", ParticleProperties::new(3.096900, Vector, 0));
    m.insert("psi(2S)", ParticleProperties::new(3.686097, Vector, 0));
    m.insert("psi(3770)", ParticleProperties::new(3.77370, Vector, 0));
    m.insert("phi", ParticleProperties::new(1.019461, Vector, 0));
    m.insert("omega", ParticleProperties::new(0.78266, Vector, 0));
    m.insert("rho0", ParticleProperties::new(0.77526, Vector, 0));
    m.insert("K*0", ParticleProperties::new(0.89555, Vector, 0));
    m.insert("K+", ParticleProperties::new(0.493677, Scalar, 1));
    m.insert("K-", ParticleProperties::new(0.493677, Scalar, -1));
    m.insert("K_S0", ParticleProperties::new(0.497611, Scalar, 0));
    m.insert("K_L0", ParticleProperties::new(0.497611, Scalar, 0));
    m.insert("pi+", ParticleProperties::new(0.13957039, Scalar, 1));
    m.insert("pi-", ParticleProperties::new(0.13957039, Scalar, -1));
    m.insert("pi0", ParticleProperties::new(0.1349768, Scalar, 0));
    m.insert("eta", ParticleProperties::new(0.547862, Scalar, 0));
    m.insert("D0", ParticleProperties::new(1.86484, Scalar, 0));
    m.insert("anti-D0", ParticleProperties::new(1.86484, Scalar, 0));
    m.insert("D+", ParticleProperties::new(1.86966, Scalar, 1));
    m.insert("D-", ParticleProperties::new(1.86966, Scalar, -1));
    m.insert("B0", ParticleProperties::new(5.27965, Scalar, 0));
    m.insert("anti-B0", ParticleProperties::new(5.27965, Scalar, 0));
    m.insert("e-", ParticleProperties::new(0.000510999, Dirac, -1));
    m.insert("e+", ParticleProperties::new(0.000510999, Dirac, 1));
    m.insert("mu-", ParticleProperties::new(0.1056584, Dirac, -1));
    m.insert("mu+", ParticleProperties::new(0.1056584, Dirac, 1));
    m.insert("p+", ParticleProperties::new(0.93827209, Dirac, 1));
    m.insert("anti-p-", ParticleProperties::new(0.93827209, Dirac, -1));
    m.insert("chi_c2", ParticleProperties::new(3.55617, Tensor, 0));
    m
});

/// Properties from the static table only (no configuration overrides).
pub fn lookup(name: &str) -> Option<ParticleProperties> {
    PARTICLE_TABLE.get(name).copied()
}

/// Sorted list of every species in the table.
pub fn species_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = PARTICLE_TABLE.keys().copied().collect();
    names.sort();
    names
}
