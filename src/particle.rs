use crate::error::{DecayError, DecayResult};
use crate::kinematics::{four_momentum, three_momentum};
use crate::particle_data::ParticleProperties;
use crate::spin::{self, SpinType};
use nalgebra::{DMatrix, Vector3, Vector4};
use num_complex::Complex64;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Shared handle to a particle in a decay tree.
///
/// Parents own their daughters through these handles; daughters point back
/// with a [`Weak`] link so the tree has no ownership cycles.
pub type ParticleRef = Rc<RefCell<Particle>>;

#[derive(Debug, Clone)]
pub struct Particle {
    pub species: String,
    pub spin: SpinType,
    pub mass: f64,
    /// (E, px, py, pz) in GeV
    pub momentum: Vector4<f64>,
    /// Helicity-basis spin-density matrix, trace equal to the state count.
    pub spin_density: DMatrix<Complex64>,
    daughters: Vec<ParticleRef>,
    parent: Weak<RefCell<Particle>>,
}

impl Particle {
    /// Unpolarized particle with the given three-momentum.
    pub fn new(species: impl Into<String>, spin: SpinType, mass: f64, p: Vector3<f64>) -> Self {
        Self {
            species: species.into(),
            spin,
            mass,
            momentum: four_momentum(mass, p),
            spin_density: spin::unpolarized(spin),
            daughters: Vec::new(),
            parent: Weak::new(),
        }
    }

    pub fn at_rest(species: impl Into<String>, spin: SpinType, mass: f64) -> Self {
        Self::new(species, spin, mass, Vector3::zeros())
    }

    /// Particle with the nominal mass and spin of a table entry.
    pub fn from_properties(species: impl Into<String>, props: &ParticleProperties, p: Vector3<f64>) -> Self {
        Self::new(species, props.spin, props.mass, p)
    }

    pub fn into_ref(self) -> ParticleRef {
        Rc::new(RefCell::new(self))
    }

    /// Replace the spin-density matrix; it must match the spin and be Hermitian.
    pub fn set_spin_density(&mut self, rho: DMatrix<Complex64>) -> DecayResult<()> {
        if !spin::is_valid_spin_density(self.spin, &rho) {
            return Err(DecayError::Kinematics(format!(
                "invalid {}x{} spin density for {} ({:?})",
                rho.nrows(),
                rho.ncols(),
                self.species,
                self.spin
            )));
        }
        self.spin_density = spin::normalize_spin_density(&rho);
        Ok(())
    }

    pub fn three_momentum(&self) -> Vector3<f64> {
        three_momentum(&self.momentum)
    }

    pub fn energy(&self) -> f64 {
        self.momentum[0]
    }

    pub fn daughters(&self) -> &[ParticleRef] {
        &self.daughters
    }

    pub fn is_decayed(&self) -> bool {
        !self.daughters.is_empty()
    }

    /// Parent of this particle, if it is a daughter that is still alive.
    pub fn parent(&self) -> Option<ParticleRef> {
        self.parent.upgrade()
    }

    /// Four-momentum sum over the direct daughters.
    pub fn daughter_momentum_sum(&self) -> Vector4<f64> {
        self.daughters
            .iter()
            .fold(Vector4::zeros(), |acc, d| acc + d.borrow().momentum)
    }
}

/// Attach `daughters` to `parent`, taking ownership of them.
///
/// The daughter list of a particle is written once; a decayed particle
/// rejects further attachments.
pub fn attach_daughters(parent: &ParticleRef, daughters: Vec<Particle>) -> DecayResult<()> {
    if parent.borrow().is_decayed() {
        return Err(DecayError::lifecycle(
            parent.borrow().species.clone(),
            "daughters already attached",
        ));
    }
    let handles: Vec<ParticleRef> = daughters
        .into_iter()
        .map(|mut d| {
            d.parent = Rc::downgrade(parent);
            d.into_ref()
        })
        .collect();
    parent.borrow_mut().daughters = handles;
    Ok(())
}
