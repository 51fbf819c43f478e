// Two-body helicity-amplitude physics shared by the VPHOTOVISRHI, VSS and
// HELAMP channels.

use crate::amplitude::{two_body_helicity_amplitudes, HelicityAmplitudes};
use crate::density::{daughter_spin_density, decay_density, polarization_envelope};
use crate::phase_space::KinematicConfiguration;
use crate::spin::SpinType;
use nalgebra::DMatrix;
use num_complex::Complex64;

/// Coupling table `H(l1, l2)` of a two-body channel with fixed spins.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoBodyHelicity {
    pub parent: SpinType,
    pub daughters: [SpinType; 2],
    /// `couplings[i1 * n2 + i2]`, helicities descending
    pub couplings: Vec<Complex64>,
}

impl TwoBodyHelicity {
    pub fn new(parent: SpinType, daughters: [SpinType; 2], couplings: Vec<Complex64>) -> Self {
        debug_assert_eq!(couplings.len(), daughters[0].state_count() * daughters[1].state_count());
        Self {
            parent,
            daughters,
            couplings,
        }
    }

    /// Amplitudes for the configuration, angles taken from daughter 0.
    pub fn amplitudes(&self, configuration: &KinematicConfiguration) -> HelicityAmplitudes {
        let (cos_theta, phi) = configuration.angles(0);
        two_body_helicity_amplitudes(self.parent, self.daughters, &self.couplings, cos_theta, phi)
    }

    pub fn density(&self, configuration: &KinematicConfiguration, rho: &DMatrix<Complex64>) -> f64 {
        decay_density(&self.amplitudes(configuration), rho)
    }

    pub fn envelope(&self, configuration: &KinematicConfiguration) -> f64 {
        polarization_envelope(&self.amplitudes(configuration))
    }

    pub fn daughter_densities(
        &self,
        configuration: &KinematicConfiguration,
        rho: &DMatrix<Complex64>,
    ) -> Vec<DMatrix<Complex64>> {
        let amps = self.amplitudes(configuration);
        (0..2).map(|k| daughter_spin_density(&amps, rho, k)).collect()
    }

    /// True when every coupling the selection rules let through is zero.
    /// A helicity difference `mu` is allowed when `abs(mu) <= J` and `J - mu`
    /// is an integer.
    pub fn is_null(&self) -> bool {
        let two_j = self.parent.two_j();
        let n2 = self.daughters[1].state_count();
        self.daughters[0]
            .helicities()
            .iter()
            .enumerate()
            .flat_map(|(i1, &l1)| {
                self.daughters[1]
                    .helicities()
                    .into_iter()
                    .enumerate()
                    .map(move |(i2, l2)| (i1 * n2 + i2, l1 - l2))
            })
            .all(|(idx, two_mu)| {
                two_mu.abs() > two_j || (two_j + two_mu) % 2 != 0 || self.couplings[idx].norm() == 0.0
            })
    }
}
