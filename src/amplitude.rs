// Helicity amplitudes for a decay configuration.

use crate::spin::{wigner_d, SpinType};
use num_complex::Complex64;

/// Complex amplitudes indexed by parent helicity and one helicity per daughter.
///
/// Helicity indices follow [`SpinType::helicities`] (descending). Storage is
/// dense and row-major with the parent index outermost and the last daughter
/// innermost.
#[derive(Debug, Clone, PartialEq)]
pub struct HelicityAmplitudes {
    parent_states: usize,
    daughter_states: Vec<usize>,
    values: Vec<Complex64>,
}

impl HelicityAmplitudes {
    /// All-zero amplitude set.
    pub fn zeros(parent_states: usize, daughter_states: Vec<usize>) -> Self {
        let len = parent_states * daughter_states.iter().product::<usize>();
        Self {
            parent_states,
            daughter_states,
            values: vec![Complex64::new(0.0, 0.0); len],
        }
    }

    pub fn for_spins(parent: SpinType, daughters: &[SpinType]) -> Self {
        Self::zeros(
            parent.state_count(),
            daughters.iter().map(|s| s.state_count()).collect(),
        )
    }

    pub fn parent_states(&self) -> usize {
        self.parent_states
    }

    pub fn daughter_states(&self) -> &[usize] {
        &self.daughter_states
    }

    /// Number of daughter helicity combinations.
    pub fn daughter_combinations(&self) -> usize {
        self.daughter_states.iter().product()
    }

    fn flat_daughter_index(&self, daughters: &[usize]) -> usize {
        debug_assert_eq!(daughters.len(), self.daughter_states.len());
        daughters
            .iter()
            .zip(&self.daughter_states)
            .fold(0, |acc, (&idx, &n)| {
                debug_assert!(idx < n);
                acc * n + idx
            })
    }

    /// Split a flat daughter combination index back into per-daughter indices.
    pub fn unflatten(&self, mut combination: usize) -> Vec<usize> {
        let mut out = vec![0; self.daughter_states.len()];
        for (slot, &n) in out.iter_mut().zip(&self.daughter_states).rev() {
            *slot = combination % n;
            combination /= n;
        }
        out
    }

    pub fn get(&self, parent: usize, daughters: &[usize]) -> Complex64 {
        self.values[parent * self.daughter_combinations() + self.flat_daughter_index(daughters)]
    }

    pub fn set(&mut self, parent: usize, daughters: &[usize], value: Complex64) {
        let idx = parent * self.daughter_combinations() + self.flat_daughter_index(daughters);
        self.values[idx] = value;
    }

    /// Amplitude by flat daughter combination index.
    pub fn get_flat(&self, parent: usize, combination: usize) -> Complex64 {
        self.values[parent * self.daughter_combinations() + combination]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Complex64> {
        self.values.iter()
    }

    /// Sum of |A|^2 over every helicity combination.
    pub fn total_intensity(&self) -> f64 {
        self.values.iter().map(|a| a.norm_sqr()).sum()
    }
}

/// Jacob-Wick amplitudes for a two-body decay `P -> 1 2`.
///
/// `couplings[i1 * n2 + i2]` is the helicity coupling `H(l1, l2)` for the
/// helicity indices of daughters 1 and 2. The angles are those of daughter 1
/// in the parent rest frame. Combinations with `|l1 - l2| > J` are exactly
/// zero.
pub fn two_body_helicity_amplitudes(
    parent: SpinType,
    daughters: [SpinType; 2],
    couplings: &[Complex64],
    cos_theta: f64,
    phi: f64,
) -> HelicityAmplitudes {
    let mut amps = HelicityAmplitudes::for_spins(parent, &daughters);
    let two_j = parent.two_j();
    let theta = cos_theta.clamp(-1.0, 1.0).acos();
    let parent_hel = parent.helicities();
    let hel1 = daughters[0].helicities();
    let hel2 = daughters[1].helicities();
    debug_assert_eq!(couplings.len(), hel1.len() * hel2.len());

    for (i1, &l1) in hel1.iter().enumerate() {
        for (i2, &l2) in hel2.iter().enumerate() {
            let coupling = couplings[i1 * hel2.len() + i2];
            let two_mu = l1 - l2;
            if two_mu.abs() > two_j || coupling == Complex64::new(0.0, 0.0) {
                continue;
            }
            for (ip, &lp) in parent_hel.iter().enumerate() {
                let d = wigner_d(two_j, lp, two_mu, phi, theta, 0.0).conj();
                amps.set(ip, &[i1, i2], d * coupling);
            }
        }
    }
    amps
}

/// Number of (l1, l2) pairs a two-body coupling table has for these spins.
pub fn two_body_coupling_count(daughters: [SpinType; 2]) -> usize {
    daughters[0].state_count() * daughters[1].state_count()
}
