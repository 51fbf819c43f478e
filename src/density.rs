// Reduction of helicity amplitudes to probability densities.
//
// Spin-density matrices use the convention of `crate::spin`: Hermitian,
// positive semidefinite, trace equal to the number of helicity states, so the
// identity is the unpolarized state.

use crate::amplitude::HelicityAmplitudes;
use nalgebra::DMatrix;
use num_complex::Complex64;

/// Probability density of a configuration for a parent with spin density `rho`:
/// `sum_d sum_ij rho_ij A_id conj(A_jd)`.
///
/// Rounding can leave a tiny negative value for a vanishing density; it is
/// clamped to zero.
pub fn decay_density(amps: &HelicityAmplitudes, rho: &DMatrix<Complex64>) -> f64 {
    let n = amps.parent_states();
    debug_assert_eq!(rho.nrows(), n);
    let mut total = Complex64::new(0.0, 0.0);
    for d in 0..amps.daughter_combinations() {
        for i in 0..n {
            let a_i = amps.get_flat(i, d);
            if a_i == Complex64::new(0.0, 0.0) {
                continue;
            }
            for j in 0..n {
                total += rho[(i, j)] * a_i * amps.get_flat(j, d).conj();
            }
        }
    }
    total.re.max(0.0)
}

/// Density for an unpolarized parent: the plain sum of |A|^2.
pub fn unpolarized_density(amps: &HelicityAmplitudes) -> f64 {
    amps.total_intensity()
}

/// Hermitian matrix `M_ij = sum_d A_id conj(A_jd)` so that
/// `decay_density = tr(rho M^T)`.
pub fn amplitude_correlation(amps: &HelicityAmplitudes) -> DMatrix<Complex64> {
    let n = amps.parent_states();
    DMatrix::from_fn(n, n, |i, j| {
        (0..amps.daughter_combinations())
            .map(|d| amps.get_flat(i, d) * amps.get_flat(j, d).conj())
            .sum()
    })
}

/// Largest density any admissible parent polarization can produce at this
/// configuration: `n * lambda_max(M)`.
pub fn polarization_envelope(amps: &HelicityAmplitudes) -> f64 {
    let n = amps.parent_states();
    if n == 1 {
        return amps.total_intensity();
    }
    let m = amplitude_correlation(amps);
    let lambda_max = m
        .symmetric_eigenvalues()
        .iter()
        .fold(0.0_f64, |acc, &v| acc.max(v));
    n as f64 * lambda_max
}

/// Reduced spin-density matrix of daughter `k` after the decay.
///
/// Sums over the helicities of every other daughter and is normalized to a
/// trace equal to the daughter's state count. A vanishing result (e.g. a
/// zero-density configuration) is reported as unpolarized.
pub fn daughter_spin_density(
    amps: &HelicityAmplitudes,
    rho: &DMatrix<Complex64>,
    k: usize,
) -> DMatrix<Complex64> {
    let nk = amps.daughter_states()[k];
    let n = amps.parent_states();
    let mut out = DMatrix::<Complex64>::zeros(nk, nk);

    for d in 0..amps.daughter_combinations() {
        let idx = amps.unflatten(d);
        let a = idx[k];
        for b in 0..nk {
            let mut other = idx.clone();
            other[k] = b;
            let mut acc = Complex64::new(0.0, 0.0);
            for i in 0..n {
                let a_i = amps.get_flat(i, d);
                if a_i == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for j in 0..n {
                    acc += rho[(i, j)] * a_i * amps.get(j, &other).conj();
                }
            }
            out[(a, b)] += acc;
        }
    }

    crate::spin::normalize_spin_density(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amplitude::two_body_helicity_amplitudes;
    use crate::spin::{pure_helicity, unpolarized, SpinType};

    fn vss(cos_theta: f64) -> HelicityAmplitudes {
        two_body_helicity_amplitudes(
            SpinType::Vector,
            [SpinType::Scalar, SpinType::Scalar],
            &[Complex64::new(1.0, 0.0)],
            cos_theta,
            0.9,
        )
    }

    #[test]
    fn test_unpolarized_matches_identity_contraction() {
        let amps = vss(0.35);
        let rho = unpolarized(SpinType::Vector);
        assert!((decay_density(&amps, &rho) - unpolarized_density(&amps)).abs() < 1e-12);
    }

    #[test]
    fn test_longitudinal_parent_gives_cos_squared() {
        let rho = pure_helicity(SpinType::Vector, 0).unwrap();
        for &c in &[-0.9, -0.2, 0.0, 0.5, 1.0] {
            let w = decay_density(&vss(c), &rho);
            assert!((w - 3.0 * c * c).abs() < 1e-12, "c={} w={}", c, w);
        }
    }

    #[test]
    fn test_envelope_dominates_every_polarization() {
        for &c in &[-0.8, 0.1, 0.6] {
            let amps = vss(c);
            let env = polarization_envelope(&amps);
            for two_l in [2, 0, -2] {
                let rho = pure_helicity(SpinType::Vector, two_l).unwrap();
                assert!(decay_density(&amps, &rho) <= env + 1e-12);
            }
            assert!(decay_density(&amps, &unpolarized(SpinType::Vector)) <= env + 1e-12);
        }
    }

    #[test]
    fn test_envelope_is_attained_for_rank_one_correlation() {
        // V -> SS has a single daughter combination, so M is rank one and the
        // envelope equals n * sum_i |A_i|^2 = 3
        let env = polarization_envelope(&vss(0.2));
        assert!((env - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_daughter_spin_density_trace() {
        let amps = two_body_helicity_amplitudes(
            SpinType::Vector,
            [SpinType::Vector, SpinType::Photon],
            &vec![Complex64::new(1.0, 0.0); 6],
            0.4,
            2.0,
        );
        let rho = unpolarized(SpinType::Vector);
        let photon = daughter_spin_density(&amps, &rho, 1);
        assert_eq!(photon.nrows(), 2);
        assert!((photon.trace().re - 2.0).abs() < 1e-12);
        let vector = daughter_spin_density(&amps, &rho, 0);
        assert!((vector.trace().re - 3.0).abs() < 1e-12);
        // Hermitian
        for i in 0..3 {
            for j in 0..3 {
                assert!((vector[(i, j)] - vector[(j, i)].conj()).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_scalar_daughter_density_is_trivial() {
        let rho = unpolarized(SpinType::Vector);
        let out = daughter_spin_density(&vss(0.5), &rho, 0);
        assert_eq!(out.nrows(), 1);
        assert!((out[(0, 0)].re - 1.0).abs() < 1e-12);
    }
}
