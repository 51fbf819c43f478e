// Spin bookkeeping: spin types, helicity states, Wigner rotation functions
// and spin-density matrices.
//
// All angular momenta are carried as twice their value (`two_j`, `two_m`) so
// that half-integer spins stay integral.

use nalgebra::DMatrix;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Spin classification of a particle species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpinType {
    Scalar,
    Dirac,
    Vector,
    /// Massless spin 1: only helicities +1 and -1 exist.
    Photon,
    Tensor,
}

impl SpinType {
    /// Twice the spin quantum number.
    pub fn two_j(self) -> i32 {
        match self {
            SpinType::Scalar => 0,
            SpinType::Dirac => 1,
            SpinType::Vector | SpinType::Photon => 2,
            SpinType::Tensor => 4,
        }
    }

    /// Allowed helicities (twice their value), in descending order.
    pub fn helicities(self) -> Vec<i32> {
        match self {
            SpinType::Photon => vec![2, -2],
            other => {
                let two_j = other.two_j();
                (0..=two_j).map(|k| two_j - 2 * k).collect()
            }
        }
    }

    pub fn state_count(self) -> usize {
        match self {
            SpinType::Photon => 2,
            other => other.two_j() as usize + 1,
        }
    }

    /// Index of helicity `two_lambda` in [`SpinType::helicities`].
    pub fn helicity_index(self, two_lambda: i32) -> Option<usize> {
        self.helicities().iter().position(|&h| h == two_lambda)
    }
}

fn factorial(n: i32) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Wigner small-d function `d^j_{m' m}(beta)` with doubled arguments.
///
/// Returns 0 when the arguments do not describe a valid matrix element.
pub fn wigner_small_d(two_j: i32, two_m_prime: i32, two_m: i32, beta: f64) -> f64 {
    if two_j < 0
        || two_m_prime.abs() > two_j
        || two_m.abs() > two_j
        || (two_j + two_m_prime) % 2 != 0
        || (two_j + two_m) % 2 != 0
    {
        return 0.0;
    }

    // integer versions of j+m', j-m', j+m, j-m and m'-m
    let jpmp = (two_j + two_m_prime) / 2;
    let jmmp = (two_j - two_m_prime) / 2;
    let jpm = (two_j + two_m) / 2;
    let jmm = (two_j - two_m) / 2;
    let mp_minus_m = (two_m_prime - two_m) / 2;

    let norm = (factorial(jpmp) * factorial(jmmp) * factorial(jpm) * factorial(jmm)).sqrt();
    let cos_half = (beta / 2.0).cos();
    let sin_half = (beta / 2.0).sin();

    let s_min = 0i32.max(-mp_minus_m);
    let s_max = jpm.min(jmmp);
    let mut sum = 0.0;
    for s in s_min..=s_max {
        let sign = if (mp_minus_m + s) % 2 == 0 { 1.0 } else { -1.0 };
        let denom = factorial(jpm - s) * factorial(s) * factorial(mp_minus_m + s) * factorial(jmmp - s);
        let cos_exp = two_j - mp_minus_m - 2 * s;
        let sin_exp = mp_minus_m + 2 * s;
        sum += sign / denom * cos_half.powi(cos_exp) * sin_half.powi(sin_exp);
    }
    norm * sum
}

/// Wigner D function `D^j_{m' m}(alpha, beta, gamma)` with doubled `j`, `m'`, `m`.
pub fn wigner_d(two_j: i32, two_m_prime: i32, two_m: i32, alpha: f64, beta: f64, gamma: f64) -> Complex64 {
    let d = wigner_small_d(two_j, two_m_prime, two_m, beta);
    let phase = -(two_m_prime as f64 / 2.0) * alpha - (two_m as f64 / 2.0) * gamma;
    Complex64::from_polar(d, phase)
}

/// Unpolarized spin-density matrix: the identity over the helicity states.
pub fn unpolarized(spin: SpinType) -> DMatrix<Complex64> {
    let n = spin.state_count();
    DMatrix::identity(n, n)
}

/// Pure helicity state `two_lambda`, normalized to trace equal to the state count.
pub fn pure_helicity(spin: SpinType, two_lambda: i32) -> Option<DMatrix<Complex64>> {
    let n = spin.state_count();
    let idx = spin.helicity_index(two_lambda)?;
    let mut rho = DMatrix::zeros(n, n);
    rho[(idx, idx)] = Complex64::new(n as f64, 0.0);
    Some(rho)
}

/// Rescale a Hermitian spin-density matrix so its trace equals its dimension.
///
/// A matrix with vanishing trace is replaced by the unpolarized one.
pub fn normalize_spin_density(rho: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let n = rho.nrows();
    let trace = rho.trace().re;
    if !(trace.is_finite() && trace > 0.0) {
        return DMatrix::identity(n, n);
    }
    let scale = n as f64 / trace;
    rho.map(|z| z * scale)
}

/// Check that `rho` is square, matches `spin`, is Hermitian, positive
/// semidefinite and has a positive trace. Tolerance is relative to the
/// largest element.
pub fn is_valid_spin_density(spin: SpinType, rho: &DMatrix<Complex64>) -> bool {
    let n = spin.state_count();
    if rho.nrows() != n || rho.ncols() != n {
        return false;
    }
    let scale = rho.iter().map(|z| z.norm()).fold(0.0, f64::max).max(1.0);
    for i in 0..n {
        for j in 0..n {
            if (rho[(i, j)] - rho[(j, i)].conj()).norm() > 1e-12 * scale {
                return false;
            }
        }
    }
    let trace = rho.trace().re;
    if !(trace.is_finite() && trace > 0.0) {
        return false;
    }
    let min_eigenvalue = rho
        .symmetric_eigenvalues()
        .iter()
        .fold(f64::INFINITY, |acc, &v| acc.min(v));
    min_eigenvalue >= -1e-10 * scale
}
