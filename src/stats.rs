use crate::kinematics::unit_direction;
use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Direction distribution for parent momenta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AngularDistribution {
    Isotropic,
    Monodirectional { reference: [f64; 3] },
}

impl AngularDistribution {
    /// Create a new monodirectional distribution; `None` for the zero vector
    pub fn new_monodirectional(x: f64, y: f64, z: f64) -> Option<Self> {
        let mag = (x * x + y * y + z * z).sqrt();
        if mag == 0.0 || !mag.is_finite() {
            return None;
        }
        Some(Self::Monodirectional {
            reference: [x / mag, y / mag, z / mag],
        })
    }

    pub fn new_isotropic() -> Self {
        Self::Isotropic
    }

    /// Sample a unit direction
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector3<f64> {
        match self {
            AngularDistribution::Isotropic => {
                let mu = 2.0 * rng.gen::<f64>() - 1.0;
                let phi = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
                unit_direction(mu, phi)
            }
            AngularDistribution::Monodirectional { reference } => {
                Vector3::new(reference[0], reference[1], reference[2])
            }
        }
    }
}

/// Running mean and variance (Welford), mergeable across workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStatistics {
    count: u64,
    mean: f64,
    m2: f64,
}

impl SampleStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Combine with statistics gathered elsewhere (Chan et al.)
    pub fn merge(&mut self, other: &SampleStatistics) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n = (self.count + other.count) as f64;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / n;
        self.m2 += other.m2 + delta * delta * self.count as f64 * other.count as f64 / n;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; zero below two entries
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn std_error(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.std_dev() / (self.count as f64).sqrt()
        }
    }
}

impl FromIterator<f64> for SampleStatistics {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for x in iter {
            stats.push(x);
        }
        stats
    }
}

/// Pearson correlation of two equally long series. `None` when they differ
/// in length, have fewer than two points or either one is constant.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}
