use crate::config::Config;
use crate::error::{DecayError, DecayResult};
use crate::particle::Particle;
use crate::spin::{self, SpinType};
use crate::stats::AngularDistribution;
use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

const MAX_MASS_DRAWS: usize = 10_000;

/// Per-event parent mass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MassDistribution {
    /// Always the species' nominal mass
    Nominal,
    Fixed(f64),
    /// Normal around `mean`, redrawn until the value exceeds `minimum`
    Gaussian { mean: f64, width: f64, minimum: f64 },
}

/// Parent spin state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Polarization {
    Unpolarized,
    /// Pure helicity state, given as twice the helicity
    Helicity(i32),
    /// Explicit spin-density matrix as (re, im) rows
    Matrix(Vec<Vec<(f64, f64)>>),
}

impl Polarization {
    pub fn spin_density(&self, spin: SpinType) -> DecayResult<DMatrix<Complex64>> {
        match self {
            Polarization::Unpolarized => Ok(spin::unpolarized(spin)),
            Polarization::Helicity(two_lambda) => spin::pure_helicity(spin, *two_lambda).ok_or_else(|| {
                DecayError::Kinematics(format!("helicity {}/2 not available for {:?}", two_lambda, spin))
            }),
            Polarization::Matrix(rows) => {
                let n = rows.len();
                if rows.iter().any(|r| r.len() != n) {
                    return Err(DecayError::Kinematics("spin-density matrix is not square".to_string()));
                }
                Ok(DMatrix::from_fn(n, n, |i, j| Complex64::new(rows[i][j].0, rows[i][j].1)))
            }
        }
    }
}

/// Source of undecayed parents fed to a decay model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentSource {
    pub species: String,
    pub mass: MassDistribution,
    /// Momentum magnitude in GeV
    pub momentum: f64,
    pub angle: AngularDistribution,
    pub polarization: Polarization,
}

impl ParentSource {
    /// Unpolarized parent at rest with its nominal mass.
    pub fn new(species: &str) -> Self {
        Self {
            species: species.to_string(),
            mass: MassDistribution::Nominal,
            momentum: 0.0,
            angle: AngularDistribution::Isotropic,
            polarization: Polarization::Unpolarized,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DecayResult<Particle> {
        let props = Config::global().properties(&self.species)?;
        let mass = match &self.mass {
            MassDistribution::Nominal => props.mass,
            MassDistribution::Fixed(m) => *m,
            MassDistribution::Gaussian { mean, width, minimum } => {
                let normal = Normal::new(*mean, *width).map_err(|e| {
                    DecayError::config(self.species.clone(), format!("invalid mass distribution: {}", e))
                })?;
                (0..MAX_MASS_DRAWS)
                    .map(|_| normal.sample(rng))
                    .find(|m| m > minimum)
                    .ok_or_else(|| {
                        DecayError::Kinematics(format!(
                            "no {} mass above {} GeV in {} draws",
                            self.species, minimum, MAX_MASS_DRAWS
                        ))
                    })?
            }
        };
        let direction = self.angle.sample(rng);
        let mut particle = Particle::new(self.species.clone(), props.spin, mass, direction * self.momentum);
        particle.set_spin_density(self.polarization.spin_density(props.spin)?)?;
        Ok(particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_source() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = ParentSource::new("J/psi").sample(&mut rng).unwrap();
        assert_eq!(p.species, "J/psi");
        assert_eq!(p.mass, 3.0969);
        assert_eq!(p.three_momentum().norm(), 0.0);
        assert_eq!(p.spin_density, DMatrix::identity(3, 3));
    }

    #[test]
    fn test_monodirectional_momentum() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = ParentSource::new("phi");
        s.momentum = 2.0;
        s.angle = AngularDistribution::new_monodirectional(0.0, 0.0, 1.0).unwrap();
        s.mass = MassDistribution::Fixed(1.02);
        let p = s.sample(&mut rng).unwrap();
        assert_eq!(p.mass, 1.02);
        assert!((p.momentum[3] - 2.0).abs() < 1e-12);
        assert!((p.energy() - (1.02f64 * 1.02 + 4.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_mass_respects_minimum() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut s = ParentSource::new("vpho");
        s.mass = MassDistribution::Gaussian { mean: 3.2, width: 0.1, minimum: 3.15 };
        for _ in 0..500 {
            assert!(s.sample(&mut rng).unwrap().mass > 3.15);
        }
    }

    #[test]
    fn test_polarization() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut s = ParentSource::new("vpho");
        s.polarization = Polarization::Helicity(2);
        let p = s.sample(&mut rng).unwrap();
        assert_eq!(p.spin_density[(0, 0)], Complex64::new(3.0, 0.0));

        s.polarization = Polarization::Helicity(1);
        assert!(matches!(s.sample(&mut rng), Err(DecayError::Kinematics(_))));

        s.polarization = Polarization::Matrix(vec![vec![(1.0, 0.0), (0.0, 0.0)], vec![(0.0, 0.0), (1.0, 0.0)]]);
        assert!(s.sample(&mut rng).is_err());
    }

    #[test]
    fn test_unknown_species() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            ParentSource::new("X(3872)").sample(&mut rng),
            Err(DecayError::UnknownParticle(_))
        ));
    }
}
