// Phase-space proposals for the rejection sampler.
//
// Configurations are generated in the parent rest frame, uniformly in the
// Lorentz-invariant phase-space measure. Two-body decays need only a random
// direction. N-body decays use the Raubold-Lynch construction with an
// internal weight rejection against the analytic maximum weight, so the
// configurations handed to the caller are unweighted.

use crate::error::{DecayError, DecayResult};
use crate::kinematics::{
    boost_along_y, four_momentum, polar_angles, rotate, three_momentum, two_body_momentum,
    unit_direction,
};
use nalgebra::{Vector3, Vector4};
use rand::{Rng, RngCore};
use std::f64::consts::PI;

/// Daughter four-momenta of one decay, in the parent rest frame.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicConfiguration {
    pub momenta: Vec<Vector4<f64>>,
}

impl KinematicConfiguration {
    /// Polar cosine and azimuth of daughter `index` in the parent rest frame.
    pub fn angles(&self, index: usize) -> (f64, f64) {
        polar_angles(&three_momentum(&self.momenta[index]))
    }

    pub fn total_momentum(&self) -> Vector4<f64> {
        self.momenta.iter().fold(Vector4::zeros(), |acc, p| acc + p)
    }
}

/// Outcome of one phase-space proposal; `attempts` counts the internal
/// weight-rejection trials (1 for two-body decays).
#[derive(Debug, Clone)]
pub struct Proposal {
    pub configuration: KinematicConfiguration,
    pub attempts: usize,
}

/// Two-body configuration with daughter 1 along (`cos_theta`, `phi`).
pub fn two_body_configuration(parent_mass: f64, masses: [f64; 2], cos_theta: f64, phi: f64) -> KinematicConfiguration {
    let p = two_body_momentum(parent_mass, masses[0], masses[1]);
    let n = unit_direction(cos_theta, phi);
    let p1 = four_momentum(masses[0], n * p);
    let p2 = four_momentum(masses[1], -n * p);
    KinematicConfiguration { momenta: vec![p1, p2] }
}

/// Uniform phase-space generator for a fixed list of daughter masses.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSpace {
    masses: Vec<f64>,
    max_attempts: usize,
}

impl PhaseSpace {
    pub fn new(masses: Vec<f64>, max_attempts: usize) -> Self {
        Self { masses, max_attempts: max_attempts.max(1) }
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn threshold(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Analytic upper bound of the Raubold-Lynch weight `prod pd_i`.
    fn max_weight(&self, parent_mass: f64) -> f64 {
        let kinetic = parent_mass - self.threshold();
        let mut em_max = kinetic + self.masses[0];
        let mut em_min = 0.0;
        let mut wt_max = 1.0;
        for i in 1..self.masses.len() {
            em_min += self.masses[i - 1];
            em_max += self.masses[i];
            wt_max *= two_body_momentum(em_max, em_min, self.masses[i]);
        }
        wt_max
    }

    /// Draw one configuration for a parent of mass `parent_mass`.
    pub fn propose(&self, parent_mass: f64, rng: &mut dyn RngCore) -> DecayResult<Proposal> {
        let n = self.masses.len();
        if n < 2 {
            return Err(DecayError::Kinematics(format!(
                "phase space needs at least two daughters, got {}",
                n
            )));
        }
        if parent_mass <= self.threshold() {
            return Err(DecayError::Kinematics(format!(
                "parent mass {:.6} GeV below threshold {:.6} GeV",
                parent_mass,
                self.threshold()
            )));
        }

        if n == 2 {
            let cos_theta = 2.0 * rng.gen::<f64>() - 1.0;
            let phi = 2.0 * PI * rng.gen::<f64>();
            return Ok(Proposal {
                configuration: two_body_configuration(parent_mass, [self.masses[0], self.masses[1]], cos_theta, phi),
                attempts: 1,
            });
        }

        let wt_max = self.max_weight(parent_mass);
        let kinetic = parent_mass - self.threshold();
        for attempt in 1..=self.max_attempts {
            // invariant masses of the nested subsystems {0..i}
            let mut rno: Vec<f64> = (0..n - 2).map(|_| rng.gen::<f64>()).collect();
            rno.sort_by(|a, b| a.total_cmp(b));
            let mut inv_mass = Vec::with_capacity(n);
            let mut sum = 0.0;
            for i in 0..n {
                sum += self.masses[i];
                let r = match i {
                    0 => 0.0,
                    _ if i == n - 1 => 1.0,
                    _ => rno[i - 1],
                };
                inv_mass.push(r * kinetic + sum);
            }

            let pd: Vec<f64> = (0..n - 1)
                .map(|i| two_body_momentum(inv_mass[i + 1], inv_mass[i], self.masses[i + 1]))
                .collect();
            let weight = pd.iter().product::<f64>();
            if rng.gen::<f64>() * wt_max >= weight {
                continue;
            }

            let mut momenta = Vec::with_capacity(n);
            momenta.push(four_momentum(self.masses[0], Vector3::new(0.0, pd[0], 0.0)));
            momenta.push(four_momentum(self.masses[1], Vector3::new(0.0, -pd[0], 0.0)));
            for i in 1..n - 1 {
                // orient subsystem {0..i} at random in its rest frame, then
                // boost it against daughter i+1
                let cos_z = 2.0 * rng.gen::<f64>() - 1.0;
                let angle_y = 2.0 * PI * rng.gen::<f64>();
                let beta = pd[i] / (pd[i] * pd[i] + inv_mass[i] * inv_mass[i]).sqrt();
                for p in momenta.iter_mut() {
                    *p = boost_along_y(&rotate(p, cos_z, angle_y), beta);
                }
                momenta.push(four_momentum(self.masses[i + 1], Vector3::new(0.0, -pd[i], 0.0)));
            }
            let cos_z = 2.0 * rng.gen::<f64>() - 1.0;
            let angle_y = 2.0 * PI * rng.gen::<f64>();
            for p in momenta.iter_mut() {
                *p = rotate(p, cos_z, angle_y);
            }

            return Ok(Proposal {
                configuration: KinematicConfiguration { momenta },
                attempts: attempt,
            });
        }

        Err(DecayError::SamplingTimeout {
            model: "phase space".to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::invariant_mass;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_conserves(config: &KinematicConfiguration, parent_mass: f64, masses: &[f64]) {
        let total = config.total_momentum();
        assert!((total[0] - parent_mass).abs() < 1e-9 * parent_mass, "E = {}", total[0]);
        assert!(three_momentum(&total).norm() < 1e-9 * parent_mass);
        for (p, &m) in config.momenta.iter().zip(masses) {
            assert!((invariant_mass(p) - m).abs() < 1e-7, "mass {} vs {}", invariant_mass(p), m);
        }
    }

    #[test]
    fn test_two_body_back_to_back() {
        let config = two_body_configuration(3.0969, [0.105, 0.105], 0.2, 1.0);
        assert_conserves(&config, 3.0969, &[0.105, 0.105]);
        let (c, phi) = config.angles(0);
        assert!((c - 0.2).abs() < 1e-12);
        assert!((phi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_body_conservation() {
        let masses = vec![0.13957, 0.13957, 0.1349768];
        let ps = PhaseSpace::new(masses.clone(), 1000);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let proposal = ps.propose(0.78266, &mut rng).unwrap();
            assert_conserves(&proposal.configuration, 0.78266, &masses);
        }
    }

    #[test]
    fn test_four_body_conservation() {
        let masses = vec![0.493677, 0.493677, 0.13957, 0.13957];
        let ps = PhaseSpace::new(masses.clone(), 1000);
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..200 {
            let proposal = ps.propose(5.27965, &mut rng).unwrap();
            assert_conserves(&proposal.configuration, 5.27965, &masses);
            assert!(proposal.attempts >= 1);
        }
    }

    #[test]
    fn test_below_threshold_is_kinematics_error() {
        let ps = PhaseSpace::new(vec![1.0, 1.0], 10);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(ps.propose(1.5, &mut rng), Err(DecayError::Kinematics(_))));
    }

    #[test]
    fn test_two_body_direction_is_isotropic() {
        let ps = PhaseSpace::new(vec![0.493677, 0.493677], 10);
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20000;
        let mean_cos: f64 = (0..n)
            .map(|_| ps.propose(1.019461, &mut rng).unwrap().configuration.angles(0).0)
            .sum::<f64>()
            / n as f64;
        // standard error of <cos> is 1/sqrt(3n) ~ 0.004
        assert!(mean_cos.abs() < 0.02, "mean cos = {}", mean_cos);
    }

    #[test]
    fn test_three_body_dalitz_uniform_in_m12_squared_mean() {
        // for a massless three-body decay the Dalitz density is flat, so
        // <m12^2> = M^2 / 3
        let ps = PhaseSpace::new(vec![0.0, 0.0, 0.0], 1000);
        let mut rng = StdRng::seed_from_u64(21);
        let n = 20000;
        let mean: f64 = (0..n)
            .map(|_| {
                let c = ps.propose(3.0, &mut rng).unwrap().configuration;
                let p12 = c.momenta[0] + c.momenta[1];
                crate::kinematics::mass_squared(&p12)
            })
            .sum::<f64>()
            / n as f64;
        assert!((mean - 3.0).abs() < 0.1, "mean m12^2 = {}", mean);
    }
}
