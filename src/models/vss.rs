// Vector -> scalar scalar.

use super::helicity::TwoBodyHelicity;
use crate::config::{ChannelDefinition, SamplerSettings};
use crate::error::DecayResult;
use crate::model::{DecayModel, ModelCore};
use crate::particle::{Particle, ParticleRef};
use crate::sampler::SamplerStats;
use crate::spin::SpinType;
use num_complex::Complex64;
use rand::RngCore;

/// `VSS`: a vector decaying to two spinless particles, e.g. `phi -> K+ K-`.
/// A single helicity coupling; the angular distribution follows the parent
/// polarization through `d^1_{l,0}`.
#[derive(Debug, Clone)]
pub struct Vss {
    core: ModelCore,
    kernel: Option<TwoBodyHelicity>,
}

impl Vss {
    pub const NAME: &'static str = "VSS";

    pub fn new() -> Self {
        Self {
            core: ModelCore::new(Self::NAME),
            kernel: None,
        }
    }

    pub fn with_settings(settings: SamplerSettings) -> Self {
        Self {
            core: ModelCore::with_settings(Self::NAME, settings),
            kernel: None,
        }
    }
}

impl Default for Vss {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayModel for Vss {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn clone_model(&self) -> Box<dyn DecayModel> {
        Box::new(Self {
            core: self.core.fresh_copy(),
            kernel: self.kernel.clone(),
        })
    }

    fn initialize(&mut self, channel: &ChannelDefinition) -> DecayResult<()> {
        let resolved = self.core.resolve(channel)?;
        self.core.check_arg_count(channel, 0, 0)?;
        self.core.check_daughter_count(&resolved, 2, Some(2))?;
        self.core.check_parent_spin(&resolved, &[SpinType::Vector])?;
        self.core.check_daughter_spin(&resolved, 0, &[SpinType::Scalar])?;
        self.core.check_daughter_spin(&resolved, 1, &[SpinType::Scalar])?;
        self.core.check_threshold(&resolved)?;

        self.kernel = Some(TwoBodyHelicity::new(
            SpinType::Vector,
            [SpinType::Scalar, SpinType::Scalar],
            vec![Complex64::new(1.0, 0.0)],
        ));
        self.core.commit(channel, resolved);
        Ok(())
    }

    fn establish_bound(&mut self, rng: &mut dyn RngCore) -> DecayResult<f64> {
        let kernel = self.kernel.as_ref().ok_or_else(|| self.core.not_initialized())?;
        self.core.establish_bound_with(rng, |c| kernel.envelope(c))
    }

    fn density_bound(&self) -> Option<f64> {
        self.core.bound()
    }

    fn stats(&self) -> &SamplerStats {
        self.core.stats()
    }

    fn channel(&self) -> Option<&ChannelDefinition> {
        self.core.channel()
    }

    fn probe_density(&self, parent: &Particle, rng: &mut dyn RngCore) -> DecayResult<f64> {
        let kernel = self.kernel.as_ref().ok_or_else(|| self.core.not_initialized())?;
        self.core.probe_density_with(parent, rng, |c, rho| kernel.density(c, rho))
    }

    fn sample(&mut self, parent: &ParticleRef, rng: &mut dyn RngCore) -> DecayResult<()> {
        let kernel = self.kernel.as_ref().ok_or_else(|| self.core.not_initialized())?;
        self.core.sample_with(
            parent,
            rng,
            |c, rho| kernel.density(c, rho),
            |c, rho| kernel.daughter_densities(c, rho),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelArg;
    use crate::error::DecayError;
    use crate::kinematics::polar_angles;
    use crate::spin::pure_helicity;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ready() -> Vss {
        let mut model = Vss::with_settings(SamplerSettings {
            scan_points: 2000,
            ..Default::default()
        });
        model
            .initialize(&ChannelDefinition::new("VSS", "phi", &["K+", "K-"], vec![]))
            .unwrap();
        model.establish_bound(&mut StdRng::seed_from_u64(1)).unwrap();
        model
    }

    #[test]
    fn test_bound_is_margin_times_three() {
        // the envelope of V -> SS is 3 everywhere
        let model = ready();
        assert!((model.density_bound().unwrap() - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_unpolarized_decay_is_isotropic_with_flat_acceptance() {
        let mut model = ready();
        let mut rng = StdRng::seed_from_u64(2);
        let n = 5000;
        let mut sum_cos = 0.0;
        for _ in 0..n {
            let parent = Particle::at_rest("phi", SpinType::Vector, 1.019461).into_ref();
            model.sample(&parent, &mut rng).unwrap();
            sum_cos += polar_angles(&parent.borrow().daughters()[0].borrow().three_momentum()).0;
        }
        assert!((sum_cos / n as f64).abs() < 0.03);
        // unpolarized density is 1 against a bound of 3.6
        assert!((model.stats().acceptance_rate() - 1.0 / 3.6).abs() < 0.02);
    }

    #[test]
    fn test_longitudinal_parent() {
        let mut model = ready();
        let mut rng = StdRng::seed_from_u64(5);
        let n = 5000;
        let mut sum = 0.0;
        for _ in 0..n {
            let mut parent = Particle::at_rest("phi", SpinType::Vector, 1.019461);
            parent.set_spin_density(pure_helicity(SpinType::Vector, 0).unwrap()).unwrap();
            let parent = parent.into_ref();
            model.sample(&parent, &mut rng).unwrap();
            let (c, _) = polar_angles(&parent.borrow().daughters()[0].borrow().three_momentum());
            sum += c * c;
        }
        // cos^2 theta distribution: <cos^2> = 3/5
        assert!((sum / n as f64 - 0.6).abs() < 0.015);
    }

    #[test]
    fn test_rejects_arguments() {
        let mut model = Vss::with_settings(SamplerSettings::default());
        let channel = ChannelDefinition::new("VSS", "phi", &["K+", "K-"], vec![ChannelArg::Number(1.0)]);
        assert!(matches!(model.initialize(&channel), Err(DecayError::Config { .. })));
    }
}
