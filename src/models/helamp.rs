// Generic two-body decay with user-supplied helicity couplings.

use super::helicity::TwoBodyHelicity;
use crate::config::{ChannelDefinition, SamplerSettings};
use crate::error::{DecayError, DecayResult};
use crate::model::{DecayModel, ModelCore};
use crate::particle::{Particle, ParticleRef};
use crate::sampler::SamplerStats;
use num_complex::Complex64;
use rand::RngCore;

/// `HELAMP`: `P -> 1 2` for any spins, with `H(l1, l2)` given as
/// `(magnitude, phase)` pairs, daughter 1 helicity outer and daughter 2
/// helicity inner, both descending. Every pair must be present, including
/// those the selection rule will zero.
#[derive(Debug, Clone)]
pub struct HelAmp {
    core: ModelCore,
    kernel: Option<TwoBodyHelicity>,
}

impl HelAmp {
    pub const NAME: &'static str = "HELAMP";

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

    pub fn couplings(&self) -> Option<&[Complex64]> {
        self.kernel.as_ref().map(|k| k.couplings.as_slice())
    }
}

impl Default for HelAmp {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayModel for HelAmp {
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
        self.core.check_daughter_count(&resolved, 2, Some(2))?;
        self.core.check_threshold(&resolved)?;

        let spins = [resolved.daughters[0].spin, resolved.daughters[1].spin];
        let pairs = spins[0].state_count() * spins[1].state_count();
        self.core.check_arg_count(channel, 2 * pairs, 2 * pairs)?;

        let mut couplings = Vec::with_capacity(pairs);
        for i in 0..pairs {
            let magnitude = self.core.arg_f64(channel, 2 * i)?;
            let phase = self.core.arg_f64(channel, 2 * i + 1)?;
            if magnitude < 0.0 {
                return Err(DecayError::config(
                    Self::NAME,
                    format!("coupling magnitude {} is negative ({})", i, magnitude),
                ));
            }
            couplings.push(Complex64::from_polar(magnitude, phase));
        }

        let kernel = TwoBodyHelicity::new(resolved.parent.spin, spins, couplings);
        if kernel.is_null() {
            return Err(DecayError::config(
                Self::NAME,
                "every coupling allowed by angular momentum conservation is zero",
            ));
        }
        self.kernel = Some(kernel);
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
