// Pure phase space.

use crate::config::{ChannelDefinition, SamplerSettings};
use crate::error::DecayResult;
use crate::model::{DecayModel, ModelCore};
use crate::particle::{Particle, ParticleRef};
use crate::sampler::SamplerStats;
use rand::RngCore;

/// `PHSP`: any parent to two or more daughters with a constant density.
/// Daughters come out unpolarized.
#[derive(Debug, Clone)]
pub struct Phsp {
    core: ModelCore,
}

impl Phsp {
    pub const NAME: &'static str = "PHSP";

    pub fn new() -> Self {
        Self {
            core: ModelCore::new(Self::NAME),
        }
    }

    pub fn with_settings(settings: SamplerSettings) -> Self {
        Self {
            core: ModelCore::with_settings(Self::NAME, settings),
        }
    }
}

impl Default for Phsp {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayModel for Phsp {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn clone_model(&self) -> Box<dyn DecayModel> {
        Box::new(Self {
            core: self.core.fresh_copy(),
        })
    }

    fn initialize(&mut self, channel: &ChannelDefinition) -> DecayResult<()> {
        let resolved = self.core.resolve(channel)?;
        self.core.check_arg_count(channel, 0, 0)?;
        self.core.check_daughter_count(&resolved, 2, None)?;
        self.core.check_threshold(&resolved)?;
        self.core.commit(channel, resolved);
        Ok(())
    }

    fn establish_bound(&mut self, rng: &mut dyn RngCore) -> DecayResult<f64> {
        self.core.establish_bound_with(rng, |_| 1.0)
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
        self.core.probe_density_with(parent, rng, |_, _| 1.0)
    }

    fn sample(&mut self, parent: &ParticleRef, rng: &mut dyn RngCore) -> DecayResult<()> {
        self.core.sample_with(parent, rng, |_, _| 1.0, |_, _| Vec::new())
    }
}
