// Virtual photon -> vector meson + photon as a two-body helicity decay.

use super::helicity::TwoBodyHelicity;
use crate::config::{ChannelDefinition, SamplerSettings};
use crate::error::{DecayError, DecayResult};
use crate::model::{DecayModel, ModelCore};
use crate::particle::{Particle, ParticleRef};
use crate::sampler::SamplerStats;
use crate::spin::SpinType;
use num_complex::Complex64;
use rand::RngCore;

/// `VPHOTOVISRHI`: `vpho -> V gamma`.
///
/// The vector meson and the photon are produced back to back with
/// helicity couplings `H(+1, +1) = H(-1, -1) = 1` and
/// `H(0, +1) = H(0, -1) = r`, where `r` is the optional channel argument
/// (longitudinal over transverse coupling, default 1). The remaining
/// combinations carry helicity 2 along the decay axis and vanish.
///
/// The photon energy follows from two-body kinematics at the parent's
/// per-event mass; no radiator spectrum is applied.
#[derive(Debug, Clone)]
pub struct VphoToVIsrHi {
    core: ModelCore,
    kernel: Option<TwoBodyHelicity>,
}

impl VphoToVIsrHi {
    pub const NAME: &'static str = "VPHOTOVISRHI";

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

    /// Coupling table for ratio `r`, vector helicities (+1, 0, -1) outer,
    /// photon helicities (+1, -1) inner.
    pub fn couplings(ratio: f64) -> Vec<Complex64> {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let r = Complex64::new(ratio, 0.0);
        vec![one, zero, r, r, zero, one]
    }

    pub fn ratio(&self) -> Option<f64> {
        self.kernel.as_ref().map(|k| k.couplings[2].re)
    }
}

impl Default for VphoToVIsrHi {
    fn default() -> Self {
        Self::new()
    }
}

impl DecayModel for VphoToVIsrHi {
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
        self.core.check_arg_count(channel, 0, 1)?;
        self.core.check_daughter_count(&resolved, 2, Some(2))?;
        self.core.check_parent_spin(&resolved, &[SpinType::Vector])?;
        self.core.check_daughter_spin(&resolved, 0, &[SpinType::Vector])?;
        self.core.check_daughter_spin(&resolved, 1, &[SpinType::Photon])?;
        self.core.check_threshold(&resolved)?;

        let ratio = if channel.args.is_empty() {
            1.0
        } else {
            self.core.arg_f64(channel, 0)?
        };
        if ratio < 0.0 {
            return Err(DecayError::config(
                Self::NAME,
                format!("coupling ratio must be non-negative, got {}", ratio),
            ));
        }

        self.kernel = Some(TwoBodyHelicity::new(
            SpinType::Vector,
            [SpinType::Vector, SpinType::Photon],
            Self::couplings(ratio),
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
