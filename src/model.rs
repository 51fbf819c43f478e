// The decay-model contract and the lifecycle glue shared by every channel.

use crate::config::{ChannelArg, ChannelDefinition, Config, SamplerSettings};
use crate::error::{DecayError, DecayResult};
use crate::kinematics::{boost_to_frame_of, three_momentum};
use crate::particle::{attach_daughters, Particle, ParticleRef};
use crate::particle_data::ParticleProperties;
use crate::phase_space::{KinematicConfiguration, PhaseSpace};
use crate::sampler::{scan_bound, Candidate, RejectionSampler, SamplerStats};
use crate::spin::{self, SpinType};
use nalgebra::DMatrix;
use num_complex::Complex64;
use rand::RngCore;
use std::fmt;
use tracing::{debug, info};

/// A decay channel plugin.
///
/// Instances move through `Created -> Initialized -> Ready`:
/// [`initialize`](DecayModel::initialize) binds a channel definition,
/// [`establish_bound`](DecayModel::establish_bound) fixes the density bound,
/// and only then may [`sample`](DecayModel::sample) be called. Workers
/// obtain their own instance through [`clone_model`](DecayModel::clone_model);
/// a single instance is never driven from two threads at once.
pub trait DecayModel: Send + Sync + fmt::Debug {
    /// Channel identifier, e.g. `"VPHOTOVISRHI"`.
    fn name(&self) -> &'static str;

    /// Independent instance with the same channel, couplings and bound but
    /// fresh sampling statistics.
    fn clone_model(&self) -> Box<dyn DecayModel>;

    fn initialize(&mut self, channel: &ChannelDefinition) -> DecayResult<()>;

    /// Search phase space for the density supremum and store it, inflated by
    /// the safety margin, as the density bound.
    fn establish_bound(&mut self, rng: &mut dyn RngCore) -> DecayResult<f64>;

    fn density_bound(&self) -> Option<f64>;

    fn stats(&self) -> &SamplerStats;

    fn channel(&self) -> Option<&ChannelDefinition>;

    /// Density of one random proposal for `parent`, without accept/reject.
    fn probe_density(&self, parent: &Particle, rng: &mut dyn RngCore) -> DecayResult<f64>;

    /// Generate the daughters of `parent` and attach them to it.
    fn sample(&mut self, parent: &ParticleRef, rng: &mut dyn RngCore) -> DecayResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Initialized,
    Ready,
}

/// Particle properties of a channel, resolved once at initialize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedChannel {
    pub parent: ParticleProperties,
    pub daughters: Vec<ParticleProperties>,
}

impl ResolvedChannel {
    pub fn daughter_masses(&self) -> Vec<f64> {
        self.daughters.iter().map(|d| d.mass).collect()
    }

    pub fn daughter_spins(&self) -> Vec<SpinType> {
        self.daughters.iter().map(|d| d.spin).collect()
    }
}

/// State every channel carries: lifecycle, bound channel, density bound,
/// sampler settings and statistics.
#[derive(Debug, Clone)]
pub struct ModelCore {
    name: &'static str,
    state: Lifecycle,
    channel: Option<ChannelDefinition>,
    resolved: Option<ResolvedChannel>,
    phase_space: Option<PhaseSpace>,
    bound: Option<f64>,
    settings: SamplerSettings,
    stats: SamplerStats,
}

impl ModelCore {
    /// Core using the sampler settings of the global [`Config`].
    pub fn new(name: &'static str) -> Self {
        let settings = Config::global().sampler;
        Self::with_settings(name, settings)
    }

    pub fn with_settings(name: &'static str, settings: SamplerSettings) -> Self {
        Self {
            name,
            state: Lifecycle::Created,
            channel: None,
            resolved: None,
            phase_space: None,
            bound: None,
            settings,
            stats: SamplerStats::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    pub fn bound(&self) -> Option<f64> {
        self.bound
    }

    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    pub fn channel(&self) -> Option<&ChannelDefinition> {
        self.channel.as_ref()
    }

    pub fn resolved(&self) -> Option<&ResolvedChannel> {
        self.resolved.as_ref()
    }

    /// Copy sharing channel, bound and settings, with zeroed statistics.
    pub fn fresh_copy(&self) -> Self {
        Self {
            stats: SamplerStats::default(),
            ..self.clone()
        }
    }

    fn config_error(&self, reason: impl Into<String>) -> DecayError {
        DecayError::config(self.name, reason)
    }

    pub fn not_initialized(&self) -> DecayError {
        DecayError::lifecycle(self.name, "model has not been initialized")
    }

    /// First half of initialize: lifecycle and model-name checks, and
    /// resolution of every particle name in the channel.
    pub fn resolve(&self, channel: &ChannelDefinition) -> DecayResult<ResolvedChannel> {
        if self.state != Lifecycle::Created {
            return Err(DecayError::lifecycle(self.name, "initialize called twice"));
        }
        if channel.model != self.name {
            return Err(self.config_error(format!(
                "channel names model '{}'",
                channel.model
            )));
        }
        self.settings.validate()?;
        let config = Config::global();
        let lookup = |species: &str| {
            config
                .properties(species)
                .map_err(|_| self.config_error(format!("unknown particle '{}'", species)))
        };
        let parent = lookup(&channel.parent)?;
        let daughters = channel
            .daughters
            .iter()
            .map(|d| lookup(d))
            .collect::<DecayResult<Vec<_>>>()?;
        Ok(ResolvedChannel { parent, daughters })
    }

    /// Second half of initialize: store the validated channel.
    pub fn commit(&mut self, channel: &ChannelDefinition, resolved: ResolvedChannel) {
        self.phase_space = Some(PhaseSpace::new(
            resolved.daughter_masses(),
            self.settings.phase_space_attempts,
        ));
        debug!(
            model = self.name,
            parent = %channel.parent,
            daughters = ?channel.daughters,
            args = channel.args.len(),
            "channel initialized"
        );
        self.channel = Some(channel.clone());
        self.resolved = Some(resolved);
        self.state = Lifecycle::Initialized;
    }

    pub fn check_arg_count(&self, channel: &ChannelDefinition, min: usize, max: usize) -> DecayResult<()> {
        let n = channel.args.len();
        if n < min || n > max {
            let expected = if min == max {
                format!("{}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(self.config_error(format!("expected {} arguments, got {}", expected, n)));
        }
        Ok(())
    }

    pub fn check_daughter_count(&self, resolved: &ResolvedChannel, min: usize, max: Option<usize>) -> DecayResult<()> {
        let n = resolved.daughters.len();
        let too_many = max.map_or(false, |m| n > m);
        if n < min || too_many {
            let expected = match max {
                Some(m) if m == min => format!("{}", min),
                Some(m) => format!("{} to {}", min, m),
                None => format!("at least {}", min),
            };
            return Err(self.config_error(format!("expected {} daughters, got {}", expected, n)));
        }
        Ok(())
    }

    pub fn check_parent_spin(&self, resolved: &ResolvedChannel, allowed: &[SpinType]) -> DecayResult<()> {
        if !allowed.contains(&resolved.parent.spin) {
            return Err(self.config_error(format!(
                "parent spin {:?} not one of {:?}",
                resolved.parent.spin, allowed
            )));
        }
        Ok(())
    }

    pub fn check_daughter_spin(&self, resolved: &ResolvedChannel, index: usize, allowed: &[SpinType]) -> DecayResult<()> {
        let spin = match resolved.daughters.get(index) {
            Some(d) => d.spin,
            None => {
                return Err(self.config_error(format!(
                    "no daughter {} among {} daughters",
                    index,
                    resolved.daughters.len()
                )))
            }
        };
        if !allowed.contains(&spin) {
            return Err(self.config_error(format!(
                "daughter {} spin {:?} not one of {:?}",
                index, spin, allowed
            )));
        }
        Ok(())
    }

    /// The daughters' nominal masses must leave phase space open.
    pub fn check_threshold(&self, resolved: &ResolvedChannel) -> DecayResult<()> {
        let threshold: f64 = resolved.daughters.iter().map(|d| d.mass).sum();
        if threshold >= resolved.parent.mass {
            return Err(self.config_error(format!(
                "daughter masses {:.6} GeV leave no phase space below parent mass {:.6} GeV",
                threshold, resolved.parent.mass
            )));
        }
        Ok(())
    }

    /// Numeric argument `index`, required to be finite.
    pub fn arg_f64(&self, channel: &ChannelDefinition, index: usize) -> DecayResult<f64> {
        match channel.args.get(index) {
            Some(ChannelArg::Number(v)) if v.is_finite() => Ok(*v),
            Some(ChannelArg::Number(v)) => {
                Err(self.config_error(format!("argument {} is not finite ({})", index, v)))
            }
            Some(ChannelArg::Text(t)) => {
                Err(self.config_error(format!("argument {} is not numeric ('{}')", index, t)))
            }
            None => Err(self.config_error(format!("missing argument {}", index))),
        }
    }

    fn initialized_parts(&self) -> DecayResult<(&ResolvedChannel, &PhaseSpace)> {
        match (&self.resolved, &self.phase_space) {
            (Some(r), Some(ps)) => Ok((r, ps)),
            _ => Err(self.not_initialized()),
        }
    }

    /// Run the bound scan at the parent nominal mass, maximizing `envelope`.
    pub fn establish_bound_with<E>(&mut self, rng: &mut dyn RngCore, envelope: E) -> DecayResult<f64>
    where
        E: FnMut(&KinematicConfiguration) -> f64,
    {
        match self.state {
            Lifecycle::Created => return Err(self.not_initialized()),
            Lifecycle::Ready => {
                return Err(DecayError::lifecycle(self.name, "density bound already established"))
            }
            Lifecycle::Initialized => {}
        }
        let (resolved, phase_space) = self.initialized_parts()?;
        let parent_mass = resolved.parent.mass;
        let bound = scan_bound(
            self.name,
            self.settings.scan_points,
            self.settings.safety_margin,
            rng,
            |r| phase_space.propose(parent_mass, r).map(|p| p.configuration),
            envelope,
        )?;
        info!(
            model = self.name,
            bound,
            scan_points = self.settings.scan_points,
            margin = self.settings.safety_margin,
            "density bound established"
        );
        self.bound = Some(bound);
        self.state = Lifecycle::Ready;
        Ok(bound)
    }

    /// Density of one proposal for `parent` under its own spin density.
    pub fn probe_density_with<D>(&self, parent: &Particle, rng: &mut dyn RngCore, mut density: D) -> DecayResult<f64>
    where
        D: FnMut(&KinematicConfiguration, &DMatrix<Complex64>) -> f64,
    {
        let (resolved, phase_space) = self.initialized_parts()?;
        let rho = self.check_parent(parent, resolved)?;
        let proposal = phase_space.propose(parent.mass, rng)?;
        Ok(density(&proposal.configuration, &rho))
    }

    /// Returns the parent spin density rescaled to trace equal to its state count.
    fn check_parent(&self, parent: &Particle, resolved: &ResolvedChannel) -> DecayResult<DMatrix<Complex64>> {
        let expected = self.channel.as_ref().map(|c| c.parent.as_str()).unwrap_or_default();
        if parent.species != expected || parent.spin != resolved.parent.spin {
            return Err(DecayError::Kinematics(format!(
                "{} cannot decay a {} ({:?}); channel parent is {}",
                self.name, parent.species, parent.spin, expected
            )));
        }
        if !spin::is_valid_spin_density(parent.spin, &parent.spin_density) {
            return Err(DecayError::Kinematics(format!(
                "{} spin density ({}x{}) is not a valid {:?} state",
                parent.species,
                parent.spin_density.nrows(),
                parent.spin_density.ncols(),
                parent.spin
            )));
        }
        Ok(spin::normalize_spin_density(&parent.spin_density))
    }

    /// Drive the rejection sampler for `parent`, then build, boost and attach
    /// the daughters.
    ///
    /// `density` weighs a rest-frame configuration for the parent spin density;
    /// `daughter_densities` gives the spin-density matrix of every daughter of
    /// the accepted configuration.
    pub fn sample_with<D, S>(
        &mut self,
        parent: &ParticleRef,
        rng: &mut dyn RngCore,
        mut density: D,
        daughter_densities: S,
    ) -> DecayResult<()>
    where
        D: FnMut(&KinematicConfiguration, &DMatrix<Complex64>) -> f64,
        S: FnOnce(&KinematicConfiguration, &DMatrix<Complex64>) -> Vec<DMatrix<Complex64>>,
    {
        let bound = match (self.state, self.bound) {
            (Lifecycle::Ready, Some(b)) => b,
            (Lifecycle::Created, _) => return Err(self.not_initialized()),
            _ => {
                return Err(DecayError::lifecycle(
                    self.name,
                    "sample called before establish_bound",
                ))
            }
        };

        let (parent_mass, parent_p4, rho) = {
            let p = parent.borrow();
            if p.is_decayed() {
                return Err(DecayError::lifecycle(
                    self.name,
                    format!("{} already has daughters", p.species),
                ));
            }
            let (resolved, _) = self.initialized_parts()?;
            let rho = self.check_parent(&p, resolved)?;
            (p.mass, p.momentum, rho)
        };

        let sampler = RejectionSampler::new(self.settings.max_iterations);
        let phase_space = match &self.phase_space {
            Some(ps) => ps,
            None => return Err(DecayError::lifecycle(self.name, "model has not been initialized")),
        };
        let (configuration, _) = sampler.sample(
            self.name,
            bound,
            rng,
            &mut self.stats,
            |r| {
                phase_space.propose(parent_mass, r).map(|p| Candidate {
                    value: p.configuration,
                    proposals: p.attempts,
                })
            },
            |c| density(c, &rho),
        )?;

        let densities = daughter_densities(&configuration, &rho);
        let (channel, resolved) = match (&self.channel, &self.resolved) {
            (Some(c), Some(r)) => (c, r),
            _ => return Err(self.not_initialized()),
        };
        let mut daughters = Vec::with_capacity(configuration.momenta.len());
        for (i, p4_rest) in configuration.momenta.iter().enumerate() {
            let props = &resolved.daughters[i];
            let p4 = boost_to_frame_of(p4_rest, &parent_p4);
            let mut d = Particle::new(channel.daughters[i].clone(), props.spin, props.mass, three_momentum(&p4));
            d.momentum = p4;
            if let Some(rho_d) = densities.get(i) {
                d.spin_density = rho_d.clone();
            }
            daughters.push(d);
        }
        attach_daughters(parent, daughters)
    }
}
