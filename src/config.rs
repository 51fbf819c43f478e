// Global configuration for decay sampling and channel definitions
use crate::error::{DecayError, DecayResult};
use crate::particle_data::{self, ParticleProperties};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

// Process-wide defaults picked up by newly created decay models
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Budgets and margins used by the rejection sampler and the bound scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    /// Accept/reject iterations allowed per `sample` call
    pub max_iterations: usize,
    /// Internal weight-rejection trials allowed per N-body proposal
    pub phase_space_attempts: usize,
    /// Proposals evaluated when establishing the density bound
    pub scan_points: usize,
    /// Factor applied to the scanned maximum
    pub safety_margin: f64,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            phase_space_attempts: 10_000,
            scan_points: 20_000,
            safety_margin: 1.2,
        }
    }
}

impl SamplerSettings {
    pub fn validate(&self) -> DecayResult<()> {
        if self.max_iterations == 0 {
            return Err(DecayError::config("sampler settings", "max_iterations must be positive"));
        }
        if self.phase_space_attempts == 0 {
            return Err(DecayError::config(
                "sampler settings",
                "phase_space_attempts must be positive",
            ));
        }
        if self.scan_points == 0 {
            return Err(DecayError::config("sampler settings", "scan_points must be positive"));
        }
        if !self.safety_margin.is_finite() || self.safety_margin < 1.0 {
            return Err(DecayError::config(
                "sampler settings",
                format!("safety_margin must be finite and >= 1, got {}", self.safety_margin),
            ));
        }
        Ok(())
    }
}

/// One ordered argument token of a channel definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelArg {
    Number(f64),
    Text(String),
}

impl From<f64> for ChannelArg {
    fn from(value: f64) -> Self {
        ChannelArg::Number(value)
    }
}

impl From<&str> for ChannelArg {
    fn from(value: &str) -> Self {
        ChannelArg::Text(value.to_string())
    }
}

/// A decay channel as handed to `DecayModel::initialize`.
///
/// ```json
/// {"model": "VPHOTOVISRHI", "parent": "vpho", "daughters": ["J/psi", "gamma"], "args": [1.0]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    pub model: String,
    pub parent: String,
    pub daughters: Vec<String>,
    #[serde(default)]
    pub args: Vec<ChannelArg>,
}

impl ChannelDefinition {
    pub fn new(model: &str, parent: &str, daughters: &[&str], args: Vec<ChannelArg>) -> Self {
        Self {
            model: model.to_string(),
            parent: parent.to_string(),
            daughters: daughters.iter().map(|d| d.to_string()).collect(),
            args,
        }
    }

    pub fn from_json_str(json: &str) -> DecayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read a JSON array of channel definitions from a file.
pub fn read_channels_from_json<P: AsRef<Path>>(path: P) -> DecayResult<Vec<ChannelDefinition>> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&text)?)
}

/// Global configuration container for decay generation.
///
/// Holds the sampler settings new models start from and per-species mass
/// overrides applied on top of the static particle table. A single global
/// instance is exposed via the `CONFIG` static; obtain a guard with
/// [`Config::global`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub sampler: SamplerSettings,
    /// Species name -> nominal mass in GeV replacing the table value
    pub mass_overrides: HashMap<String, f64>,
}

impl Config {
    pub fn new() -> Self {
        Config {
            sampler: SamplerSettings::default(),
            mass_overrides: HashMap::new(),
        }
    }

    /// Override the nominal mass of one species.
    pub fn set_mass(&mut self, species: &str, mass: f64) -> DecayResult<()> {
        if !mass.is_finite() || mass < 0.0 {
            return Err(DecayError::config(
                "config",
                format!("mass override for {} must be finite and non-negative, got {}", species, mass),
            ));
        }
        if particle_data::lookup(species).is_none() {
            return Err(DecayError::UnknownParticle(species.to_string()));
        }
        self.mass_overrides.insert(species.to_string(), mass);
        Ok(())
    }

    /// Set several mass overrides at once
    pub fn set_masses<T>(&mut self, input: T) -> DecayResult<()>
    where
        T: IntoMassOverrides,
    {
        input.apply(self)
    }

    pub fn set_sampler(&mut self, sampler: SamplerSettings) -> DecayResult<()> {
        sampler.validate()?;
        self.sampler = sampler;
        Ok(())
    }

    /// Table properties of `species` with any mass override applied.
    pub fn properties(&self, species: &str) -> DecayResult<ParticleProperties> {
        let mut props = particle_data::lookup(species)
            .ok_or_else(|| DecayError::UnknownParticle(species.to_string()))?;
        if let Some(&mass) = self.mass_overrides.get(species) {
            props.mass = mass;
        }
        Ok(props)
    }

    /// Restore the defaults
    pub fn clear(&mut self) {
        self.mass_overrides.clear();
        self.sampler = SamplerSettings::default();
    }
}

/// Trait to allow flexible input types for set_masses
pub trait IntoMassOverrides {
    fn apply(self, config: &mut Config) -> DecayResult<()>;
}

impl IntoMassOverrides for HashMap<String, f64> {
    fn apply(self, config: &mut Config) -> DecayResult<()> {
        for (species, mass) in self {
            config.set_mass(&species, mass)?;
        }
        Ok(())
    }
}

impl IntoMassOverrides for &[(&str, f64)] {
    fn apply(self, config: &mut Config) -> DecayResult<()> {
        for &(species, mass) in self {
            config.set_mass(species, mass)?;
        }
        Ok(())
    }
}

impl Config {
    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
