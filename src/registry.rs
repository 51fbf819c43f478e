// Name -> constructor lookup for decay models.

use crate::config::ChannelDefinition;
use crate::error::{DecayError, DecayResult};
use crate::model::DecayModel;
use crate::models::{HelAmp, Phsp, VphoToVIsrHi, Vss};
use once_cell::sync::Lazy;
use rand::RngCore;
use std::collections::HashMap;

pub type ModelFactory = fn() -> Box<dyn DecayModel>;

/// Registry holding every built-in channel.
pub static BUILTIN_MODELS: Lazy<ModelRegistry> = Lazy::new(ModelRegistry::with_builtins);

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    factories: HashMap<&'static str, ModelFactory>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [ModelFactory; 4] = [
            || Box::new(VphoToVIsrHi::new()),
            || Box::new(Vss::new()),
            || Box::new(HelAmp::new()),
            || Box::new(Phsp::new()),
        ];
        for factory in builtins {
            // names are distinct, so registration cannot collide
            let name = factory().name();
            registry.factories.insert(name, factory);
        }
        registry
    }

    /// Add a factory under the name its models report.
    pub fn register(&mut self, factory: ModelFactory) -> DecayResult<()> {
        let name = factory().name();
        if self.factories.contains_key(name) {
            return Err(DecayError::config(name, "model name already registered"));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Fresh, uninitialized model.
    pub fn create(&self, name: &str) -> DecayResult<Box<dyn DecayModel>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| DecayError::UnknownModel(name.to_string()))
    }

    /// Create, initialize and bound a model for `channel`.
    pub fn build(&self, channel: &ChannelDefinition, rng: &mut dyn RngCore) -> DecayResult<Box<dyn DecayModel>> {
        let mut model = self.create(&channel.model)?;
        model.initialize(channel)?;
        model.establish_bound(rng)?;
        Ok(model)
    }
}
