//! Helicity-amplitude decay models driven by rejection sampling.
//!
//! A decay channel is a [`DecayModel`]: it is created from the
//! [`ModelRegistry`], initialized with a [`ChannelDefinition`], bounded once
//! with `establish_bound`, and then called once per event to attach daughters
//! to a [`Particle`]. [`DecayGenerator`] runs a bounded prototype across rayon
//! workers, one prototype copy and one [`FastRng`] stream per worker.

pub mod amplitude;
pub mod config;
pub mod density;
pub mod error;
pub mod fast_rng;
pub mod generator;
pub mod kinematics;
pub mod model;
pub mod models;
pub mod particle;
pub mod particle_data;
pub mod phase_space;
pub mod registry;
pub mod sampler;
pub mod settings;
pub mod source;
pub mod spin;
pub mod stats;

pub use amplitude::{two_body_helicity_amplitudes, HelicityAmplitudes};
pub use config::{read_channels_from_json, ChannelArg, ChannelDefinition, Config, SamplerSettings};
pub use density::{decay_density, polarization_envelope, unpolarized_density};
pub use error::{DecayError, DecayResult};
pub use fast_rng::FastRng;
pub use generator::{DecayGenerator, DecayRecord, RunSummary};
pub use model::{DecayModel, Lifecycle, ModelCore};
pub use particle::{attach_daughters, Particle, ParticleRef};
pub use particle_data::ParticleProperties;
pub use phase_space::{KinematicConfiguration, PhaseSpace};
pub use registry::{ModelRegistry, BUILTIN_MODELS};
pub use sampler::{RejectionSampler, SamplerStats};
pub use settings::{Settings, TimeoutPolicy};
pub use source::{MassDistribution, ParentSource, Polarization};
pub use spin::SpinType;
pub use stats::{pearson_correlation, AngularDistribution, SampleStatistics};
