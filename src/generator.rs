// Batch event generation: one prototype copy and one random stream per worker.

use crate::error::{DecayError, DecayResult};
use crate::fast_rng::FastRng;
use crate::kinematics::{boost_to_frame_of, polar_angles, three_momentum};
use crate::model::DecayModel;
use crate::particle::Particle;
use crate::sampler::SamplerStats;
use crate::settings::{Settings, TimeoutPolicy};
use crate::stats::SampleStatistics;
use nalgebra::Vector4;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One generated decay, momenta as (E, px, py, pz) in the lab frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayRecord {
    pub parent: [f64; 4],
    pub daughter_species: Vec<String>,
    pub daughters: Vec<[f64; 4]>,
}

impl DecayRecord {
    fn from_parent(parent: &Particle) -> Self {
        let daughters = parent.daughters();
        Self {
            parent: parent.momentum.into(),
            daughter_species: daughters.iter().map(|d| d.borrow().species.clone()).collect(),
            daughters: daughters.iter().map(|d| d.borrow().momentum.into()).collect(),
        }
    }

    /// Polar cosine of daughter `index` in the parent rest frame.
    pub fn rest_frame_cos_theta(&self, index: usize) -> f64 {
        let p = Vector4::from(self.parent);
        let inverse = Vector4::new(p[0], -p[1], -p[2], -p[3]);
        let d = boost_to_frame_of(&Vector4::from(self.daughters[index]), &inverse);
        polar_angles(&three_momentum(&d)).0
    }
}

#[derive(Debug, Clone, Default)]
struct WorkerOutput {
    records: Vec<DecayRecord>,
    stats: SamplerStats,
    skipped: usize,
}

/// Merged result of a generator run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub records: Vec<DecayRecord>,
    pub stats: SamplerStats,
    /// Events dropped under [`TimeoutPolicy::SkipEvent`]
    pub skipped: usize,
    /// First-daughter rest-frame cos(theta)
    pub cos_theta: SampleStatistics,
    /// First-daughter rest-frame cos^2(theta)
    pub cos_theta_sq: SampleStatistics,
}

impl RunSummary {
    pub fn attempts(&self) -> u64 {
        self.stats.attempts
    }

    pub fn accepted(&self) -> u64 {
        self.stats.accepted
    }

    pub fn bound_violations(&self) -> u64 {
        self.stats.bound_violations
    }

    pub fn acceptance_rate(&self) -> f64 {
        self.stats.acceptance_rate()
    }
}

/// Drives a ready decay model over many parents.
#[derive(Debug)]
pub struct DecayGenerator {
    prototype: Box<dyn DecayModel>,
    settings: Settings,
}

impl DecayGenerator {
    /// The prototype must already be initialized and bounded.
    pub fn new(prototype: Box<dyn DecayModel>, settings: Settings) -> DecayResult<Self> {
        if prototype.density_bound().is_none() {
            return Err(DecayError::lifecycle(
                prototype.name(),
                "generator needs a model with an established bound",
            ));
        }
        if settings.workers == 0 {
            return Err(DecayError::config(prototype.name(), "workers must be at least 1"));
        }
        Ok(Self { prototype, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run(&self) -> DecayResult<RunSummary> {
        let outputs: Vec<DecayResult<WorkerOutput>> = (0..self.settings.workers)
            .into_par_iter()
            .map(|w| self.run_worker(w))
            .collect();

        let mut summary = RunSummary::default();
        for output in outputs {
            let output = output?;
            summary.stats.merge(&output.stats);
            summary.skipped += output.skipped;
            summary.records.extend(output.records);
        }
        for record in &summary.records {
            let c = record.rest_frame_cos_theta(0);
            summary.cos_theta.push(c);
            summary.cos_theta_sq.push(c * c);
        }

        info!(
            model = self.prototype.name(),
            events = summary.records.len(),
            skipped = summary.skipped,
            attempts = summary.attempts(),
            acceptance = summary.acceptance_rate(),
            bound_violations = summary.bound_violations(),
            "generator run finished"
        );
        Ok(summary)
    }

    fn run_worker(&self, worker: usize) -> DecayResult<WorkerOutput> {
        let mut model = self.prototype.clone_model();
        let mut rng = FastRng::for_stream(self.settings.seed, worker as u64);
        let events = self.settings.events_for_worker(worker);
        let mut output = WorkerOutput {
            records: Vec::with_capacity(events),
            ..Default::default()
        };

        for _ in 0..events {
            let parent = self.settings.source.sample(&mut rng)?.into_ref();
            match model.sample(&parent, &mut rng) {
                Ok(()) => output.records.push(DecayRecord::from_parent(&parent.borrow())),
                Err(err @ DecayError::SamplingTimeout { .. })
                    if self.settings.timeout_policy == TimeoutPolicy::SkipEvent =>
                {
                    warn!(worker, error = %err, "skipping event");
                    output.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        output.stats = model.stats().clone();
        Ok(output)
    }
}
