// Acceptance-rejection sampling against a precomputed density bound, and the
// bounded stochastic maximization that establishes that bound.

use crate::error::{DecayError, DecayResult};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Counters accumulated by one model instance across `sample` calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplerStats {
    /// Candidates evaluated by the accept/reject loop
    pub attempts: u64,
    /// Candidates accepted
    pub accepted: u64,
    /// Phase-space proposal trials, including internal weight rejections
    pub proposals: u64,
    /// Candidates whose density exceeded the bound
    pub bound_violations: u64,
    /// Largest density seen on a candidate
    pub max_density: f64,
    /// Sum of candidate densities, for the mean-density estimate
    pub density_sum: f64,
    /// `sample` calls that ended in a timeout
    pub timeouts: u64,
}

impl SamplerStats {
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }

    /// Mean density over all evaluated candidates.
    pub fn mean_density(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.density_sum / self.attempts as f64
        }
    }

    pub fn merge(&mut self, other: &SamplerStats) {
        self.attempts += other.attempts;
        self.accepted += other.accepted;
        self.proposals += other.proposals;
        self.bound_violations += other.bound_violations;
        self.max_density = self.max_density.max(other.max_density);
        self.density_sum += other.density_sum;
        self.timeouts += other.timeouts;
    }
}

/// A proposed candidate together with the number of proposal trials it cost.
pub struct Candidate<T> {
    pub value: T,
    pub proposals: usize,
}

/// Accept/reject loop bounded by an iteration budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectionSampler {
    pub max_iterations: usize,
}

impl RejectionSampler {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Draw candidates from `propose` until one is accepted.
    ///
    /// A candidate with density `w` is accepted when a uniform draw from
    /// `[0, bound)` is strictly below `w`. The bound is never adjusted here;
    /// densities above it are counted in `stats.bound_violations`.
    pub fn sample<T, P, D>(
        &self,
        model: &str,
        bound: f64,
        rng: &mut dyn RngCore,
        stats: &mut SamplerStats,
        mut propose: P,
        mut density: D,
    ) -> DecayResult<(T, f64)>
    where
        P: FnMut(&mut dyn RngCore) -> DecayResult<Candidate<T>>,
        D: FnMut(&T) -> f64,
    {
        for _ in 0..self.max_iterations {
            let candidate = propose(&mut *rng)?;
            stats.proposals += candidate.proposals as u64;
            stats.attempts += 1;

            let w = density(&candidate.value);
            stats.density_sum += w;
            stats.max_density = stats.max_density.max(w);
            if w > bound {
                stats.bound_violations += 1;
                warn!(model, density = w, bound, "probability density exceeds established bound");
            }

            let u = rng.gen::<f64>() * bound;
            if u < w {
                stats.accepted += 1;
                return Ok((candidate.value, w));
            }
        }
        stats.timeouts += 1;
        Err(DecayError::SamplingTimeout {
            model: model.to_string(),
            attempts: self.max_iterations,
        })
    }
}

/// Largest `envelope` value over `points` proposals, inflated by `margin`.
///
/// Fails with a numerical error when no positive finite maximum is found.
pub fn scan_bound<T, P, E>(
    model: &str,
    points: usize,
    margin: f64,
    rng: &mut dyn RngCore,
    mut propose: P,
    mut envelope: E,
) -> DecayResult<f64>
where
    P: FnMut(&mut dyn RngCore) -> DecayResult<T>,
    E: FnMut(&T) -> f64,
{
    let mut max = 0.0_f64;
    for _ in 0..points {
        let candidate = propose(&mut *rng)?;
        let w = envelope(&candidate);
        if !w.is_finite() {
            return Err(DecayError::numerical(
                model,
                format!("non-finite density {} during bound scan", w),
            ));
        }
        max = max.max(w);
    }
    if max <= 0.0 {
        return Err(DecayError::numerical(
            model,
            format!("no positive density found in {} scan points", points),
        ));
    }
    Ok(max * margin)
}
