use crate::source::ParentSource;
use serde::{Deserialize, Serialize};

/// What the generator does when a `sample` call times out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutPolicy {
    /// Stop the run and return the error
    #[default]
    AbortRun,
    /// Count the event as skipped and continue
    SkipEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub events: usize,
    /// Worker count; each worker drives its own model copy and random stream
    pub workers: usize,
    pub seed: u64,
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
    pub source: ParentSource,
}

impl Settings {
    pub fn new(events: usize, source: ParentSource) -> Self {
        Self {
            events,
            workers: 1,
            seed: 1,
            timeout_policy: TimeoutPolicy::AbortRun,
            source,
        }
    }

    /// Events assigned to worker `index`; the first `events % workers`
    /// workers take one extra.
    pub fn events_for_worker(&self, index: usize) -> usize {
        let workers = self.workers.max(1);
        let base = self.events / workers;
        let extra = usize::from(index < self.events % workers);
        base + extra
    }
}
