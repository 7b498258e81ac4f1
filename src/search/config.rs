use crate::oracle::IsotacticOracle;
use crate::relation::SearchSpace;
use crate::search::{BestBound, SearchStats};
use std::path::PathBuf;
use std::sync::Arc;

/// Tunables for one search run.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Path to the first automaton, passed through to the oracle.
    pub m1: PathBuf,
    /// Path to the second automaton, passed through to the oracle.
    pub m2: PathBuf,
    /// Number of worker threads; `0` uses the hardware's available
    /// parallelism.
    pub workers: usize,
    /// Maximum queued jobs; `0` means unbounded.
    pub queue_capacity: usize,
    /// Jobs a worker pops per batch, amortizing queue contention on fast
    /// jobs deep in the tree.
    pub batch_size: usize,
}

impl SearchConfig {
    /// Defaults: hardware worker count, unbounded queue, batches of 10.
    pub fn new(m1: impl Into<PathBuf>, m2: impl Into<PathBuf>) -> SearchConfig {
        SearchConfig {
            m1: m1.into(),
            m2: m2.into(),
            workers: 0,
            queue_capacity: 0,
            batch_size: 10,
        }
    }

    pub fn workers(mut self, workers: usize) -> SearchConfig {
        self.workers = workers;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> SearchConfig {
        self.queue_capacity = capacity;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> SearchConfig {
        self.batch_size = batch_size.max(1);
        self
    }
}

/// Everything shared by the workers of one run: the immutable search space
/// and automaton paths, the oracle, the global bound and the counters.
pub struct SearchContext {
    pub space: SearchSpace,
    pub m1: PathBuf,
    pub m2: PathBuf,
    pub oracle: Arc<dyn IsotacticOracle>,
    pub bound: BestBound,
    pub stats: SearchStats,
}

impl SearchContext {
    pub fn new(
        space: SearchSpace,
        config: &SearchConfig,
        oracle: Arc<dyn IsotacticOracle>,
    ) -> SearchContext {
        let initial_bound = space.k_max();
        SearchContext {
            space,
            m1: config.m1.clone(),
            m2: config.m2.clone(),
            oracle,
            bound: BestBound::new(initial_bound),
            stats: SearchStats::default(),
        }
    }
}
