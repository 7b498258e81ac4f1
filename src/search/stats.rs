use std::sync::atomic::{AtomicU64, Ordering};

/// Shared search counters, updated with relaxed atomics from all workers.
#[derive(Debug, Default)]
pub struct SearchStats {
    /// Jobs executed (= relations visited, including the empty root).
    pub jobs: AtomicU64,
    /// Oracle invocations.
    pub iso_tests: AtomicU64,
    /// Oracle invocations that answered "isotactic".
    pub iso_yes: AtomicU64,
    /// Oracle invocations that answered "not isotactic".
    pub iso_no: AtomicU64,
    /// Oracle invocations that failed.
    pub oracle_failures: AtomicU64,
    /// Nodes cut (with their subtree) by the permissiveness bound.
    pub skipped_bound: AtomicU64,
    /// Non-total relations skipped before the oracle.
    pub skipped_partial: AtomicU64,
    /// Wall-clock microseconds spent inside the oracle, summed over workers.
    pub oracle_micros: AtomicU64,
}

impl SearchStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            jobs: self.jobs.load(Ordering::Relaxed),
            iso_tests: self.iso_tests.load(Ordering::Relaxed),
            iso_yes: self.iso_yes.load(Ordering::Relaxed),
            iso_no: self.iso_no.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
            skipped_bound: self.skipped_bound.load(Ordering::Relaxed),
            skipped_partial: self.skipped_partial.load(Ordering::Relaxed),
            oracle_micros: self.oracle_micros.load(Ordering::Relaxed),
        }
    }
}

/// A plain copy of the counters at one point in time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub jobs: u64,
    pub iso_tests: u64,
    pub iso_yes: u64,
    pub iso_no: u64,
    pub oracle_failures: u64,
    pub skipped_bound: u64,
    pub skipped_partial: u64,
    pub oracle_micros: u64,
}
