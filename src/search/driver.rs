use crate::oracle::IsotacticOracle;
use crate::relation::{BitRelation, SearchSpace};
use crate::search::{Job, JobQueue, SearchConfig, SearchContext, StatsSnapshot, WorkerPool};
use log::{debug, info};
use num_bigint::BigUint;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Result of one completed search run.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// The best `max_pc` found, or the initial loose bound `|S1| · |S2|` if
    /// no relation improved on it.
    pub best_max_pc: u16,
    /// Relation code of the best alignment; `0` if none was found.
    pub best_code: BigUint,
    /// Smallest complexity of the best alignment; `None` if none was found.
    pub best_k: Option<u16>,
    /// Total wall-clock search time.
    pub elapsed: Duration,
    /// Approximate wall-clock share spent inside the oracle (oracle time is
    /// summed across workers, so it is averaged over the worker count).
    pub in_oracle: Duration,
    pub workers: usize,
    pub stats: StatsSnapshot,
}

impl SearchOutcome {
    /// Whether any isotactic alignment was found at all.
    pub fn found_alignment(&self) -> bool {
        self.best_k.is_some()
    }

    /// Decode the best relation against its search space.
    pub fn best_relation<'a>(&self, space: &'a SearchSpace) -> BitRelation<'a> {
        BitRelation::new(self.best_code.clone(), space)
    }
}

/// Seeds the root job, waits for the queue to drain, and collects the
/// outcome.
pub struct SearchDriver {
    config: SearchConfig,
    ctx: Arc<SearchContext>,
}

impl SearchDriver {
    pub fn new(
        space: SearchSpace,
        config: SearchConfig,
        oracle: Arc<dyn IsotacticOracle>,
    ) -> SearchDriver {
        let ctx = Arc::new(SearchContext::new(space, &config, oracle));
        SearchDriver { config, ctx }
    }

    /// Run the search to completion.
    pub fn run(self) -> SearchOutcome {
        let queue = Arc::new(JobQueue::new(self.config.queue_capacity));
        let mut pool = WorkerPool::new(
            Arc::clone(&self.ctx),
            Arc::clone(&queue),
            self.config.workers,
            self.config.batch_size,
        );

        info!(
            "searching {} candidate relations over {} pairs with {} workers",
            self.ctx.space.relation_count(),
            self.ctx.space.pair_count(),
            pool.worker_count()
        );

        pool.start();
        let reporter_stop = Arc::new(AtomicBool::new(false));
        let reporter = spawn_reporter(
            Arc::clone(&self.ctx),
            Arc::clone(&queue),
            Arc::clone(&reporter_stop),
        );

        let start = Instant::now();
        queue.push(Job::root());
        queue.wait_until_finished();
        let elapsed = start.elapsed();

        debug!("queue drained, stopping workers");
        pool.stop();
        pool.join();
        reporter_stop.store(true, Ordering::Relaxed);
        reporter.join().expect("reporter thread panicked");

        let best = self.ctx.bound.snapshot();
        let stats = self.ctx.stats.snapshot();
        let outcome = SearchOutcome {
            best_max_pc: best.max_pc,
            best_code: best.code,
            best_k: best.k,
            elapsed,
            in_oracle: Duration::from_micros(stats.oracle_micros / pool.worker_count() as u64),
            workers: pool.worker_count(),
            stats,
        };
        log_outcome(&outcome);
        outcome
    }
}

/// Periodically report test throughput and queue size while the search runs.
///
/// Throughput is measured from the first observed test so that slow startup
/// does not skew the rate.
fn spawn_reporter(
    ctx: Arc<SearchContext>,
    queue: Arc<JobQueue>,
    stop: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut first_test_at: Option<Instant> = None;
        let mut ticks = 0u32;
        while !stop.load(Ordering::Relaxed) {
            std::thread::sleep(Duration::from_millis(100));
            ticks += 1;
            if ticks % 10 != 0 {
                continue;
            }

            let tests = ctx.stats.iso_tests.load(Ordering::Relaxed);
            if tests > 0 && first_test_at.is_none() {
                first_test_at = Some(Instant::now());
            }
            if let Some(since) = first_test_at {
                let seconds = since.elapsed().as_secs_f64();
                if seconds > 0.0 {
                    info!(
                        "tests: {}, tests/s: {:.1}, queue size: {}",
                        tests,
                        tests as f64 / seconds,
                        queue.size()
                    );
                }
            }
        }
    })
}

fn log_outcome(outcome: &SearchOutcome) {
    info!(
        "{} microseconds elapsed, {} in iso-decision ({:.1}%)",
        outcome.elapsed.as_micros(),
        outcome.in_oracle.as_micros(),
        100.0 * outcome.in_oracle.as_secs_f64()
            / outcome.elapsed.as_secs_f64().max(f64::MIN_POSITIVE)
    );
    info!(
        "iso tests: {} ({} iso, {} not iso, {} failed)",
        outcome.stats.iso_tests,
        outcome.stats.iso_yes,
        outcome.stats.iso_no,
        outcome.stats.oracle_failures
    );
    match outcome.best_k {
        Some(k) => info!(
            "best max_pc: {} (relation code {}, complexity {})",
            outcome.best_max_pc, outcome.best_code, k
        ),
        None => info!(
            "no isotactic alignment found, best max_pc stays at {}",
            outcome.best_max_pc
        ),
    }
}
