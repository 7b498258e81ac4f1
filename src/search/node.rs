use crate::alignment::AlignmentGraph;
use crate::oracle::OracleError;
use crate::relation::BitRelation;
use crate::search::{IsoStatus, Job, JobQueue, SearchContext};
use log::{debug, info, trace, warn};
use num_bigint::BigUint;
use std::sync::atomic::Ordering;
use std::time::Instant;

/// Evaluates one candidate relation and enqueues its spanning-tree children.
///
/// The evaluation pipeline, in order:
///
///  1. The empty relation skips straight to child enumeration.
///  2. Permissiveness gate: a relation whose permissiveness already reaches
///     the global bound cannot improve, and neither can any superset
///     (permissiveness grows monotonically with the relation), so the whole
///     subtree is cut.
///  3. Totality gate: non-total relations are skipped before the oracle,
///     but their children are still enumerated because adding pairs can make
///     a relation total.
///  4. Oracle round at the largest complexity, unless the parent was already
///     isotactic (in which case the verdict is inherited).
///  5. For isotactic relations, descend through the smaller complexities to
///     find the cheapest isotactic alignment, improving the global bound.
pub struct SearchNode<'a> {
    job: Job,
    relation: BitRelation<'a>,
    ctx: &'a SearchContext,
    queue: &'a JobQueue,
    /// Smallest complexity known isotactic for this relation, inherited from
    /// the parent when it was already isotactic.
    smallest_k: Option<u16>,
}

impl<'a> SearchNode<'a> {
    pub fn new(job: Job, ctx: &'a SearchContext, queue: &'a JobQueue) -> SearchNode<'a> {
        let relation =
            BitRelation::with_permissiveness(job.code.clone(), job.permissiveness, &ctx.space);
        SearchNode {
            smallest_k: job.parent_best_k,
            job,
            relation,
            ctx,
            queue,
        }
    }

    pub fn execute(mut self) {
        self.ctx.stats.jobs.fetch_add(1, Ordering::Relaxed);

        if !self.relation.is_empty() && !self.evaluate() {
            // Subtree cut by the permissiveness gate.
            return;
        }

        self.create_children();
    }

    /// Run the gates and oracle rounds. Returns `false` iff the whole
    /// subtree should be cut.
    fn evaluate(&mut self) -> bool {
        if self.relation.permissiveness() >= self.ctx.bound.get() {
            debug!(
                "cutting subtree of {}: permissiveness {} reaches bound {}",
                self.job.code,
                self.relation.permissiveness(),
                self.ctx.bound.get()
            );
            self.job.iso_status = IsoStatus::Skipped;
            self.ctx.stats.skipped_bound.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        if !self.relation.contains_all_symbols() {
            trace!("skipping {}: relation is not total", self.job.code);
            self.job.iso_status = IsoStatus::Skipped;
            self.ctx
                .stats
                .skipped_partial
                .fetch_add(1, Ordering::Relaxed);
            return true;
        }

        let graph = AlignmentGraph::build(&self.ctx.space, &self.relation);

        if self.job.iso_status == IsoStatus::Unknown {
            self.test_largest_k(&graph);
        }

        if self.job.iso_status == IsoStatus::Iso {
            self.descend(&graph);
        }

        true
    }

    /// Decide the relation at its largest complexity; an isotactic verdict
    /// here means the relation admits *some* isotactic alignment.
    fn test_largest_k(&mut self, graph: &AlignmentGraph) {
        let largest_k = graph
            .largest_k()
            .expect("non-empty relation has alignment nodes");

        match self.run_oracle(graph, largest_k) {
            Ok(true) => {
                self.job.iso_status = IsoStatus::Iso;
                self.smallest_k = Some(largest_k);
                let max_pc = self.relation.permissiveness().max(largest_k);
                if self
                    .ctx
                    .bound
                    .try_improve(max_pc, self.relation.code(), largest_k)
                {
                    info!(
                        "new best: R={{{}}} p={} k={} max_pc={}",
                        self.relation,
                        self.relation.permissiveness(),
                        largest_k,
                        max_pc
                    );
                }
            }
            Ok(false) => {
                trace!("{} is not isotactic", self.job.code);
                self.job.iso_status = IsoStatus::NotIso;
            }
            Err(error) => self.skip_after_oracle_failure(error),
        }
    }

    /// Walk the populated complexities upward from the smallest, looking for
    /// a cheaper isotactic alignment of an already-isotactic relation.
    fn descend(&mut self, graph: &AlignmentGraph) {
        let complexities: Vec<u16> = graph.complexities().collect();
        for k in complexities {
            if let Some(smallest_k) = self.smallest_k {
                if k >= smallest_k {
                    // Isotactic for every complexity from here up.
                    break;
                }
            }

            let max_pc = self.relation.permissiveness().max(k);
            if max_pc >= self.ctx.bound.get() {
                // Larger complexities only get worse.
                break;
            }

            match self.run_oracle(graph, k) {
                Ok(true) => {
                    self.smallest_k = Some(k);
                    if self.ctx.bound.try_improve(max_pc, self.relation.code(), k) {
                        info!(
                            "new best: R={{{}}} p={} k={} max_pc={} a={}",
                            self.relation,
                            self.relation.permissiveness(),
                            k,
                            max_pc,
                            graph.sorted_alignment(k)
                        );
                    }
                    break;
                }
                Ok(false) => {}
                Err(error) => {
                    self.skip_after_oracle_failure(error);
                    break;
                }
            }
        }
    }

    fn run_oracle(&self, graph: &AlignmentGraph, k: u16) -> Result<bool, OracleError> {
        self.ctx.stats.iso_tests.fetch_add(1, Ordering::Relaxed);
        let alignment = graph.to_oracle_alignment(k);

        let start = Instant::now();
        let verdict = self
            .ctx
            .oracle
            .is_isotactic(&self.ctx.m1, &self.ctx.m2, &alignment);
        self.ctx
            .stats
            .oracle_micros
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);

        match &verdict {
            Ok(true) => self.ctx.stats.iso_yes.fetch_add(1, Ordering::Relaxed),
            Ok(false) => self.ctx.stats.iso_no.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.ctx.stats.oracle_failures.fetch_add(1, Ordering::Relaxed),
        };
        verdict
    }

    fn skip_after_oracle_failure(&mut self, error: OracleError) {
        warn!("oracle failed on {}: {}; node skipped", self.job.code, error);
        self.job.iso_status = IsoStatus::Skipped;
    }

    /// Enqueue the spanning-tree children of this relation.
    ///
    /// A child is the relation plus one pair whose bit lies strictly above
    /// the relation's highest set bit; every subset of the pair universe is
    /// thereby generated from exactly one parent. Children whose
    /// permissiveness already reaches the bound are dropped here, cutting
    /// their subtrees before they are ever queued.
    fn create_children(&self) {
        let bound = self.ctx.bound.get();
        let (iso_status, parent_best_k) = if self.job.iso_status == IsoStatus::Iso {
            (IsoStatus::Iso, self.smallest_k)
        } else {
            (IsoStatus::Unknown, None)
        };

        let first_free_bit = self.job.code.bits();
        for j in first_free_bit..self.ctx.space.pair_count() as u64 {
            let code = &self.job.code | (BigUint::from(1u8) << j);
            let permissiveness = self.relation.permissiveness_of(&code);
            if permissiveness >= bound {
                trace!(
                    "dropping child {}: permissiveness {} reaches bound {}",
                    code, permissiveness, bound
                );
                continue;
            }

            trace!("search edge {} -> {}", self.job.code, code);
            self.queue.push(Job {
                code,
                permissiveness,
                iso_status,
                parent_best_k,
            });
        }
    }
}
