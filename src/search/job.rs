use num_bigint::BigUint;

/// Isotacticity classification of one search node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IsoStatus {
    /// Not yet decided; the node runs the oracle at its largest complexity.
    Unknown,
    /// Known isotactic, either from its own oracle round or inherited from
    /// an isotactic parent (growing `R` preserves isotacticity).
    Iso,
    /// The oracle rejected the alignment at the largest complexity.
    NotIso,
    /// Evaluation was skipped (pruned by the bound, non-total relation, or
    /// oracle failure).
    Skipped,
}

/// One unit of work: a candidate relation waiting for evaluation.
///
/// Created by a parent node (or by the driver for the root), consumed exactly
/// once by a worker, then discarded.
#[derive(Clone, Debug)]
pub struct Job {
    /// Bitmask code of the candidate relation.
    pub code: BigUint,
    /// Permissiveness of the relation, computed when the job was created.
    pub permissiveness: u16,
    /// Classification inherited from the parent (`Iso` propagates down the
    /// spanning tree; everything else arrives as `Unknown`).
    pub iso_status: IsoStatus,
    /// If the parent is isotactic, the smallest complexity for which it is
    /// known to be; the child is isotactic for the same complexity.
    pub parent_best_k: Option<u16>,
}

impl Job {
    /// The empty-relation root job that seeds the search.
    pub fn root() -> Job {
        Job {
            code: BigUint::from(0u8),
            permissiveness: 0,
            iso_status: IsoStatus::Unknown,
            parent_best_k: None,
        }
    }
}
