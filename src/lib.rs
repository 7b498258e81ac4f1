//! Parallel branch-and-bound search for optimal isotactic alignments.
//!
//! Given two labeled transition models `M1` and `M2` with edge-label alphabets
//! `S1` and `S2`, the search looks for a binary relation `R ⊆ S1 × S2` and a
//! grouping of `R` (an *alignment*) under which `M1` and `M2` are isotactic,
//! minimizing `max_pc = max(permissiveness, complexity)`.
//!
//! The crate is organized around the search core:
//!
//!  - [`relation`] encodes candidate relations as big-integer bitmasks over
//!    the `|S1|·|S2|` pair universe and computes permissiveness and totality.
//!  - [`alignment`] builds, per candidate relation, the lattice of alignment
//!    pairs reachable by merging symbols, grouped by complexity.
//!  - [`oracle`] is the seam to the external isotactic-decision procedure.
//!  - [`search`] contains the shared best-known bound, the blocking job
//!    queue, the per-job evaluation pipeline with spanning-tree child
//!    enumeration, the worker pool, and the driver.
//!  - [`automaton`] reads the edge-label alphabets from automaton files.
//!
//! The subset universe is enumerated as a spanning tree: children of a
//! relation code `c` are exactly `c | (1 << j)` for bits `j` above the highest
//! set bit of `c`, so each of the `2^N` candidate relations has a unique
//! parent and is visited at most once. A globally shared upper bound on
//! `max_pc` prunes subtrees that cannot improve on the best alignment found
//! so far.

pub mod alignment;
pub mod automaton;
pub mod oracle;
pub mod relation;
pub mod search;

#[cfg(test)]
mod test_utils;
