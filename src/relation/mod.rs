//! Symbol sets and bitmask-coded binary relations.
//!
//! A [`SearchSpace`] fixes the two alphabets for one search run and derives
//! the canonical pair universe: pair `(i1, i2)` sits at bit position
//! `i2 · |S1| + i1`. A [`BitRelation`] is a subset of that universe, encoded
//! as a [`num_bigint::BigUint`] so the code can exceed a machine word when
//! `|S1| · |S2| > 63`.

mod bit_relation;

pub use bit_relation::BitRelation;

use num_bigint::BigUint;
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised when constructing a [`SearchSpace`].
#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("symbol set {side} is empty")]
    EmptySide { side: &'static str },
    #[error("symbol set {side} contains duplicate label {label:?}")]
    DuplicateSymbol { side: &'static str, label: String },
    #[error("symbol sets too large: {count} symbols total, at most 64 supported")]
    TooManySymbols { count: usize },
}

/// The immutable context of one search run: both alphabets and the canonical
/// pair table.
///
/// Alignment-pair masks pack one bit per symbol of `S1 ∪ S2` into a `u64`,
/// which is why construction rejects `|S1| + |S2| > 64`. Relation codes are
/// arbitrary-precision and carry no such limit.
#[derive(Clone, Debug)]
pub struct SearchSpace {
    symbols_left: Vec<String>,
    symbols_right: Vec<String>,
    /// All candidate pairs as index pairs, in canonical order.
    pairs: Vec<(u16, u16)>,
}

impl SearchSpace {
    /// Create a search space from the two alphabets.
    pub fn new(
        symbols_left: Vec<String>,
        symbols_right: Vec<String>,
    ) -> Result<SearchSpace, SpaceError> {
        if symbols_left.is_empty() {
            return Err(SpaceError::EmptySide { side: "S1" });
        }
        if symbols_right.is_empty() {
            return Err(SpaceError::EmptySide { side: "S2" });
        }
        if symbols_left.len() + symbols_right.len() > 64 {
            return Err(SpaceError::TooManySymbols {
                count: symbols_left.len() + symbols_right.len(),
            });
        }
        check_distinct("S1", &symbols_left)?;
        check_distinct("S2", &symbols_right)?;

        let mut pairs = Vec::with_capacity(symbols_left.len() * symbols_right.len());
        for i2 in 0..symbols_right.len() as u16 {
            for i1 in 0..symbols_left.len() as u16 {
                pairs.push((i1, i2));
            }
        }

        Ok(SearchSpace {
            symbols_left,
            symbols_right,
            pairs,
        })
    }

    pub fn symbols_left(&self) -> &[String] {
        &self.symbols_left
    }

    pub fn symbols_right(&self) -> &[String] {
        &self.symbols_right
    }

    /// `|S1|`.
    pub fn left_count(&self) -> u16 {
        self.symbols_left.len() as u16
    }

    /// `|S2|`.
    pub fn right_count(&self) -> u16 {
        self.symbols_right.len() as u16
    }

    /// `N = |S1| · |S2|`, the number of candidate pairs (= relation code bits).
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// The global maximum complexity `|S1| · |S2|`, also the initial (loose)
    /// upper bound on `max_pc`.
    pub fn k_max(&self) -> u16 {
        self.left_count() * self.right_count()
    }

    /// Number of candidate relations, `2^N`.
    pub fn relation_count(&self) -> BigUint {
        BigUint::from(1u8) << self.pair_count()
    }

    /// The index pair at bit position `i`.
    pub fn pair(&self, i: usize) -> (u16, u16) {
        self.pairs[i]
    }

    /// The label pair at bit position `i`.
    pub fn pair_labels(&self, i: usize) -> (&str, &str) {
        let (i1, i2) = self.pairs[i];
        (
            &self.symbols_left[i1 as usize],
            &self.symbols_right[i2 as usize],
        )
    }

    /// Permissiveness of an arbitrary relation code: the maximum, over all
    /// symbols of both alphabets, of the number of set pairs touching that
    /// symbol. The empty relation has permissiveness `0`.
    pub fn permissiveness_of(&self, code: &BigUint) -> u16 {
        let n1 = self.left_count() as usize;
        let mut partner_count = vec![0u16; n1 + self.right_count() as usize];

        for (i, &(i1, i2)) in self.pairs.iter().enumerate() {
            if code.bit(i as u64) {
                partner_count[i1 as usize] += 1;
                partner_count[n1 + i2 as usize] += 1;
            }
        }

        partner_count.into_iter().max().unwrap_or(0)
    }

    /// True iff every symbol of `S1` appears on the left of some set pair and
    /// every symbol of `S2` on the right of some set pair.
    pub fn contains_all_symbols(&self, code: &BigUint) -> bool {
        let mut left_seen = vec![false; self.left_count() as usize];
        let mut right_seen = vec![false; self.right_count() as usize];

        for (i, &(i1, i2)) in self.pairs.iter().enumerate() {
            if code.bit(i as u64) {
                left_seen[i1 as usize] = true;
                right_seen[i2 as usize] = true;
            }
        }

        left_seen.into_iter().all(|seen| seen) && right_seen.into_iter().all(|seen| seen)
    }
}

fn check_distinct(side: &'static str, symbols: &[String]) -> Result<(), SpaceError> {
    let mut seen = HashSet::new();
    for label in symbols {
        if !seen.insert(label.as_str()) {
            return Err(SpaceError::DuplicateSymbol {
                side,
                label: label.clone(),
            });
        }
    }
    Ok(())
}
