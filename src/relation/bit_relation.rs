use crate::relation::SearchSpace;
use num_bigint::BigUint;
use std::fmt;

/// One candidate binary relation `R ⊆ S1 × S2`, encoded as a bitmask over the
/// canonical pair universe of a [`SearchSpace`].
///
/// All operations are pure functions of `(code, S1, S2)`; the value is
/// immutable after construction and therefore safe to share across threads.
#[derive(Clone, Debug)]
pub struct BitRelation<'a> {
    space: &'a SearchSpace,
    code: BigUint,
    permissiveness: u16,
}

impl<'a> BitRelation<'a> {
    /// Decode `code` against `space`, computing its permissiveness.
    pub fn new(code: BigUint, space: &'a SearchSpace) -> BitRelation<'a> {
        let permissiveness = space.permissiveness_of(&code);
        BitRelation {
            space,
            code,
            permissiveness,
        }
    }

    /// Decode `code` with an already-known permissiveness (jobs carry the
    /// value computed when the child was previewed).
    pub fn with_permissiveness(
        code: BigUint,
        permissiveness: u16,
        space: &'a SearchSpace,
    ) -> BitRelation<'a> {
        BitRelation {
            space,
            code,
            permissiveness,
        }
    }

    pub fn code(&self) -> &BigUint {
        &self.code
    }

    pub fn space(&self) -> &'a SearchSpace {
        self.space
    }

    pub fn is_empty(&self) -> bool {
        self.code == BigUint::from(0u8)
    }

    /// Permissiveness of this relation (see [`SearchSpace::permissiveness_of`]).
    pub fn permissiveness(&self) -> u16 {
        self.permissiveness
    }

    /// Permissiveness of an arbitrary code in the same space, used when
    /// previewing children before enqueueing them.
    pub fn permissiveness_of(&self, code: &BigUint) -> u16 {
        self.space.permissiveness_of(code)
    }

    /// True iff the relation is total: every symbol of both alphabets occurs
    /// in at least one set pair.
    pub fn contains_all_symbols(&self) -> bool {
        self.space.contains_all_symbols(&self.code)
    }

    /// Bit positions of the set pairs, ascending.
    pub fn pair_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.space.pair_count()).filter(|&i| self.code.bit(i as u64))
    }
}

impl fmt::Display for BitRelation<'_> {
    /// Diagnostic rendering as a pair list, e.g. `(a,s),(b,t)`. The empty
    /// relation renders as an empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for i in self.pair_indices() {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            let (left, right) = self.space.pair_labels(i);
            write!(f, "({},{})", left, right)?;
        }
        Ok(())
    }
}
