use num_bigint::BigUint;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU16, Ordering};

/// The best alignment found so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestRecord {
    /// `max(permissiveness, complexity)` of the best alignment, initially
    /// the loose upper bound `|S1| · |S2|`.
    pub max_pc: u16,
    /// Relation code of the best alignment; `0` until a first improvement.
    pub code: BigUint,
    /// Smallest complexity of the best alignment, `None` until a first
    /// improvement.
    pub k: Option<u16>,
}

/// Process-wide best-so-far record with monotone compare-update.
///
/// Writers serialize on a mutex; readers use a relaxed atomic mirror of
/// `max_pc`. A stale (higher) read only causes extra work, never incorrect
/// pruning, because pruning skips candidates with `value >= bound` while
/// improvements require `value < bound`.
pub struct BestBound {
    max_pc: AtomicU16,
    record: Mutex<BestRecord>,
}

impl BestBound {
    /// Start from the loose upper bound `initial = |S1| · |S2|`.
    pub fn new(initial: u16) -> BestBound {
        BestBound {
            max_pc: AtomicU16::new(initial),
            record: Mutex::new(BestRecord {
                max_pc: initial,
                code: BigUint::from(0u8),
                k: None,
            }),
        }
    }

    /// Current best `max_pc`, as a pruning hint.
    pub fn get(&self) -> u16 {
        self.max_pc.load(Ordering::Relaxed)
    }

    /// Record a new best if `max_pc` strictly improves on the current one.
    /// Returns whether the record was taken.
    pub fn try_improve(&self, max_pc: u16, code: &BigUint, k: u16) -> bool {
        let mut record = self.record.lock().expect("best bound poisoned");
        if max_pc < record.max_pc {
            record.max_pc = max_pc;
            record.code = code.clone();
            record.k = Some(k);
            self.max_pc.store(max_pc, Ordering::Release);
            true
        } else {
            false
        }
    }

    /// A copy of the full best record.
    pub fn snapshot(&self) -> BestRecord {
        self.record.lock().expect("best bound poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improvements_are_strictly_monotone() {
        let bound = BestBound::new(6);
        assert_eq!(bound.get(), 6);

        assert!(bound.try_improve(4, &BigUint::from(9u8), 2));
        assert_eq!(bound.get(), 4);

        // Equal is not an improvement.
        assert!(!bound.try_improve(4, &BigUint::from(5u8), 1));
        // Worse is not an improvement.
        assert!(!bound.try_improve(5, &BigUint::from(5u8), 1));

        let record = bound.snapshot();
        assert_eq!(record.max_pc, 4);
        assert_eq!(record.code, BigUint::from(9u8));
        assert_eq!(record.k, Some(2));
    }

    #[test]
    fn initial_record_has_no_relation() {
        let record = BestBound::new(4).snapshot();
        assert_eq!(record.max_pc, 4);
        assert_eq!(record.code, BigUint::from(0u8));
        assert_eq!(record.k, None);
    }

    #[test]
    fn concurrent_improvements_keep_the_minimum() {
        use std::sync::Arc;

        let bound = Arc::new(BestBound::new(100));
        let mut handles = Vec::new();
        for value in 1u16..=16 {
            let bound = Arc::clone(&bound);
            handles.push(std::thread::spawn(move || {
                bound.try_improve(value, &BigUint::from(value), 1);
            }));
        }
        for handle in handles {
            handle.join().expect("worker thread panicked");
        }
        assert_eq!(bound.get(), 1);
        assert_eq!(bound.snapshot().code, BigUint::from(1u16));
    }
}
