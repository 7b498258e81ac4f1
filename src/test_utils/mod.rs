//! Shared helpers for tests.

use crate::alignment::Alignment;
use crate::oracle::{FnOracle, IsotacticOracle};
use crate::relation::SearchSpace;
use std::path::Path;
use std::sync::Arc;

/// Initialize env_logger for tests. Safe to call multiple times.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

pub fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// A search space over literal alphabets, e.g. `space(&["a", "b"], &["s"])`.
pub fn space(left: &[&str], right: &[&str]) -> SearchSpace {
    SearchSpace::new(labels(left), labels(right)).expect("test symbol sets are valid")
}

/// An oracle that answers every question with `verdict`.
pub fn always(verdict: bool) -> Arc<dyn IsotacticOracle> {
    Arc::new(FnOracle::new(
        move |_: &Path, _: &Path, _: &Alignment| verdict,
    ))
}
