use crate::oracle::IsotacticOracle;
use crate::relation::SearchSpace;
use crate::search::{SearchConfig, SearchDriver, SearchOutcome};
use std::sync::Arc;

#[cfg(test)]
mod driver_tests;

/// Run a complete search over `space` with the given oracle and a fixed
/// worker count. The automaton paths are opaque to scripted oracles.
pub fn run_search(space: SearchSpace, oracle: Arc<dyn IsotacticOracle>) -> SearchOutcome {
    let config = SearchConfig::new("m1.dot", "m2.dot").workers(4);
    SearchDriver::new(space, config, oracle).run()
}
