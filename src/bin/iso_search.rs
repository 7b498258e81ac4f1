use clap::Parser;
use env_logger::Builder;
use iso_align_search::automaton;
use iso_align_search::oracle::CommandOracle;
use iso_align_search::relation::SearchSpace;
use iso_align_search::search::{SearchConfig, SearchDriver};
use log::LevelFilter;
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "iso-search")]
#[command(about = "Search for an optimal isotactic alignment between two automata")]
struct Args {
    /// Path to the first automaton (DOT format)
    #[arg(value_name = "M1")]
    m1: String,

    /// Path to the second automaton (DOT format)
    #[arg(value_name = "M2")]
    m2: String,

    /// External isotactic-decision command, invoked as "CMD M1 M2 ALIGNMENT.json"
    #[arg(long, default_value = "iso-decision", require_equals = true)]
    oracle: String,

    /// Number of worker threads (0 = hardware parallelism)
    #[arg(long, default_value_t = 0, require_equals = true)]
    workers: usize,

    /// Maximum queued jobs (0 = unbounded)
    #[arg(long, default_value_t = 0, require_equals = true)]
    queue_capacity: usize,

    /// Verbose logging level: "trace", "debug", or "info"
    /// If specified without a value (--verbose or -v), defaults to "info"
    /// Use --verbose=LEVEL to specify a level, or just --verbose/-v for info
    #[arg(long, short = 'v', value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info", require_equals = true)]
    verbose: Option<Option<LogLevel>>,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

fn main() {
    let args = Args::parse();

    // Configure logging:
    // None = not specified, Some(None) = --verbose without value (info),
    // Some(Some(level)) = --verbose=level
    let log_level = match args.verbose {
        None => LevelFilter::Off,
        Some(None) => LevelFilter::Info,
        Some(Some(level)) => level.into(),
    };
    Builder::from_default_env().filter_level(log_level).init();

    let (s1, s2) = automaton::symbol_sets(Path::new(&args.m1), Path::new(&args.m2))
        .unwrap_or_else(|e| panic!("Failed to read automata: {}", e));

    println!(
        "Loaded M1 with {} labels, M2 with {} labels.",
        s1.len(),
        s2.len()
    );

    let space = SearchSpace::new(s1, s2)
        .unwrap_or_else(|e| panic!("Failed to build the search space: {}", e));

    println!(
        "Searching {} candidate relations over {} pairs.",
        space.relation_count(),
        space.pair_count()
    );

    let config = SearchConfig::new(&args.m1, &args.m2)
        .workers(args.workers)
        .queue_capacity(args.queue_capacity);
    let oracle = Arc::new(CommandOracle::new(&args.oracle));

    let report_space = space.clone();
    let outcome = SearchDriver::new(space, config, oracle).run();

    println!("{} microseconds elapsed.", outcome.elapsed.as_micros());
    println!(
        "{} microseconds spent in iso-decision ({:.1}%).",
        outcome.in_oracle.as_micros(),
        100.0 * outcome.in_oracle.as_secs_f64()
            / outcome.elapsed.as_secs_f64().max(f64::MIN_POSITIVE)
    );
    println!(
        "iso tests: {} ({} iso, {} not iso, {} failed)",
        outcome.stats.iso_tests,
        outcome.stats.iso_yes,
        outcome.stats.iso_no,
        outcome.stats.oracle_failures
    );
    println!("best max_pc: {}", outcome.best_max_pc);
    match outcome.best_k {
        Some(k) => {
            let best = outcome.best_relation(&report_space);
            println!(
                "best relation: {} [code {}], complexity {}",
                best, outcome.best_code, k
            );
        }
        None => println!("no isotactic alignment found"),
    }
}
