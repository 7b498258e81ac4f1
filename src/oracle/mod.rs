//! The seam to the external isotactic-decision procedure.
//!
//! The search core never decides isotacticity itself; it hands a candidate
//! alignment to an [`IsotacticOracle`] and consumes the yes/no verdict.
//! Three adapters are provided:
//!
//!  - [`CommandOracle`] invokes an external decision tool as a subprocess,
//!    exchanging the alignment through a JSON file.
//!  - [`FnOracle`] wraps a closure, for embedding an in-process decision
//!    procedure or scripting verdicts in tests.
//!  - [`CachingOracle`] memoizes verdicts of an inner oracle; sound because
//!    oracle calls are pure functions of `(M1, M2, alignment)`.
//!
//! Callers must pre-filter non-total relations (the decision procedure has
//! undefined behavior when symbols are missing from the alignment); the
//! search core does this via `BitRelation::contains_all_symbols`.

use crate::alignment::{Alignment, AlignmentDocument};
use log::{debug, trace};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Errors produced by an oracle invocation.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to write alignment exchange file {path}: {source}")]
    Exchange {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run decision command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The decision procedure terminated with an unexpected status
    /// (historically a segfault on malformed alignments).
    #[error("decision procedure terminated abnormally (status {status:?})")]
    Failed { status: Option<i32> },
}

/// Decides whether two automata are isotactic under an alignment.
///
/// Implementations must be callable from multiple worker threads at once and
/// must evaluate each call freshly (caching parsed automata internally is
/// fine as long as verdicts stay pure).
pub trait IsotacticOracle: Send + Sync {
    fn is_isotactic(
        &self,
        m1: &Path,
        m2: &Path,
        alignment: &Alignment,
    ) -> Result<bool, OracleError>;
}

/// Oracle backed by a plain function; useful for stubs and for embedding an
/// in-process decision procedure.
pub struct FnOracle<F> {
    decide: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&Path, &Path, &Alignment) -> bool + Send + Sync,
{
    pub fn new(decide: F) -> FnOracle<F> {
        FnOracle { decide }
    }
}

impl<F> IsotacticOracle for FnOracle<F>
where
    F: Fn(&Path, &Path, &Alignment) -> bool + Send + Sync,
{
    fn is_isotactic(
        &self,
        m1: &Path,
        m2: &Path,
        alignment: &Alignment,
    ) -> Result<bool, OracleError> {
        Ok((self.decide)(m1, m2, alignment))
    }
}

/// Oracle that shells out to an external decision tool.
///
/// The alignment is written to a JSON exchange file and the tool is invoked
/// as `CMD M1 M2 ALIGNMENT.json`. Exit code 0 means isotactic, exit code 1
/// (raw wait status 256) means not isotactic; anything else is reported as a
/// failure and the exchange file is kept for inspection.
pub struct CommandOracle {
    command: String,
    exchange_dir: PathBuf,
    sequence: AtomicU64,
}

impl CommandOracle {
    pub fn new(command: impl Into<String>) -> CommandOracle {
        CommandOracle {
            command: command.into(),
            exchange_dir: std::env::temp_dir(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Use `dir` for alignment exchange files instead of the system temp
    /// directory.
    pub fn exchange_dir(mut self, dir: impl Into<PathBuf>) -> CommandOracle {
        self.exchange_dir = dir.into();
        self
    }

    fn write_exchange_file(&self, alignment: &Alignment) -> Result<PathBuf, OracleError> {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        let path = self
            .exchange_dir
            .join(format!("iso-align-{}-{}.json", std::process::id(), n));
        let document = AlignmentDocument { alignment };
        let json = serde_json::to_string(&document).expect("alignment serialization cannot fail");
        std::fs::write(&path, json).map_err(|source| OracleError::Exchange {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }
}

impl IsotacticOracle for CommandOracle {
    fn is_isotactic(
        &self,
        m1: &Path,
        m2: &Path,
        alignment: &Alignment,
    ) -> Result<bool, OracleError> {
        let exchange = self.write_exchange_file(alignment)?;
        trace!(
            "running {} {} {} {}",
            self.command,
            m1.display(),
            m2.display(),
            exchange.display()
        );

        let status = Command::new(&self.command)
            .arg(m1)
            .arg(m2)
            .arg(&exchange)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| OracleError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        match status.code() {
            Some(0) => {
                let _ = std::fs::remove_file(&exchange);
                Ok(true)
            }
            Some(1) => {
                let _ = std::fs::remove_file(&exchange);
                Ok(false)
            }
            code => {
                debug!(
                    "decision command failed (status {:?}), keeping {}",
                    code,
                    exchange.display()
                );
                Err(OracleError::Failed { status: code })
            }
        }
    }
}

/// Memoizes the verdicts of an inner oracle behind a mutex.
///
/// Distinct relations can induce identical alignments at low complexity
/// budgets, so repeated questions do occur during a search.
pub struct CachingOracle<O> {
    inner: O,
    verdicts: Mutex<HashMap<(PathBuf, PathBuf, Alignment), bool>>,
}

impl<O: IsotacticOracle> CachingOracle<O> {
    pub fn new(inner: O) -> CachingOracle<O> {
        CachingOracle {
            inner,
            verdicts: Mutex::new(HashMap::new()),
        }
    }
}

impl<O: IsotacticOracle> IsotacticOracle for CachingOracle<O> {
    fn is_isotactic(
        &self,
        m1: &Path,
        m2: &Path,
        alignment: &Alignment,
    ) -> Result<bool, OracleError> {
        let key = (m1.to_path_buf(), m2.to_path_buf(), alignment.clone());
        {
            let verdicts = self.verdicts.lock().expect("oracle cache poisoned");
            if let Some(&verdict) = verdicts.get(&key) {
                return Ok(verdict);
            }
        }

        // The inner call runs outside the lock so workers don't serialize on
        // slow decisions; a racing duplicate just recomputes the same verdict.
        let verdict = self.inner.is_isotactic(m1, m2, alignment)?;
        let mut verdicts = self.verdicts.lock().expect("oracle cache poisoned");
        verdicts.insert(key, verdict);
        Ok(verdict)
    }
}
