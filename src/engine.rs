//! Worker pool and engine facade.
//!
//! [`Engine`] owns one [`RootTask`] per input path and a fixed number of
//! worker threads. Every worker runs the same drain loop: for each root in
//! input order it keeps claiming and expanding items until the root reports
//! itself exhausted, then moves on. A worker only ever waits on the root it
//! is currently draining, and never returns to a root it has left.
//!
//! Because a root is declared exhausted only under its schedule lock with an
//! empty stack and no active expander, every worker sees every root finish,
//! and the totals read after joining are final. Worker count changes
//! interleaving and wall-clock time, never the sums.

use crate::data::{RootTotal, ScanReport};
use crate::error::{EngineError, ErrorSlot};
use crate::expand::expand;
use crate::metrics::ScanStats;
use crate::root::RootTask;
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// State shared by every worker of one run.
#[derive(Debug)]
struct Shared {
    roots: Vec<RootTask>,
    errors: ErrorSlot,
    stats: ScanStats,
}

/// A configured, not yet started traversal.
///
/// # Examples
/// ```rust,no_run
/// use mdu::engine::Engine;
///
/// let report = Engine::new(["/usr/share", "/var/log"], 8)?.run()?;
/// for total in &report.totals {
///     println!("{}     {}", total.blocks, total.path.display());
/// }
/// # Ok::<(), mdu::error::EngineError>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    shared: Arc<Shared>,
    workers: usize,
}

impl Engine {
    /// Seeds one root task per path.
    ///
    /// # Errors
    /// * [`EngineError::NoRoots`] if `roots` is empty
    /// * [`EngineError::NoWorkers`] if `workers` is zero
    pub fn new<I, P>(roots: I, workers: usize) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        if workers == 0 {
            return Err(EngineError::NoWorkers);
        }

        let roots: Vec<RootTask> = roots
            .into_iter()
            .enumerate()
            .map(|(index, path)| RootTask::new(index, path.into()))
            .collect();
        if roots.is_empty() {
            return Err(EngineError::NoRoots);
        }

        Ok(Self {
            shared: Arc::new(Shared {
                roots,
                errors: ErrorSlot::new(),
                stats: ScanStats::default(),
            }),
            workers,
        })
    }

    /// Starts the workers, waits for all of them, and collects the totals.
    ///
    /// If some but not all workers fail to spawn, the run continues with the
    /// ones that started.
    ///
    /// # Errors
    /// * [`EngineError::Spawn`] if not a single worker could be started
    /// * [`EngineError::WorkerPanicked`] if any worker panicked
    pub fn run(self) -> Result<ScanReport, EngineError> {
        let mut handles: Vec<(usize, JoinHandle<()>)> = Vec::with_capacity(self.workers);

        for id in 0..self.workers {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("mdu-worker-{}", id))
                .spawn(move || drain(id, &shared));

            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(source) if handles.is_empty() => {
                    return Err(EngineError::Spawn { id, source });
                }
                Err(source) => {
                    warn!(worker = id, error = %source, "could not spawn worker, continuing with fewer");
                    break;
                }
            }
        }

        let mut panicked = None;
        for (id, handle) in handles {
            if let Err(payload) = handle.join() {
                if panicked.is_none() {
                    panicked = Some(EngineError::WorkerPanicked {
                        id,
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }
        if let Some(err) = panicked {
            return Err(err);
        }

        let shared = &self.shared;
        Ok(ScanReport {
            totals: shared
                .roots
                .iter()
                .map(|root| RootTotal {
                    path: root.path().to_path_buf(),
                    blocks: root.total_blocks(),
                })
                .collect(),
            first_error: shared.errors.get(),
            stats: shared.stats.snapshot(),
        })
    }
}

/// Runs a complete traversal of `roots` with `workers` threads.
pub fn run<I, P>(roots: I, workers: usize) -> Result<ScanReport, EngineError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Engine::new(roots, workers)?.run()
}

/// The per-worker drain loop.
fn drain(id: usize, shared: &Shared) {
    debug!(worker = id, "worker starting");

    for root in &shared.roots {
        while let Some(claim) = root.next_item(&shared.stats) {
            expand(&claim, &shared.errors, &shared.stats);
        }
        trace!(worker = id, root = root.index(), "moving to next root");
    }

    debug!(worker = id, "worker finished");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker thread panicked".to_string()
    }
}
