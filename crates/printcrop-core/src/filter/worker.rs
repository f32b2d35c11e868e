//! Background filter passes with last-writer-wins delivery.
//!
//! Each submitted pass gets a generation number and its own one-shot
//! channel. Submitting drops the receiver of the previous pass, so a pass
//! that is superseded while running has nowhere to send. A pass that has
//! already been superseded when it starts is skipped. A pass that panics
//! drops its sender, and waiting on it returns `None` instead of blocking.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use tracing::{trace, warn};

use super::{filter, FilterParameters};
use crate::raster::Raster;

/// A finished filter pass.
#[derive(Debug, Clone)]
pub struct FilterResult {
    pub generation: u64,
    pub raster: Raster,
}

struct Pending {
    generation: u64,
    rx: Receiver<Raster>,
}

/// Runs filter passes on the rayon pool.
pub struct FilterWorker {
    latest: Arc<AtomicU64>,
    pending: Option<Pending>,
}

impl Default for FilterWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterWorker {
    pub fn new() -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    /// Queue a pass, superseding any pass still in flight.
    ///
    /// Returns the generation assigned to this pass.
    pub fn submit(&mut self, raster: Raster, params: FilterParameters) -> u64 {
        self.submit_with(raster, move |raster| filter(raster, &params))
    }

    fn submit_with<F>(&mut self, raster: Raster, job: F) -> u64
    where
        F: FnOnce(&Raster) -> Raster + Send + 'static,
    {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = Arc::clone(&self.latest);
        let (tx, rx) = bounded(1);
        self.pending = Some(Pending { generation, rx });

        rayon::spawn(move || {
            if latest.load(Ordering::Acquire) != generation {
                trace!(generation, "skipping superseded filter pass");
                return;
            }
            let out = match catch_unwind(AssertUnwindSafe(|| job(&raster))) {
                Ok(out) => out,
                Err(_) => {
                    warn!(generation, "filter pass panicked");
                    return;
                }
            };
            if tx.send(out).is_err() {
                trace!(generation, "dropping stale filter result");
            }
        });

        generation
    }

    /// Generation of the most recent submission.
    pub fn current_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Non-blocking: the newest result if it has arrived.
    pub fn latest(&mut self) -> Option<FilterResult> {
        let pending = self.pending.as_ref()?;
        let generation = pending.generation;
        match pending.rx.try_recv() {
            Ok(raster) => {
                self.pending = None;
                Some(FilterResult { generation, raster })
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!(generation, "filter pass ended without a result");
                self.pending = None;
                None
            }
        }
    }

    /// Block until the newest submission finishes.
    ///
    /// Returns `None` if nothing was submitted, the newest result was
    /// already delivered, or the pass failed.
    pub fn wait_latest(&mut self) -> Option<FilterResult> {
        let Pending { generation, rx } = self.pending.take()?;
        match rx.recv() {
            Ok(raster) => Some(FilterResult { generation, raster }),
            Err(_) => {
                warn!(generation, "filter pass ended without a result");
                None
            }
        }
    }
}
