//! Cooperative run control shared between a worker and its controller
//!
//! A `RunControl` is cloned into the controlling thread while the worker
//! runs the Metropolis loop. The loop checks it once per step, so a pause or
//! abort always lands between two complete moves.

use lattice::LatticeSnapshot;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

const PROCEED: u8 = 0;
const PAUSE: u8 = 1;
const ABORT: u8 = 2;

/// Why a run stopped before completing its steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Paused,
    Aborted,
}

/// Steps actually performed by a run and the interrupt that ended it early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    pub steps: u64,
    pub interrupt: Option<Interrupt>,
}

impl RunOutcome {
    pub fn completed(&self) -> bool {
        self.interrupt.is_none()
    }
}

/// Latest published lattice snapshot, replaced as a whole
#[derive(Debug, Clone, Default)]
pub struct SnapshotSlot {
    latest: Arc<Mutex<Option<LatticeSnapshot>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: LatticeSnapshot) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    pub fn latest(&self) -> Option<LatticeSnapshot> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Default)]
struct ControlState {
    request: AtomicU8,
    running: AtomicBool,
    steps_done: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct RunControl {
    state: Arc<ControlState>,
    snapshots: Option<(SnapshotSlot, u64)>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a snapshot into `slot` every `interval` steps (0 disables).
    pub fn with_snapshots(mut self, slot: SnapshotSlot, interval: u64) -> Self {
        self.snapshots = (interval > 0).then_some((slot, interval));
        self
    }

    pub fn request_pause(&self) {
        self.state.request.store(PAUSE, Ordering::SeqCst);
    }

    /// An abort overrides a pending pause.
    pub fn request_abort(&self) {
        self.state.request.store(ABORT, Ordering::SeqCst);
    }

    /// Clear any pending pause or abort request.
    pub fn resume(&self) {
        self.state.request.store(PROCEED, Ordering::SeqCst);
    }

    pub fn interrupt(&self) -> Option<Interrupt> {
        match self.state.request.load(Ordering::SeqCst) {
            PAUSE => Some(Interrupt::Paused),
            ABORT => Some(Interrupt::Aborted),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Metropolis steps completed since creation or the last `reset_steps`
    pub fn steps_done(&self) -> u64 {
        self.state.steps_done.load(Ordering::Relaxed)
    }

    pub fn reset_steps(&self) {
        self.state.steps_done.store(0, Ordering::Relaxed);
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.state.running.store(running, Ordering::SeqCst);
    }

    /// Count one finished step and publish a snapshot when one is due.
    pub(crate) fn record_step(&self, snapshot: impl FnOnce() -> LatticeSnapshot) {
        let done = self.state.steps_done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some((slot, interval)) = &self.snapshots {
            if done % interval == 0 {
                slot.publish(snapshot());
            }
        }
    }

    /// Publish unconditionally, e.g. at the end of a run.
    pub(crate) fn publish(&self, snapshot: impl FnOnce() -> LatticeSnapshot) {
        if let Some((slot, _)) = &self.snapshots {
            slot.publish(snapshot());
        }
    }
}
