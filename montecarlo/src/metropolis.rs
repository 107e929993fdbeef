//! Metropolis acceptance and per-move observation

use rand::Rng;
use tracing::trace;

/// Metropolis criterion for a move with energy change `delta`.
///
/// Draws `u` uniform in `[0, 1)` and rejects when `u >= exp(-delta / T)`.
/// Non-positive temperatures follow IEEE arithmetic: at `T = 0` a move that
/// lowers the energy gives `exp(+inf)` and is kept, one that raises it gives
/// `exp(-inf) = 0` and is rejected, and `delta = 0` yields NaN, which never
/// compares as greater or equal and therefore keeps the move.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn accept<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    let threshold = (-delta / temperature).exp();
    let u: f64 = rng.gen();
    !(u >= threshold)
}

/// Outcome of a single trial move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEvent {
    /// Sites touched by the move
    pub sites: Vec<usize>,
    /// Energy change of the trial move
    pub delta: f64,
    pub accepted: bool,
    /// Hamiltonian after acceptance or rollback
    pub hamiltonian: f64,
}

/// Hook receiving every trial move of a run
pub trait MoveObserver: Send {
    fn on_move(&mut self, event: &MoveEvent);
}

/// Logs every move at trace level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl MoveObserver for TracingObserver {
    fn on_move(&mut self, event: &MoveEvent) {
        if event.accepted {
            trace!(
                "move {:?} accepted, dE = {:+.4}, new H: {:.4}",
                event.sites,
                event.delta,
                event.hamiltonian
            );
        } else {
            trace!(
                "move {:?} rejected, dE = {:+.4}, new H would have been: {:.4}",
                event.sites,
                event.delta,
                event.hamiltonian + event.delta
            );
        }
    }
}

impl<F: FnMut(&MoveEvent) + Send> MoveObserver for F {
    fn on_move(&mut self, event: &MoveEvent) {
        self(event)
    }
}
