// Metropolis Monte Carlo driver for the spin lattice

pub mod app;
pub mod config;
pub mod control;
pub mod host;
pub mod io;
pub mod metropolis;
pub mod stats;

pub use control::{Interrupt, RunControl, RunOutcome, SnapshotSlot};
pub use host::MonteCarloHost;
pub use metropolis::{MoveEvent, MoveObserver, TracingObserver};
pub use stats::Averages;
