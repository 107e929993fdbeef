//! Metropolis Monte Carlo for the two-dimensional Ising model
//!
//! `lattice` owns the spins and the energy bookkeeping, `montecarlo` drives
//! the Metropolis loop, records time series and writes the data files.

pub use lattice;
pub use montecarlo;

pub use lattice::{ConfigError, Histogram, LatticeSnapshot, Parameters, Spin, SpinState, Spinsystem};
pub use montecarlo::{Averages, MonteCarloHost, RunControl, RunOutcome, SnapshotSlot};
