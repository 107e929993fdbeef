//! Two-dimensional Ising lattice with periodic boundaries
//!
//! This crate holds the lattice side of the simulation: spins and their
//! neighbour topology, the incrementally maintained Hamiltonian, the two move
//! classes (single flip and spin exchange) and the pair correlation analysis.
//! Driving the Metropolis loop lives in the `montecarlo` crate.

pub mod error;
pub mod histogram;
pub mod parameters;
pub mod spin;
pub mod spinsystem;

pub use error::ConfigError;
pub use histogram::Histogram;
pub use parameters::Parameters;
pub use spin::{Spin, SpinState};
pub use spinsystem::{LatticeSnapshot, Spinsystem};
