//! Input/Output operations for lattice simulations
//!
//! This module handles logging setup and the fixed-width data files.

mod export;
mod output;

pub use export::OutputFiles;
pub use output::{format_snapshot, setup_output};
