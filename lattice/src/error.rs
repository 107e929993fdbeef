use thiserror::Error;

/// Configuration problems detected before any Monte Carlo step runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("lattice must have at least one site, got {width}x{height}")]
    EmptyLattice { width: usize, height: usize },
    #[error("system size must be an even number if system is constrained, got {sites} sites")]
    OddConstrainedSize { sites: usize },
    #[error("constrained system cannot have a magnetic field (B = {field})")]
    FieldWithConstraint { field: f64 },
    #[error("down-spin ratio {ratio} must be between 0.0 and 1.0")]
    RatioOutOfRange { ratio: f64 },
    #[error("constrained system with {down} of {sites} spins down has no unlike neighbour pair to exchange")]
    FrozenConstrainedLattice { down: usize, sites: usize },
    #[error("sampling stride (print_freq) must be at least one step")]
    ZeroSamplingStride,
    #[error("stripe pattern wavelength must be at least one site")]
    ZeroWavelength,
    #[error("parameters change the lattice from {from} to {to}; run setup instead")]
    ShapeMismatch { from: String, to: String },
}
