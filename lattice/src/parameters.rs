use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Simulation parameters handed to the lattice and the Monte Carlo driver.
///
/// The values are read-only for the engine; changing them goes through
/// `Spinsystem::setup` (new shape) or `Spinsystem::reset_parameters`
/// (same shape, new couplings or temperature).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Parameters {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Coupling constant J
    pub interaction: f64,
    /// External magnetic field B
    pub magnetic: f64,
    /// Temperature in units of J/k_B
    pub temperature: f64,
    /// Spin-exchange (magnetisation conserving) dynamics
    pub constrained: bool,
    /// Fraction of spins set down in constrained mode
    pub ratio: f64,
    /// Metropolis steps between two recorded samples
    pub print_freq: u64,
    /// Optional stripe wavelength (in sites) for the initial pattern
    pub wavelength: Option<u32>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            width: 32,
            height: 32,
            interaction: 1.0,
            magnetic: 0.0,
            temperature: 2.0,
            constrained: false,
            ratio: 0.5,
            print_freq: 100,
            wavelength: None,
        }
    }
}

impl Parameters {
    /// Total number of sites, `width * height`
    pub fn sites(&self) -> usize {
        self.width * self.height
    }

    /// Number of spins turned down by a constrained initialisation
    pub fn down_count(&self) -> usize {
        (self.ratio * self.sites() as f64) as usize
    }

    /// Check the structural constraints a lattice must satisfy before setup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyLattice {
                width: self.width,
                height: self.height,
            });
        }
        if self.print_freq == 0 {
            return Err(ConfigError::ZeroSamplingStride);
        }
        if !self.constrained {
            return Ok(());
        }

        let sites = self.sites();
        if sites % 2 != 0 {
            return Err(ConfigError::OddConstrainedSize { sites });
        }
        if self.magnetic != 0.0 {
            return Err(ConfigError::FieldWithConstraint {
                field: self.magnetic,
            });
        }
        if !(0.0..=1.0).contains(&self.ratio) {
            return Err(ConfigError::RatioOutOfRange { ratio: self.ratio });
        }
        let down = self.down_count();
        if down == 0 || down == sites {
            return Err(ConfigError::FrozenConstrainedLattice { down, sites });
        }
        Ok(())
    }

    /// Short description of the lattice shape and move class.
    pub(crate) fn shape(&self) -> String {
        format!(
            "{}x{} ({})",
            self.width,
            self.height,
            if self.constrained {
                "spin exchange"
            } else {
                "single flip"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constrained(width: usize, height: usize) -> Parameters {
        Parameters {
            width,
            height,
            constrained: true,
            ..Parameters::default()
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(Parameters::default().validate().is_ok());
    }

    #[test]
    fn test_zero_sampling_stride_rejected() {
        let params = Parameters {
            print_freq: 0,
            ..Parameters::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::ZeroSamplingStride));
    }

    #[test]
    fn test_empty_lattice_rejected() {
        let params = Parameters {
            width: 0,
            ..Parameters::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::EmptyLattice {
                width: 0,
                height: 32
            })
        );
    }

    #[test]
    fn test_odd_constrained_size_rejected() {
        let params = constrained(3, 3);
        assert_eq!(
            params.validate(),
            Err(ConfigError::OddConstrainedSize { sites: 9 })
        );
        // the same size is fine without the constraint
        let free = Parameters {
            constrained: false,
            ..params
        };
        assert!(free.validate().is_ok());
    }

    #[test]
    fn test_field_with_constraint_rejected() {
        let params = Parameters {
            magnetic: 0.5,
            ..constrained(4, 4)
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::FieldWithConstraint { field: 0.5 })
        );
    }

    #[test]
    fn test_degenerate_ratios_rejected() {
        for ratio in [0.0, 1.0, 0.01] {
            let params = Parameters {
                ratio,
                ..constrained(4, 4)
            };
            assert!(matches!(
                params.validate(),
                Err(ConfigError::FrozenConstrainedLattice { sites: 16, .. })
            ));
        }

        let params = Parameters {
            ratio: 1.5,
            ..constrained(4, 4)
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::RatioOutOfRange { ratio: 1.5 })
        );
    }

    #[test]
    fn test_down_count_truncates() {
        let params = Parameters {
            ratio: 0.3,
            ..constrained(4, 4)
        };
        assert_eq!(params.down_count(), 4);
    }
}
