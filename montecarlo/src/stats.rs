//! Thermodynamic averages over the sampled series

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Averages {
    /// Mean Hamiltonian <H>
    pub energy: f64,
    /// Mean magnetisation <M>
    pub magnetisation: f64,
    /// (<M²> - <M>²) / T
    pub susceptibility: f64,
    /// (<H²> - <H>²) / (T² N²)
    pub heat_capacity: f64,
    pub samples: usize,
}

impl Averages {
    /// Averages of the recorded series for a lattice of `sites` spins.
    ///
    /// Empty series give NaN for every quantity.
    pub fn compute(energies: &[f64], magnetisations: &[f64], temperature: f64, sites: usize) -> Self {
        let energy = mean(energies);
        let magnetisation = mean(magnetisations);
        let n = sites as f64;
        Self {
            energy,
            magnetisation,
            susceptibility: (mean_square(magnetisations) - magnetisation * magnetisation)
                / temperature,
            heat_capacity: (mean_square(energies) - energy * energy)
                / (temperature * temperature * n * n),
            samples: energies.len(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64
}
