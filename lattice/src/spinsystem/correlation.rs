//! Pair correlation G(r) and structure function S(k)

use super::Spinsystem;
use crate::histogram::Histogram;
use nalgebra::Vector2;
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::debug;

/// Shorter of the direct and the wrapped offset along one periodic axis
fn minimum_image(a: usize, b: usize, length: usize) -> i64 {
    let offset = (b as i64 - a as i64).abs();
    if offset <= length as i64 / 2 {
        offset
    } else {
        offset - length as i64
    }
}

impl Spinsystem {
    /// Toroidal (minimum image) distance between two sites
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        let width = self.width();
        let dx = minimum_image(a % width, b % width, width);
        let dy = minimum_image(a / width, b / width, self.height());
        Vector2::new(dx as f64, dy as f64).norm()
    }

    /// Fraction of equal-state pairs per toroidal distance.
    ///
    /// Scans every unordered pair of distinct sites. Every distance seen gets a
    /// bin, also when no pair at that distance agrees, so the bin set only
    /// depends on the lattice shape.
    pub fn correlate(&self) -> Histogram {
        let sites = self.spins.len();
        let empty = || (Histogram::new(), Histogram::new());

        let (mut same, all) = (0..sites)
            .into_par_iter()
            .fold(empty, |(mut same, mut all), i| {
                let state = self.spins[i].state();
                for j in (i + 1)..sites {
                    let r = self.distance(i, j);
                    if self.spins[j].state() == state {
                        same.add_data(r);
                    } else {
                        same.add_bin(r);
                    }
                    all.add_data(r);
                }
                (same, all)
            })
            .reduce(empty, |(mut same, mut all), (other_same, other_all)| {
                same.merge(&other_same);
                all.merge(&other_all);
                (same, all)
            });

        same.normalize_by(&all);
        debug!("Correlated {} sites into {} distance bins", sites, same.len());
        same
    }

    /// Cosine transform of a correlation histogram.
    ///
    /// With `L = max(width, height)` the wavevectors are `k = 2π n / L` for
    /// `n = 0..L`, and `S(k) = Σ_r G(r) cos(k r)`.
    pub fn compute_structure_function(&self, correlation: &Histogram) -> Histogram {
        let length = self.width().max(self.height());
        (0..length)
            .map(|n| {
                let k = 2.0 * PI * n as f64 / length as f64;
                let s: f64 = correlation.iter().map(|(r, g)| g * (k * r).cos()).sum();
                (k, s)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_image() {
        assert_eq!(minimum_image(0, 1, 4), 1);
        assert_eq!(minimum_image(0, 2, 4), 2);
        assert_eq!(minimum_image(0, 3, 4), -1);
        assert_eq!(minimum_image(3, 0, 4), -1);
        assert_eq!(minimum_image(0, 3, 5), -2);
        assert_eq!(minimum_image(0, 0, 1), 0);
    }
}
