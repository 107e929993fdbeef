//! Sparse histogram keyed by real-valued bins
//!
//! Bins are discovered on the fly: the first time a key is seen a bin is
//! created for it and it is never removed afterwards. Keys compare by exact
//! floating point value, there is no tolerance or bucketing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Total-ordered wrapper so `f64` can key a `BTreeMap`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
struct BinKey(f64);

impl PartialEq for BinKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BinKey {}

impl PartialOrd for BinKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BinKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Histogram {
    bins: BTreeMap<BinKey, f64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bin at `key` if there is none yet
    pub fn add_bin(&mut self, key: f64) {
        self.bins.entry(BinKey(key)).or_insert(0.0);
    }

    pub fn contains(&self, key: f64) -> bool {
        self.bins.contains_key(&BinKey(key))
    }

    /// Count one occurrence of `key`
    pub fn add_data(&mut self, key: f64) {
        self.add(key, 1.0);
    }

    /// Add `amount` to the bin at `key`, creating it if needed
    pub fn add(&mut self, key: f64, amount: f64) {
        *self.bins.entry(BinKey(key)).or_insert(0.0) += amount;
    }

    pub fn get(&self, key: f64) -> Option<f64> {
        self.bins.get(&BinKey(key)).copied()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bin keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ {
        self.bins.keys().map(|k| k.0)
    }

    /// `(key, value)` pairs in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.bins.iter().map(|(k, v)| (k.0, *v))
    }

    /// Add all bins of `other` into `self`
    pub fn merge(&mut self, other: &Histogram) {
        for (key, value) in other.iter() {
            self.add(key, value);
        }
    }

    /// Divide every bin by the matching bin of `counts`.
    ///
    /// Bins without a nonzero counterpart are left untouched.
    pub fn normalize_by(&mut self, counts: &Histogram) {
        for (key, value) in self.bins.iter_mut() {
            if let Some(&n) = counts.bins.get(key) {
                if n != 0.0 {
                    *value /= n;
                }
            }
        }
    }

    /// One `key value` line per bin in fixed-width columns
    pub fn formatted_string(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{:>14.6}{:>18.10}\n", key, value))
            .collect()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_string())
    }
}

impl FromIterator<(f64, f64)> for Histogram {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut histogram = Histogram::new();
        for (key, value) in iter {
            histogram.add(key, value);
        }
        histogram
    }
}
