//! Configuration management for lattice simulations
//!
//! Every field is optional in the YAML file; `with_defaults` fills the gaps
//! and command-line arguments override whatever the file says.

mod args;

pub use args::Args;

use lattice::Parameters;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub lattice: LatticeParams,
    #[serde(default)]
    pub coupling: CouplingParams,
    pub temperature: Option<f64>,
    #[serde(default)]
    pub sampling: SamplingParams,
    #[serde(default)]
    pub output: OutputParams,
    pub sweep: Option<SweepParams>,
    pub seed: Option<u64>,
}

/// Lattice shape and initial state
#[derive(Debug, Deserialize, Serialize)]
pub struct LatticeParams {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub constrained: Option<bool>,
    /// Fraction of down spins for spin-exchange runs
    pub ratio: Option<f64>,
    /// Stripe wavelength of the initial pattern, random when absent
    pub wavelength: Option<u32>,
}

impl Default for LatticeParams {
    fn default() -> Self {
        LatticeParams {
            width: Some(32),
            height: Some(32),
            constrained: Some(false),
            ratio: Some(0.5),
            wavelength: None,
        }
    }
}

impl LatticeParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.width.is_none() {
            self.width = defaults.width;
        }
        if self.height.is_none() {
            self.height = defaults.height;
        }
        if self.constrained.is_none() {
            self.constrained = defaults.constrained;
        }
        if self.ratio.is_none() {
            self.ratio = defaults.ratio;
        }
        self
    }
}

/// Coupling constant and external field
#[derive(Debug, Deserialize, Serialize)]
pub struct CouplingParams {
    pub interaction: Option<f64>,
    pub magnetic: Option<f64>,
}

impl Default for CouplingParams {
    fn default() -> Self {
        CouplingParams {
            interaction: Some(1.0),
            magnetic: Some(0.0),
        }
    }
}

impl CouplingParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.interaction.is_none() {
            self.interaction = defaults.interaction;
        }
        if self.magnetic.is_none() {
            self.magnetic = defaults.magnetic;
        }
        self
    }
}

/// Run lengths and sampling stride
#[derive(Debug, Deserialize, Serialize)]
pub struct SamplingParams {
    /// Steps between two recorded samples
    pub print_freq: Option<u64>,
    pub equilibration_steps: Option<u64>,
    pub production_steps: Option<u64>,
    /// Steps between two published lattice snapshots
    pub draw_interval: Option<u64>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            print_freq: Some(1000),
            equilibration_steps: Some(100_000),
            production_steps: Some(1_000_000),
            draw_interval: Some(10_000),
        }
    }
}

impl SamplingParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.print_freq.is_none() {
            self.print_freq = defaults.print_freq;
        }
        if self.equilibration_steps.is_none() {
            self.equilibration_steps = defaults.equilibration_steps;
        }
        if self.production_steps.is_none() {
            self.production_steps = defaults.production_steps;
        }
        if self.draw_interval.is_none() {
            self.draw_interval = defaults.draw_interval;
        }
        self
    }
}

/// Where and what to write
#[derive(Debug, Deserialize, Serialize)]
pub struct OutputParams {
    /// Prefix of the data files; only the text before the first space is used
    pub file_key: Option<String>,
    pub directory: Option<String>,
    /// Write correlation and structure function files
    pub correlation: Option<bool>,
}

impl Default for OutputParams {
    fn default() -> Self {
        OutputParams {
            file_key: Some("ising".to_string()),
            directory: Some(".".to_string()),
            correlation: Some(false),
        }
    }
}

impl OutputParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.file_key.is_none() {
            self.file_key = defaults.file_key;
        }
        if self.directory.is_none() {
            self.directory = defaults.directory;
        }
        if self.correlation.is_none() {
            self.correlation = defaults.correlation;
        }
        self
    }
}

/// Temperature sweep from `start` to `stop` (inclusive) in steps of `step`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepParams {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl SweepParams {
    /// Temperatures of the sweep; empty if `step` does not move from
    /// `start` towards `stop`.
    pub fn temperatures(&self) -> Vec<f64> {
        let span = self.stop - self.start;
        if self.step == 0.0 || span * self.step < 0.0 {
            return Vec::new();
        }
        // tolerate rounding at the final point
        let count = (span / self.step + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.lattice = self.lattice.with_defaults();
        self.coupling = self.coupling.with_defaults();
        self.sampling = self.sampling.with_defaults();
        self.output = self.output.with_defaults();
        if self.temperature.is_none() {
            self.temperature = Some(2.0);
        }
        self
    }

    /// Let command-line arguments override the file
    pub fn apply_args(mut self, args: &Args) -> Self {
        self.temperature = args.temperature.or(self.temperature);
        self.coupling.interaction = args.interaction.or(self.coupling.interaction);
        self.coupling.magnetic = args.magnetic.or(self.coupling.magnetic);
        if args.constrained {
            self.lattice.constrained = Some(true);
        }
        self.sampling.equilibration_steps = args
            .equilibration_steps
            .or(self.sampling.equilibration_steps);
        self.sampling.production_steps = args.production_steps.or(self.sampling.production_steps);
        self.seed = args.seed.or(self.seed);
        if let Some(file_key) = &args.file_key {
            self.output.file_key = Some(file_key.clone());
        }
        if args.correlation {
            self.output.correlation = Some(true);
        }
        self
    }

    /// Engine parameters described by this configuration
    pub fn parameters(&self) -> Parameters {
        let defaults = Parameters::default();
        Parameters {
            width: self.lattice.width.unwrap_or(defaults.width),
            height: self.lattice.height.unwrap_or(defaults.height),
            interaction: self.coupling.interaction.unwrap_or(defaults.interaction),
            magnetic: self.coupling.magnetic.unwrap_or(defaults.magnetic),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            constrained: self.lattice.constrained.unwrap_or(defaults.constrained),
            ratio: self.lattice.ratio.unwrap_or(defaults.ratio),
            print_freq: self.sampling.print_freq.unwrap_or(defaults.print_freq),
            wavelength: self.lattice.wavelength,
        }
    }

    pub fn equilibration_steps(&self) -> u64 {
        self.sampling.equilibration_steps.unwrap_or(0)
    }

    pub fn production_steps(&self) -> u64 {
        self.sampling.production_steps.unwrap_or(0)
    }

    pub fn draw_interval(&self) -> u64 {
        self.sampling.draw_interval.unwrap_or(0)
    }

    /// Check if correlation output is enabled
    pub fn is_correlation_enabled(&self) -> bool {
        self.output.correlation.unwrap_or(false)
    }

    /// File prefix up to the first whitespace
    pub fn file_key(&self) -> String {
        self.output
            .file_key
            .as_deref()
            .and_then(|key| key.split_whitespace().next())
            .unwrap_or("ising")
            .to_string()
    }

    pub fn directory(&self) -> &str {
        self.output.directory.as_deref().unwrap_or(".")
    }
}
