//! Command-line argument parsing for lattice simulations

use clap::Parser;

/// Metropolis Monte Carlo simulation of a 2D Ising lattice
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "spinlab.yaml")]
    pub config_file: String,

    /// Override temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Override coupling constant J
    #[arg(long)]
    pub interaction: Option<f64>,

    /// Override magnetic field B
    #[arg(long)]
    pub magnetic: Option<f64>,

    /// Use spin-exchange dynamics (conserved magnetisation)
    #[arg(long)]
    pub constrained: bool,

    /// Override number of equilibration steps
    #[arg(long)]
    pub equilibration_steps: Option<u64>,

    /// Override number of production steps
    #[arg(long)]
    pub production_steps: Option<u64>,

    /// Random seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the prefix of the data files
    #[arg(long)]
    pub file_key: Option<String>,

    /// Also write correlation and structure function files
    #[arg(long)]
    pub correlation: bool,

    /// Log every trial move at trace level
    #[arg(long)]
    pub trace_moves: bool,

    /// Log file (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,
}
