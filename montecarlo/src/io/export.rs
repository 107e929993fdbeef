//! Fixed-width data files written after a run
//!
//! Column widths and precisions are shared with the plotting scripts that
//! consume these files and must not change.

use crate::stats::Averages;
use color_eyre::eyre::{Result, WrapErr};
use lattice::{Histogram, Parameters};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const SIGNIFICANT_DIGITS: i32 = 6;

/// `%g` rendering: six significant digits, trailing zeros dropped, exponent
/// form for exponents below -4 or from 6 on.
pub fn format_general(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return format_special(value);
    }
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= SIGNIFICANT_DIGITS {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// `value` with `precision` decimals; NaN and infinities are spelled
/// `nan` and `inf` as `%f` does.
fn format_fixed(value: f64, precision: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", precision, value)
    } else {
        format_special(value)
    }
}

fn format_special(value: f64) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let body = if value.is_nan() {
        "nan"
    } else if value.is_infinite() {
        "inf"
    } else {
        "0"
    };
    format!("{}{}", sign, body)
}

fn strip_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Locations of the files belonging to one file key.
#[derive(Debug, Clone)]
pub struct OutputFiles {
    directory: PathBuf,
    file_key: String,
}

impl OutputFiles {
    /// Only the part of `file_key` before the first whitespace is used.
    pub fn new(directory: impl AsRef<Path>, file_key: &str) -> Self {
        let file_key = file_key
            .split_whitespace()
            .next()
            .unwrap_or("ising")
            .to_string();
        Self {
            directory: directory.as_ref().to_path_buf(),
            file_key,
        }
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn path(&self, extension: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.file_key, extension))
    }

    fn create(&self, extension: &str) -> Result<(PathBuf, BufWriter<File>)> {
        fs::create_dir_all(&self.directory).wrap_err_with(|| {
            format!(
                "Unable to create output directory: {}",
                self.directory.display()
            )
        })?;
        let path = self.path(extension);
        let file = File::create(&path)
            .wrap_err_with(|| format!("Unable to create {}", path.display()))?;
        Ok((path, BufWriter::new(file)))
    }

    /// `(step, H)` pairs recorded during production.
    pub fn write_trajectory(&self, trajectory: &[(u64, f64)]) -> Result<PathBuf> {
        let (path, mut out) = self.create("trajectory")?;
        writeln!(out, "{:>10}{:>6}", "# time", "Hamiltonian")?;
        for (step, hamiltonian) in trajectory {
            writeln!(out, "{:>10}{:>6}", step, format_general(*hamiltonian))?;
        }
        out.flush()?;
        info!("Trajectory written to {}", path.display());
        Ok(path)
    }

    /// One row per sample: step, J, T, B, H, M.
    pub fn write_data(
        &self,
        parameters: &Parameters,
        energies: &[f64],
        magnetisations: &[f64],
    ) -> Result<PathBuf> {
        let (path, mut out) = self.create("data")?;
        writeln!(
            out,
            "{:>14}{:>8}{:>8}{:>8}{:>14}{:>14}",
            "# step", "J", "T", "B", "H", "M"
        )?;
        for (i, (energy, magnetisation)) in energies.iter().zip(magnetisations).enumerate() {
            writeln!(
                out,
                "{:>14}{:>8}{:>8}{:>8}{:>14}{:>14}",
                (i as u64 + 1) * parameters.print_freq,
                format_fixed(parameters.interaction, 2),
                format_fixed(parameters.temperature, 2),
                format_fixed(parameters.magnetic, 2),
                format_fixed(*energy, 2),
                format_fixed(*magnetisation, 6)
            )?;
        }
        out.flush()?;
        info!("{} samples written to {}", energies.len(), path.display());
        Ok(path)
    }

    /// Append one row of averages; the header is written only when the file
    /// does not exist yet.
    pub fn append_averages(&self, parameters: &Parameters, averages: &Averages) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory).wrap_err_with(|| {
            format!(
                "Unable to create output directory: {}",
                self.directory.display()
            )
        })?;
        let path = self.path("averaged_data");
        let is_new = !path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .wrap_err_with(|| format!("Unable to open {}", path.display()))?;
        let mut out = BufWriter::new(file);

        if is_new {
            writeln!(
                out,
                "{:>8}{:>8}{:>8}{:>14}{:>14}{:>18}{:>18}{:>14}",
                "J", "T", "B", "<H>", "<M>", "<chi>", "<Cv>", "# of samples"
            )?;
        }
        writeln!(
            out,
            "{:>8}{:>8}{:>8}{:>14}{:>14}{:>18}{:>18}{:>14}",
            format_fixed(parameters.interaction, 2),
            format_fixed(parameters.temperature, 2),
            format_fixed(parameters.magnetic, 2),
            format_fixed(averages.energy, 2),
            format_fixed(averages.magnetisation, 6),
            format_fixed(averages.susceptibility, 10),
            format_fixed(averages.heat_capacity, 10),
            averages.samples
        )?;
        out.flush()?;
        info!("Averages appended to {}", path.display());
        Ok(path)
    }

    pub fn write_correlation(&self, correlation: &Histogram) -> Result<PathBuf> {
        self.write_histogram(
            "correlation",
            "# correlation G(r) = <S(0) S(r)> - <S>^2",
            correlation,
        )
    }

    pub fn write_structure_function(&self, structure: &Histogram) -> Result<PathBuf> {
        self.write_histogram(
            "structureFunction",
            "# structure function S(k) = FT( G(r) )",
            structure,
        )
    }

    fn write_histogram(&self, extension: &str, header: &str, histogram: &Histogram) -> Result<PathBuf> {
        let (path, mut out) = self.create(extension)?;
        writeln!(out, "{}", header)?;
        write!(out, "{}", histogram.formatted_string())?;
        out.flush()?;
        info!("{} bins written to {}", histogram.len(), path.display());
        Ok(path)
    }
}
