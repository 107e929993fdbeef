mod report;
mod runner;

pub use runner::{build_host, run_single, run_sweep, RunSummary};

use self::report::{report_configuration, report_run_summary, report_sweep_summary};
use crate::config::{Args, Config};
use crate::control::{RunControl, SnapshotSlot};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use tracing::info;

pub struct Application {
    args: Args,
    config: Config,
}

impl Application {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref(), self.args.trace_moves);
        info!("Configuration loaded from: {}", self.args.config_file);
        report_configuration(&self.config);

        let mut host = build_host(&self.config, self.args.trace_moves)?;
        let slot = SnapshotSlot::new();
        let control = RunControl::new().with_snapshots(slot.clone(), self.config.draw_interval());

        match &self.config.sweep {
            Some(sweep) => {
                let summaries = run_sweep(&mut host, &self.config, sweep, &control, &slot)?;
                report_sweep_summary(&summaries);
            }
            None => {
                let summary = run_single(&mut host, &self.config, &control, &slot)?;
                report_run_summary(&summary);
            }
        }

        Ok(())
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults()
        .apply_args(args);

    Ok(config)
}
