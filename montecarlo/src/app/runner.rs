use crate::config::{Config, SweepParams};
use crate::control::{RunControl, RunOutcome, SnapshotSlot};
use crate::host::MonteCarloHost;
use crate::io::{format_snapshot, OutputFiles};
use crate::metropolis::TracingObserver;
use crate::stats::Averages;
use color_eyre::eyre::{eyre, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use lattice::Parameters;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of one equilibrate-and-produce cycle at a single temperature
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub parameters: Parameters,
    pub averages: Averages,
    pub equilibration: RunOutcome,
    pub production: RunOutcome,
}

impl RunSummary {
    pub fn completed(&self) -> bool {
        self.equilibration.completed() && self.production.completed()
    }
}

/// Host for the configured lattice, with the stripe pattern applied when a
/// wavelength is set.
pub fn build_host(config: &Config, trace_moves: bool) -> Result<MonteCarloHost> {
    let parameters = config.parameters();
    let mut host = MonteCarloHost::seeded(parameters, config.seed)
        .wrap_err("Invalid lattice configuration")?;
    if host.parameters().wavelength.is_some() {
        host.reset_spins()
            .wrap_err("Unable to apply the initial stripe pattern")?;
    }
    if trace_moves {
        host = host.with_observer(TracingObserver);
    }
    Ok(host)
}

/// Equilibrate, produce and export every file for a single temperature.
pub fn run_single(
    host: &mut MonteCarloHost,
    config: &Config,
    control: &RunControl,
    slot: &SnapshotSlot,
) -> Result<RunSummary> {
    let files = OutputFiles::new(config.directory(), &config.file_key());
    let summary = run_temperature(host, config, control, slot)?;

    files.write_trajectory(host.trajectory())?;
    files.write_data(host.parameters(), host.energies(), host.magnetisations())?;
    files.append_averages(host.parameters(), &summary.averages)?;
    if config.is_correlation_enabled() {
        export_correlation(host, &files)?;
    }
    Ok(summary)
}

/// Repeat the run for every temperature of `sweep` on the same lattice,
/// appending one averaged row per temperature.
///
/// Each temperature starts from the final configuration of the previous one.
pub fn run_sweep(
    host: &mut MonteCarloHost,
    config: &Config,
    sweep: &SweepParams,
    control: &RunControl,
    slot: &SnapshotSlot,
) -> Result<Vec<RunSummary>> {
    let temperatures = sweep.temperatures();
    if temperatures.is_empty() {
        warn!(
            "Sweep from {} to {} with step {} contains no temperatures",
            sweep.start, sweep.stop, sweep.step
        );
    }
    let files = OutputFiles::new(config.directory(), &config.file_key());
    let base = config.parameters();

    let mut summaries = Vec::with_capacity(temperatures.len());
    for temperature in temperatures {
        host.set_parameters(Parameters {
            temperature,
            ..base.clone()
        })
        .wrap_err_with(|| format!("Unable to switch to temperature {}", temperature))?;

        let summary = run_temperature(host, config, control, slot)?;
        let completed = summary.completed();
        if completed {
            files.append_averages(host.parameters(), &summary.averages)?;
        }
        summaries.push(summary);
        if !completed {
            warn!("Sweep stopped at T = {:.4}", temperature);
            break;
        }
    }

    if config.is_correlation_enabled() {
        export_correlation(host, &files)?;
    }
    Ok(summaries)
}

fn run_temperature(
    host: &mut MonteCarloHost,
    config: &Config,
    control: &RunControl,
    slot: &SnapshotSlot,
) -> Result<RunSummary> {
    let temperature = host.parameters().temperature;
    info!("Running at T = {:.4}", temperature);

    let equilibration_steps = config.equilibration_steps();
    let equilibration = drive(
        host,
        control,
        slot,
        equilibration_steps,
        "equilibration",
        move |host, control| host.equilibrate(equilibration_steps, control),
    )?;

    let production = if equilibration.completed() {
        let production_steps = config.production_steps();
        drive(
            host,
            control,
            slot,
            production_steps,
            "production",
            move |host, control| host.produce(production_steps, control),
        )?
    } else {
        RunOutcome::default()
    };

    Ok(RunSummary {
        parameters: host.parameters().clone(),
        averages: host.averages(),
        equilibration,
        production,
    })
}

/// Run `phase` on a worker thread while this thread reports progress from
/// the shared step counter and snapshot slot.
fn drive<F>(
    host: &mut MonteCarloHost,
    control: &RunControl,
    slot: &SnapshotSlot,
    total: u64,
    label: &str,
    phase: F,
) -> Result<RunOutcome>
where
    F: FnOnce(&mut MonteCarloHost, &RunControl) -> RunOutcome + Send,
{
    control.reset_steps();
    let bar = ProgressBar::new(total);
    bar.set_style(ProgressStyle::with_template(
        " {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}] {msg}",
    )?);
    bar.set_message(label.to_string());

    let outcome = thread::scope(|s| {
        let worker = s.spawn(move || phase(host, control));
        while !worker.is_finished() {
            bar.set_position(control.steps_done());
            if let Some(snapshot) = slot.latest() {
                bar.set_message(format!("{} H = {:.2}", label, snapshot.hamiltonian));
            }
            thread::sleep(POLL_INTERVAL);
        }
        worker.join()
    })
    .map_err(|_| eyre!("Monte Carlo worker panicked during {}", label))?;

    bar.set_position(control.steps_done());
    bar.finish_and_clear();

    if let Some(interrupt) = outcome.interrupt {
        warn!("{} interrupted ({:?}) after {} steps", label, interrupt, outcome.steps);
    }
    if let Some(snapshot) = slot.latest() {
        debug!("Lattice after {}:\n{}", label, format_snapshot(&snapshot));
    }
    Ok(outcome)
}

fn export_correlation(host: &MonteCarloHost, files: &OutputFiles) -> Result<()> {
    info!("Computing pair correlation of the final configuration");
    let correlation = host.correlation();
    let structure = host.structure_function(&correlation);
    files.write_correlation(&correlation)?;
    files.write_structure_function(&structure)?;
    Ok(())
}
