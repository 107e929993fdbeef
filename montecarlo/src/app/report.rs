use crate::app::runner::RunSummary;
use crate::config::Config;
use tracing::info;

pub fn report_configuration(config: &Config) {
    let p = config.parameters();
    info!("\nLattice: {} x {} ({} sites)", p.width, p.height, p.sites());
    if p.constrained {
        info!(
            "  Dynamics: spin exchange, {} down spins (ratio {:.3})",
            p.down_count(),
            p.ratio
        );
    } else {
        info!("  Dynamics: single spin flip");
    }
    info!("  J = {:.4}, B = {:.4}, T = {:.4}", p.interaction, p.magnetic, p.temperature);
    info!(
        "  Equilibration: {} steps, production: {} steps, sampled every {}",
        config.equilibration_steps(),
        config.production_steps(),
        p.print_freq
    );
    if let Some(wavelength) = p.wavelength {
        info!("  Initial stripe wavelength: {}", wavelength);
    }
}

pub fn report_run_summary(summary: &RunSummary) {
    let avg = &summary.averages;
    info!(
        "\nRun finished at T = {:.4} ({} samples)",
        summary.parameters.temperature, avg.samples
    );
    info!("  <H>   = {:.6}", avg.energy);
    info!("  <M>   = {:.6}", avg.magnetisation);
    info!("  <chi> = {:.10}", avg.susceptibility);
    info!("  <Cv>  = {:.10}", avg.heat_capacity);
}

pub fn report_sweep_summary(summaries: &[RunSummary]) {
    info!("\nTemperature sweep finished ({} temperatures):", summaries.len());
    info!(
        "  {:>8} {:>14} {:>14} {:>18} {:>18}",
        "T", "<H>", "<M>", "<chi>", "<Cv>"
    );
    for summary in summaries {
        let avg = &summary.averages;
        info!(
            "  {:>8.4} {:>14.4} {:>14.6} {:>18.10} {:>18.10}",
            summary.parameters.temperature,
            avg.energy,
            avg.magnetisation,
            avg.susceptibility,
            avg.heat_capacity
        );
    }
}
