//! Command-line entry point for lattice Monte Carlo runs driven by a YAML file.

use color_eyre::eyre::Result;
use montecarlo::app::Application;

fn main() -> Result<()> {
    color_eyre::install()?;
    Application::from_cli()?.run()
}
