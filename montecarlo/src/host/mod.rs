//! Monte Carlo host owning one lattice and its sampled time series

use crate::control::{Interrupt, RunControl, RunOutcome};
use crate::metropolis::{self, MoveEvent, MoveObserver};
use crate::stats::Averages;
use lattice::{ConfigError, Histogram, LatticeSnapshot, Parameters, Spinsystem};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// Drives Metropolis steps over a `Spinsystem` and records samples.
///
/// `energies` and `magnetisations` always have the same length: one entry
/// per completed production run, none for equilibration runs.
pub struct MonteCarloHost<R: Rng = ChaCha8Rng> {
    spinsystem: Spinsystem,
    rng: R,
    energies: Vec<f64>,
    magnetisations: Vec<f64>,
    /// (production step, H) recorded by `produce`, starting at step 0
    trajectory: Vec<(u64, f64)>,
    produced: u64,
    observer: Option<Box<dyn MoveObserver>>,
}

impl MonteCarloHost<ChaCha8Rng> {
    /// Host with a ChaCha8 generator, seeded from `seed` or from OS entropy.
    pub fn seeded(parameters: Parameters, seed: Option<u64>) -> Result<Self, ConfigError> {
        let rng = match seed {
            Some(seed) => {
                info!("Using random seed {}", seed);
                ChaCha8Rng::seed_from_u64(seed)
            }
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(parameters, rng)
    }
}

impl<R: Rng> MonteCarloHost<R> {
    pub fn new(parameters: Parameters, mut rng: R) -> Result<Self, ConfigError> {
        let spinsystem = Spinsystem::new(parameters, &mut rng)?;
        Ok(Self {
            spinsystem,
            rng,
            energies: Vec::new(),
            magnetisations: Vec::new(),
            trajectory: Vec::new(),
            produced: 0,
            observer: None,
        })
    }

    /// Report every trial move to `observer`.
    pub fn with_observer(mut self, observer: impl MoveObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Rebuild the lattice for `parameters` and clear all records.
    pub fn setup(&mut self, parameters: Parameters) -> Result<(), ConfigError> {
        self.spinsystem.setup(parameters, &mut self.rng)?;
        self.clear_records();
        Ok(())
    }

    /// Switch to new couplings, field or temperature on the same lattice.
    ///
    /// Records belong to the old parameters and are cleared.
    pub fn set_parameters(&mut self, parameters: Parameters) -> Result<(), ConfigError> {
        self.spinsystem.reset_parameters(parameters)?;
        self.clear_records();
        Ok(())
    }

    /// Reinitialise spin states: the stripe pattern when a wavelength is
    /// configured, a fresh random draw otherwise.
    pub fn reset_spins(&mut self) -> Result<(), ConfigError> {
        match self.spinsystem.parameters().wavelength {
            Some(wavelength) => self.spinsystem.apply_wavelength_pattern(wavelength),
            None => {
                self.spinsystem.randomise(&mut self.rng);
                Ok(())
            }
        }
    }

    /// Empty both series and refresh the lattice's derived state.
    pub fn clear_records(&mut self) {
        self.energies.clear();
        self.magnetisations.clear();
        self.trajectory.clear();
        self.produced = 0;
        self.spinsystem.refresh();
        debug!("Cleared records, H = {:.4}", self.spinsystem.hamiltonian());
    }

    /// Run `steps` Metropolis steps; sample once at the end unless equilibrating.
    pub fn run(&mut self, steps: u64, equilibration: bool) -> RunOutcome {
        self.run_controlled(steps, equilibration, &RunControl::new())
    }

    /// `run` with cooperative pause/abort and snapshot publishing.
    ///
    /// `control` is checked before every step. An interrupted run keeps the
    /// steps it completed but records no sample.
    pub fn run_controlled(
        &mut self,
        steps: u64,
        equilibration: bool,
        control: &RunControl,
    ) -> RunOutcome {
        control.set_running(true);
        let temperature = self.spinsystem.temperature();
        let mut outcome = RunOutcome::default();

        for _ in 0..steps {
            if let Some(interrupt) = control.interrupt() {
                outcome.interrupt = Some(interrupt);
                break;
            }
            self.step(temperature);
            outcome.steps += 1;

            let spinsystem = &self.spinsystem;
            control.record_step(|| spinsystem.snapshot());
        }

        if outcome.completed() && !equilibration {
            self.energies.push(self.spinsystem.hamiltonian());
            self.magnetisations.push(self.spinsystem.magnetisation());
        }
        control.publish(|| self.spinsystem.snapshot());
        control.set_running(false);

        match outcome.interrupt {
            Some(Interrupt::Paused) => info!("Run paused after {} steps", outcome.steps),
            Some(Interrupt::Aborted) => info!("Run aborted after {} steps", outcome.steps),
            None => {}
        }
        outcome
    }

    /// One trial move followed by the Metropolis decision.
    fn step(&mut self, temperature: f64) {
        let delta = self.spinsystem.flip(&mut self.rng);
        let accepted = metropolis::accept(delta, temperature, &mut self.rng);

        let sites = if self.observer.is_some() {
            self.spinsystem.last_flipped().to_vec()
        } else {
            Vec::new()
        };
        if !accepted {
            self.spinsystem.flip_back();
        }

        if let Some(observer) = self.observer.as_mut() {
            observer.on_move(&MoveEvent {
                sites,
                delta,
                accepted,
                hamiltonian: self.spinsystem.hamiltonian(),
            });
        }
    }

    /// Equilibration steps, never sampled.
    pub fn equilibrate(&mut self, steps: u64, control: &RunControl) -> RunOutcome {
        info!("Equilibrating for {} steps", steps);
        self.run_controlled(steps, true, control)
    }

    /// Production run of `steps` steps, sampled every `print_freq` steps.
    ///
    /// Trailing steps that do not fill a whole sampling block are not run.
    pub fn produce(&mut self, steps: u64, control: &RunControl) -> RunOutcome {
        let stride = self.spinsystem.parameters().print_freq;
        let blocks = steps / stride;
        if steps % stride != 0 {
            warn!(
                "{} production steps are not a multiple of the sampling stride {}; running {}",
                steps,
                stride,
                blocks * stride
            );
        }
        info!("Production run: {} samples of {} steps", blocks, stride);

        if self.trajectory.is_empty() {
            self.trajectory.push((0, self.spinsystem.hamiltonian()));
        }

        let mut total = RunOutcome::default();
        for _ in 0..blocks {
            let outcome = self.run_controlled(stride, false, control);
            total.steps += outcome.steps;
            self.produced += outcome.steps;
            if outcome.completed() {
                self.trajectory
                    .push((self.produced, self.spinsystem.hamiltonian()));
            } else {
                total.interrupt = outcome.interrupt;
                break;
            }
        }
        total
    }

    pub fn averages(&self) -> Averages {
        Averages::compute(
            &self.energies,
            &self.magnetisations,
            self.spinsystem.temperature(),
            self.spinsystem.parameters().sites(),
        )
    }

    /// Pair correlation of the current configuration
    pub fn correlation(&self) -> Histogram {
        self.spinsystem.correlate()
    }

    pub fn structure_function(&self, correlation: &Histogram) -> Histogram {
        self.spinsystem.compute_structure_function(correlation)
    }

    pub fn spinsystem(&self) -> &Spinsystem {
        &self.spinsystem
    }

    pub fn parameters(&self) -> &Parameters {
        self.spinsystem.parameters()
    }

    pub fn hamiltonian(&self) -> f64 {
        self.spinsystem.hamiltonian()
    }

    pub fn magnetisation(&self) -> f64 {
        self.spinsystem.magnetisation()
    }

    pub fn snapshot(&self) -> LatticeSnapshot {
        self.spinsystem.snapshot()
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn magnetisations(&self) -> &[f64] {
        &self.magnetisations
    }

    pub fn trajectory(&self) -> &[(u64, f64)] {
        &self.trajectory
    }
}
