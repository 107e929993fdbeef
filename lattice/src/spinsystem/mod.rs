//! Spin lattice with incrementally maintained Hamiltonian
//!
//! The lattice is a `width x height` torus stored row-major. Every site has
//! up to four neighbours (up, right, down, left); self-neighbours, which only
//! appear on 1-wide or 1-tall lattices, are dropped.
//!
//! The Hamiltonian is computed from scratch once per setup or explicit reset
//! and afterwards only ever changed by the energy delta of a move.

mod correlation;

use crate::error::ConfigError;
use crate::parameters::Parameters;
use crate::spin::{Spin, SpinState};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// Copy of the lattice state taken between two moves
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LatticeSnapshot {
    pub width: usize,
    pub height: usize,
    pub hamiltonian: f64,
    pub magnetisation: f64,
    /// Row-major spin signs, +1 or -1
    pub states: Vec<i8>,
}

#[derive(Debug, Clone)]
pub struct Spinsystem {
    parameters: Parameters,
    spins: Vec<Spin>,
    hamiltonian: f64,
    /// Sites touched by the most recent move, consumed by `flip_back`
    last_flipped: Vec<usize>,
}

impl Spinsystem {
    /// Build the lattice, draw initial states and compute the Hamiltonian.
    pub fn new<R: Rng + ?Sized>(parameters: Parameters, rng: &mut R) -> Result<Self, ConfigError> {
        parameters.validate()?;
        if parameters.temperature <= 0.0 {
            warn!(
                "Temperature {} is not positive; only energy-lowering moves will be accepted",
                parameters.temperature
            );
        }

        let sites = parameters.sites();
        let spins = (0..sites).map(|id| Spin::new(id, SpinState::Up)).collect();
        let mut system = Self {
            parameters,
            spins,
            hamiltonian: 0.0,
            last_flipped: Vec::with_capacity(2),
        };
        system.wire_neighbours();
        system.assign_states(rng);
        system.hamiltonian = system.compute_hamiltonian();

        info!(
            "Set up {} lattice with {} sites, initial H = {:.4}",
            system.parameters.shape(),
            sites,
            system.hamiltonian
        );
        Ok(system)
    }

    /// Rebuild the lattice for a new set of parameters.
    pub fn setup<R: Rng + ?Sized>(
        &mut self,
        parameters: Parameters,
        rng: &mut R,
    ) -> Result<(), ConfigError> {
        *self = Self::new(parameters, rng)?;
        Ok(())
    }

    /// Redraw every spin state in place and recompute the Hamiltonian.
    pub fn randomise<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.assign_states(rng);
        self.last_flipped.clear();
        self.hamiltonian = self.compute_hamiltonian();
        debug!("Randomised spins, H = {:.4}", self.hamiltonian);
    }

    /// Set columns to a stripe pattern: up where `cos(2π col / λ) >= 0`.
    pub fn apply_wavelength_pattern(&mut self, wavelength: u32) -> Result<(), ConfigError> {
        if wavelength == 0 {
            return Err(ConfigError::ZeroWavelength);
        }
        let width = self.width();
        let states: Vec<SpinState> = (0..self.spins.len())
            .map(|id| {
                let phase = 2.0 * PI * (id % width) as f64 / wavelength as f64;
                if phase.cos() >= 0.0 {
                    SpinState::Up
                } else {
                    SpinState::Down
                }
            })
            .collect();

        if self.parameters.constrained {
            let down = states.iter().filter(|&&s| s == SpinState::Down).count();
            if down == 0 || down == states.len() {
                return Err(ConfigError::FrozenConstrainedLattice {
                    down,
                    sites: states.len(),
                });
            }
        }

        for (spin, state) in self.spins.iter_mut().zip(states) {
            spin.set_state(state);
        }
        self.last_flipped.clear();
        self.hamiltonian = self.compute_hamiltonian();
        debug!(
            "Applied stripe pattern with wavelength {}, H = {:.4}",
            wavelength, self.hamiltonian
        );
        Ok(())
    }

    /// Take new couplings, field or temperature for the same lattice.
    ///
    /// The lattice is not reallocated; the Hamiltonian is recomputed because
    /// it depends on J and B.
    pub fn reset_parameters(&mut self, parameters: Parameters) -> Result<(), ConfigError> {
        parameters.validate()?;
        if parameters.width != self.parameters.width
            || parameters.height != self.parameters.height
            || parameters.constrained != self.parameters.constrained
        {
            return Err(ConfigError::ShapeMismatch {
                from: self.parameters.shape(),
                to: parameters.shape(),
            });
        }
        self.parameters = parameters;
        self.last_flipped.clear();
        self.hamiltonian = self.compute_hamiltonian();
        debug!(
            "Reset parameters: J = {}, B = {}, T = {}, H = {:.4}",
            self.parameters.interaction,
            self.parameters.magnetic,
            self.parameters.temperature,
            self.hamiltonian
        );
        Ok(())
    }

    /// Drop the pending move and recompute the Hamiltonian from scratch.
    pub fn refresh(&mut self) {
        self.last_flipped.clear();
        self.hamiltonian = self.compute_hamiltonian();
    }

    fn wire_neighbours(&mut self) {
        let (width, height) = (self.width(), self.height());
        for spin in self.spins.iter_mut() {
            let id = spin.id();
            let (row, col) = (id / width, id % width);
            let up = ((row + height - 1) % height) * width + col;
            let right = row * width + (col + 1) % width;
            let down = ((row + 1) % height) * width + col;
            let left = row * width + (col + width - 1) % width;

            let neighbours = [up, right, down, left]
                .into_iter()
                .filter(|&n| n != id)
                .collect();
            spin.set_neighbours(neighbours);
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            for spin in &self.spins {
                trace!("spin {} has neighbours {:?}", spin.id(), spin.neighbours());
            }
        }
    }

    fn assign_states<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.parameters.constrained {
            for spin in self.spins.iter_mut() {
                spin.set_state(if rng.gen_bool(0.5) {
                    SpinState::Up
                } else {
                    SpinState::Down
                });
            }
            return;
        }

        // validate() guarantees 0 < down < sites, so the rejection loop ends
        self.spins
            .iter_mut()
            .for_each(|s| s.set_state(SpinState::Up));
        let sites = self.spins.len();
        for _ in 0..self.parameters.down_count() {
            loop {
                let candidate = rng.gen_range(0..sites);
                if self.spins[candidate].state() == SpinState::Up {
                    self.spins[candidate].set_state(SpinState::Down);
                    break;
                }
            }
        }
    }

    /// Effective coupling between a neighbour of state `t1` and a spin of
    /// state `t2`. Spin exchange only couples unlike neighbours.
    fn coupling(&self, t1: SpinState, t2: SpinState) -> f64 {
        if !self.parameters.constrained || t1 != t2 {
            self.parameters.interaction
        } else {
            0.0
        }
    }

    /// Bond energy of a site, every bond counted from this end
    pub fn interaction_energy(&self, id: usize) -> f64 {
        let spin = &self.spins[id];
        let state = spin.state();
        -self.coupling(SpinState::Up, state) * spin.num_signed(SpinState::Up, &self.spins) as f64
            - self.coupling(SpinState::Down, state)
                * spin.num_signed(SpinState::Down, &self.spins) as f64
    }

    /// Field energy of a site, doubled so that halving the lattice sum gives `-B Σ s`
    pub fn magnetic_energy(&self, id: usize) -> f64 {
        -self.parameters.magnetic * 2.0 * self.spins[id].state().sign() as f64
    }

    /// Local energy of a site; the Hamiltonian is half the sum over all sites.
    pub fn local_energy(&self, id: usize) -> f64 {
        self.interaction_energy(id) + self.magnetic_energy(id)
    }

    /// Share of the Hamiltonian that changes when the sites in `ids` flip.
    ///
    /// Bonds reach the Hamiltonian through both endpoints, fields through one
    /// site only, hence the halved field term.
    fn move_energy(&self, ids: &[usize]) -> f64 {
        ids.iter()
            .map(|&id| self.interaction_energy(id) + 0.5 * self.magnetic_energy(id))
            .sum()
    }

    /// Full recomputation of the Hamiltonian from the current configuration
    pub fn compute_hamiltonian(&self) -> f64 {
        (0..self.spins.len())
            .map(|id| self.local_energy(id))
            .sum::<f64>()
            / 2.0
    }

    fn apply_move(&mut self, ids: &[usize]) -> f64 {
        let before = self.move_energy(ids);
        for &id in ids {
            self.spins[id].flip();
        }
        let after = self.move_energy(ids);
        self.hamiltonian += after - before;
        after - before
    }

    /// Perform one trial move and return its energy change.
    ///
    /// Single-flip mode flips one random spin. Spin-exchange mode picks a
    /// random spin with an unlike neighbour and swaps it with a random one of
    /// those neighbours. The move stays pending until the next `flip` or a
    /// `flip_back`.
    pub fn flip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let sites = self.spins.len();
        let mut moved = std::mem::take(&mut self.last_flipped);
        moved.clear();

        if !self.parameters.constrained {
            moved.push(rng.gen_range(0..sites));
        } else {
            let first = loop {
                let candidate = rng.gen_range(0..sites);
                if self.spins[candidate].num_opposite(&self.spins) > 0 {
                    break candidate;
                }
            };
            let spin = &self.spins[first];
            let neighbours = spin.neighbours();
            let second = loop {
                let candidate = neighbours[rng.gen_range(0..neighbours.len())];
                if self.spins[candidate].state() != spin.state() {
                    break candidate;
                }
            };
            moved.push(first);
            moved.push(second);
        }

        let delta = self.apply_move(&moved);
        self.last_flipped = moved;
        delta
    }

    /// Undo the pending move and return the (reverse) energy change.
    ///
    /// # Panics
    ///
    /// Panics if there is no pending move, i.e. `flip` was never called or
    /// the last move has already been undone.
    pub fn flip_back(&mut self) -> f64 {
        assert!(
            !self.last_flipped.is_empty(),
            "cannot flip back, since nothing has flipped yet"
        );
        let moved = std::mem::take(&mut self.last_flipped);
        self.apply_move(&moved)
    }

    /// Sum of spin signs
    pub fn magnetisation(&self) -> f64 {
        self.spins.iter().map(|s| s.state().sign() as f64).sum()
    }

    pub fn up_count(&self) -> usize {
        self.spins
            .iter()
            .filter(|s| s.state() == SpinState::Up)
            .count()
    }

    pub fn hamiltonian(&self) -> f64 {
        self.hamiltonian
    }

    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Sites of the pending move
    pub fn last_flipped(&self) -> &[usize] {
        &self.last_flipped
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn width(&self) -> usize {
        self.parameters.width
    }

    pub fn height(&self) -> usize {
        self.parameters.height
    }

    pub fn interaction(&self) -> f64 {
        self.parameters.interaction
    }

    pub fn magnetic(&self) -> f64 {
        self.parameters.magnetic
    }

    pub fn temperature(&self) -> f64 {
        self.parameters.temperature
    }

    pub fn is_constrained(&self) -> bool {
        self.parameters.constrained
    }

    pub fn snapshot(&self) -> LatticeSnapshot {
        LatticeSnapshot {
            width: self.width(),
            height: self.height(),
            hamiltonian: self.hamiltonian,
            magnetisation: self.magnetisation(),
            states: self.spins.iter().map(|s| s.state().sign()).collect(),
        }
    }
}

impl fmt::Display for Spinsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width();
        for spin in &self.spins {
            let separator = if (spin.id() + 1) % width == 0 { '\n' } else { ' ' };
            write!(f, "{}{}", spin.state(), separator)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
