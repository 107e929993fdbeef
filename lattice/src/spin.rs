use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary state of a lattice site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SpinState {
    Up,
    Down,
}

impl SpinState {
    /// The opposite state
    pub fn flipped(self) -> Self {
        match self {
            SpinState::Up => SpinState::Down,
            SpinState::Down => SpinState::Up,
        }
    }

    /// +1 for up, -1 for down
    pub fn sign(self) -> i8 {
        match self {
            SpinState::Up => 1,
            SpinState::Down => -1,
        }
    }
}

impl fmt::Display for SpinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpinState::Up => "+",
            SpinState::Down => "-",
        })
    }
}

/// A single lattice site.
///
/// Neighbours are stored as indices into the spin array owned by the
/// `Spinsystem`, so a spin never owns or borrows another spin. The spin knows
/// nothing about energies; callers do the bookkeeping around `flip`.
#[derive(Debug, Clone)]
pub struct Spin {
    id: usize,
    state: SpinState,
    neighbours: Vec<usize>,
}

impl Spin {
    pub fn new(id: usize, state: SpinState) -> Self {
        Self {
            id,
            state,
            neighbours: Vec::with_capacity(4),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn set_state(&mut self, state: SpinState) {
        self.state = state;
    }

    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }

    pub(crate) fn set_neighbours(&mut self, neighbours: Vec<usize>) {
        self.neighbours = neighbours;
    }

    /// Toggle the state unconditionally
    pub fn flip(&mut self) {
        self.state = self.state.flipped();
    }

    /// Number of neighbours currently in state `target`
    pub fn num(&self, target: SpinState, lattice: &[Spin]) -> i32 {
        self.neighbours
            .iter()
            .filter(|&&n| lattice[n].state == target)
            .count() as i32
    }

    /// Signed neighbour count: positive when `target` is this spin's own
    /// state, negative otherwise.
    pub fn num_signed(&self, target: SpinState, lattice: &[Spin]) -> i32 {
        let num = self.num(target, lattice);
        if target == self.state {
            num
        } else {
            -num
        }
    }

    /// Number of neighbours in the opposite state
    pub fn num_opposite(&self, lattice: &[Spin]) -> i32 {
        self.num(self.state.flipped(), lattice)
    }
}
