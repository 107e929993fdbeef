use super::*;
use approx::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn params(width: usize, height: usize) -> Parameters {
    Parameters {
        width,
        height,
        ..Parameters::default()
    }
}

fn constrained(width: usize, height: usize, ratio: f64) -> Parameters {
    Parameters {
        constrained: true,
        ratio,
        ..params(width, height)
    }
}

/// Energy from the right and down bond of every site, independent of the
/// local-energy bookkeeping.
fn reference_energy(system: &Spinsystem) -> f64 {
    let (width, height) = (system.width(), system.height());
    let states = system.snapshot().states;
    let p = system.parameters();
    let mut energy = 0.0;
    for row in 0..height {
        for col in 0..width {
            let id = row * width + col;
            let s = states[id] as f64;
            let right = row * width + (col + 1) % width;
            let down = ((row + 1) % height) * width + col;
            for n in [right, down] {
                if n == id {
                    continue;
                }
                let t = states[n] as f64;
                energy += if p.constrained {
                    if s != t {
                        p.interaction
                    } else {
                        0.0
                    }
                } else {
                    -p.interaction * s * t
                };
            }
            energy -= p.magnetic * s;
        }
    }
    energy
}

#[test]
fn test_spinsystem_creation() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let system = Spinsystem::new(params(5, 4), &mut rng).unwrap();
    assert_eq!(system.spins().len(), 20);
    assert_eq!(system.width(), 5);
    assert_eq!(system.height(), 4);
    for (id, spin) in system.spins().iter().enumerate() {
        assert_eq!(spin.id(), id);
        assert_eq!(spin.neighbours().len(), 4);
        assert!(!spin.neighbours().contains(&id));
    }
    assert!(system.last_flipped().is_empty());
}

#[test]
fn test_neighbour_order_and_wrapping() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let system = Spinsystem::new(params(3, 3), &mut rng).unwrap();
    // up, right, down, left
    assert_eq!(system.spins()[0].neighbours(), &[6, 1, 3, 2]);
    assert_eq!(system.spins()[4].neighbours(), &[1, 5, 7, 3]);
    assert_eq!(system.spins()[8].neighbours(), &[5, 6, 2, 7]);
}

#[test]
fn test_degenerate_lattice_has_no_self_neighbours() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let row = Spinsystem::new(params(4, 1), &mut rng).unwrap();
    for spin in row.spins() {
        assert_eq!(spin.neighbours().len(), 2);
        assert!(!spin.neighbours().contains(&spin.id()));
    }

    let single = Spinsystem::new(params(1, 1), &mut rng).unwrap();
    assert!(single.spins()[0].neighbours().is_empty());
    assert_relative_eq!(single.hamiltonian(), 0.0);
}

#[test]
fn test_invalid_parameters_fail_setup() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let odd = constrained(3, 3, 0.5);
    assert_eq!(
        Spinsystem::new(odd, &mut rng).unwrap_err(),
        ConfigError::OddConstrainedSize { sites: 9 }
    );

    let field = Parameters {
        magnetic: 1.0,
        ..constrained(4, 4, 0.5)
    };
    assert!(matches!(
        Spinsystem::new(field, &mut rng),
        Err(ConfigError::FieldWithConstraint { .. })
    ));
}

#[test]
fn test_ordered_state_energy() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    // wavelength far beyond the width leaves every column up
    system.apply_wavelength_pattern(100).unwrap();
    assert_eq!(system.up_count(), 16);
    assert_relative_eq!(system.magnetisation(), 16.0);
    assert_relative_eq!(system.hamiltonian(), -32.0, epsilon = 1e-10);

    let field = Parameters {
        magnetic: 0.5,
        ..params(4, 4)
    };
    system.reset_parameters(field).unwrap();
    assert_relative_eq!(system.hamiltonian(), -40.0, epsilon = 1e-10);
}

#[test]
fn test_local_energy_components() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let p = Parameters {
        magnetic: 0.25,
        ..params(4, 4)
    };
    let mut system = Spinsystem::new(p, &mut rng).unwrap();
    system.apply_wavelength_pattern(100).unwrap();
    assert_relative_eq!(system.interaction_energy(5), -4.0);
    assert_relative_eq!(system.magnetic_energy(5), -0.5);
    assert_relative_eq!(system.local_energy(5), -4.5);
}

#[test]
fn test_initial_hamiltonian_matches_reference() {
    for seed in 0..5 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let p = Parameters {
            interaction: 0.7,
            magnetic: -0.3,
            ..params(6, 5)
        };
        let system = Spinsystem::new(p, &mut rng).unwrap();
        assert_relative_eq!(
            system.hamiltonian(),
            reference_energy(&system),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_single_flip_tracks_hamiltonian() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let p = Parameters {
        magnetic: 0.4,
        ..params(5, 3)
    };
    let mut system = Spinsystem::new(p, &mut rng).unwrap();

    for _ in 0..500 {
        let before = system.hamiltonian();
        let delta = system.flip(&mut rng);
        assert_eq!(system.last_flipped().len(), 1);
        assert_relative_eq!(system.hamiltonian() - before, delta, epsilon = 1e-9);
        assert_relative_eq!(
            system.hamiltonian(),
            reference_energy(&system),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_flip_back_restores_energy() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let p = Parameters {
        magnetic: 0.2,
        ..params(4, 4)
    };
    let mut system = Spinsystem::new(p, &mut rng).unwrap();

    for _ in 0..200 {
        let before = system.hamiltonian();
        let states_before = system.snapshot().states;
        system.flip(&mut rng);
        system.flip_back();
        assert_relative_eq!(system.hamiltonian(), before, epsilon = 1e-9);
        assert_eq!(system.snapshot().states, states_before);
        assert!(system.last_flipped().is_empty());
    }
}

#[test]
fn test_spin_exchange_conserves_up_count() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut system = Spinsystem::new(constrained(6, 4, 0.25), &mut rng).unwrap();
    assert_eq!(system.up_count(), 18);

    for step in 0..300 {
        let states = system.snapshot().states;
        system.flip(&mut rng);

        let moved = system.last_flipped().to_vec();
        assert_eq!(moved.len(), 2);
        assert!(system.spins()[moved[0]].neighbours().contains(&moved[1]));
        assert_ne!(states[moved[0]], states[moved[1]]);

        if step % 2 == 0 {
            system.flip_back();
        }
        assert_eq!(system.up_count(), 18);
        assert_relative_eq!(
            system.hamiltonian(),
            reference_energy(&system),
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_constrained_initialisation_uses_ratio() {
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let mut system = Spinsystem::new(constrained(8, 8, 0.3), &mut rng).unwrap();
    // 0.3 * 64 = 19.2 spins down, truncated
    assert_eq!(system.up_count(), 45);
    system.randomise(&mut rng);
    assert_eq!(system.up_count(), 45);
    assert_relative_eq!(
        system.hamiltonian(),
        reference_energy(&system),
        epsilon = 1e-9
    );
}

#[test]
#[should_panic(expected = "nothing has flipped yet")]
fn test_flip_back_without_flip_panics() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    system.flip_back();
}

#[test]
#[should_panic(expected = "nothing has flipped yet")]
fn test_double_flip_back_panics() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    system.flip(&mut rng);
    system.flip_back();
    system.flip_back();
}

#[test]
fn test_wavelength_pattern() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let mut system = Spinsystem::new(params(4, 2), &mut rng).unwrap();
    system.apply_wavelength_pattern(2).unwrap();
    assert_eq!(system.to_string(), "+ - + -\n+ - + -\n");
    assert_relative_eq!(system.magnetisation(), 0.0);
    assert_eq!(
        system.apply_wavelength_pattern(0),
        Err(ConfigError::ZeroWavelength)
    );

    let mut frozen = Spinsystem::new(constrained(4, 4, 0.5), &mut rng).unwrap();
    assert!(matches!(
        frozen.apply_wavelength_pattern(100),
        Err(ConfigError::FrozenConstrainedLattice { down: 0, sites: 16 })
    ));
}

#[test]
fn test_reset_parameters_rejects_new_shape() {
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    let result = system.reset_parameters(params(4, 6));
    assert!(matches!(result, Err(ConfigError::ShapeMismatch { .. })));

    let hotter = Parameters {
        temperature: 5.0,
        interaction: 2.0,
        ..params(4, 4)
    };
    let states = system.snapshot().states;
    system.reset_parameters(hotter).unwrap();
    assert_eq!(system.snapshot().states, states);
    assert_relative_eq!(system.temperature(), 5.0);
    assert_relative_eq!(
        system.hamiltonian(),
        reference_energy(&system),
        epsilon = 1e-9
    );
}

#[test]
fn test_setup_rebuilds_lattice() {
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    system.flip(&mut rng);
    system.setup(params(6, 2), &mut rng).unwrap();
    assert_eq!(system.spins().len(), 12);
    assert!(system.last_flipped().is_empty());
}

#[test]
fn test_zero_temperature_is_accepted() {
    let mut rng = ChaCha8Rng::seed_from_u64(16);
    let p = Parameters {
        temperature: 0.0,
        ..params(4, 4)
    };
    assert!(Spinsystem::new(p, &mut rng).is_ok());
}

#[test]
fn test_toroidal_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let system = Spinsystem::new(params(5, 4), &mut rng).unwrap();
    assert_relative_eq!(system.distance(0, 1), 1.0);
    // column 0 to column 4 wraps to a single step
    assert_relative_eq!(system.distance(0, 4), 1.0);
    // row 0 to row 3 wraps as well
    assert_relative_eq!(system.distance(0, 15), 1.0);
    // (row 2, col 2) and (row 1, col 2) stay within half the lattice
    assert_relative_eq!(system.distance(0, 12), 8.0f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(system.distance(0, 7), 5.0f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(system.distance(7, 0), system.distance(0, 7));
}

#[test]
fn test_correlation_bins_depend_only_on_shape() {
    let keys: Vec<Vec<f64>> = (0..4)
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
            system.correlate().keys().collect()
        })
        .collect();

    for k in &keys[1..] {
        assert_eq!(k, &keys[0]);
    }
    // 1, √2, 2, √5, √8
    assert_eq!(keys[0].len(), 5);
}

#[test]
fn test_correlation_values_in_unit_interval() {
    let mut rng = ChaCha8Rng::seed_from_u64(18);
    let system = Spinsystem::new(params(7, 6), &mut rng).unwrap();
    for (_, g) in system.correlate().iter() {
        assert!((0.0..=1.0).contains(&g));
    }
}

#[test]
fn test_correlation_of_stripes() {
    let mut rng = ChaCha8Rng::seed_from_u64(19);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    system.apply_wavelength_pattern(2).unwrap();
    let g = system.correlate();
    // horizontal neighbours differ, vertical neighbours agree
    assert_relative_eq!(g.get(1.0).unwrap(), 0.5);
    assert_relative_eq!(g.get(2.0).unwrap(), 1.0);
    assert_relative_eq!(g.get(2.0f64.sqrt()).unwrap(), 0.0);

    system.apply_wavelength_pattern(100).unwrap();
    assert!(system.correlate().iter().all(|(_, g)| g == 1.0));
}

#[test]
fn test_structure_function() {
    let mut rng = ChaCha8Rng::seed_from_u64(20);
    let mut system = Spinsystem::new(params(4, 4), &mut rng).unwrap();
    system.apply_wavelength_pattern(100).unwrap();
    let g = system.correlate();
    let s = system.compute_structure_function(&g);

    assert_eq!(s.len(), 4);
    // at k = 0 every bin contributes its full weight
    assert_relative_eq!(s.get(0.0).unwrap(), g.len() as f64, epsilon = 1e-12);
    let k = std::f64::consts::PI / 2.0;
    let expected: f64 = g.iter().map(|(r, v)| v * (k * r).cos()).sum();
    assert_relative_eq!(s.get(k).unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn test_snapshot() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let system = Spinsystem::new(params(3, 2), &mut rng).unwrap();
    let snapshot = system.snapshot();
    assert_eq!(snapshot.states.len(), 6);
    assert_eq!((snapshot.width, snapshot.height), (3, 2));
    assert_relative_eq!(snapshot.hamiltonian, system.hamiltonian());
    assert_relative_eq!(
        snapshot.magnetisation,
        snapshot.states.iter().map(|&s| s as f64).sum::<f64>()
    );
}
