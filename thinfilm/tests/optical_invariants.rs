//! Physical sanity checks on complete passes and sweeps

use approx::assert_relative_eq;
use ndarray::Array2;
use num_complex::Complex64;
use thinfilm::photocurrent::ideal_current;
use thinfilm::{
    DeviceSimulation, OpticalConstants, Stack, SweepRange, ThicknessSweep, WavelengthGrid,
};

fn constants_for(indices: &[Complex64], grid: WavelengthGrid) -> OpticalConstants {
    let names = (0..indices.len()).map(|i| format!("layer{}", i)).collect();
    let table = Array2::from_shape_fn((indices.len(), grid.len()), |(layer, _)| indices[layer]);
    let spectrum = vec![0.1; grid.len()];
    OpticalConstants::new(grid, names, table, spectrum).unwrap()
}

#[test]
fn test_absorber_sweep_is_continuous_and_non_decreasing() {
    // Behind the last interface nothing reflects, so thickening the absorber
    // only appends samples to an unchanged field profile
    let grid = WavelengthGrid::single(500.0).unwrap();
    let constants = constants_for(&[Complex64::new(1.5, 0.0), Complex64::new(2.0, 0.1)], grid);
    let stack = Stack::from_parts(&["glass", "absorber"], &[0.0, 0.0]).unwrap();
    let range = SweepRange::new(0.0, 300.0, 5.0).unwrap();
    let sweep = ThicknessSweep::new(stack, 1, 1, range, 5.0).unwrap();

    let currents = sweep.run(&constants).unwrap().currents();
    assert_eq!(currents.len(), 61);

    let steps: Vec<f64> = currents.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(steps.iter().all(|&d| d > 0.0));
    // Each step adds one sample deeper in a decaying field
    assert!(steps.windows(2).all(|w| w[1] <= w[0] * (1.0 + 1e-9)));
    assert!(steps.iter().all(|&d| d <= currents[1] * (1.0 + 1e-9)));

    assert!(currents[60] < ideal_current(&constants));
}

#[test]
fn test_absorbing_stack_reflectance_bounded() {
    let grid = WavelengthGrid::from_range(350.0, 800.0, 5.0).unwrap();
    let constants = constants_for(
        &[
            Complex64::new(1.5, 0.0),
            Complex64::new(1.9, 0.02),
            Complex64::new(1.5, 0.01),
            Complex64::new(2.0, 0.4),
            Complex64::new(0.3, 3.0),
            Complex64::new(1.2, 7.0),
        ],
        grid,
    );
    let stack = Stack::from_parts(
        &["SiO2", "ITO", "PEDOT", "BHJ", "Ca", "Al"],
        &[0.0, 110.0, 35.0, 220.0, 7.0, 200.0],
    )
    .unwrap();

    let solution = DeviceSimulation::new(&constants, 3, 1.0)
        .unwrap()
        .run(&stack)
        .unwrap();

    for &r in &solution.reflectance {
        assert!((0.0..=1.0).contains(&r), "R = {}", r);
    }
    assert!(solution.field.iter().all(|e| e.is_finite()));
    assert!(solution.jsc > 0.0 && solution.jsc < ideal_current(&constants));
}

#[test]
fn test_lossless_stack_conserves_energy() {
    let grid = WavelengthGrid::from_range(400.0, 700.0, 10.0).unwrap();
    let constants = constants_for(
        &[
            Complex64::new(1.5, 0.0),
            Complex64::new(2.3, 0.0),
            Complex64::new(1.38, 0.0),
            Complex64::new(1.0, 0.0),
        ],
        grid,
    );
    let stack = Stack::from_parts(&["glass", "TiO2", "MgF2", "air"], &[0.0, 60.0, 95.0, 10.0])
        .unwrap();
    let solution = DeviceSimulation::new(&constants, 1, 1.0)
        .unwrap()
        .run(&stack)
        .unwrap();

    for (r, t) in solution.reflectance.iter().zip(&solution.transmittance) {
        assert_relative_eq!(r + t, 1.0, epsilon = 1e-10);
    }
    assert_eq!(solution.jsc, 0.0);
    assert!(solution.absorptance.iter().all(|&a| a == 0.0));
}
