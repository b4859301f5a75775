use quickcheck_macros::quickcheck;
use xplot_wasm::domain::layer::{
    ComplexMode, LOG_FLOOR_REAL, PhaseUnits, apply_transform, phase,
};

#[quickcheck]
fn real_mode_on_real_data_is_identity(values: Vec<i32>) -> bool {
    let raw: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    let out = apply_transform(&raw, false, ComplexMode::Real, PhaseUnits::Radians);
    out.ys == raw && out.xs.is_none()
}

#[quickcheck]
fn magnitude_of_complex_is_non_negative(pairs: Vec<(i16, i16)>) -> bool {
    let raw: Vec<f64> = pairs.iter().flat_map(|&(re, im)| [re as f64, im as f64]).collect();
    let out = apply_transform(&raw, true, ComplexMode::Magnitude, PhaseUnits::Radians);
    out.ys.len() == pairs.len() && out.ys.iter().all(|&m| m >= 0.0)
}

#[test]
fn phase_of_origin_is_zero() {
    assert_eq!(phase(0.0, 0.0), 0.0);
    let out = apply_transform(&[0.0, 0.0], true, ComplexMode::Phase, PhaseUnits::Degrees);
    assert_eq!(out.ys, vec![0.0]);
}

#[test]
fn phase_units_scale_a_quarter_turn() {
    let raw = [0.0, 1.0];
    let degrees = apply_transform(&raw, true, ComplexMode::Phase, PhaseUnits::Degrees);
    let cycles = apply_transform(&raw, true, ComplexMode::Phase, PhaseUnits::Cycles);
    assert!((degrees.ys[0] - 90.0).abs() < 1e-9);
    assert!((cycles.ys[0] - 0.25).abs() < 1e-12);
}

#[test]
fn log_of_zero_hits_the_floor() {
    let out = apply_transform(&[0.0, 100.0], false, ComplexMode::Log20, PhaseUnits::Radians);
    assert_eq!(out.ys[0], 20.0 * LOG_FLOOR_REAL.log10());
    assert!((out.ys[1] - 40.0).abs() < 1e-9);
    assert!(out.ys.iter().all(|y| y.is_finite()));
}

#[test]
fn imag_vs_real_moves_real_part_to_x() {
    let out = apply_transform(&[1.0, 2.0, 3.0, 4.0], true, ComplexMode::ImagVsReal, PhaseUnits::Radians);
    assert_eq!(out.xs, Some(vec![1.0, 3.0]));
    assert_eq!(out.ys, vec![2.0, 4.0]);
}
