//! Complex-to-real sample transforms.

use super::value_objects::{ComplexMode, PhaseUnits};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Floor applied before `log10` on real samples
pub const LOG_FLOOR_REAL: f64 = 1e-20;
/// Floor applied to magnitude squared before `log10` on complex samples
pub const LOG_FLOOR_COMPLEX: f64 = 1e-37;

#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Output of [`apply_transform`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transformed {
    pub ys: Vec<f64>,
    /// Replacement abscissae; only set in [`ComplexMode::ImagVsReal`]
    pub xs: Option<Vec<f64>>,
}

/// Convert raw samples (interleaved re/im when `complex`) into plottable values
pub fn apply_transform(raw: &[f64], complex: bool, mode: ComplexMode, units: PhaseUnits) -> Transformed {
    if complex {
        transform_complex(raw, mode, units)
    } else {
        transform_real(raw, mode, units)
    }
}

fn transform_real(raw: &[f64], mode: ComplexMode, units: PhaseUnits) -> Transformed {
    let ys = match mode {
        ComplexMode::Real | ComplexMode::Imaginary => raw.to_vec(),
        ComplexMode::Magnitude => map_samples(raw, 1, |s| s[0].abs()),
        ComplexMode::MagnitudeSquared => map_samples(raw, 1, |s| s[0] * s[0]),
        ComplexMode::Phase => {
            let scale = units.scale();
            map_samples(raw, 1, move |s| phase(s[0], 0.0) * scale)
        }
        ComplexMode::Log10 => map_samples(raw, 1, |s| 10.0 * s[0].abs().max(LOG_FLOOR_REAL).log10()),
        ComplexMode::Log20 => map_samples(raw, 1, |s| 20.0 * s[0].abs().max(LOG_FLOOR_REAL).log10()),
        ComplexMode::ImagVsReal => {
            return Transformed { ys: vec![0.0; raw.len()], xs: Some(raw.to_vec()) };
        }
    };
    Transformed { ys, xs: None }
}

fn transform_complex(raw: &[f64], mode: ComplexMode, units: PhaseUnits) -> Transformed {
    let ys = match mode {
        ComplexMode::Magnitude => map_samples(raw, 2, |s| s[0].hypot(s[1])),
        ComplexMode::MagnitudeSquared => map_samples(raw, 2, |s| s[0] * s[0] + s[1] * s[1]),
        ComplexMode::Phase => {
            let scale = units.scale();
            map_samples(raw, 2, move |s| phase(s[0], s[1]) * scale)
        }
        ComplexMode::Real => map_samples(raw, 2, |s| s[0]),
        ComplexMode::Imaginary => map_samples(raw, 2, |s| s[1]),
        // 10·log10(|z|) == 5·log10(|z|²)
        ComplexMode::Log10 => map_samples(raw, 2, |s| 5.0 * power(s).max(LOG_FLOOR_COMPLEX).log10()),
        ComplexMode::Log20 => map_samples(raw, 2, |s| 10.0 * power(s).max(LOG_FLOOR_COMPLEX).log10()),
        ComplexMode::ImagVsReal => {
            let xs = map_samples(raw, 2, |s| s[0]);
            let ys = map_samples(raw, 2, |s| s[1]);
            return Transformed { ys, xs: Some(xs) };
        }
    };
    Transformed { ys, xs: None }
}

/// `atan2(im, re)` with an exact zero treated as `re = 1`
pub fn phase(re: f64, im: f64) -> f64 {
    let re = if re == 0.0 && im == 0.0 { 1.0 } else { re };
    im.atan2(re)
}

fn power(s: &[f64]) -> f64 {
    s[0] * s[0] + s[1] * s[1]
}

fn map_samples<F>(raw: &[f64], width: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    #[cfg(feature = "parallel")]
    if raw.len() >= PARALLEL_THRESHOLD {
        return raw.par_chunks_exact(width).map(|s| f(s)).collect();
    }
    raw.chunks_exact(width).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_phase_is_zero() {
        let out = apply_transform(&[0.0, 0.0], true, ComplexMode::Phase, PhaseUnits::Degrees);
        assert_eq!(out.ys, vec![0.0]);
    }

    #[test]
    fn log_of_zero_hits_floor() {
        let out = apply_transform(&[0.0], false, ComplexMode::Log10, PhaseUnits::Radians);
        assert_eq!(out.ys, vec![10.0 * LOG_FLOOR_REAL.log10()]);
        let out = apply_transform(&[0.0, 0.0], true, ComplexMode::Log20, PhaseUnits::Radians);
        assert_eq!(out.ys, vec![10.0 * LOG_FLOOR_COMPLEX.log10()]);
    }

    #[test]
    fn complex_log_halves_scale_on_power() {
        let out = apply_transform(&[3.0, 4.0], true, ComplexMode::Log20, PhaseUnits::Radians);
        assert!((out.ys[0] - 20.0 * 5f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn imag_vs_real_moves_real_part_to_x() {
        let out = apply_transform(&[1.0, 2.0, 3.0, 4.0], true, ComplexMode::ImagVsReal, PhaseUnits::Radians);
        assert_eq!(out.xs, Some(vec![1.0, 3.0]));
        assert_eq!(out.ys, vec![2.0, 4.0]);
    }

    #[test]
    fn real_layer_magnitude_is_absolute() {
        let out = apply_transform(&[-2.0, 3.0], false, ComplexMode::Magnitude, PhaseUnits::Radians);
        assert_eq!(out.ys, vec![2.0, 3.0]);
    }
}
