//! Auto-scale engine: computes the pan range across every layer.

use super::value_objects::{AutoMode, PanRange};
use crate::domain::layer::{ComplexMode, Layer};
use crate::domain::logging::{LogComponent, LogLevel, get_logger};

/// Inputs of a scale pass that come from plot settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSettings {
    pub autox: AutoMode,
    pub autoy: AutoMode,
    /// Explicit y bounds used for sides that are not auto-scaled
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    /// Scan every window up to the requested xmax instead of only the first
    pub all: bool,
    /// With `all`, scan the whole buffer regardless of the requested x range
    pub expand: bool,
    /// Damping factor; values above 1 blend new y extents with the previous ones
    pub autol: i32,
    /// Samples materialized per window
    pub bufmax: usize,
    /// Fraction of the y span added on each auto-scaled side
    pub ymargin_fraction: f64,
}

impl Default for ScaleSettings {
    fn default() -> Self {
        Self {
            autox: AutoMode::Both,
            autoy: AutoMode::Both,
            ymin: None,
            ymax: None,
            all: false,
            expand: false,
            autol: -1,
            bufmax: 32768,
            ymargin_fraction: 0.02,
        }
    }
}

/// Running min/max over finite values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Default for Extents {
    fn default() -> Self {
        Self {
            xmin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymin: f64::INFINITY,
            ymax: f64::NEG_INFINITY,
        }
    }
}

impl Extents {
    pub fn include_x(&mut self, x: f64) {
        if x.is_finite() {
            self.xmin = self.xmin.min(x);
            self.xmax = self.xmax.max(x);
        }
    }

    pub fn include_y(&mut self, y: f64) {
        if y.is_finite() {
            self.ymin = self.ymin.min(y);
            self.ymax = self.ymax.max(y);
        }
    }

    pub fn has_x(&self) -> bool {
        self.xmin <= self.xmax
    }

    pub fn has_y(&self) -> bool {
        self.ymin <= self.ymax
    }
}

/// Domain service computing layer extents
pub struct AutoScaleService;

impl AutoScaleService {
    pub fn new() -> Self {
        Self
    }

    /// Union extent of all displayed layers (all layers when none is displayed).
    ///
    /// `requested_xmin`/`requested_xmax` replace a layer's own x bounds when
    /// given. Layers whose reads fail are logged and skipped. `previous` is the
    /// last pan range, used for auto-level damping.
    pub fn scale_base(
        &self,
        layers: &mut [Layer],
        requested_xmin: Option<f64>,
        requested_xmax: Option<f64>,
        settings: &ScaleSettings,
        previous: Option<PanRange>,
    ) -> PanRange {
        let mut extents = Extents::default();
        let any_displayed = layers.iter().any(|l| l.display);
        let scan = !settings.autox.is_off()
            || !settings.autoy.is_off()
            || settings.ymin.is_none()
            || settings.ymax.is_none();

        for layer in layers.iter_mut().filter(|l| l.display || !any_displayed) {
            let (mut lo, mut hi) = (
                requested_xmin.unwrap_or(layer.xmin()),
                requested_xmax.unwrap_or(layer.xmax()),
            );
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            if settings.all && settings.expand {
                lo = layer.xmin();
                hi = layer.xmax();
            }
            if layer.mode != ComplexMode::ImagVsReal {
                extents.include_x(lo);
                extents.include_x(hi);
            }
            if !scan {
                continue;
            }
            if let Err(message) = self.scan_layer(layer, lo, hi, settings, &mut extents) {
                get_logger().log_with_metadata(
                    LogLevel::Warn,
                    LogComponent::Domain("AutoScale"),
                    "layer skipped during scale",
                    &format!("layer={} error={}", layer.index, message),
                );
            }
        }

        self.finish(extents, settings, previous)
    }

    /// Walk `[lo, hi]` one window at a time, folding samples into `extents`
    fn scan_layer(
        &self,
        layer: &mut Layer,
        lo: f64,
        hi: f64,
        settings: &ScaleSettings,
        extents: &mut Extents,
    ) -> Result<(), String> {
        let bufmax = settings.bufmax.max(1);
        // a window request pads three samples around its span
        let step = bufmax.saturating_sub(3).max(1);
        let span = layer.xdelta().abs() * step as f64;
        let imag_vs_real = layer.mode == ComplexMode::ImagVsReal;
        let max_windows = layer.size() / step + 2;
        // windows outside the buffer read nothing, so walk only the overlap
        let (lo, hi) = (lo.max(layer.xmin()), hi.min(layer.xmax()));
        if lo > hi {
            return Ok(());
        }
        let mut x0 = lo;

        for _ in 0..max_windows {
            let x1 = if span > 0.0 && span.is_finite() { (x0 + span).min(hi) } else { hi };
            layer.materialize_window(x0, x1, bufmax).map_err(|e| e.to_string())?;
            for (x, y) in layer.xs().iter().zip(layer.ys()) {
                if imag_vs_real {
                    extents.include_x(*x);
                    extents.include_y(*y);
                } else if *x >= lo && *x <= hi {
                    extents.include_y(*y);
                }
            }
            if !settings.all || x1 >= hi {
                break;
            }
            x0 = x1;
        }
        Ok(())
    }

    fn finish(&self, extents: Extents, settings: &ScaleSettings, previous: Option<PanRange>) -> PanRange {
        let (mut x_min, mut x_max) = if extents.has_x() { (extents.xmin, extents.xmax) } else { (-1.0, 1.0) };
        if let Some(prev) = previous {
            if !settings.autox.has_min() {
                x_min = prev.x_min;
            }
            if !settings.autox.has_max() {
                x_max = prev.x_max;
            }
        }

        let (data_ymin, data_ymax) = if extents.has_y() { (extents.ymin, extents.ymax) } else { (-1.0, 1.0) };
        let auto_ymin = settings.autoy.has_min() || settings.ymin.is_none();
        let auto_ymax = settings.autoy.has_max() || settings.ymax.is_none();
        let mut y_min = if auto_ymin { data_ymin } else { settings.ymin.unwrap_or(data_ymin) };
        let mut y_max = if auto_ymax { data_ymax } else { settings.ymax.unwrap_or(data_ymax) };

        let mut range = PanRange::new(x_min, x_max, y_min, y_max).normalized();
        y_min = range.y_min;
        y_max = range.y_max;

        let margin = (y_max - y_min) * settings.ymargin_fraction;
        if auto_ymin {
            y_min -= margin;
        }
        if auto_ymax {
            y_max += margin;
        }

        if let Some(prev) = previous.filter(|_| settings.autol > 1) {
            let fac = 1.0 / settings.autol.max(1) as f64;
            y_min = prev.y_min + (y_min - prev.y_min) * fac;
            y_max = prev.y_max + (y_max - prev.y_max) * fac;
        }

        range.y_min = y_min;
        range.y_max = y_max;
        range.normalized()
    }
}

impl Default for AutoScaleService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layer::SampleBuffer;
    use std::rc::Rc;

    fn layer(values: &[f64]) -> Layer {
        Layer::new(0, Rc::new(SampleBuffer::from_f64(values, 0.0, 1.0)), 0).unwrap()
    }

    #[test]
    fn hundred_samples_span_zero_to_ninety_nine() {
        let values: Vec<f64> = (0..100).map(|i| (i % 10) as f64).collect();
        let mut layers = vec![layer(&values)];
        let range = AutoScaleService::new().scale_base(&mut layers, None, None, &ScaleSettings::default(), None);
        assert_eq!((range.x_min, range.x_max), (0.0, 99.0));
        assert!((range.y_min - (-0.18)).abs() < 1e-12);
        assert!((range.y_max - 9.18).abs() < 1e-12);
    }

    #[test]
    fn first_window_only_unless_all() {
        let mut values = vec![0.0; 100];
        values[90] = 50.0;
        let settings = ScaleSettings { bufmax: 20, ymargin_fraction: 0.0, ..ScaleSettings::default() };
        let mut layers = vec![layer(&values)];
        let service = AutoScaleService::new();
        let range = service.scale_base(&mut layers, None, None, &settings, None);
        assert_eq!(range.y_max, 1.0);
        let all = ScaleSettings { all: true, ..settings };
        let range = service.scale_base(&mut layers, None, None, &all, None);
        assert_eq!(range.y_max, 50.0);
    }

    #[test]
    fn explicit_y_bounds_hold_when_not_auto() {
        let settings = ScaleSettings {
            autoy: AutoMode::Off,
            ymin: Some(-5.0),
            ymax: Some(5.0),
            ..ScaleSettings::default()
        };
        let mut layers = vec![layer(&[100.0, 200.0])];
        let range = AutoScaleService::new().scale_base(&mut layers, None, None, &settings, None);
        assert_eq!((range.y_min, range.y_max), (-5.0, 5.0));
    }

    #[test]
    fn autol_damps_towards_new_extent() {
        let settings = ScaleSettings { autol: 4, ymargin_fraction: 0.0, ..ScaleSettings::default() };
        let mut layers = vec![layer(&[0.0, 8.0])];
        let previous = PanRange::new(0.0, 1.0, 0.0, 4.0);
        let range = AutoScaleService::new().scale_base(&mut layers, None, None, &settings, Some(previous));
        assert_eq!((range.y_min, range.y_max), (0.0, 5.0));
    }
}
