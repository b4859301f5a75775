//! Scrollbar and wheel actions translated into pan offsets.

use crate::domain::logging::{LogComponent, get_logger};
use serde::{Deserialize, Serialize};

/// Fraction of the visible span moved by one arrow step
pub const STEP_FRACTION: f64 = 0.1;

/// One scrollbar gesture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScrollAction {
    StepInc,
    StepDec,
    PageInc,
    PageDec,
    /// Thumb dragged by `pixel_delta` inside a trough `trough_pixels` long
    Drag { pixel_delta: f64, trough_pixels: f64 },
    Home,
    End,
}

impl ScrollAction {
    /// Offset to add to the visible range `view` so it stays inside `range`.
    ///
    /// Returns `None` for a gesture that cannot move anything.
    pub fn offset(&self, view: (f64, f64), range: (f64, f64)) -> Option<f64> {
        let (lo, hi) = view;
        let span = hi - lo;
        let raw = match *self {
            ScrollAction::StepInc => span * STEP_FRACTION,
            ScrollAction::StepDec => -span * STEP_FRACTION,
            ScrollAction::PageInc => span,
            ScrollAction::PageDec => -span,
            ScrollAction::Drag { pixel_delta, trough_pixels } => {
                if trough_pixels <= 0.0 || !trough_pixels.is_finite() {
                    get_logger().warn(
                        LogComponent::Application("Scrollbar"),
                        "drag on a zero-length trough ignored",
                    );
                    return None;
                }
                pixel_delta * (range.1 - range.0) / trough_pixels
            }
            ScrollAction::Home => range.0 - lo,
            ScrollAction::End => range.1 - hi,
        };
        if !raw.is_finite() || raw == 0.0 {
            return None;
        }
        Some(raw)
    }
}

/// Shift `view` by `offset` and clamp it into `range`, keeping its span.
///
/// A view wider than the range is left where it is.
pub fn clamp_pan(view: (f64, f64), offset: f64, range: (f64, f64)) -> (f64, f64) {
    let span = view.1 - view.0;
    if span >= range.1 - range.0 {
        return view;
    }
    let lo = (view.0 + offset).clamp(range.0, range.1 - span);
    (lo, lo + span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_and_pages_follow_the_view_span() {
        let view = (10.0, 30.0);
        let range = (0.0, 100.0);
        assert_eq!(ScrollAction::StepInc.offset(view, range), Some(2.0));
        assert_eq!(ScrollAction::PageDec.offset(view, range), Some(-20.0));
        assert_eq!(ScrollAction::Home.offset(view, range), Some(-10.0));
        assert_eq!(ScrollAction::End.offset(view, range), Some(70.0));
    }

    #[test]
    fn drag_scales_by_trough_length() {
        let drag = ScrollAction::Drag { pixel_delta: 50.0, trough_pixels: 200.0 };
        assert_eq!(drag.offset((0.0, 10.0), (0.0, 100.0)), Some(25.0));
        let empty = ScrollAction::Drag { pixel_delta: 50.0, trough_pixels: 0.0 };
        assert_eq!(empty.offset((0.0, 10.0), (0.0, 100.0)), None);
    }

    #[test]
    fn pan_is_clamped_to_range() {
        assert_eq!(clamp_pan((80.0, 90.0), 50.0, (0.0, 100.0)), (90.0, 100.0));
        assert_eq!(clamp_pan((10.0, 20.0), -50.0, (0.0, 100.0)), (0.0, 10.0));
        assert_eq!(clamp_pan((0.0, 200.0), 5.0, (0.0, 100.0)), (0.0, 200.0));
    }
}
