//! Liang–Barsky parametric line clipping against an axis-aligned window.

use super::value_objects::{RealPoint, RealRect};

/// Parametric interval surviving the boundary tests run so far
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipState {
    pub t_enter: f64,
    pub t_exit: f64,
}

impl Default for ClipState {
    fn default() -> Self {
        Self { t_enter: 0.0, t_exit: 1.0 }
    }
}

/// One boundary test. Returns `false` once the segment is known to miss the
/// window; otherwise narrows `state`.
pub fn clip_parametric(denom: f64, num: f64, state: &mut ClipState) -> bool {
    if denom > 0.0 {
        let t = num / denom;
        if t > state.t_exit {
            return false;
        }
        if t > state.t_enter {
            state.t_enter = t;
        }
    } else if denom < 0.0 {
        let t = num / denom;
        if t < state.t_enter {
            return false;
        }
        if t < state.t_exit {
            state.t_exit = t;
        }
    } else if num > 0.0 {
        // parallel to this boundary and outside it
        return false;
    }
    true
}

/// Visible parametric interval of `p0 -> p1` inside `window`, or `None`
pub fn clip_interval(p0: &RealPoint, p1: &RealPoint, window: &RealRect) -> Option<ClipState> {
    if !p0.is_finite() || !p1.is_finite() {
        return None;
    }
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let mut state = ClipState::default();
    let inside = clip_parametric(dx, window.xmin - p0.x, &mut state)
        && clip_parametric(-dx, p0.x - window.xmax, &mut state)
        && clip_parametric(dy, window.ymin - p0.y, &mut state)
        && clip_parametric(-dy, p0.y - window.ymax, &mut state);
    if inside && state.t_enter <= state.t_exit { Some(state) } else { None }
}

/// Clipped endpoints of `p0 -> p1`, or `None` when nothing is visible
pub fn clip_segment(p0: &RealPoint, p1: &RealPoint, window: &RealRect) -> Option<(RealPoint, RealPoint)> {
    let state = clip_interval(p0, p1, window)?;
    let start = if state.t_enter > 0.0 { p0.lerp(p1, state.t_enter) } else { *p0 };
    let end = if state.t_exit < 1.0 { p0.lerp(p1, state.t_exit) } else { *p1 };
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> RealRect {
        RealRect { xmin: 0.0, xmax: 10.0, ymin: 0.0, ymax: 10.0 }
    }

    #[test]
    fn horizontal_crossing_is_clipped_at_both_edges() {
        let (a, b) = clip_segment(&RealPoint::new(-5.0, 5.0), &RealPoint::new(15.0, 5.0), &window())
            .expect("segment crosses the window");
        assert_eq!(a, RealPoint::new(0.0, 5.0));
        assert_eq!(b, RealPoint::new(10.0, 5.0));
    }

    #[test]
    fn parallel_outside_is_rejected() {
        assert!(clip_segment(&RealPoint::new(-5.0, 12.0), &RealPoint::new(15.0, 12.0), &window()).is_none());
        let mut state = ClipState::default();
        assert!(!clip_parametric(0.0, 1.0, &mut state));
        assert!(clip_parametric(0.0, -1.0, &mut state));
    }

    #[test]
    fn inside_segment_is_untouched() {
        let p0 = RealPoint::new(1.0, 1.0);
        let p1 = RealPoint::new(9.0, 3.0);
        assert_eq!(clip_segment(&p0, &p1, &window()), Some((p0, p1)));
    }

    #[test]
    fn diagonal_corner_miss() {
        assert!(clip_segment(&RealPoint::new(-1.0, 9.0), &RealPoint::new(1.0, 13.0), &window()).is_none());
    }

    #[test]
    fn non_finite_points_are_rejected() {
        assert!(clip_segment(&RealPoint::new(f64::NAN, 1.0), &RealPoint::new(1.0, 1.0), &window()).is_none());
    }
}
