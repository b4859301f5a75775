//! Coordinate-space stack: nested zoom levels mapping real-world rectangles
//! onto the plotting area's pixel rectangle.
//!
//! Levels are stored in [`Origin::CANONICAL`] orientation (real minimum at the
//! first pixel edge of each axis). Conversions go through the level remapped
//! to the stack's display origin.

use super::value_objects::{
    Origin, OriginFlip, PixelPoint, PixelRect, RealPoint, RealRect, normalize_span,
};
use crate::domain::logging::{LogComponent, get_logger};

/// Maximum number of levels, base level included
pub const MAX_ZOOM_DEPTH: usize = 10;

/// One entry of the coordinate-space stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLevel {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Real-world units per pixel; the sign encodes axis direction
    pub xscl: f64,
    pub yscl: f64,
}

impl ViewLevel {
    pub fn new(bounds: RealRect, pixels: PixelRect) -> Self {
        let mut level = Self {
            xmin: bounds.xmin,
            xmax: bounds.xmax,
            ymin: bounds.ymin,
            ymax: bounds.ymax,
            x1: pixels.x1,
            y1: pixels.y1,
            x2: pixels.x2,
            y2: pixels.y2,
            xscl: 0.0,
            yscl: 0.0,
        };
        level.rescale();
        level
    }

    /// Recompute the scale factors from bounds and pixel rectangle
    pub fn rescale(&mut self) {
        let dx = (self.x2 - self.x1) as f64;
        let dy = (self.y2 - self.y1) as f64;
        self.xscl = if dx != 0.0 { (self.xmax - self.xmin) / dx } else { 0.0 };
        self.yscl = if dy != 0.0 { (self.ymax - self.ymin) / dy } else { 0.0 };
    }

    pub fn set_bounds(&mut self, bounds: RealRect) {
        self.xmin = bounds.xmin;
        self.xmax = bounds.xmax;
        self.ymin = bounds.ymin;
        self.ymax = bounds.ymax;
        self.rescale();
    }

    pub fn set_pixels(&mut self, pixels: PixelRect) {
        self.x1 = pixels.x1;
        self.y1 = pixels.y1;
        self.x2 = pixels.x2;
        self.y2 = pixels.y2;
        self.rescale();
    }

    pub fn pixels(&self) -> PixelRect {
        PixelRect::new(self.x1, self.y1, self.x2, self.y2)
    }

    /// Visible real-world rectangle, ordered regardless of orientation
    pub fn bounds(&self) -> RealRect {
        RealRect {
            xmin: self.xmin.min(self.xmax),
            xmax: self.xmin.max(self.xmax),
            ymin: self.ymin.min(self.ymax),
            ymax: self.ymin.max(self.ymax),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.xscl == 0.0 || self.yscl == 0.0 || !self.xscl.is_finite() || !self.yscl.is_finite()
    }

    /// Real-world to pixel. `None` on a degenerate level; callers skip drawing.
    pub fn to_pixel(&self, x: f64, y: f64) -> Option<PixelPoint> {
        if self.is_degenerate() {
            return None;
        }
        let px = ((x - self.xmin) * (1.0 / self.xscl)).round() as i32;
        let py = ((y - self.ymin) * (1.0 / self.yscl)).round() as i32;
        Some(PixelPoint::new(px.saturating_add(self.x1), py.saturating_add(self.y1)))
    }

    /// Pixel to real-world, clamping the pixel into the level's rectangle first
    pub fn to_real(&self, px: i32, py: i32) -> RealPoint {
        let px = px.clamp(self.x1.min(self.x2), self.x1.max(self.x2));
        let py = py.clamp(self.y1.min(self.y2), self.y1.max(self.y2));
        RealPoint::new(
            self.xmin + (px - self.x1) as f64 * self.xscl,
            self.ymin + (py - self.y1) as f64 * self.yscl,
        )
    }

    /// Mirror this level from `input` orientation into `output` orientation
    pub fn remap_origin(&self, input: Origin, output: Origin) -> ViewLevel {
        let mut out = *self;
        match Origin::flip_between(input, output) {
            OriginFlip::None => {}
            OriginFlip::X => out.flip_x(),
            OriginFlip::Y => out.flip_y(),
            OriginFlip::Both => {
                out.flip_x();
                out.flip_y();
            }
        }
        out
    }

    fn flip_x(&mut self) {
        std::mem::swap(&mut self.xmin, &mut self.xmax);
        self.xscl = -self.xscl;
    }

    fn flip_y(&mut self) {
        std::mem::swap(&mut self.ymin, &mut self.ymax);
        self.yscl = -self.yscl;
    }
}

/// Stack of zoom levels; level 0 is permanent
#[derive(Debug, Clone)]
pub struct CoordinateStack {
    levels: Vec<ViewLevel>,
    origin: Origin,
}

impl CoordinateStack {
    pub fn new(base: RealRect, pixels: PixelRect, origin: Origin) -> Self {
        Self { levels: vec![ViewLevel::new(ordered(base), pixels)], origin }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Index of the current level (0 = unzoomed)
    pub fn level(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = origin;
    }

    pub fn levels(&self) -> &[ViewLevel] {
        &self.levels
    }

    pub fn base(&self) -> &ViewLevel {
        &self.levels[0]
    }

    /// Top of stack in canonical orientation
    pub fn current(&self) -> &ViewLevel {
        &self.levels[self.levels.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut ViewLevel {
        let top = self.levels.len() - 1;
        &mut self.levels[top]
    }

    /// Top of stack remapped to the display origin; used for every conversion
    pub fn display_level(&self) -> ViewLevel {
        self.current().remap_origin(Origin::CANONICAL, self.origin)
    }

    /// Push a level for `bounds`. No-op returning `false` at maximum depth.
    pub fn push_zoom(&mut self, bounds: RealRect) -> bool {
        if self.levels.len() >= MAX_ZOOM_DEPTH {
            get_logger().debug(
                LogComponent::Domain("CoordinateStack"),
                &format!("zoom refused: stack already {} deep", self.levels.len()),
            );
            return false;
        }
        let pixels = self.current().pixels();
        self.levels.push(ViewLevel::new(ordered(bounds), pixels));
        true
    }

    /// Pop up to `count` levels, never the base. Returns how many were removed.
    pub fn pop_zoom(&mut self, count: usize) -> usize {
        let removable = count.min(self.levels.len() - 1);
        self.levels.truncate(self.levels.len() - removable);
        removable
    }

    /// Replace the base level bounds, keeping zoomed levels
    pub fn set_base(&mut self, bounds: RealRect) {
        self.levels[0].set_bounds(ordered(bounds));
    }

    /// Drop every zoom and reset the base level
    pub fn reset(&mut self, bounds: RealRect) {
        self.levels.truncate(1);
        self.set_base(bounds);
    }

    /// Resize the plotting area on every level
    pub fn set_pixels(&mut self, pixels: PixelRect) {
        for level in &mut self.levels {
            level.set_pixels(pixels);
        }
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> Option<PixelPoint> {
        self.display_level().to_pixel(x, y)
    }

    pub fn to_real(&self, px: i32, py: i32) -> RealPoint {
        self.display_level().to_real(px, py)
    }
}

fn ordered(bounds: RealRect) -> RealRect {
    let (xmin, xmax) = normalize_span(bounds.xmin, bounds.xmax);
    let (ymin, ymax) = normalize_span(bounds.ymin, bounds.ymax);
    RealRect { xmin, xmax, ymin, ymax }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_stack() -> CoordinateStack {
        CoordinateStack::new(
            RealRect { xmin: 0.0, xmax: 100.0, ymin: 0.0, ymax: 10.0 },
            PixelRect::new(0, 0, 100, 100),
            Origin::BottomLeft,
        )
    }

    #[test]
    fn scale_invariant_holds() {
        let level = *unit_stack().current();
        assert_eq!(level.xscl, (level.xmax - level.xmin) / (level.x2 - level.x1) as f64);
        assert_eq!(level.yscl, 0.1);
    }

    #[test]
    fn display_origin_puts_ymax_at_top() {
        let stack = unit_stack();
        assert_eq!(stack.to_pixel(0.0, 10.0), Some(PixelPoint::new(0, 0)));
        assert_eq!(stack.to_pixel(100.0, 0.0), Some(PixelPoint::new(100, 100)));
    }

    #[test]
    fn to_real_clamps_off_canvas_positions() {
        let stack = unit_stack();
        let p = stack.to_real(-50, 500);
        assert_eq!(p, RealPoint::new(0.0, 0.0));
    }

    #[test]
    fn degenerate_level_does_not_project() {
        let level = ViewLevel::new(
            RealRect { xmin: 0.0, xmax: 1.0, ymin: 0.0, ymax: 1.0 },
            PixelRect::new(10, 10, 10, 50),
        );
        assert!(level.is_degenerate());
        assert_eq!(level.to_pixel(0.5, 0.5), None);
    }

    #[test]
    fn base_level_is_permanent() {
        let mut stack = unit_stack();
        assert!(stack.push_zoom(RealRect { xmin: 10.0, xmax: 20.0, ymin: 1.0, ymax: 2.0 }));
        assert_eq!(stack.pop_zoom(5), 1);
        assert_eq!(stack.pop_zoom(1), 0);
        assert_eq!(stack.depth(), 1);
    }
}
