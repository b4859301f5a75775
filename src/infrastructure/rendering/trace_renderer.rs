//! Trace renderer: scan-converts a layer's samples into draw calls.
//!
//! Samples are projected through the display level of the coordinate stack.
//! Connected traces are clipped in real-world coordinates so the boundary
//! crossing points are exact; those crossing points never receive symbols.

use super::surface::{DrawingSurface, StrokeStyle, TextAlign};
use crate::domain::layer::{LayerStyle, LineMode, SymbolMode};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::plot::clip::clip_segment;
use crate::domain::plot::stack::ViewLevel;
use crate::domain::plot::value_objects::{Color, Highlight, PixelPoint, PixelRect, RealPoint, RealRect};

/// Per-call rendering options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceOptions {
    /// Skip real-world clipping and rely on the surface clip region
    pub noclip: bool,
    /// X sub-ranges drawn in their own colors
    pub highlights: Vec<Highlight>,
    /// Full-height line through every symbol position
    pub vertsym: bool,
    /// Full-width line through every symbol position
    pub horzsym: bool,
}

/// What one `render_trace` call drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub polylines: usize,
    pub symbols: usize,
    pub clipped_segments: usize,
    pub stems: usize,
}

/// Trace renderer service
#[derive(Debug, Default)]
pub struct TraceRenderer;

impl TraceRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw `count` samples taken every `stride` entries of `xs`/`ys`.
    ///
    /// Does not touch layer or stack state. An empty trace only logs.
    #[allow(clippy::too_many_arguments)]
    pub fn render_trace(
        &self,
        surface: &mut dyn DrawingSurface,
        level: &ViewLevel,
        style: &LayerStyle,
        xs: &[f64],
        ys: &[f64],
        count: usize,
        stride: usize,
        options: &TraceOptions,
    ) -> TraceStats {
        let stride = stride.max(1);
        let available = xs.len().min(ys.len()).div_ceil(stride);
        let count = count.min(available);
        if count == 0 {
            get_logger().debug(LogComponent::Infrastructure("TraceRenderer"), "empty trace, nothing to draw");
            return TraceStats::default();
        }
        if level.is_degenerate() {
            get_logger().warn(
                LogComponent::Infrastructure("TraceRenderer"),
                "degenerate view level, trace skipped",
            );
            return TraceStats::default();
        }

        let samples = Samples { xs, ys, stride, count };
        let mut pass = TracePass::new(surface, level, style, options);
        match style.line {
            LineMode::None => pass.points_only(&samples),
            LineMode::VerticalStems | LineMode::HorizontalStems => pass.stems(&samples, style.line),
            LineMode::Connecting if options.noclip => pass.connect_unclipped(&samples),
            LineMode::Connecting => pass.connect(&samples),
        }
        pass.finish()
    }
}

struct Samples<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    stride: usize,
    count: usize,
}

impl Samples<'_> {
    fn get(&self, i: usize) -> RealPoint {
        RealPoint::new(self.xs[i * self.stride], self.ys[i * self.stride])
    }
}

/// State of one trace drawing pass
struct TracePass<'a> {
    surface: &'a mut dyn DrawingSurface,
    level: &'a ViewLevel,
    window: RealRect,
    style: &'a LayerStyle,
    options: &'a TraceOptions,
    stroke: StrokeBuilder,
    symbols: Vec<PixelPoint>,
    stats: TraceStats,
}

impl<'a> TracePass<'a> {
    fn new(
        surface: &'a mut dyn DrawingSurface,
        level: &'a ViewLevel,
        style: &'a LayerStyle,
        options: &'a TraceOptions,
    ) -> Self {
        let mut highlights = options.highlights.clone();
        highlights.sort_by(|a, b| a.xstart.total_cmp(&b.xstart));
        let stroke = StrokeBuilder {
            base_color: style.color,
            highlights,
            stroke: StrokeStyle { width: style.thickness.max(1) as f64, dashed: style.dashed },
            color: style.color,
            points: Vec::new(),
            pending: Vec::new(),
            last: None,
        };
        Self {
            surface,
            level,
            window: level.bounds(),
            style,
            options,
            stroke,
            symbols: Vec::new(),
            stats: TraceStats::default(),
        }
    }

    fn project(&self, p: &RealPoint) -> Option<PixelPoint> {
        self.level.to_pixel(p.x, p.y)
    }

    fn visible(&self, p: &RealPoint) -> bool {
        p.is_finite() && self.window.contains(p)
    }

    fn add_symbol(&mut self, p: &RealPoint) {
        if self.style.symbol == SymbolMode::None && !self.options.vertsym && !self.options.horzsym {
            return;
        }
        if let Some(px) = self.project(p) {
            self.symbols.push(px);
        }
    }

    fn points_only(&mut self, samples: &Samples) {
        for i in 0..samples.count {
            let p = samples.get(i);
            if self.visible(&p) {
                self.add_symbol(&p);
            }
        }
    }

    fn stems(&mut self, samples: &Samples, mode: LineMode) {
        let color = self.style.color;
        let stroke = self.stroke.stroke;
        for i in 0..samples.count {
            let p = samples.get(i);
            if !p.is_finite() {
                continue;
            }
            let base = match mode {
                LineMode::HorizontalStems => RealPoint::new(0.0, p.y),
                _ => RealPoint::new(p.x, 0.0),
            };
            if let Some((a, b)) = clip_segment(&p, &base, &self.window) {
                if let (Some(pa), Some(pb)) = (self.project(&a), self.project(&b)) {
                    self.surface.draw_line(pa, pb, color, stroke);
                    self.stats.stems += 1;
                }
            }
            if self.visible(&p) {
                self.add_symbol(&p);
            }
        }
    }

    fn connect_unclipped(&mut self, samples: &Samples) {
        let mut drawing = false;
        for i in 0..samples.count {
            let p = samples.get(i);
            if !p.is_finite() {
                self.stroke.flush(self.surface, &mut self.stats);
                drawing = false;
                continue;
            }
            if drawing {
                self.stroke.line_to(self.level, p);
            } else {
                self.stroke.move_to(self.level, p);
                drawing = true;
            }
            if self.visible(&p) {
                self.add_symbol(&p);
            }
        }
    }

    /// General case: extend the polyline while both ends are visible and run
    /// the clipper whenever visibility changes.
    fn connect(&mut self, samples: &Samples) {
        let mut prev = samples.get(0);
        let mut was_visible = self.visible(&prev);
        if was_visible {
            self.stroke.move_to(self.level, prev);
            self.add_symbol(&prev);
        }

        for i in 1..samples.count {
            let cur = samples.get(i);
            let is_visible = self.visible(&cur);

            if was_visible && is_visible {
                self.stroke.line_to(self.level, cur);
                self.add_symbol(&cur);
            } else if prev.is_finite() && cur.is_finite() {
                if let Some((enter, exit)) = clip_segment(&prev, &cur, &self.window) {
                    self.stats.clipped_segments += 1;
                    if was_visible {
                        // leaving: end on the boundary crossing
                        self.stroke.line_to(self.level, exit);
                        self.stroke.flush(self.surface, &mut self.stats);
                    } else if is_visible {
                        // entering: start from the boundary crossing
                        self.stroke.move_to(self.level, enter);
                        self.stroke.line_to(self.level, cur);
                        self.add_symbol(&cur);
                    } else {
                        // passing through
                        self.stroke.move_to(self.level, enter);
                        self.stroke.line_to(self.level, exit);
                        self.stroke.flush(self.surface, &mut self.stats);
                    }
                } else if was_visible {
                    self.stroke.flush(self.surface, &mut self.stats);
                }
            } else {
                // gap in the data
                self.stroke.flush(self.surface, &mut self.stats);
                if is_visible {
                    self.stroke.move_to(self.level, cur);
                    self.add_symbol(&cur);
                }
            }

            prev = cur;
            was_visible = is_visible;
        }
    }

    fn finish(mut self) -> TraceStats {
        self.stroke.flush(self.surface, &mut self.stats);
        let pixels = self.level.pixels();
        let symbols = std::mem::take(&mut self.symbols);
        for p in &symbols {
            self.draw_markers(*p, &pixels);
        }
        self.stats
    }

    fn draw_markers(&mut self, p: PixelPoint, pixels: &PixelRect) {
        let color = self.style.color;
        let thin = StrokeStyle::default();
        if self.options.vertsym {
            self.surface.draw_line(PixelPoint::new(p.x, pixels.y1), PixelPoint::new(p.x, pixels.y2), color, thin);
        }
        if self.options.horzsym {
            self.surface.draw_line(PixelPoint::new(pixels.x1, p.y), PixelPoint::new(pixels.x2, p.y), color, thin);
        }
        if self.style.symbol != SymbolMode::None {
            draw_symbol(self.surface, self.style.symbol, p, self.style.radius, color);
            self.stats.symbols += 1;
        }
    }
}

/// Accumulates a polyline, splitting it wherever the active highlight changes
struct StrokeBuilder {
    base_color: Color,
    highlights: Vec<Highlight>,
    stroke: StrokeStyle,
    color: Color,
    points: Vec<PixelPoint>,
    /// Finished runs waiting for the next flush
    pending: Vec<(Vec<PixelPoint>, Color)>,
    last: Option<RealPoint>,
}

impl StrokeBuilder {
    /// Color at `x`; later-starting highlights win
    fn color_at(&self, x: f64) -> Color {
        self.highlights
            .iter()
            .rev()
            .find(|h| h.covers(x))
            .map(|h| h.color)
            .unwrap_or(self.base_color)
    }

    fn move_to(&mut self, level: &ViewLevel, p: RealPoint) {
        self.flush_points();
        self.color = self.color_at(p.x);
        self.points.extend(level.to_pixel(p.x, p.y));
        self.last = Some(p);
    }

    fn line_to(&mut self, level: &ViewLevel, p: RealPoint) {
        let Some(from) = self.last else {
            self.move_to(level, p);
            return;
        };
        let mut cuts: Vec<f64> = Vec::new();
        if !self.highlights.is_empty() && from.x != p.x {
            for h in &self.highlights {
                for bx in [h.xstart, h.xend] {
                    let t = (bx - from.x) / (p.x - from.x);
                    if t > 0.0 && t < 1.0 {
                        cuts.push(t);
                    }
                }
            }
            cuts.sort_by(f64::total_cmp);
            cuts.dedup();
        }

        let mut start = from;
        for end in cuts.iter().map(|t| from.lerp(&p, *t)).chain(std::iter::once(p)) {
            let color = self.color_at((start.x + end.x) * 0.5);
            if color != self.color {
                let joint = self.points.last().copied();
                self.flush_points();
                self.points.extend(joint);
                self.color = color;
            }
            if let Some(px) = level.to_pixel(end.x, end.y) {
                if self.points.last() != Some(&px) {
                    self.points.push(px);
                }
            }
            start = end;
        }
        self.last = Some(p);
    }

    fn flush(&mut self, surface: &mut dyn DrawingSurface, stats: &mut TraceStats) {
        self.flush_points();
        for (points, color) in self.pending.drain(..) {
            surface.draw_polyline(&points, color, self.stroke);
            stats.polylines += 1;
        }
        self.last = None;
    }

    fn flush_points(&mut self) {
        if self.points.len() >= 2 {
            self.pending.push((std::mem::take(&mut self.points), self.color));
        }
        self.points.clear();
    }
}

/// Draw one marker centered on `p`
pub fn draw_symbol(surface: &mut dyn DrawingSurface, symbol: SymbolMode, p: PixelPoint, radius: u32, color: Color) {
    let r = radius.max(1) as i32;
    let thin = StrokeStyle::default();
    match symbol {
        SymbolMode::None => {}
        SymbolMode::Pixel => surface.fill_rect(PixelRect::new(p.x, p.y, p.x + 1, p.y + 1), color),
        SymbolMode::Circle => surface.draw_circle(p, r as u32, color, true),
        SymbolMode::Square => surface.fill_rect(PixelRect::new(p.x - r, p.y - r, p.x + r, p.y + r), color),
        SymbolMode::Plus => {
            surface.draw_line(PixelPoint::new(p.x - r, p.y), PixelPoint::new(p.x + r, p.y), color, thin);
            surface.draw_line(PixelPoint::new(p.x, p.y - r), PixelPoint::new(p.x, p.y + r), color, thin);
        }
        SymbolMode::X => {
            surface.draw_line(PixelPoint::new(p.x - r, p.y - r), PixelPoint::new(p.x + r, p.y + r), color, thin);
            surface.draw_line(PixelPoint::new(p.x - r, p.y + r), PixelPoint::new(p.x + r, p.y - r), color, thin);
        }
        SymbolMode::TriangleUp => surface.draw_polygon(
            &[PixelPoint::new(p.x, p.y - r), PixelPoint::new(p.x - r, p.y + r), PixelPoint::new(p.x + r, p.y + r)],
            color,
            true,
        ),
        SymbolMode::TriangleDown => surface.draw_polygon(
            &[PixelPoint::new(p.x, p.y + r), PixelPoint::new(p.x - r, p.y - r), PixelPoint::new(p.x + r, p.y - r)],
            color,
            true,
        ),
        SymbolMode::Character(c) => {
            let mut buf = [0u8; 4];
            surface.draw_text(p, c.encode_utf8(&mut buf), color, TextAlign::Center);
        }
    }
}
