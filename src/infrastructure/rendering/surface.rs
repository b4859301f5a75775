//! Drawing surface abstraction. Every coordinate handed to a surface is
//! already in pixel space.

use crate::domain::plot::value_objects::{Color, PixelPoint, PixelRect};

/// Stroke parameters for lines and outlines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub dashed: bool,
}

impl StrokeStyle {
    pub fn solid(width: f64) -> Self {
        Self { width, dashed: false }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::solid(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Immediate-mode 2D drawing primitives
pub trait DrawingSurface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn fill_rect(&mut self, rect: PixelRect, color: Color);
    fn stroke_rect(&mut self, rect: PixelRect, color: Color, style: StrokeStyle);
    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, style: StrokeStyle);
    fn draw_polyline(&mut self, points: &[PixelPoint], color: Color, style: StrokeStyle);
    fn draw_polygon(&mut self, points: &[PixelPoint], color: Color, filled: bool);
    fn draw_circle(&mut self, center: PixelPoint, radius: u32, color: Color, filled: bool);
    fn draw_text(&mut self, at: PixelPoint, text: &str, color: Color, align: TextAlign);

    /// Approximate rendered width of `text` in pixels
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * 7.0
    }

    /// Restrict drawing to `rect` until the matching `restore_clip`
    fn save_clip(&mut self, rect: PixelRect);
    fn restore_clip(&mut self);

    /// Filled box with a drop shadow, used by legends and menus
    fn shadow_box(&mut self, rect: PixelRect, fill: Color, border: Color);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: PixelRect, color: Color },
    StrokeRect { rect: PixelRect, color: Color, style: StrokeStyle },
    Line { from: PixelPoint, to: PixelPoint, color: Color, style: StrokeStyle },
    Polyline { points: Vec<PixelPoint>, color: Color, style: StrokeStyle },
    Polygon { points: Vec<PixelPoint>, color: Color, filled: bool },
    Circle { center: PixelPoint, radius: u32, color: Color, filled: bool },
    Text { at: PixelPoint, text: String, color: Color, align: TextAlign },
    SaveClip(PixelRect),
    RestoreClip,
    ShadowBox { rect: PixelRect, fill: Color, border: Color },
}

/// Surface that records draw calls instead of rasterizing them
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, commands: Vec::new() }
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Every polyline, in draw order
    pub fn polylines(&self) -> Vec<&[PixelPoint]> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Polyline { points, .. } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(PixelPoint, PixelPoint)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }
}

impl DrawingSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Color, style: StrokeStyle) {
        self.commands.push(DrawCommand::StrokeRect { rect, color, style });
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, style: StrokeStyle) {
        self.commands.push(DrawCommand::Line { from, to, color, style });
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], color: Color, style: StrokeStyle) {
        self.commands.push(DrawCommand::Polyline { points: points.to_vec(), color, style });
    }

    fn draw_polygon(&mut self, points: &[PixelPoint], color: Color, filled: bool) {
        self.commands.push(DrawCommand::Polygon { points: points.to_vec(), color, filled });
    }

    fn draw_circle(&mut self, center: PixelPoint, radius: u32, color: Color, filled: bool) {
        self.commands.push(DrawCommand::Circle { center, radius, color, filled });
    }

    fn draw_text(&mut self, at: PixelPoint, text: &str, color: Color, align: TextAlign) {
        self.commands.push(DrawCommand::Text { at, text: text.to_string(), color, align });
    }

    fn save_clip(&mut self, rect: PixelRect) {
        self.commands.push(DrawCommand::SaveClip(rect));
    }

    fn restore_clip(&mut self) {
        self.commands.push(DrawCommand::RestoreClip);
    }

    fn shadow_box(&mut self, rect: PixelRect, fill: Color, border: Color) {
        self.commands.push(DrawCommand::ShadowBox { rect, fill, border });
    }
}
