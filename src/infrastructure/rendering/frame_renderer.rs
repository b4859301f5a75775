//! Frame renderer: background, grid, traces, legend and pointer chrome.

use super::surface::{DrawingSurface, StrokeStyle, TextAlign};
use super::trace_renderer::{TraceOptions, TraceRenderer, TraceStats};
use crate::domain::layer::Layer;
use crate::domain::plot::stack::ViewLevel;
use crate::domain::plot::ticks::{format_tick, nice_step, nice_ticks};
use crate::domain::plot::value_objects::{Color, Crosshairs, PixelPoint, PixelRect, RealPoint};

/// Cosmetic settings for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ChromeSettings {
    pub background: Color,
    pub foreground: Color,
    pub grid_color: Color,
    pub grid: bool,
    pub legend: bool,
    pub crosshairs: Crosshairs,
    pub xdiv: usize,
    pub ydiv: usize,
    pub readout: bool,
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            foreground: Color::WHITE,
            grid_color: Color::from_hex(0x404040),
            grid: true,
            legend: false,
            crosshairs: Crosshairs::Off,
            xdiv: 6,
            ydiv: 6,
            readout: true,
        }
    }
}

/// Everything a frame draws, borrowed from the controller's state
pub struct FrameScene<'a> {
    /// Current level, already remapped to the display origin
    pub level: ViewLevel,
    pub layers: &'a [Layer],
    pub chrome: &'a ChromeSettings,
    pub pointer: Option<PixelPoint>,
    pub rubber_band: Option<PixelRect>,
    pub readout: Option<RealPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub traces: Vec<(usize, TraceStats)>,
    pub skipped_layers: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct FrameRenderer {
    traces: TraceRenderer,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self { traces: TraceRenderer::new() }
    }

    pub fn render(&self, surface: &mut dyn DrawingSurface, scene: &FrameScene) -> FrameStats {
        let chrome = scene.chrome;
        let full = PixelRect::new(0, 0, surface.width() as i32, surface.height() as i32);
        let plot = scene.level.pixels();
        surface.fill_rect(full, chrome.background);

        self.draw_axes(surface, scene);

        let mut stats = FrameStats::default();
        surface.save_clip(plot);
        for layer in scene.layers.iter().filter(|l| l.display) {
            if layer.ys().is_empty() {
                stats.skipped_layers.push(layer.index);
                continue;
            }
            let options = TraceOptions { highlights: layer.sorted_highlights(), ..TraceOptions::default() };
            let trace = self.traces.render_trace(
                surface,
                &scene.level,
                &layer.style,
                layer.xs(),
                layer.ys(),
                layer.ys().len(),
                1,
                &options,
            );
            stats.traces.push((layer.index, trace));
        }
        if let Some(pointer) = scene.pointer {
            self.draw_crosshairs(surface, chrome, &plot, pointer);
        }
        if let Some(band) = scene.rubber_band {
            surface.stroke_rect(band, chrome.foreground, StrokeStyle { width: 1.0, dashed: true });
        }
        surface.restore_clip();

        surface.stroke_rect(plot, chrome.foreground, StrokeStyle::default());
        if chrome.legend {
            self.draw_legend(surface, chrome, &plot, scene.layers);
        }
        if let (true, Some(at)) = (chrome.readout, scene.readout) {
            let text = format!("x: {:.6}  y: {:.6}", at.x, at.y);
            surface.draw_text(PixelPoint::new(plot.x1, full.y2 - 8), &text, chrome.foreground, TextAlign::Left);
        }
        stats
    }

    fn draw_axes(&self, surface: &mut dyn DrawingSurface, scene: &FrameScene) {
        let chrome = scene.chrome;
        let level = &scene.level;
        let plot = level.pixels();
        let bounds = level.bounds();
        let grid = StrokeStyle { width: 1.0, dashed: true };

        let xstep = nice_step(bounds.width() / chrome.xdiv.max(2) as f64);
        for x in nice_ticks(bounds.xmin, bounds.xmax, chrome.xdiv) {
            let Some(p) = level.to_pixel(x, bounds.ymin) else { break };
            if chrome.grid {
                surface.draw_line(PixelPoint::new(p.x, plot.y1), PixelPoint::new(p.x, plot.y2), chrome.grid_color, grid);
            }
            let bottom = plot.y1.max(plot.y2);
            surface.draw_line(PixelPoint::new(p.x, bottom), PixelPoint::new(p.x, bottom + 4), chrome.foreground, StrokeStyle::default());
            surface.draw_text(PixelPoint::new(p.x, bottom + 12), &format_tick(x, xstep), chrome.foreground, TextAlign::Center);
        }

        let ystep = nice_step(bounds.height() / chrome.ydiv.max(2) as f64);
        for y in nice_ticks(bounds.ymin, bounds.ymax, chrome.ydiv) {
            let Some(p) = level.to_pixel(bounds.xmin, y) else { break };
            if chrome.grid {
                surface.draw_line(PixelPoint::new(plot.x1, p.y), PixelPoint::new(plot.x2, p.y), chrome.grid_color, grid);
            }
            let left = plot.x1.min(plot.x2);
            surface.draw_line(PixelPoint::new(left - 4, p.y), PixelPoint::new(left, p.y), chrome.foreground, StrokeStyle::default());
            surface.draw_text(PixelPoint::new(left - 6, p.y), &format_tick(y, ystep), chrome.foreground, TextAlign::Right);
        }
    }

    fn draw_crosshairs(&self, surface: &mut dyn DrawingSurface, chrome: &ChromeSettings, plot: &PixelRect, at: PixelPoint) {
        if !plot.contains(at) {
            return;
        }
        let style = StrokeStyle::default();
        if matches!(chrome.crosshairs, Crosshairs::Vertical | Crosshairs::Both) {
            surface.draw_line(PixelPoint::new(at.x, plot.y1), PixelPoint::new(at.x, plot.y2), chrome.foreground, style);
        }
        if matches!(chrome.crosshairs, Crosshairs::Horizontal | Crosshairs::Both) {
            surface.draw_line(PixelPoint::new(plot.x1, at.y), PixelPoint::new(plot.x2, at.y), chrome.foreground, style);
        }
    }

    fn draw_legend(&self, surface: &mut dyn DrawingSurface, chrome: &ChromeSettings, plot: &PixelRect, layers: &[Layer]) {
        if layers.is_empty() {
            return;
        }
        let row_height = 14;
        let width = layers
            .iter()
            .map(|l| surface.text_width(&l.name))
            .fold(0.0, f64::max)
            .ceil() as i32
            + 34;
        let right = plot.x1.max(plot.x2) - 6;
        let top = plot.y1.min(plot.y2) + 6;
        let rect = PixelRect::new(right - width, top, right, top + row_height * layers.len() as i32 + 6);
        surface.shadow_box(rect, chrome.background, chrome.foreground);

        for (i, layer) in layers.iter().enumerate() {
            let y = top + 10 + row_height * i as i32;
            let swatch_color = if layer.display { layer.style.color } else { chrome.grid_color };
            surface.draw_line(
                PixelPoint::new(rect.x1 + 4, y),
                PixelPoint::new(rect.x1 + 24, y),
                swatch_color,
                StrokeStyle::solid(layer.style.thickness.max(1) as f64),
            );
            surface.draw_text(PixelPoint::new(rect.x1 + 28, y), &layer.name, chrome.foreground, TextAlign::Left);
        }
    }
}
