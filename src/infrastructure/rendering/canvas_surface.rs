use super::surface::{DrawingSurface, StrokeStyle, TextAlign};
use crate::domain::errors::FatalError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::plot::value_objects::{Color, PixelPoint, PixelRect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const FONT: &str = "12px monospace";

/// Canvas 2D drawing surface - Infrastructure implementation
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    clip_depth: usize,
}

impl CanvasSurface {
    /// Look up `canvas_id` in the current document
    pub fn from_id(canvas_id: &str) -> Result<Self, FatalError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(FatalError::CanvasUnsupported)?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| FatalError::CanvasNotFound(canvas_id.to_string()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| FatalError::CanvasNotFound(canvas_id.to_string()))?;
        Self::new(canvas)
    }

    /// Wrap a canvas; fails when it has no 2D context or no area
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, FatalError> {
        if canvas.width() == 0 || canvas.height() == 0 {
            return Err(FatalError::ZeroSizedContainer { width: canvas.width(), height: canvas.height() });
        }
        let context = canvas
            .get_context("2d")
            .map_err(|_| FatalError::CanvasUnsupported)?
            .ok_or(FatalError::CanvasUnsupported)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| FatalError::CanvasUnsupported)?;
        context.set_font(FONT);
        Ok(Self { canvas, context, clip_depth: 0 })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.context.set_font(FONT);
    }

    fn apply_stroke(&self, color: Color, style: StrokeStyle) {
        self.context.set_stroke_style(&JsValue::from_str(&color.to_css()));
        self.context.set_line_width(style.width);
        let dashes = if style.dashed {
            js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0))
        } else {
            js_sys::Array::new()
        };
        if let Err(e) = self.context.set_line_dash(&dashes) {
            get_logger().warn(
                LogComponent::Infrastructure("CanvasSurface"),
                &format!("set_line_dash failed: {:?}", e),
            );
        }
    }

    fn trace_path(&self, points: &[PixelPoint]) {
        self.context.begin_path();
        for (i, p) in points.iter().enumerate() {
            // half-pixel offset keeps 1px lines crisp
            let (x, y) = (p.x as f64 + 0.5, p.y as f64 + 0.5);
            if i == 0 {
                self.context.move_to(x, y);
            } else {
                self.context.line_to(x, y);
            }
        }
    }
}

fn rect_xywh(rect: &PixelRect) -> (f64, f64, f64, f64) {
    (
        rect.x1.min(rect.x2) as f64,
        rect.y1.min(rect.y2) as f64,
        rect.width() as f64,
        rect.height() as f64,
    )
}

impl DrawingSurface for CanvasSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        let (x, y, w, h) = rect_xywh(&rect);
        self.context.set_fill_style(&JsValue::from_str(&color.to_css()));
        self.context.fill_rect(x, y, w.max(1.0), h.max(1.0));
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Color, style: StrokeStyle) {
        let (x, y, w, h) = rect_xywh(&rect);
        self.apply_stroke(color, style);
        self.context.stroke_rect(x + 0.5, y + 0.5, w, h);
    }

    fn draw_line(&mut self, from: PixelPoint, to: PixelPoint, color: Color, style: StrokeStyle) {
        self.draw_polyline(&[from, to], color, style);
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], color: Color, style: StrokeStyle) {
        if points.len() < 2 {
            return;
        }
        self.apply_stroke(color, style);
        self.trace_path(points);
        self.context.stroke();
    }

    fn draw_polygon(&mut self, points: &[PixelPoint], color: Color, filled: bool) {
        if points.len() < 3 {
            return;
        }
        self.trace_path(points);
        self.context.close_path();
        if filled {
            self.context.set_fill_style(&JsValue::from_str(&color.to_css()));
            self.context.fill();
        } else {
            self.apply_stroke(color, StrokeStyle::default());
            self.context.stroke();
        }
    }

    fn draw_circle(&mut self, center: PixelPoint, radius: u32, color: Color, filled: bool) {
        self.context.begin_path();
        if let Err(e) = self.context.arc(
            center.x as f64 + 0.5,
            center.y as f64 + 0.5,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        ) {
            get_logger().warn(LogComponent::Infrastructure("CanvasSurface"), &format!("arc failed: {:?}", e));
            return;
        }
        if filled {
            self.context.set_fill_style(&JsValue::from_str(&color.to_css()));
            self.context.fill();
        } else {
            self.apply_stroke(color, StrokeStyle::default());
            self.context.stroke();
        }
    }

    fn draw_text(&mut self, at: PixelPoint, text: &str, color: Color, align: TextAlign) {
        self.context.set_fill_style(&JsValue::from_str(&color.to_css()));
        self.context.set_text_align(match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.context.set_text_baseline("middle");
        if let Err(e) = self.context.fill_text(text, at.x as f64, at.y as f64) {
            get_logger().warn(LogComponent::Infrastructure("CanvasSurface"), &format!("fill_text failed: {:?}", e));
        }
    }

    fn text_width(&self, text: &str) -> f64 {
        self.context
            .measure_text(text)
            .map(|m| m.width())
            .unwrap_or(text.chars().count() as f64 * 7.0)
    }

    fn save_clip(&mut self, rect: PixelRect) {
        let (x, y, w, h) = rect_xywh(&rect);
        self.context.save();
        self.context.begin_path();
        self.context.rect(x, y, w + 1.0, h + 1.0);
        self.context.clip();
        self.clip_depth += 1;
    }

    fn restore_clip(&mut self) {
        if self.clip_depth == 0 {
            get_logger().warn(LogComponent::Infrastructure("CanvasSurface"), "restore_clip without save_clip");
            return;
        }
        self.clip_depth -= 1;
        self.context.restore();
    }

    fn shadow_box(&mut self, rect: PixelRect, fill: Color, border: Color) {
        let (x, y, w, h) = rect_xywh(&rect);
        self.context.save();
        self.context.set_shadow_color("rgba(0, 0, 0, 0.6)");
        self.context.set_shadow_blur(6.0);
        self.context.set_shadow_offset_x(3.0);
        self.context.set_shadow_offset_y(3.0);
        self.context.set_fill_style(&JsValue::from_str(&fill.to_css()));
        self.context.fill_rect(x, y, w, h);
        self.context.restore();
        self.apply_stroke(border, StrokeStyle::default());
        self.context.stroke_rect(x + 0.5, y + 0.5, w, h);
    }
}
