use super::scrollbar::{ScrollAction, clamp_pan};
use super::settings::{ChangeImpact, LayerOverrides, Margins, PlotOptions, PlotSettings, SettingsChange};
use crate::domain::errors::{ConfigurationError, FatalError, PlotResult};
use crate::domain::events::{DomainEvent, EventDispatcher, InMemoryEventDispatcher, MouseButton, PlotEvent};
use crate::domain::layer::{BufferAccessor, ComplexMode, HeaderOverride, Layer};
use crate::domain::logging::{LogComponent, LogLevel, get_logger};
use crate::domain::plot::{
    AutoScaleService, Axis, Color, CoordinateStack, Crosshairs, MAX_ZOOM_DEPTH, PanRange, PixelPoint, PixelRect, RealPoint,
    RealRect,
};
use crate::infrastructure::rendering::{ChromeSettings, DrawingSurface, FrameRenderer, FrameScene, FrameStats};
use std::rc::Rc;

/// Largest drag, in pixels on both axes, still treated as a click
pub const CLICK_TOLERANCE: i32 = 2;

/// Identifies one requested render; only the latest one is honoured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderToken(u64);

/// Result of a rubber-band gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomOutcome {
    Zoomed,
    /// Too small to be a zoom; reported as `mtag` instead
    Tagged(RealPoint),
    Refused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    start: PixelPoint,
    current: PixelPoint,
}

/// Everything one plot owns. Nothing here is shared between plots.
#[derive(Debug)]
pub struct PlotState {
    pub settings: PlotSettings,
    pub chrome: ChromeSettings,
    pub margins: Margins,
    pub width: u32,
    pub height: u32,
    pub stack: CoordinateStack,
    pub layers: Vec<Layer>,
    pub pan_range: PanRange,
    /// Base-level bounds pinned by panning the first zoom level
    panned_x: Option<(f64, f64)>,
    panned_y: Option<(f64, f64)>,
    scaled: bool,
    pointer: Option<PixelPoint>,
    drag: Option<Drag>,
    render_token: Option<RenderToken>,
    next_token: u64,
}

/// Plot Controller: the state machine over the coordinate stack plus the
/// layer list, driven by API calls and translated pointer input.
pub struct PlotController {
    state: PlotState,
    dispatcher: InMemoryEventDispatcher,
    scaler: AutoScaleService,
    frames: FrameRenderer,
}

impl PlotController {
    pub fn new(width: u32, height: u32, options: PlotOptions) -> PlotResult<Self> {
        if width == 0 || height == 0 {
            get_logger().error(
                LogComponent::Application("PlotController"),
                &format!("refusing zero-sized plot {}x{}", width, height),
            );
            return Err(FatalError::ZeroSizedContainer { width, height }.into());
        }

        let chrome = options.chrome();
        let settings = options.settings;
        let pixels = plot_area(width, height, &options.margins);
        let pan_range = PanRange::default();
        let stack = CoordinateStack::new(pan_range.as_rect(), pixels, settings.origin);

        get_logger().info(
            LogComponent::Application("PlotController"),
            &format!("plot created {}x{} origin={}", width, height, settings.origin.code()),
        );

        Ok(Self {
            state: PlotState {
                settings,
                chrome,
                margins: options.margins,
                width,
                height,
                stack,
                layers: Vec::new(),
                pan_range,
                panned_x: None,
                panned_y: None,
                scaled: false,
                pointer: None,
                drag: None,
                render_token: None,
                next_token: 0,
            },
            dispatcher: InMemoryEventDispatcher::new(),
            scaler: AutoScaleService::new(),
            frames: FrameRenderer::new(),
        })
    }

    pub fn state(&self) -> &PlotState {
        &self.state
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.state.settings
    }

    pub fn stack(&self) -> &CoordinateStack {
        &self.state.stack
    }

    pub fn layers(&self) -> &[Layer] {
        &self.state.layers
    }

    pub fn pan_range(&self) -> PanRange {
        self.state.pan_range
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&PlotEvent) + 'static,
    {
        self.dispatcher.subscribe_to_plot_events(handler);
    }

    fn emit(&self, event: PlotEvent) {
        crate::log_trace!(LogComponent::Application("PlotController"), "emit {}", event.event_type());
        self.dispatcher.publish_plot_event(event);
    }

    // ---- render coalescing ----

    /// Ask for a redraw. Returns the token this request superseded, if any.
    pub fn request_render(&mut self) -> Option<RenderToken> {
        self.state.next_token += 1;
        self.state.render_token.replace(RenderToken(self.state.next_token))
    }

    pub fn pending_render(&self) -> Option<RenderToken> {
        self.state.render_token
    }

    /// Claim the pending render. Stale tokens are refused.
    pub fn take_render(&mut self, token: RenderToken) -> bool {
        if self.state.render_token == Some(token) {
            self.state.render_token = None;
            true
        } else {
            false
        }
    }

    // ---- layers ----

    /// Add a layer over `buffer` and rescale. Returns the new layer index.
    pub fn overlay(&mut self, buffer: Rc<dyn BufferAccessor>, overrides: &LayerOverrides) -> PlotResult<usize> {
        let index = self.state.layers.len();
        let mut layer = Layer::new(index, buffer, overrides.row.unwrap_or(0)).map_err(|e| {
            get_logger().error(
                LogComponent::Application("PlotController"),
                &format!("overlay rejected: {}", e),
            );
            e
        })?;
        layer.style.color = Color::palette(index);
        layer.set_transform(self.state.settings.cmode, self.state.settings.phunits);
        overrides.apply(&mut layer)?;

        let name = layer.name.clone();
        get_logger().info(
            LogComponent::Application("PlotController"),
            &format!("overlay {} as layer {} ({} samples)", name, index, layer.size()),
        );
        self.state.layers.push(layer);
        self.rescale();
        self.request_render();
        self.emit(PlotEvent::FileOverlayed { name, index });
        Ok(index)
    }

    /// Remove a layer and renumber the ones after it
    pub fn remove_layer(&mut self, index: usize) -> PlotResult<()> {
        if index >= self.state.layers.len() {
            return Err(ConfigurationError::NoSuchLayer(index).into());
        }
        let removed = self.state.layers.remove(index);
        for (i, layer) in self.state.layers.iter_mut().enumerate() {
            layer.index = i;
        }
        if self.state.layers.is_empty() {
            self.state.scaled = false;
        } else {
            self.rescale();
        }
        self.request_render();
        self.emit(PlotEvent::FileDeoverlayed { name: removed.name, index });
        Ok(())
    }

    /// Swap a layer's data, e.g. for a new streaming frame
    pub fn reload(&mut self, index: usize, buffer: Rc<dyn BufferAccessor>) -> PlotResult<()> {
        let layer = self
            .state
            .layers
            .get_mut(index)
            .ok_or(ConfigurationError::NoSuchLayer(index))?;
        if let Err(e) = layer.replace_buffer(buffer) {
            get_logger().log_with_metadata(
                LogLevel::Warn,
                LogComponent::Application("PlotController"),
                "reload rejected",
                &format!("layer={} error={}", index, e),
            );
            return Err(e.into());
        }
        if !self.state.settings.autox.is_off() || !self.state.settings.autoy.is_off() {
            self.rescale();
        }
        self.request_render();
        self.emit(PlotEvent::Reread { index });
        Ok(())
    }

    /// Merge a streaming header update into a layer's x axis.
    ///
    /// Format and subsize changes only affect buffers decoded afterwards.
    pub fn apply_header_override(&mut self, index: usize, update: &HeaderOverride) -> PlotResult<()> {
        let layer = self
            .state
            .layers
            .get_mut(index)
            .ok_or(ConfigurationError::NoSuchLayer(index))?;
        if update.xstart.is_none() && update.xdelta.is_none() {
            return Ok(());
        }
        let xstart = update.xstart.unwrap_or(layer.xstart());
        let xdelta = update.xdelta.unwrap_or(layer.xdelta());
        layer.set_x_axis(xstart, xdelta);
        if !self.state.settings.autox.is_off() {
            self.rescale();
        }
        self.request_render();
        Ok(())
    }

    // ---- scaling ----

    /// Recompute the pan range and the base level from the layers
    pub fn rescale(&mut self) {
        let scale = self.state.settings.scale_settings();
        let (xmin, xmax) = self.state.settings.requested_x();
        let previous = self.state.scaled.then_some(self.state.pan_range);
        let pan = self.scaler.scale_base(&mut self.state.layers, xmin, xmax, &scale, previous);
        self.state.pan_range = pan;
        self.state.scaled = !self.state.layers.is_empty();

        let mut base = pan.as_rect();
        if let Some((lo, hi)) = self.state.panned_x {
            base.xmin = lo;
            base.xmax = hi;
        }
        if let Some((lo, hi)) = self.state.panned_y {
            base.ymin = lo;
            base.ymax = hi;
        }
        self.state.stack.set_base(base);
        get_logger().debug(
            LogComponent::Application("PlotController"),
            &format!(
                "rescaled x=[{}, {}] y=[{}, {}]",
                pan.x_min, pan.x_max, pan.y_min, pan.y_max
            ),
        );
    }

    /// Apply a partial settings update, rescaling only when it matters
    pub fn change_settings(&mut self, change: &SettingsChange) -> ChangeImpact {
        let impact = change.apply(&mut self.state.settings, &mut self.state.chrome);
        self.state.stack.set_origin(self.state.settings.origin);
        if impact.retransform {
            let (mode, units) = (self.state.settings.cmode, self.state.settings.phunits);
            for layer in &mut self.state.layers {
                layer.set_transform(mode, units);
            }
        }
        if impact.rescale {
            self.state.panned_x = None;
            self.state.panned_y = None;
            self.rescale();
        }
        if impact.render {
            self.request_render();
        }
        impact
    }

    pub fn set_layer_display(&mut self, index: usize, display: bool) -> PlotResult<()> {
        let layer = self
            .state
            .layers
            .get_mut(index)
            .ok_or(ConfigurationError::NoSuchLayer(index))?;
        layer.display = display;
        self.rescale();
        self.request_render();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> PlotResult<()> {
        if width == 0 || height == 0 {
            return Err(FatalError::ZeroSizedContainer { width, height }.into());
        }
        self.state.width = width;
        self.state.height = height;
        self.state.stack.set_pixels(plot_area(width, height, &self.state.margins));
        self.request_render();
        Ok(())
    }

    // ---- zoom state machine ----

    /// Push a zoom level spanning the two real-world corners.
    ///
    /// Returns `Ok(false)` when the stack is already at its maximum depth.
    pub fn zoom(&mut self, upper_left: RealPoint, lower_right: RealPoint) -> PlotResult<bool> {
        let rect = RealRect::from_corners(upper_left, lower_right);
        if !upper_left.is_finite() || !lower_right.is_finite() || rect.width() <= 0.0 || rect.height() <= 0.0 {
            get_logger().warn(
                LogComponent::Application("PlotController"),
                &format!("ignoring empty zoom {:?} -> {:?}", upper_left, lower_right),
            );
            return Err(ConfigurationError::InvalidZoom(format!(
                "corners ({}, {}) and ({}, {}) enclose no area",
                upper_left.x, upper_left.y, lower_right.x, lower_right.y
            ))
            .into());
        }
        if !self.state.stack.push_zoom(rect) {
            get_logger().warn(
                LogComponent::Application("PlotController"),
                &format!("zoom refused at depth {}", MAX_ZOOM_DEPTH),
            );
            return Ok(false);
        }
        self.request_render();
        Ok(true)
    }

    /// Zoom to a pixel rubber band; tiny drags become a tag
    pub fn zoom_pixels(&mut self, a: PixelPoint, b: PixelPoint) -> ZoomOutcome {
        if (a.x - b.x).abs() <= CLICK_TOLERANCE && (a.y - b.y).abs() <= CLICK_TOLERANCE {
            let at = self.state.stack.to_real(a.x, a.y);
            self.emit(PlotEvent::Tag { x: at.x, y: at.y, w: 0.0, h: 0.0 });
            return ZoomOutcome::Tagged(at);
        }
        let first = self.state.stack.to_real(a.x, a.y);
        let second = self.state.stack.to_real(b.x, b.y);
        match self.zoom(first, second) {
            Ok(true) => ZoomOutcome::Zoomed,
            Ok(false) | Err(_) => ZoomOutcome::Refused,
        }
    }

    /// Pop up to `levels` zoom levels; the base is never removed
    pub fn unzoom(&mut self, levels: usize) -> usize {
        let removed = self.state.stack.pop_zoom(levels);
        if removed > 0 {
            self.request_render();
        }
        removed
    }

    pub fn unzoom_all(&mut self) -> usize {
        self.unzoom(MAX_ZOOM_DEPTH)
    }

    /// Shift the current level along `axis`, clamped to the pan range.
    ///
    /// Panning the first zoom level also writes the moved bounds into the
    /// base level and pins them there, so a later rescale keeps the panned
    /// view. Returns `false` when nothing moved.
    pub fn pan(&mut self, axis: Axis, delta: f64) -> bool {
        let pan = self.state.pan_range;
        let mut bounds = self.state.stack.current().bounds();
        let (view, range) = match axis {
            Axis::X => ((bounds.xmin, bounds.xmax), (pan.x_min, pan.x_max)),
            Axis::Y => ((bounds.ymin, bounds.ymax), (pan.y_min, pan.y_max)),
        };
        let moved = clamp_pan(view, delta, range);
        if moved == view {
            return false;
        }
        match axis {
            Axis::X => (bounds.xmin, bounds.xmax) = moved,
            Axis::Y => (bounds.ymin, bounds.ymax) = moved,
        }
        self.state.stack.current_mut().set_bounds(bounds);
        if self.state.stack.level() == 1 {
            let mut base = self.state.stack.base().bounds();
            match axis {
                Axis::X => {
                    (base.xmin, base.xmax) = moved;
                    self.state.panned_x = Some(moved);
                }
                Axis::Y => {
                    (base.ymin, base.ymax) = moved;
                    self.state.panned_y = Some(moved);
                }
            }
            self.state.stack.set_base(base);
        }
        self.request_render();
        true
    }

    pub fn scroll(&mut self, axis: Axis, action: ScrollAction) -> bool {
        let pan = self.state.pan_range;
        let bounds = self.state.stack.current().bounds();
        let (view, range) = match axis {
            Axis::X => ((bounds.xmin, bounds.xmax), (pan.x_min, pan.x_max)),
            Axis::Y => ((bounds.ymin, bounds.ymax), (pan.y_min, pan.y_max)),
        };
        match action.offset(view, range) {
            Some(delta) => self.pan(axis, delta),
            None => false,
        }
    }

    // ---- pointer input ----

    pub fn mouse_move(&mut self, px: i32, py: i32) {
        let at = PixelPoint::new(px, py);
        self.state.pointer = Some(at);
        let real = self.state.stack.to_real(px, py);
        if let Some(drag) = self.state.drag.as_mut() {
            drag.current = at;
            self.request_render();
        } else if self.state.chrome.crosshairs != Crosshairs::Off || self.state.chrome.readout {
            self.request_render();
        }
        self.emit(PlotEvent::MouseMove { x: real.x, y: real.y });
    }

    pub fn mouse_leave(&mut self) {
        self.state.pointer = None;
        self.request_render();
    }

    pub fn mouse_down(&mut self, px: i32, py: i32, button: MouseButton) {
        let real = self.state.stack.to_real(px, py);
        self.emit(PlotEvent::MouseDown { x: real.x, y: real.y, button });
        if button == MouseButton::Left {
            let at = PixelPoint::new(px, py);
            self.state.drag = Some(Drag { start: at, current: at });
        }
    }

    pub fn mouse_up(&mut self, px: i32, py: i32, button: MouseButton) {
        let real = self.state.stack.to_real(px, py);
        self.emit(PlotEvent::MouseUp { x: real.x, y: real.y, button });
        match button {
            MouseButton::Left => {
                if let Some(drag) = self.state.drag.take() {
                    self.zoom_pixels(drag.start, PixelPoint::new(px, py));
                    self.request_render();
                }
            }
            MouseButton::Right => {
                self.unzoom(1);
            }
            MouseButton::Middle => self.emit(PlotEvent::ShowMenu { px, py }),
        }
    }

    /// Wheel pages the x axis
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let action = if delta_y > 0.0 { ScrollAction::PageInc } else { ScrollAction::PageDec };
        self.scroll(Axis::X, action)
    }

    pub fn exit(&mut self) {
        self.emit(PlotEvent::Exit);
    }

    // ---- drawing ----

    /// Draw the current view. Layers whose reads fail are logged and skipped.
    pub fn render(&mut self, surface: &mut dyn DrawingSurface) -> FrameStats {
        let bounds = self.state.stack.current().bounds();
        let bufmax = self.state.settings.bufmax;
        for layer in self.state.layers.iter_mut().filter(|l| l.display) {
            let (lo, hi) = if layer.mode == ComplexMode::ImagVsReal {
                (layer.xmin(), layer.xmax())
            } else {
                (bounds.xmin, bounds.xmax)
            };
            if let Err(e) = layer.materialize_window(lo, hi, bufmax) {
                get_logger().log_with_metadata(
                    LogLevel::Warn,
                    LogComponent::Application("PlotController"),
                    "layer skipped during render",
                    &format!("layer={} error={}", layer.index, e),
                );
            }
        }

        let rubber_band = self
            .state
            .drag
            .filter(|d| d.start != d.current)
            .map(|d| PixelRect::new(d.start.x, d.start.y, d.current.x, d.current.y));
        let readout = self.state.pointer.map(|p| self.state.stack.to_real(p.x, p.y));
        let scene = FrameScene {
            level: self.state.stack.display_level(),
            layers: &self.state.layers,
            chrome: &self.state.chrome,
            pointer: self.state.pointer,
            rubber_band,
            readout,
        };
        let stats = self.frames.render(surface, &scene);
        self.state.render_token = None;
        stats
    }
}

/// Plotting rectangle inside a canvas, never narrower than one pixel
fn plot_area(width: u32, height: u32, margins: &Margins) -> PixelRect {
    let x1 = margins.left.min(width.saturating_sub(2)) as i32;
    let y1 = margins.top.min(height.saturating_sub(2)) as i32;
    let x2 = (width.saturating_sub(margins.right + 1) as i32).max(x1 + 1);
    let y2 = (height.saturating_sub(margins.bottom + 1) as i32).max(y1 + 1);
    PixelRect::new(x1, y1, x2, y2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layer::SampleBuffer;

    fn ramp(n: usize) -> Rc<dyn BufferAccessor> {
        let samples: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Rc::new(SampleBuffer::from_f64(&samples, 0.0, 1.0))
    }

    #[test]
    fn zero_sized_container_is_fatal() {
        assert!(PlotController::new(0, 100, PlotOptions::default()).is_err());
    }

    #[test]
    fn render_tokens_supersede() {
        let mut plot = PlotController::new(200, 100, PlotOptions::default()).unwrap();
        assert_eq!(plot.request_render(), None);
        let first = plot.pending_render().unwrap();
        assert_eq!(plot.request_render(), Some(first));
        assert!(!plot.take_render(first));
        let second = plot.pending_render().unwrap();
        assert!(plot.take_render(second));
        assert_eq!(plot.pending_render(), None);
    }

    #[test]
    fn remove_renumbers_layers() {
        let mut plot = PlotController::new(200, 100, PlotOptions::default()).unwrap();
        plot.overlay(ramp(10), &LayerOverrides::default()).unwrap();
        plot.overlay(ramp(20), &LayerOverrides::default()).unwrap();
        plot.remove_layer(0).unwrap();
        assert_eq!(plot.layers().len(), 1);
        assert_eq!(plot.layers()[0].index, 0);
        assert_eq!(plot.layers()[0].size(), 20);
        assert!(plot.remove_layer(3).is_err());
    }

    #[test]
    fn pan_is_clamped_and_pins_the_base() {
        let mut plot = PlotController::new(200, 100, PlotOptions::default()).unwrap();
        plot.overlay(ramp(101), &LayerOverrides::default()).unwrap();
        plot.zoom(RealPoint::new(10.0, 0.0), RealPoint::new(20.0, 50.0)).unwrap();
        assert!(plot.pan(Axis::X, 500.0));
        let b = plot.stack().current().bounds();
        assert_eq!((b.xmin, b.xmax), (90.0, 100.0));
        assert!(!plot.pan(Axis::X, 5.0));
        assert_eq!(plot.unzoom(5), 1);
        assert_eq!(plot.stack().base().bounds().xmin, 0.0);
    }

    #[test]
    fn plot_area_respects_margins() {
        let area = plot_area(400, 300, &Margins::default());
        assert_eq!(area, PixelRect::new(60, 16, 383, 263));
        let tiny = plot_area(3, 3, &Margins::default());
        assert!(tiny.x2 > tiny.x1 && tiny.y2 > tiny.y1);
    }
}
