use std::rc::Rc;
use std::sync::OnceLock;

use xplot_wasm::domain::layer::{Layer, LayerStyle, LineMode, SampleBuffer, SymbolMode};
use xplot_wasm::domain::logging::{LogLevel, MemoryLogger, init_logger};
use xplot_wasm::domain::plot::{Color, Highlight, Origin, PixelPoint, PixelRect, RealRect, ViewLevel};
use xplot_wasm::infrastructure::rendering::{
    ChromeSettings, DrawCommand, FrameRenderer, FrameScene, RecordingSurface, TraceOptions, TraceRenderer,
};

static LOGGER: OnceLock<MemoryLogger> = OnceLock::new();

fn logger() -> &'static MemoryLogger {
    LOGGER.get_or_init(|| {
        let logger = MemoryLogger::new();
        init_logger(Box::new(logger.clone()));
        logger
    })
}

/// 0..10 on both axes over a 100 px square, in pixel orientation
fn level() -> ViewLevel {
    ViewLevel::new(RealRect { xmin: 0.0, xmax: 10.0, ymin: 0.0, ymax: 10.0 }, PixelRect::new(0, 0, 100, 100))
}

fn draw(xs: &[f64], ys: &[f64], style: &LayerStyle, options: &TraceOptions) -> (RecordingSurface, xplot_wasm::infrastructure::rendering::TraceStats) {
    let mut surface = RecordingSurface::new(100, 100);
    let stats = TraceRenderer::new().render_trace(&mut surface, &level(), style, xs, ys, xs.len(), 1, options);
    (surface, stats)
}

#[test]
fn segment_crossing_the_window_becomes_one_clipped_polyline() {
    let (surface, stats) = draw(&[-5.0, 15.0], &[5.0, 5.0], &LayerStyle::default(), &TraceOptions::default());
    assert_eq!(surface.polylines(), vec![&[PixelPoint::new(0, 50), PixelPoint::new(100, 50)][..]]);
    assert_eq!(stats.clipped_segments, 1);
}

#[test]
fn leaving_and_reentering_splits_the_trace() {
    let (surface, stats) = draw(&[1.0, 5.0, 9.0], &[5.0, 15.0, 5.0], &LayerStyle::default(), &TraceOptions::default());
    let polylines = surface.polylines();
    assert_eq!(polylines.len(), 2);
    assert_eq!(polylines[0], &[PixelPoint::new(10, 50), PixelPoint::new(30, 100)][..]);
    assert_eq!(polylines[1], &[PixelPoint::new(70, 100), PixelPoint::new(90, 50)][..]);
    assert_eq!(stats.clipped_segments, 2);
}

#[test]
fn non_finite_sample_breaks_the_line() {
    let ys = [1.0, 2.0, f64::NAN, 4.0, 5.0];
    let (surface, stats) = draw(&[1.0, 2.0, 3.0, 4.0, 5.0], &ys, &LayerStyle::default(), &TraceOptions::default());
    assert_eq!(surface.polylines().len(), 2);
    assert_eq!(stats.polylines, 2);
}

#[test]
fn symbols_mark_visible_samples_only() {
    let style = LayerStyle { symbol: SymbolMode::Circle, line: LineMode::None, ..LayerStyle::default() };
    let (surface, stats) = draw(&[1.0, 2.0, 30.0, 4.0], &[1.0, 2.0, 3.0, 4.0], &style, &TraceOptions::default());
    assert_eq!(stats.symbols, 3);
    assert_eq!(surface.count(|c| matches!(c, DrawCommand::Circle { .. })), 3);
    assert!(surface.polylines().is_empty());
}

#[test]
fn stems_drop_to_the_zero_line() {
    let style = LayerStyle { line: LineMode::VerticalStems, ..LayerStyle::default() };
    let (surface, stats) = draw(&[2.0, 4.0], &[5.0, 8.0], &style, &TraceOptions::default());
    assert_eq!(stats.stems, 2);
    assert_eq!(surface.lines()[0], (PixelPoint::new(20, 50), PixelPoint::new(20, 0)));
}

#[test]
fn highlight_recolors_its_x_range() {
    let red = Color::RED;
    let options = TraceOptions { highlights: vec![Highlight::new(4.0, 6.0, red)], ..TraceOptions::default() };
    let (surface, _) = draw(&[0.0, 10.0], &[5.0, 5.0], &LayerStyle::default(), &options);
    let colors: Vec<Color> = surface
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Polyline { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec![Color::WHITE, red, Color::WHITE]);
}

#[test]
fn empty_trace_only_logs() {
    let logger = logger();
    let (surface, stats) = draw(&[], &[], &LayerStyle::default(), &TraceOptions::default());
    assert!(surface.commands.is_empty());
    assert_eq!(stats, Default::default());
    assert!(logger.contains(LogLevel::Debug, "empty trace, nothing to draw"));
}

#[test]
fn frame_draws_legend_and_flipped_y() {
    let values: Vec<f64> = (0..11).map(|i| i as f64).collect();
    let buffer = SampleBuffer::from_f64(&values, 0.0, 1.0).with_name("ramp");
    let mut layer = Layer::new(0, Rc::new(buffer), 0).unwrap();
    layer.materialize_window(0.0, 10.0, 1024).unwrap();

    let display = level().remap_origin(Origin::CANONICAL, Origin::BottomLeft);
    let chrome = ChromeSettings { legend: true, grid: false, ..ChromeSettings::default() };
    let layers = [layer];
    let scene = FrameScene {
        level: display,
        layers: &layers,
        chrome: &chrome,
        pointer: None,
        rubber_band: None,
        readout: None,
    };
    let mut surface = RecordingSurface::new(100, 100);
    let stats = FrameRenderer::new().render(&mut surface, &scene);

    assert!(stats.skipped_layers.is_empty());
    assert!(surface.texts().contains(&"ramp"));
    let trace = surface.polylines()[0];
    assert_eq!(trace.first(), Some(&PixelPoint::new(0, 100)));
    assert_eq!(trace.last(), Some(&PixelPoint::new(100, 0)));
}
