#![cfg(all(feature = "render", target_arch = "wasm32"))]
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;
use xplot_wasm::application::{LayerOverrides, PlotController, PlotOptions};
use xplot_wasm::domain::errors::FatalError;
use xplot_wasm::domain::layer::SampleBuffer;
use xplot_wasm::infrastructure::rendering::CanvasSurface;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas(id: &str, width: u32, height: u32) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_id(id);
    canvas.set_width(width);
    canvas.set_height(height);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn zero_sized_canvas_is_refused() {
    let result = CanvasSurface::new(canvas("empty", 0, 50));
    assert!(matches!(result, Err(FatalError::ZeroSizedContainer { .. })));
}

#[wasm_bindgen_test]
fn missing_canvas_is_reported() {
    assert!(matches!(CanvasSurface::from_id("nowhere"), Err(FatalError::CanvasNotFound(_))));
}

#[wasm_bindgen_test]
fn controller_draws_onto_a_real_canvas() {
    canvas("plot", 320, 200);
    let mut surface = CanvasSurface::from_id("plot").unwrap();
    let mut plot = PlotController::new(320, 200, PlotOptions::default()).unwrap();
    let samples: Vec<f64> = (0..64).map(|i| (i as f64 * 0.2).sin()).collect();
    plot.overlay(Rc::new(SampleBuffer::from_f64(&samples, 0.0, 1.0)), &LayerOverrides::default())
        .unwrap();

    let stats = plot.render(&mut surface);
    assert_eq!(stats.traces.len(), 1);
    assert!(stats.skipped_layers.is_empty());

    surface.resize(640, 400);
    assert_eq!(surface.canvas().width(), 640);
}
