use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::rc::Rc;
use xplot_wasm::domain::layer::{
    ComplexMode, Layer, LayerStyle, PhaseUnits, SampleBuffer, apply_transform,
};
use xplot_wasm::domain::plot::{AutoScaleService, PixelRect, RealRect, ScaleSettings, ViewLevel};
use xplot_wasm::infrastructure::rendering::{RecordingSurface, TraceOptions, TraceRenderer};

/// Noisy sine, half of it outside a +/-1 window so the clipper has work to do
fn samples(count: usize) -> Vec<f64> {
    (0..count).map(|i| 1.5 * (i as f64 * 0.01).sin() + 0.1 * (i as f64 * 0.7).cos()).collect()
}

fn bench_render_trace(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_trace");
    for count in [1_000usize, 10_000, 100_000] {
        let ys = samples(count);
        let xs: Vec<f64> = (0..count).map(|i| i as f64).collect();
        let level = ViewLevel::new(
            RealRect { xmin: 0.0, xmax: count as f64, ymin: -1.0, ymax: 1.0 },
            PixelRect::new(0, 0, 1024, 512),
        );
        let style = LayerStyle::default();
        let options = TraceOptions::default();
        let renderer = TraceRenderer::new();
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut surface = RecordingSurface::new(1024, 512);
                renderer.render_trace(&mut surface, &level, &style, &xs, &ys, count, 1, &options)
            })
        });
    }
    group.finish();
}

fn bench_complex_transform(c: &mut Criterion) {
    let raw: Vec<f64> = samples(200_000);
    let mut group = c.benchmark_group("complex_transform");
    for mode in [ComplexMode::Magnitude, ComplexMode::Phase, ComplexMode::Log20] {
        group.bench_function(mode.label(), |b| {
            b.iter(|| apply_transform(&raw, true, mode, PhaseUnits::Degrees))
        });
    }
    group.finish();
}

fn bench_scale_base(c: &mut Criterion) {
    let buffer = Rc::new(SampleBuffer::from_f64(&samples(500_000), 0.0, 1.0));
    let settings = ScaleSettings { all: true, ..ScaleSettings::default() };
    let service = AutoScaleService::new();
    c.bench_function("scale_base_all_windows", |b| {
        b.iter(|| {
            let mut layers = vec![Layer::new(0, buffer.clone(), 0).unwrap()];
            service.scale_base(&mut layers, None, None, &settings, None)
        })
    });
}

criterion_group!(benches, bench_render_trace, bench_complex_transform, bench_scale_base);
criterion_main!(benches);
