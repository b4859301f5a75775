use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use xplot_wasm::domain::plot::{
    CoordinateStack, MAX_ZOOM_DEPTH, Origin, PixelRect, RealRect, ViewLevel,
};

const ORIGINS: [Origin; 4] = [Origin::BottomLeft, Origin::BottomRight, Origin::TopRight, Origin::TopLeft];

fn level(xmin: f64, span_x: f64, ymin: f64, span_y: f64) -> ViewLevel {
    ViewLevel::new(
        RealRect { xmin, xmax: xmin + span_x, ymin, ymax: ymin + span_y },
        PixelRect::new(40, 10, 640, 410),
    )
}

#[quickcheck]
fn pixel_round_trip_within_one_pixel(xmin: i16, span: u16, fx: u8, fy: u8, origin: u8) -> TestResult {
    if span == 0 {
        return TestResult::discard();
    }
    let base = level(xmin as f64, span as f64, -(span as f64), 2.0 * span as f64);
    let display = base.remap_origin(Origin::CANONICAL, ORIGINS[origin as usize % 4]);
    let x = base.xmin + (fx as f64 / 255.0) * (base.xmax - base.xmin);
    let y = base.ymin + (fy as f64 / 255.0) * (base.ymax - base.ymin);

    let Some(p) = display.to_pixel(x, y) else {
        return TestResult::failed();
    };
    let back = display.to_real(p.x, p.y);
    TestResult::from_bool(
        (back.x - x).abs() <= display.xscl.abs() && (back.y - y).abs() <= display.yscl.abs(),
    )
}

#[quickcheck]
fn origin_remap_is_an_involution(a: u8, b: u8, xmin: i32, ymin: i32) -> bool {
    let (a, b) = (ORIGINS[a as usize % 4], ORIGINS[b as usize % 4]);
    let original = level(xmin as f64, 25.0, ymin as f64, 4.0);
    original.remap_origin(b, a).remap_origin(a, b) == original
}

#[test]
fn twenty_zooms_never_exceed_depth() {
    let mut stack = CoordinateStack::new(
        RealRect { xmin: 0.0, xmax: 1024.0, ymin: 0.0, ymax: 1024.0 },
        PixelRect::new(0, 0, 500, 500),
        Origin::BottomLeft,
    );
    let mut accepted = 0;
    for i in 0..20 {
        let half = 512.0 / (i + 1) as f64;
        if stack.push_zoom(RealRect { xmin: 0.0, xmax: half, ymin: 0.0, ymax: half }) {
            accepted += 1;
        }
        assert!(stack.depth() <= MAX_ZOOM_DEPTH);
    }
    assert_eq!(accepted, MAX_ZOOM_DEPTH - 1);
    assert_eq!(stack.pop_zoom(100), MAX_ZOOM_DEPTH - 1);
    assert_eq!(stack.depth(), 1);
}

#[test]
fn zoom_then_unzoom_restores_base_exactly() {
    let mut stack = CoordinateStack::new(
        RealRect { xmin: 0.0, xmax: 99.0, ymin: -0.18, ymax: 9.18 },
        PixelRect::new(60, 16, 783, 563),
        Origin::BottomLeft,
    );
    let before = *stack.base();
    stack.push_zoom(RealRect { xmin: 25.0, xmax: 75.0, ymin: 0.0, ymax: 5.0 });
    assert_eq!(stack.current().bounds().xmin, 25.0);
    stack.pop_zoom(1);
    assert_eq!(*stack.current(), before);
}

#[test]
fn display_origin_controls_pixel_direction() {
    let bounds = RealRect { xmin: 0.0, xmax: 10.0, ymin: 0.0, ymax: 10.0 };
    let pixels = PixelRect::new(0, 0, 100, 100);

    let bottom_left = CoordinateStack::new(bounds, pixels, Origin::BottomLeft);
    assert_eq!(bottom_left.to_pixel(0.0, 0.0).map(|p| (p.x, p.y)), Some((0, 100)));

    let top_right = CoordinateStack::new(bounds, pixels, Origin::TopRight);
    assert_eq!(top_right.to_pixel(0.0, 0.0).map(|p| (p.x, p.y)), Some((100, 0)));

    let top_left = CoordinateStack::new(bounds, pixels, Origin::TopLeft);
    assert_eq!(top_left.to_real(100, 100), xplot_wasm::domain::plot::RealPoint::new(10.0, 10.0));
}
