//! Grid tick placement and labels.

/// Round `raw` up to 1, 2 or 5 times a power of ten
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let n = raw / base;
    let nice = if n <= 1.0 {
        1.0
    } else if n <= 2.0 {
        2.0
    } else if n <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Tick values inside `[min, max]`, roughly `divisions` of them
pub fn nice_ticks(min: f64, max: f64, divisions: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || divisions < 2 {
        return Vec::new();
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let span = hi - lo;
    if span <= 0.0 {
        return vec![lo];
    }
    let step = nice_step(span / divisions as f64);
    let start = (lo / step).ceil() * step;
    let mut ticks = Vec::new();
    for i in 0..(divisions * 4) {
        let v = start + i as f64 * step;
        if v > hi + step * 1e-9 {
            break;
        }
        // snap values like 0.30000000000000004
        ticks.push(if v.abs() < step * 1e-9 { 0.0 } else { v });
    }
    ticks
}

/// Label text with enough decimals to tell neighbouring ticks apart
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || step <= 0.0 || !step.is_finite() {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    let magnitude = value.abs();
    if magnitude != 0.0 && (magnitude >= 1e7 || magnitude < 1e-4) {
        format!("{:.3e}", value)
    } else {
        format!("{:.*}", decimals, value)
    }
}
