use super::buffer::BufferAccessor;
use super::transform::apply_transform;
use super::value_objects::{ComplexMode, LayerStyle, PhaseUnits};
use crate::domain::errors::BufferError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::plot::value_objects::Highlight;
use std::fmt;
use std::rc::Rc;

/// Entity - one overlaid data source.
///
/// The layer reads a sliding window of samples out of a shared buffer
/// accessor and keeps them transformed and ready to draw.
pub struct Layer {
    pub index: usize,
    pub name: String,
    buffer: Rc<dyn BufferAccessor>,
    /// Row of a two-dimensional buffer
    row: usize,
    complex: bool,
    pub mode: ComplexMode,
    pub phase_units: PhaseUnits,
    xstart: f64,
    xdelta: f64,
    xmin: f64,
    xmax: f64,
    /// Samples in the selected row
    size: usize,
    window_start: usize,
    window_size: usize,
    window_xstart: f64,
    pub display: bool,
    pub style: LayerStyle,
    pub highlights: Vec<Highlight>,
    xbuf: Vec<f64>,
    ybuf: Vec<f64>,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("row", &self.row)
            .field("xstart", &self.xstart)
            .field("xdelta", &self.xdelta)
            .field("window_start", &self.window_start)
            .field("window_size", &self.window_size)
            .finish()
    }
}

impl Layer {
    /// Create a layer over `row` of `buffer`, taking x-axis metadata from its header
    pub fn new(index: usize, buffer: Rc<dyn BufferAccessor>, row: usize) -> Result<Self, BufferError> {
        let header = buffer.header();
        header.element_format()?;
        let (xstart, xdelta) = (header.xstart, header.xdelta);
        let name = if header.name.is_empty() { format!("layer {}", index) } else { header.name.clone() };
        let mut layer = Self {
            index,
            name,
            complex: buffer.is_complex(),
            row: row.min(buffer.rows().saturating_sub(1)),
            buffer,
            mode: ComplexMode::default(),
            phase_units: PhaseUnits::default(),
            xstart,
            xdelta,
            xmin: 0.0,
            xmax: 0.0,
            size: 0,
            window_start: 0,
            window_size: 0,
            window_xstart: xstart,
            display: true,
            style: LayerStyle::default(),
            highlights: Vec::new(),
            xbuf: Vec::new(),
            ybuf: Vec::new(),
        };
        layer.size = layer.buffer.row_length();
        layer.update_extent();
        Ok(layer)
    }

    pub fn buffer(&self) -> &Rc<dyn BufferAccessor> {
        &self.buffer
    }

    pub fn is_complex(&self) -> bool {
        self.complex
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn xstart(&self) -> f64 {
        self.xstart
    }

    pub fn xdelta(&self) -> f64 {
        self.xdelta
    }

    /// Smallest x covered by the buffer
    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    /// Largest x covered by the buffer
    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn window_xstart(&self) -> f64 {
        self.window_xstart
    }

    /// Transformed abscissae of the materialized window
    pub fn xs(&self) -> &[f64] {
        &self.xbuf
    }

    /// Transformed ordinates of the materialized window
    pub fn ys(&self) -> &[f64] {
        &self.ybuf
    }

    /// Replace the x-axis description and forget the materialized window
    pub fn set_x_axis(&mut self, xstart: f64, xdelta: f64) {
        self.xstart = xstart;
        self.xdelta = xdelta;
        self.update_extent();
        self.invalidate();
    }

    pub fn set_transform(&mut self, mode: ComplexMode, units: PhaseUnits) {
        if self.mode != mode || self.phase_units != units {
            self.mode = mode;
            self.phase_units = units;
            self.invalidate();
        }
    }

    /// Swap in new data, keeping styling and transform
    pub fn replace_buffer(&mut self, buffer: Rc<dyn BufferAccessor>) -> Result<(), BufferError> {
        buffer.header().element_format()?;
        self.complex = buffer.is_complex();
        self.xstart = buffer.header().xstart;
        self.xdelta = buffer.header().xdelta;
        self.row = self.row.min(buffer.rows().saturating_sub(1));
        self.size = buffer.row_length();
        self.buffer = buffer;
        self.update_extent();
        self.invalidate();
        Ok(())
    }

    /// Drop the materialized window so the next request re-reads
    pub fn invalidate(&mut self) {
        self.window_size = 0;
        self.xbuf.clear();
        self.ybuf.clear();
    }

    fn update_extent(&mut self) {
        let last = self.xstart + self.xdelta * self.size.saturating_sub(1) as f64;
        self.xmin = self.xstart.min(last);
        self.xmax = self.xstart.max(last);
    }

    /// Sample index range `[imin, imax)` covering `[xmin, xmax]` plus one
    /// sample of slack on each side, clamped to the buffer.
    pub fn index_range(&self, xmin: f64, xmax: f64) -> (usize, usize) {
        if self.size == 0 {
            return (0, 0);
        }
        if self.xdelta == 0.0 || !self.xdelta.is_finite() || !xmin.is_finite() || !xmax.is_finite() {
            return (0, self.size);
        }
        let a = (xmin - self.xstart) / self.xdelta;
        let b = (xmax - self.xstart) / self.xdelta;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let imin = (lo.floor() - 1.0).clamp(0.0, self.size as f64) as usize;
        let imax = (hi.ceil() + 2.0).clamp(0.0, self.size as f64) as usize;
        (imin, imax.max(imin))
    }

    /// Make sure the samples covering `[xmin, xmax]` are read and transformed.
    ///
    /// At most `max_size` samples are kept. Returns `true` when the buffer
    /// accessor was read, `false` when the current window already covers the
    /// request.
    pub fn materialize_window(&mut self, xmin: f64, xmax: f64, max_size: usize) -> Result<bool, BufferError> {
        let (imin, mut imax) = self.index_range(xmin, xmax);
        if imax - imin > max_size.max(1) {
            imax = imin + max_size.max(1);
        }
        let current_end = self.window_start + self.window_size;
        if self.window_size > 0 && imin >= self.window_start && imax <= current_end {
            return Ok(false);
        }
        self.read_window(imin, imax - imin)?;
        Ok(true)
    }

    /// Read `count` samples starting at sample `start` of the selected row
    pub fn read_window(&mut self, start: usize, count: usize) -> Result<(), BufferError> {
        let start = start.min(self.size);
        let count = count.min(self.size - start);
        let stride = self.buffer.element_stride()?;
        let row_offset = self.row * self.buffer.header().subsize;
        let raw = match self.buffer.materialize((row_offset + start) * stride, count) {
            Ok(raw) => raw,
            Err(e) => {
                get_logger().error(
                    LogComponent::Domain("Layer"),
                    &format!("layer {} ({}) read failed: {}", self.index, self.name, e),
                );
                self.invalidate();
                return Err(e);
            }
        };
        let transformed = apply_transform(&raw, self.complex, self.mode, self.phase_units);
        self.window_start = start;
        self.window_size = count;
        self.window_xstart = self.xstart + start as f64 * self.xdelta;
        self.xbuf = match transformed.xs {
            Some(xs) => xs,
            None => (0..count).map(|i| self.window_xstart + i as f64 * self.xdelta).collect(),
        };
        self.ybuf = transformed.ys;
        Ok(())
    }

    /// Finite extents of the materialized window: `(xmin, xmax, ymin, ymax)`
    pub fn window_extents(&self) -> Option<(f64, f64, f64, f64)> {
        let mut extents: Option<(f64, f64, f64, f64)> = None;
        for (x, y) in self.xbuf.iter().zip(&self.ybuf) {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            extents = Some(match extents {
                None => (*x, *x, *y, *y),
                Some((x0, x1, y0, y1)) => (x0.min(*x), x1.max(*x), y0.min(*y), y1.max(*y)),
            });
        }
        extents
    }

    /// Highlights overlapping the materialized window, ordered by start
    pub fn sorted_highlights(&self) -> Vec<Highlight> {
        let mut sorted = self.highlights.clone();
        sorted.sort_by(|a, b| a.xstart.total_cmp(&b.xstart));
        sorted
    }
}
