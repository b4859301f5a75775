//! Buffer accessors: typed sample storage a layer reads windows from.
//!
//! Element formats use the two-character bluefile codes, mode (`S`calar or
//! `C`omplex) followed by type (`B` i8, `I` i16, `L` i32, `X` i64, `F` f32,
//! `D` f64).

use crate::domain::errors::BufferError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
pub enum ElementMode {
    #[strum(serialize = "S")]
    Scalar,
    #[strum(serialize = "C")]
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr)]
pub enum ElementType {
    #[strum(serialize = "B")]
    Int8,
    #[strum(serialize = "I")]
    Int16,
    #[strum(serialize = "L")]
    Int32,
    #[strum(serialize = "X")]
    Int64,
    #[strum(serialize = "F")]
    Float32,
    #[strum(serialize = "D")]
    Float64,
}

impl ElementType {
    pub fn byte_size(self) -> usize {
        match self {
            ElementType::Int8 => 1,
            ElementType::Int16 => 2,
            ElementType::Int32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::Float64 => 8,
        }
    }
}

/// Parsed element format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementFormat {
    pub mode: ElementMode,
    pub kind: ElementType,
}

impl ElementFormat {
    pub const SCALAR_F32: ElementFormat =
        ElementFormat { mode: ElementMode::Scalar, kind: ElementType::Float32 };
    pub const SCALAR_F64: ElementFormat =
        ElementFormat { mode: ElementMode::Scalar, kind: ElementType::Float64 };
    pub const COMPLEX_F32: ElementFormat =
        ElementFormat { mode: ElementMode::Complex, kind: ElementType::Float32 };
    pub const COMPLEX_F64: ElementFormat =
        ElementFormat { mode: ElementMode::Complex, kind: ElementType::Float64 };

    pub fn is_complex(&self) -> bool {
        self.mode == ElementMode::Complex
    }

    /// Values per sample: 2 for complex, 1 otherwise
    pub fn values_per_sample(&self) -> usize {
        if self.is_complex() { 2 } else { 1 }
    }

    /// Bytes per sample
    pub fn stride(&self) -> usize {
        self.kind.byte_size() * self.values_per_sample()
    }

    pub fn code(&self) -> String {
        let (mode, kind): (&str, &str) = (self.mode.as_ref(), self.kind.as_ref());
        format!("{}{}", mode, kind)
    }

    fn decode(&self, bytes: &[u8], big_endian: bool) -> Vec<f64> {
        macro_rules! decode_as {
            ($ty:ty) => {
                bytes
                    .chunks_exact(std::mem::size_of::<$ty>())
                    .map(|chunk| {
                        let mut raw = [0u8; std::mem::size_of::<$ty>()];
                        raw.copy_from_slice(chunk);
                        if big_endian {
                            <$ty>::from_be_bytes(raw) as f64
                        } else {
                            <$ty>::from_le_bytes(raw) as f64
                        }
                    })
                    .collect()
            };
        }
        match self.kind {
            ElementType::Int8 => bytes.iter().map(|b| *b as i8 as f64).collect(),
            ElementType::Int16 => decode_as!(i16),
            ElementType::Int32 => decode_as!(i32),
            ElementType::Int64 => decode_as!(i64),
            ElementType::Float32 => decode_as!(f32),
            ElementType::Float64 => decode_as!(f64),
        }
    }
}

impl FromStr for ElementFormat {
    type Err = BufferError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let unknown = || BufferError::UnknownFormat(code.to_string());
        let mut chars = code.trim().chars();
        let (Some(mode), Some(kind), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(unknown());
        };
        let mode = ElementMode::from_str(&mode.to_ascii_uppercase().to_string()).map_err(|_| unknown())?;
        let kind = ElementType::from_str(&kind.to_ascii_uppercase().to_string()).map_err(|_| unknown())?;
        Ok(ElementFormat { mode, kind })
    }
}

/// Metadata describing a buffer's samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferHeader {
    /// Two-character element format code, validated on read
    pub format: String,
    pub xstart: f64,
    pub xdelta: f64,
    /// Samples per row; 0 for one-dimensional data
    #[serde(default)]
    pub subsize: usize,
    #[serde(default)]
    pub big_endian: bool,
    #[serde(default)]
    pub name: String,
}

impl BufferHeader {
    pub fn new(format: ElementFormat, xstart: f64, xdelta: f64) -> Self {
        Self { format: format.code(), xstart, xdelta, subsize: 0, big_endian: false, name: String::new() }
    }

    pub fn element_format(&self) -> Result<ElementFormat, BufferError> {
        self.format.parse()
    }

    /// Apply the fields present in `update`. The format is checked before
    /// anything changes.
    pub fn merge(&mut self, update: &HeaderOverride) -> Result<(), BufferError> {
        if let Some(format) = &update.format {
            format.parse::<ElementFormat>()?;
            self.format = format.clone();
        }
        if let Some(xstart) = update.xstart {
            self.xstart = xstart;
        }
        if let Some(xdelta) = update.xdelta {
            self.xdelta = xdelta;
        }
        if let Some(subsize) = update.subsize {
            self.subsize = subsize;
        }
        Ok(())
    }
}

/// Partial header update, e.g. `{ "xstart": 1.0e8, "xdelta": 30.5 }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xstart: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xdelta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsize: Option<usize>,
}

impl HeaderOverride {
    pub fn is_empty(&self) -> bool {
        self.xstart.is_none() && self.xdelta.is_none() && self.format.is_none() && self.subsize.is_none()
    }
}

/// Source of samples for one or more layers
pub trait BufferAccessor {
    fn header(&self) -> &BufferHeader;

    fn byte_length(&self) -> usize;

    /// Bytes per sample
    fn element_stride(&self) -> Result<usize, BufferError> {
        Ok(self.header().element_format()?.stride())
    }

    fn is_complex(&self) -> bool {
        self.header().element_format().map(|f| f.is_complex()).unwrap_or(false)
    }

    /// Total number of samples
    fn len(&self) -> usize {
        self.element_stride().map(|stride| self.byte_length() / stride).unwrap_or(0)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows: 1 for one-dimensional buffers
    fn rows(&self) -> usize {
        match self.header().subsize {
            0 => 1,
            subsize => self.len() / subsize,
        }
    }

    /// Samples per row
    fn row_length(&self) -> usize {
        match self.header().subsize {
            0 => self.len(),
            subsize => subsize.min(self.len()),
        }
    }

    /// Copy `count` samples starting at `byte_offset` as f64 values
    /// (interleaved re/im for complex formats).
    fn materialize(&self, byte_offset: usize, count: usize) -> Result<Vec<f64>, BufferError>;
}

/// In-memory accessor over raw bytes
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    header: BufferHeader,
    bytes: Vec<u8>,
}

impl SampleBuffer {
    /// Wrap raw bytes. The format is checked and the byte count must be a
    /// whole number of samples.
    pub fn new(header: BufferHeader, bytes: Vec<u8>) -> Result<Self, BufferError> {
        let stride = header.element_format()?.stride();
        if bytes.len() % stride != 0 {
            return Err(BufferError::Truncated {
                expected: bytes.len() / stride * stride + stride,
                actual: bytes.len(),
            });
        }
        Ok(Self { header, bytes })
    }

    /// Accessor that keeps the header unvalidated; reads report the format error
    pub fn unchecked(header: BufferHeader, bytes: Vec<u8>) -> Self {
        Self { header, bytes }
    }

    pub fn from_f64(values: &[f64], xstart: f64, xdelta: f64) -> Self {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self { header: BufferHeader::new(ElementFormat::SCALAR_F64, xstart, xdelta), bytes }
    }

    pub fn from_f32(values: &[f32], xstart: f64, xdelta: f64) -> Self {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self { header: BufferHeader::new(ElementFormat::SCALAR_F32, xstart, xdelta), bytes }
    }

    /// Complex double samples from `(re, im)` pairs
    pub fn from_complex(pairs: &[(f64, f64)], xstart: f64, xdelta: f64) -> Self {
        let bytes = pairs
            .iter()
            .flat_map(|(re, im)| re.to_le_bytes().into_iter().chain(im.to_le_bytes()))
            .collect();
        Self { header: BufferHeader::new(ElementFormat::COMPLEX_F64, xstart, xdelta), bytes }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.header.name = name.to_string();
        self
    }

    pub fn with_subsize(mut self, subsize: usize) -> Self {
        self.header.subsize = subsize;
        self
    }

    pub fn header_mut(&mut self) -> &mut BufferHeader {
        &mut self.header
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl BufferAccessor for SampleBuffer {
    fn header(&self) -> &BufferHeader {
        &self.header
    }

    fn byte_length(&self) -> usize {
        self.bytes.len()
    }

    fn materialize(&self, byte_offset: usize, count: usize) -> Result<Vec<f64>, BufferError> {
        let format = self.header.element_format()?;
        let end = count
            .checked_mul(format.stride())
            .and_then(|n| n.checked_add(byte_offset))
            .filter(|end| *end <= self.bytes.len())
            .ok_or(BufferError::OutOfRange { offset: byte_offset, count, len: self.bytes.len() })?;
        Ok(format.decode(&self.bytes[byte_offset..end], self.header.big_endian))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_codes() {
        let format: ElementFormat = "CF".parse().unwrap();
        assert_eq!(format, ElementFormat::COMPLEX_F32);
        assert_eq!(format.stride(), 8);
        assert_eq!("sb".parse::<ElementFormat>().unwrap().stride(), 1);
        assert_eq!("QZ".parse::<ElementFormat>(), Err(BufferError::UnknownFormat("QZ".into())));
        assert!("SDX".parse::<ElementFormat>().is_err());
    }

    #[test]
    fn reads_window_of_samples() {
        let buffer = SampleBuffer::from_f64(&[1.0, 2.0, 3.0, 4.0], 0.0, 1.0);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.materialize(8, 2).unwrap(), vec![2.0, 3.0]);
        assert!(matches!(buffer.materialize(16, 3), Err(BufferError::OutOfRange { .. })));
    }

    #[test]
    fn big_endian_integers() {
        let mut header = BufferHeader::new("SI".parse().unwrap(), 0.0, 1.0);
        header.big_endian = true;
        let buffer = SampleBuffer::new(header, vec![0x01, 0x00, 0xFF, 0xFE]).unwrap();
        assert_eq!(buffer.materialize(0, 2).unwrap(), vec![256.0, -2.0]);
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        let header = BufferHeader::new(ElementFormat::SCALAR_F32, 0.0, 1.0);
        assert!(matches!(SampleBuffer::new(header, vec![0; 6]), Err(BufferError::Truncated { .. })));
    }

    #[test]
    fn two_dimensional_rows() {
        let buffer = SampleBuffer::from_f64(&[0.0; 12], 0.0, 1.0).with_subsize(4);
        assert_eq!(buffer.rows(), 3);
        assert_eq!(buffer.row_length(), 4);
    }
}
