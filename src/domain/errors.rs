//! Error taxonomy for the plot core.
//!
//! Per-layer problems (bad formats, out-of-range reads) are reported and the
//! layer is skipped; only construction-time `FatalError`s stop the plot.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Root error type
#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    Configuration(ConfigurationError),
    Validation(ValidationError),
    Fatal(FatalError),
    Buffer(BufferError),
    Stream(StreamError),
}

/// Errors raised while reading samples out of a buffer accessor
#[derive(Debug, Clone, PartialEq)]
pub enum BufferError {
    UnknownFormat(String),
    OutOfRange { offset: usize, count: usize, len: usize },
    Truncated { expected: usize, actual: usize },
}

/// Bad configuration, rejected requests and malformed overrides
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    UnknownFormat(String),
    InvalidZoom(String),
    MalformedOverride(String),
    NoSuchLayer(usize),
    InvalidOrigin(i32),
}

/// User-entered values that failed a prompt validator
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Empty,
    NotAFloat(String),
    NotAnInteger(String),
    OutOfBounds { value: i64, max: i64 },
}

/// Conditions that prevent a plot from being constructed at all
#[derive(Debug, Clone, PartialEq)]
pub enum FatalError {
    CanvasUnsupported,
    CanvasNotFound(String),
    ZeroSizedContainer { width: u32, height: u32 },
}

/// Streaming collaborator errors
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    ConnectionFailed(String),
    MalformedFrame { len: usize, element_size: usize },
    MalformedHeader(String),
}

pub type PlotResult<T> = Result<T, PlotError>;

impl Display for PlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PlotError::Configuration(e) => write!(f, "Configuration Error: {}", e),
            PlotError::Validation(e) => write!(f, "Validation Error: {}", e),
            PlotError::Fatal(e) => write!(f, "Fatal Error: {}", e),
            PlotError::Buffer(e) => write!(f, "Buffer Error: {}", e),
            PlotError::Stream(e) => write!(f, "Stream Error: {}", e),
        }
    }
}

impl Display for BufferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BufferError::UnknownFormat(code) => write!(f, "unknown element format '{}'", code),
            BufferError::OutOfRange { offset, count, len } => {
                write!(f, "read of {} elements at byte {} exceeds buffer of {} bytes", count, offset, len)
            }
            BufferError::Truncated { expected, actual } => {
                write!(f, "expected {} bytes, buffer holds {}", expected, actual)
            }
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConfigurationError::UnknownFormat(code) => write!(f, "unknown format '{}'", code),
            ConfigurationError::InvalidZoom(msg) => write!(f, "invalid zoom: {}", msg),
            ConfigurationError::MalformedOverride(msg) => write!(f, "malformed override: {}", msg),
            ConfigurationError::NoSuchLayer(index) => write!(f, "no layer at index {}", index),
            ConfigurationError::InvalidOrigin(code) => write!(f, "origin {} is not in 1..=4", code),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ValidationError::Empty => write!(f, "a value is required"),
            ValidationError::NotAFloat(input) => write!(f, "'{}' is not a number", input),
            ValidationError::NotAnInteger(input) => write!(f, "'{}' is not an integer", input),
            ValidationError::OutOfBounds { value, max } => {
                write!(f, "{} exceeds the maximum of {}", value, max)
            }
        }
    }
}

impl Display for FatalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FatalError::CanvasUnsupported => write!(f, "2D canvas is not supported"),
            FatalError::CanvasNotFound(id) => write!(f, "canvas '{}' not found", id),
            FatalError::ZeroSizedContainer { width, height } => {
                write!(f, "plot container has zero size ({}x{})", width, height)
            }
        }
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StreamError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            StreamError::MalformedFrame { len, element_size } => {
                write!(f, "frame of {} bytes is not a multiple of {}", len, element_size)
            }
            StreamError::MalformedHeader(msg) => write!(f, "malformed header: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {}
impl std::error::Error for BufferError {}
impl std::error::Error for ConfigurationError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for FatalError {}
impl std::error::Error for StreamError {}

impl From<ConfigurationError> for PlotError {
    fn from(error: ConfigurationError) -> Self {
        PlotError::Configuration(error)
    }
}

impl From<ValidationError> for PlotError {
    fn from(error: ValidationError) -> Self {
        PlotError::Validation(error)
    }
}

impl From<FatalError> for PlotError {
    fn from(error: FatalError) -> Self {
        PlotError::Fatal(error)
    }
}

impl From<BufferError> for PlotError {
    fn from(error: BufferError) -> Self {
        match error {
            BufferError::UnknownFormat(code) => {
                PlotError::Configuration(ConfigurationError::UnknownFormat(code))
            }
            other => PlotError::Buffer(other),
        }
    }
}

impl From<StreamError> for PlotError {
    fn from(error: StreamError) -> Self {
        PlotError::Stream(error)
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(error: serde_json::Error) -> Self {
        ConfigurationError::MalformedOverride(error.to_string())
    }
}
