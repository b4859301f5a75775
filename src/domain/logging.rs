//! Process-wide diagnostics for the plot engine.
//!
//! Domain code logs through [`get_logger`]; the browser shell installs a
//! console sink at start-up, native builds and tests fall back to a silent
//! logger unless they install a [`MemoryLogger`].

use derive_more::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum LogLevel {
    #[display(fmt = "TRACE")]
    Trace,
    #[display(fmt = "DEBUG")]
    Debug,
    #[display(fmt = " INFO")]
    Info,
    #[display(fmt = " WARN")]
    Warn,
    #[display(fmt = "ERROR")]
    Error,
}

/// Emitting subsystem, prefixed with its layer
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LogComponent {
    #[display(fmt = "DOM:{}", _0)]
    Domain(&'static str),
    #[display(fmt = "APP:{}", _0)]
    Application(&'static str),
    #[display(fmt = "INF:{}", _0)]
    Infrastructure(&'static str),
    #[display(fmt = "PRE:{}", _0)]
    Presentation(&'static str),
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: u64,
    pub level: LogLevel,
    pub component: LogComponent,
    pub message: String,
    /// Free-form `key=value` details, e.g. the layer index that failed
    pub metadata: Option<String>,
}

impl LogEntry {
    /// Entry stamped with the installed clock
    pub fn new(level: LogLevel, component: LogComponent, message: &str) -> Self {
        Self {
            timestamp: get_time_provider().current_timestamp(),
            level,
            component,
            message: message.to_owned(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: &str) -> Self {
        self.metadata = Some(metadata.to_owned());
        self
    }
}

/// Millisecond clock used to stamp entries
pub trait TimeProvider: Send + Sync {
    fn current_timestamp(&self) -> u64;
}

/// Sink for log entries; the level helpers all funnel into [`Logger::log`]
pub trait Logger: Send + Sync {
    fn log(&self, entry: LogEntry);

    fn trace(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Trace, component, message));
    }

    fn debug(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Debug, component, message));
    }

    fn info(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    fn warn(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    fn error(&self, component: LogComponent, message: &str) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    fn log_with_metadata(&self, level: LogLevel, component: LogComponent, message: &str, metadata: &str) {
        self.log(LogEntry::new(level, component, message).with_metadata(metadata));
    }
}

/// Logger that keeps every entry in memory.
///
/// Clones share the same entry list, so a handle kept after installing the
/// logger globally still sees what was logged.
#[derive(Default, Clone)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

struct SilentLogger;

impl Logger for SilentLogger {
    fn log(&self, _entry: LogEntry) {}
}

/// Sequence numbers until a wall clock is installed
struct SequenceClock(AtomicU64);

impl TimeProvider for SequenceClock {
    fn current_timestamp(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Box<dyn Logger>> = OnceLock::new();
static CLOCK: OnceLock<Box<dyn TimeProvider>> = OnceLock::new();
static FALLBACK_CLOCK: SequenceClock = SequenceClock(AtomicU64::new(0));

/// Install the process logger. Later calls are ignored.
pub fn init_logger(logger: Box<dyn Logger>) {
    let _ = LOGGER.set(logger);
}

/// Install the process clock. Later calls are ignored.
pub fn init_time_provider(clock: Box<dyn TimeProvider>) {
    let _ = CLOCK.set(clock);
}

pub fn get_logger() -> &'static dyn Logger {
    match LOGGER.get() {
        Some(logger) => logger.as_ref(),
        None => &SilentLogger,
    }
}

pub fn get_time_provider() -> &'static dyn TimeProvider {
    match CLOCK.get() {
        Some(clock) => clock.as_ref(),
        None => &FALLBACK_CLOCK,
    }
}

/// Trace-level log with `format!` arguments; compiled out of release builds
#[macro_export]
macro_rules! log_trace {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().trace($component, &format!($($arg)*));
        }
    };
}

/// Debug-level counterpart of [`log_trace!`]
#[macro_export]
macro_rules! log_debug {
    ($component:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            $crate::domain::logging::get_logger().debug($component, &format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_logger_collects_entries() {
        let logger = MemoryLogger::new();
        logger.warn(LogComponent::Domain("Stack"), "degenerate level");
        logger.info(LogComponent::Application("Plot"), "overlay");
        assert_eq!(logger.entries().len(), 2);
        assert!(logger.contains(LogLevel::Warn, "degenerate"));
        assert!(!logger.contains(LogLevel::Error, "degenerate"));
    }

    #[test]
    fn metadata_travels_with_the_entry() {
        let logger = MemoryLogger::new();
        logger.log_with_metadata(LogLevel::Warn, LogComponent::Domain("AutoScale"), "layer skipped", "layer=2");
        let entries = logger.entries();
        assert_eq!(entries[0].metadata.as_deref(), Some("layer=2"));
    }

    #[test]
    fn component_display_carries_layer_prefix() {
        assert_eq!(LogComponent::Infrastructure("Trace").to_string(), "INF:Trace");
        assert_eq!(LogLevel::Warn.to_string(), " WARN");
    }
}
