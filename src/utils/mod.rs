//! Shared utilities

pub mod logging;

pub use self::logging::{LogEntry, LogLevel, LogSink, MemorySink, TracingSink};
