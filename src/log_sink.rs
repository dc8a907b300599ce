//! Narrow logging interface towards the host application.
//!
//! The engine reports grip and release events, collision state changes, script
//! load/run/stop events and script errors through a [`LogSink`]. It never reads them back.

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

pub trait LogSink: Send + Sync {
    fn add_log(&self, message: &str, level: LogLevel);
}

/// Forwards everything to `tracing`. This is the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn add_log(&self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Info => tracing::info!(target: "arm", "{}", message),
            LogLevel::Warning => tracing::warn!(target: "arm", "{}", message),
            LogLevel::Error => tracing::error!(target: "arm", "{}", message),
        }
    }
}

/// Keeps the entries in memory, for a log window or for tests. Also forwards to `tracing`.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.entries().iter().any(|(_, m)| m.contains(fragment))
    }

    pub fn clear(&self) {
        match self.entries.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl LogSink for MemorySink {
    fn add_log(&self, message: &str, level: LogLevel) {
        TracingSink.add_log(message, level);
        match self.entries.lock() {
            Ok(mut entries) => entries.push((level, message.to_string())),
            Err(poisoned) => poisoned.into_inner().push((level, message.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::new();
        sink.add_log("script loaded", LogLevel::Info);
        sink.add_log("line 3: boom", LogLevel::Error);
        assert_eq!(sink.count(LogLevel::Info), 1);
        assert_eq!(sink.count(LogLevel::Error), 1);
        assert!(sink.contains("boom"));
        sink.clear();
        assert!(sink.entries().is_empty());
    }
}
