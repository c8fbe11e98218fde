//! Host log forwarding.
//!
//! The core logs through `tracing`; hosts that want those records in their own
//! pipeline (browser console, OS log) implement [`LoggerSink`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Structured log record handed to a [`LoggerSink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Emitting module, e.g. `core_playback::queue`.
    pub target: String,
    pub message: String,
    /// Structured fields such as `renderer` or `property`.
    pub fields: HashMap<String, String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Forwards log records to the host logging system.
///
/// Unlike the media contracts this one is `Send + Sync`: the tracing
/// subscriber that feeds it is global.
#[async_trait::async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Records below this level are filtered before `log` is called.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Sink writing one line per record to stderr.
#[derive(Debug, Clone)]
pub struct StderrLogger {
    pub min_level: LogLevel,
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

impl StderrLogger {
    fn format(entry: &LogEntry) -> String {
        let mut line = format!(
            "[{}] {} {}: {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level.as_str(),
            entry.target,
            entry.message
        );
        let mut keys: Vec<_> = entry.fields.keys().collect();
        keys.sort();
        for key in keys {
            line.push_str(&format!(" {}={}", key, entry.fields[key]));
        }
        line
    }
}

#[async_trait::async_trait]
impl LoggerSink for StderrLogger {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            eprintln!("{}", Self::format(&entry));
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_fields_sorted_in_output() {
        let entry = LogEntry::new(LogLevel::Debug, "core_playback::queue", "dropped")
            .with_field("renderer", "youtube_iframe")
            .with_field("property", "volume");

        let line = StderrLogger::format(&entry);
        assert!(line.contains("DEBUG core_playback::queue: dropped"));
        assert!(line.ends_with("property=volume renderer=youtube_iframe"));
    }

    #[tokio::test]
    async fn test_stderr_logger_accepts_entries() {
        let logger = StderrLogger::default();
        let entry = LogEntry::new(LogLevel::Info, "test", "hello");
        logger.log(entry).await.unwrap();
        assert_eq!(logger.min_level(), LogLevel::Info);
    }
}
