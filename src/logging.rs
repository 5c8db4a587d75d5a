//! Structured diagnostics logging
//!
//! This module provides the logging used while a measurement runs:
//! - Leveled logging with console, compact and JSON line formats
//! - A per-run session ID attached to every entry
//! - Structured key/value fields and source locations
//!
//! Every entry is written to stderr. Stdout is reserved for the CSV row.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Step-by-step details: ASN answers, build info, the written record
    Debug = 0,
    /// Progress of the run (`--verbose`)
    Info = 1,
    /// Default threshold; keeps stderr quiet on a normal run
    Warn = 2,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
        }
    }

    fn colorize(&self, text: &str) -> String {
        match self {
            LogLevel::Debug => text.cyan().to_string(),
            LogLevel::Info => text.green().to_string(),
            LogLevel::Warn => text.yellow().to_string(),
        }
    }
}

/// Log output format, selected with `--log-format`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console format
    #[default]
    Console,
    /// Compact single-line format
    Compact,
    /// One JSON object per line
    Json,
}

/// Logger settings derived from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub use_color: bool,
    pub include_location: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::default(),
            use_color: false,
            include_location: false,
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Additional structured fields
    pub fields: BTreeMap<String, serde_json::Value>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    /// Source file name
    pub file: String,
    /// Line number
    pub line: u32,
    /// Module path
    pub module: Option<String>,
}

/// Shared logging context for session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
}

/// Logger implementation with multiple output formats
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger with default settings
    pub fn new(name: &str) -> Self {
        Self::with_settings(name, &LogSettings::default())
    }

    /// Create a logger with specific settings
    pub fn with_settings(name: &str, settings: &LogSettings) -> Self {
        Self {
            min_level: settings.level,
            use_color: settings.use_color,
            include_location: settings.include_location,
            format: settings.format,
            name: name.to_string(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger for the current run with a fresh session ID
    pub async fn for_session(name: &str, settings: &LogSettings) -> Self {
        let logger = Self::with_settings(name, settings);
        logger.set_session_id(Uuid::new_v4().to_string()).await;
        logger
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Current session ID, if one was assigned
    pub async fn session_id(&self) -> Option<String> {
        self.context.read().await.session_id.clone()
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        if let Some(session_id) = self.session_id().await {
            entry
                .fields
                .insert("session_id".to_string(), serde_json::Value::String(session_id));
        }

        let output = self.render(&entry);
        let _ = writeln!(io::stderr().lock(), "{}", output);
    }

    /// Render an entry in the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = format!("{:>5}", entry.level.as_str());
        let formatted_level = if self.use_color {
            entry.level.colorize(&level_str)
        } else {
            level_str
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        let fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "session_id")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !fields.is_empty() {
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!(
                "{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}",
                entry.message
            ),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!(
            "{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add location information
    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Finished entry, without writing it
    pub fn build(self) -> LogEntry {
        self.entry
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
