//! Error handling for speedtest-asn

use thiserror::Error;

/// Every failure the pipeline can hit.
///
/// All variants are fatal: the run stops at the first error, nothing is
/// written to stdout and the process exits with status 1. The `Display`
/// output is the bare message so the binary can print `Error: <message>`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// One or more required external tools are not on the search path
    #[error("{0}")]
    MissingDependency(String),

    /// An external tool ran but exited with a non-zero status
    #[error("{0}")]
    SubprocessFailure(String),

    /// Tool output could not be interpreted (bad JSON, malformed TXT data)
    #[error("{0}")]
    Parse(String),

    /// Caller supplied a value that is not acceptable (e.g. not an IP literal)
    #[error("{0}")]
    InvalidInput(String),

    /// I/O errors (spawning a tool, writing the result)
    #[error("{0}")]
    Io(String),
}

impl AppError {
    /// Create a new missing dependency error
    pub fn missing_dependency<S: Into<String>>(message: S) -> Self {
        Self::MissingDependency(message.into())
    }

    /// Create a new subprocess failure error
    pub fn subprocess<S: Into<String>>(message: S) -> Self {
        Self::SubprocessFailure(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingDependency(_) => "DEPENDENCY",
            Self::SubprocessFailure(_) => "SUBPROCESS",
            Self::Parse(_) => "PARSE",
            Self::InvalidInput(_) => "INPUT",
            Self::Io(_) => "IO",
        }
    }

    /// Get exit code for this error type.
    ///
    /// The contract with callers (cron jobs, shell loops) is a plain 0/1,
    /// so every kind maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingDependency(_)
            | Self::SubprocessFailure(_)
            | Self::Parse(_)
            | Self::InvalidInput(_)
            | Self::Io(_) => 1,
        }
    }

    /// Format error for console display
    pub fn format_for_console(&self, use_color: bool) -> String {
        let message = format!("Error: {}", self);

        if use_color {
            use colored::Colorize;
            message.red().to_string()
        } else {
            message
        }
    }
}

// Only I/O errors convert implicitly.
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
