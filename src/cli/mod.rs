//! Command-line interface

use crate::error::AppError;
use crate::logging::{LogFormat, LogLevel, LogSettings};
use clap::error::ErrorKind;
use clap::Parser;

/// Run an Ookla speed test and print one CSV row:
/// date, source IP, destination IP, source ASN, destination ASN,
/// download Mbps, upload Mbps, ping latency ms, ping jitter ms.
///
/// Requires `dig` and `speedtest` (https://www.speedtest.net/apps/cli) on PATH.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "speedtest-asn")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log progress to stderr
    #[arg(long)]
    pub verbose: bool,

    /// Log debug details to stderr (implies --verbose)
    #[arg(long)]
    pub debug: bool,

    /// Format of diagnostic log lines
    #[arg(long, value_enum, default_value_t = LogFormat::Console)]
    pub log_format: LogFormat,

    /// Disable colored diagnostics
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Minimum log level implied by the verbosity switches
    pub fn log_level(&self) -> LogLevel {
        if self.debug {
            LogLevel::Debug
        } else if self.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }

    /// Logger settings for this invocation
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level(),
            format: self.log_format,
            use_color: self.use_colors() && self.log_format != LogFormat::Json,
            include_location: self.debug,
        }
    }
}

/// Map a clap parse failure to an application error.
///
/// Returns `None` for `--help` and `--version`, which clap prints itself.
pub fn usage_error(error: &clap::Error) -> Option<AppError> {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => {
            let rendered = error.to_string();
            let first_line = rendered.lines().next().unwrap_or_default();
            let message = first_line.strip_prefix("error: ").unwrap_or(first_line);
            Some(AppError::invalid_input(message))
        }
    }
}

/// Color is only used when stderr is a terminal
fn supports_color() -> bool {
    use std::io::IsTerminal;

    std::io::stderr().is_terminal()
}
