//! speedtest-asn
//!
//! Runs the Ookla `speedtest` CLI, resolves the origin ASN of both the local
//! public address and the test server through Team Cymru's DNS service
//! (queried with `dig`), and emits the combined measurement as one CSV row.

pub mod app;
pub mod asn;
pub mod cli;
pub mod deps;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod runner;
pub mod speedtest;

// Re-export commonly used types
pub use app::App;
pub use asn::{AsNumber, AsnResolver};
pub use error::{AppError, Result};
pub use models::{SpeedTestRecord, SpeedTestResult};
pub use output::{CsvFormatter, OutputFormatter};
pub use runner::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use speedtest::calculate_mbps;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata exported by build.rs
pub mod build_info {
    pub const BUILD_TIME: &str = env!("BUILD_TIME");
    pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");
    pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");
}

/// Names of the external tools
pub mod defaults {
    /// DNS lookup utility used for the Cymru TXT queries
    pub const DIG_COMMAND: &str = "dig";
    /// Ookla speed test CLI
    pub const SPEEDTEST_COMMAND: &str = "speedtest";
}
