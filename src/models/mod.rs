//! Data models for speedtest-asn

pub mod record;

// Re-export main model types
pub use record::{SpeedTestRecord, SpeedTestResult, TestDetails};
