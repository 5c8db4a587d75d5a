//! Speed test result and final record models

use serde::{Deserialize, Serialize};

/// Values extracted from one `speedtest` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestResult {
    /// Timestamp reported by the speed test tool, passed through verbatim
    pub date: String,
    /// Public address of the local interface
    pub source_ip: String,
    /// Address of the selected test server
    pub destination_ip: String,
    /// Download throughput in megabits per second
    pub download_mbps: f64,
    /// Upload throughput in megabits per second
    pub upload_mbps: f64,
    /// Idle ping latency in milliseconds
    pub ping_latency_ms: f64,
    /// Idle ping jitter in milliseconds
    pub ping_jitter_ms: f64,
    /// Extra details used only for diagnostics
    #[serde(default)]
    pub details: TestDetails,
}

/// Optional context reported by `speedtest`, never part of the CSV row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestDetails {
    pub isp: Option<String>,
    pub server_name: Option<String>,
    pub server_location: Option<String>,
    pub packet_loss: Option<f64>,
    pub result_url: Option<String>,
}

/// The combined record written as one CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestRecord {
    pub date: String,
    pub source_ip: String,
    pub destination_ip: String,
    pub source_asn: u32,
    pub destination_asn: u32,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_latency_ms: f64,
    pub ping_jitter_ms: f64,
}

impl SpeedTestRecord {
    /// Combine a speed test result with the resolved ASNs of both endpoints
    pub fn new(result: SpeedTestResult, source_asn: u32, destination_asn: u32) -> Self {
        Self {
            date: result.date,
            source_ip: result.source_ip,
            destination_ip: result.destination_ip,
            source_asn,
            destination_asn,
            download_mbps: result.download_mbps,
            upload_mbps: result.upload_mbps,
            ping_latency_ms: result.ping_latency_ms,
            ping_jitter_ms: result.ping_jitter_ms,
        }
    }
}
