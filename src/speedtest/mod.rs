//! Ookla `speedtest` invocation and result decoding
//!
//! The CLI is run with `--selection-details --format=json-pretty` and its
//! report is decoded into typed structs. Only the fields below are required;
//! everything else in the report is ignored.
//!
//! ```text
//! {
//!   "timestamp": "2024-05-01T10:00:00Z",
//!   "ping": { "jitter": 0.41, "latency": 9.12 },
//!   "download": { "bytes": 312500000, "elapsed": 10000 },
//!   "upload": { "bytes": 31250000, "elapsed": 10000 },
//!   "interface": { "externalIp": "203.0.113.7" },
//!   "server": { "ip": "198.51.100.1" }
//! }
//! ```

use crate::error::{AppError, Result};
use crate::models::{SpeedTestResult, TestDetails};
use crate::runner::CommandRunner;
use serde::Deserialize;

/// Arguments passed to the speed test tool
pub const SPEEDTEST_ARGS: &[&str] = &["--selection-details", "--format=json-pretty"];

/// Bytes per second in one megabit per second
const BYTES_PER_SEC_PER_MBPS: f64 = 125_000.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    timestamp: String,
    ping: Ping,
    download: Transfer,
    upload: Transfer,
    interface: Interface,
    server: Server,
    #[serde(default)]
    isp: Option<String>,
    #[serde(default)]
    packet_loss: Option<f64>,
    #[serde(default)]
    result: Option<ResultLink>,
}

#[derive(Debug, Deserialize)]
struct Ping {
    latency: f64,
    jitter: f64,
}

/// Raw transfer counters: `elapsed` is in milliseconds
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transfer {
    pub bytes: u64,
    pub elapsed: u64,
}

impl Transfer {
    /// Throughput of this transfer in Mbps
    pub fn mbps(&self) -> Result<f64> {
        if self.elapsed == 0 {
            return Err(AppError::parse(
                "Failed to parse speed test results: transfer elapsed time is zero",
            ));
        }
        Ok(calculate_mbps(self.bytes, self.elapsed))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Interface {
    external_ip: String,
}

#[derive(Debug, Deserialize)]
struct Server {
    ip: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultLink {
    #[serde(default)]
    url: Option<String>,
}

/// Convert `bytes` moved in `elapsed_ms` milliseconds to megabits per second.
///
/// Computed as `(bytes / elapsed) * 1000 / 125000`; callers must ensure
/// `elapsed_ms` is non-zero.
pub fn calculate_mbps(bytes: u64, elapsed_ms: u64) -> f64 {
    let bytes_per_second = (bytes as f64 / elapsed_ms as f64) * 1000.0;
    bytes_per_second / BYTES_PER_SEC_PER_MBPS
}

/// Decode a `speedtest` JSON report
pub fn parse_report(output: &str) -> Result<SpeedTestResult> {
    let report: Report = serde_json::from_str(output)
        .map_err(|e| AppError::parse(format!("Failed to parse speed test results: {}", e)))?;

    Ok(SpeedTestResult {
        date: report.timestamp,
        source_ip: report.interface.external_ip,
        destination_ip: report.server.ip,
        download_mbps: report.download.mbps()?,
        upload_mbps: report.upload.mbps()?,
        ping_latency_ms: report.ping.latency,
        ping_jitter_ms: report.ping.jitter,
        details: TestDetails {
            isp: report.isp,
            server_name: report.server.name,
            server_location: report.server.location,
            packet_loss: report.packet_loss,
            result_url: report.result.and_then(|r| r.url),
        },
    })
}

/// Run the speed test tool once and decode its report
pub async fn run_speedtest<R>(runner: &R, command: &str) -> Result<SpeedTestResult>
where
    R: CommandRunner + ?Sized,
{
    let output = runner.run(command, SPEEDTEST_ARGS).await?;
    if !output.is_success() {
        return Err(AppError::subprocess(format!(
            "Failed to perform speed test. Make sure '{}' CLI is installed.",
            command
        )));
    }

    parse_report(&output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::stub::StubRunner;
    use crate::runner::CommandOutput;
    use proptest::prelude::*;

    const SPEEDTEST_LINE: &str = "speedtest --selection-details --format=json-pretty";

    const REPORT: &str = r#"{
        "type": "result",
        "timestamp": "2024-05-01T10:00:00Z",
        "ping": { "jitter": 0.412, "latency": 9.123, "low": 8.7, "high": 10.2 },
        "download": { "bandwidth": 31250000, "bytes": 312500000, "elapsed": 10000 },
        "upload": { "bandwidth": 3125000, "bytes": 31250000, "elapsed": 10000 },
        "packetLoss": 0,
        "isp": "Example Broadband",
        "interface": {
            "internalIp": "192.168.1.20",
            "name": "eth0",
            "isVpn": false,
            "externalIp": "203.0.113.7"
        },
        "server": {
            "id": 1234,
            "host": "speedtest.example.net",
            "port": 8080,
            "name": "Example Net",
            "location": "Amsterdam",
            "country": "Netherlands",
            "ip": "198.51.100.1"
        },
        "result": { "id": "abc", "url": "https://www.speedtest.net/result/c/abc", "persisted": true }
    }"#;

    #[test]
    fn test_calculate_mbps_reference_value() {
        assert_eq!(calculate_mbps(125_000_000, 1000), 1000.0);
        assert_eq!(calculate_mbps(312_500_000, 10_000), 250.0);
    }

    #[test]
    fn test_parse_report() {
        let result = parse_report(REPORT).unwrap();

        assert_eq!(result.date, "2024-05-01T10:00:00Z");
        assert_eq!(result.source_ip, "203.0.113.7");
        assert_eq!(result.destination_ip, "198.51.100.1");
        assert_eq!(result.download_mbps, 250.0);
        assert_eq!(result.upload_mbps, 25.0);
        assert_eq!(result.ping_latency_ms, 9.123);
        assert_eq!(result.ping_jitter_ms, 0.412);
        assert_eq!(result.details.isp.as_deref(), Some("Example Broadband"));
        assert_eq!(result.details.server_location.as_deref(), Some("Amsterdam"));
        assert_eq!(result.details.packet_loss, Some(0.0));
        assert_eq!(
            result.details.result_url.as_deref(),
            Some("https://www.speedtest.net/result/c/abc")
        );
    }

    #[test]
    fn test_parse_minimal_report() {
        let minimal = r#"{
            "timestamp": "t",
            "ping": { "jitter": 1, "latency": 2 },
            "download": { "bytes": 1000, "elapsed": 8 },
            "upload": { "bytes": 1000, "elapsed": 8 },
            "interface": { "externalIp": "2001:db8::1" },
            "server": { "ip": "2001:db8::2" }
        }"#;

        let result = parse_report(minimal).unwrap();
        assert_eq!(result.ping_latency_ms, 2.0);
        assert_eq!(result.destination_ip, "2001:db8::2");
        assert_eq!(result.details, TestDetails::default());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_report("Speedtest by Ookla\n\nServer: ...").unwrap_err();
        assert_eq!(err.category(), "PARSE");
        assert!(err.to_string().starts_with("Failed to parse speed test results"));
    }

    #[test]
    fn test_parse_missing_required_field() {
        let no_server = REPORT.replace("\"ip\": \"198.51.100.1\"", "\"hostIp\": \"198.51.100.1\"");
        let err = parse_report(&no_server).unwrap_err();
        assert_eq!(err.category(), "PARSE");
    }

    #[test]
    fn test_parse_zero_elapsed() {
        let zero = REPORT.replace("\"bytes\": 31250000, \"elapsed\": 10000", "\"bytes\": 31250000, \"elapsed\": 0");
        let err = parse_report(&zero).unwrap_err();
        assert_eq!(err.category(), "PARSE");
        assert!(err.to_string().contains("elapsed"));
    }

    #[tokio::test]
    async fn test_run_speedtest_invokes_tool() {
        let runner = StubRunner::new().respond(SPEEDTEST_LINE, CommandOutput::success(REPORT));

        let result = run_speedtest(&runner, "speedtest").await.unwrap();
        assert_eq!(result.download_mbps, 250.0);
        assert_eq!(runner.calls(), vec![SPEEDTEST_LINE.to_string()]);
    }

    #[tokio::test]
    async fn test_run_speedtest_nonzero_exit() {
        let runner = StubRunner::new().respond(
            SPEEDTEST_LINE,
            CommandOutput::failure(2, "Limit reached: too many requests"),
        );

        let err = run_speedtest(&runner, "speedtest").await.unwrap_err();
        assert_eq!(
            err,
            AppError::subprocess(
                "Failed to perform speed test. Make sure 'speedtest' CLI is installed."
            )
        );
    }

    proptest! {
        #[test]
        fn prop_mbps_increases_with_bytes(
            bytes in 0u64..1_000_000_000_000,
            extra in 1u64..1_000_000_000,
            elapsed in 1u64..10_000_000,
        ) {
            prop_assert!(calculate_mbps(bytes + extra, elapsed) >= calculate_mbps(bytes, elapsed));
        }

        #[test]
        fn prop_mbps_decreases_with_elapsed(
            bytes in 0u64..1_000_000_000_000,
            elapsed in 1u64..10_000_000,
            extra in 1u64..10_000_000,
        ) {
            prop_assert!(calculate_mbps(bytes, elapsed + extra) <= calculate_mbps(bytes, elapsed));
        }

        #[test]
        fn prop_mbps_is_finite_and_non_negative(
            bytes in any::<u32>(),
            elapsed in 1u64..u32::MAX as u64,
        ) {
            let mbps = calculate_mbps(bytes as u64, elapsed);
            prop_assert!(mbps.is_finite());
            prop_assert!(mbps >= 0.0);
        }
    }
}
