//! Main application orchestration and execution

use crate::{
    asn::AsnResolver,
    defaults,
    deps::{check_dependencies, Dependency, REQUIRED_DEPENDENCIES},
    error::Result,
    logging::Logger,
    models::SpeedTestRecord,
    output::{write_record, CsvFormatter},
    runner::CommandRunner,
    speedtest::run_speedtest,
};
use std::io::Write;

/// Runs the measurement pipeline once.
///
/// Steps run strictly in order: dependency check, speed test, source ASN,
/// destination ASN, output. The first error ends the run.
pub struct App<R: CommandRunner> {
    runner: R,
    logger: Logger,
    dependencies: &'static [Dependency],
}

impl<R: CommandRunner> App<R> {
    /// Create a new application instance
    pub fn new(runner: R, logger: Logger) -> Self {
        Self {
            runner,
            logger,
            dependencies: REQUIRED_DEPENDENCIES,
        }
    }

    /// Collect a complete record without writing it
    pub async fn measure(&self) -> Result<SpeedTestRecord> {
        check_dependencies(&self.runner, self.dependencies)?;
        crate::log_debug!(self.logger, "All required tools found on PATH");

        crate::log_info!(self.logger, "Running speed test");
        let result = run_speedtest(&self.runner, defaults::SPEEDTEST_COMMAND).await?;
        self.logger
            .info("Speed test finished")
            .field("download_mbps", result.download_mbps)
            .field("upload_mbps", result.upload_mbps)
            .field("latency_ms", result.ping_latency_ms)
            .field("isp", &result.details.isp)
            .field("server", &result.details.server_name)
            .field("server_location", &result.details.server_location)
            .field("packet_loss", result.details.packet_loss)
            .field("result_url", &result.details.result_url)
            .log()
            .await;

        let resolver = AsnResolver::new(&self.runner, defaults::DIG_COMMAND);
        let source_asn = resolver.resolve(&result.source_ip).await?;
        self.logger
            .debug("Resolved source ASN")
            .field("ip", &result.source_ip)
            .field("asn", source_asn)
            .log()
            .await;

        let destination_asn = resolver.resolve(&result.destination_ip).await?;
        self.logger
            .debug("Resolved destination ASN")
            .field("ip", &result.destination_ip)
            .field("asn", destination_asn)
            .log()
            .await;

        Ok(SpeedTestRecord::new(result, source_asn, destination_asn))
    }

    /// Measure and write the CSV row to `out`
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<SpeedTestRecord> {
        let record = match self.measure().await {
            Ok(record) => record,
            Err(e) => {
                self.logger.debug("Run failed").error_info(&e).log().await;
                return Err(e);
            }
        };

        write_record(out, &CsvFormatter::new(), &record)?;
        self.logger.debug("Record written").field("record", &record).log().await;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::runner::stub::StubRunner;
    use crate::runner::CommandOutput;

    const SPEEDTEST_LINE: &str = "speedtest --selection-details --format=json-pretty";
    const SOURCE_QUERY: &str = "dig +short 7.113.0.203.origin.asn.cymru.com. TXT";
    const DESTINATION_QUERY: &str = "dig +short 8.8.8.8.origin.asn.cymru.com. TXT";

    const REPORT: &str = r#"{
        "timestamp": "2024-05-01T10:00:00Z",
        "ping": { "jitter": 0.5, "latency": 12.25 },
        "download": { "bytes": 125000000, "elapsed": 1000 },
        "upload": { "bytes": 12500000, "elapsed": 1000 },
        "interface": { "externalIp": "203.0.113.7" },
        "server": { "ip": "8.8.8.8", "name": "Example" }
    }"#;

    fn installed_runner() -> StubRunner {
        StubRunner::new().installed("dig").installed("speedtest")
    }

    fn app(runner: StubRunner) -> App<StubRunner> {
        App::new(runner, Logger::new("TEST"))
    }

    #[tokio::test]
    async fn test_full_run_writes_one_row() {
        let runner = installed_runner()
            .respond(SPEEDTEST_LINE, CommandOutput::success(REPORT))
            .respond(
                SOURCE_QUERY,
                CommandOutput::success("\"64500 | 203.0.113.0/24 | ZZ | arin | 2010-01-01\"\n"),
            )
            .respond(
                DESTINATION_QUERY,
                CommandOutput::success("\"15169 | 8.8.8.0/24 | US | arin | ...\"\n"),
            );
        let app = app(runner);

        let mut out = Vec::new();
        let record = app.run(&mut out).await.unwrap();

        assert_eq!(record.source_asn, 64500);
        assert_eq!(record.destination_asn, 15169);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2024-05-01T10:00:00Z,203.0.113.7,8.8.8.8,64500,15169,1000.0,100.0,12.25,0.5\r\n"
        );
        assert_eq!(
            app.runner.calls(),
            vec![SPEEDTEST_LINE, SOURCE_QUERY, DESTINATION_QUERY]
        );
    }

    #[tokio::test]
    async fn test_missing_tools_stop_before_any_command() {
        let app = app(StubRunner::new().installed("speedtest"));

        let mut out = Vec::new();
        let err = app.run(&mut out).await.unwrap_err();

        assert_eq!(err, AppError::missing_dependency("Missing `dig`"));
        assert!(out.is_empty());
        assert!(app.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_speedtest_failure_skips_lookups() {
        let app = app(
            installed_runner().respond(SPEEDTEST_LINE, CommandOutput::failure(1, "no servers")),
        );

        let mut out = Vec::new();
        let err = app.run(&mut out).await.unwrap_err();

        assert_eq!(err.category(), "SUBPROCESS");
        assert!(out.is_empty());
        assert_eq!(app.runner.calls(), vec![SPEEDTEST_LINE]);
    }

    #[tokio::test]
    async fn test_destination_lookup_failure_writes_nothing() {
        let app = app(
            installed_runner()
                .respond(SPEEDTEST_LINE, CommandOutput::success(REPORT))
                .respond(
                    SOURCE_QUERY,
                    CommandOutput::success("\"64500 | 203.0.113.0/24 | ZZ | arin |\"\n"),
                )
                .respond(DESTINATION_QUERY, CommandOutput::success("\"garbage\"\n")),
        );

        let mut out = Vec::new();
        let err = app.run(&mut out).await.unwrap_err();

        assert_eq!(err, AppError::parse("Invalid ASN data format for IP: 8.8.8.8"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_reported_ip() {
        let report = REPORT.replace("203.0.113.7", "999.999.999.999");
        let app = app(installed_runner().respond(SPEEDTEST_LINE, CommandOutput::success(report)));

        let mut out = Vec::new();
        let err = app.run(&mut out).await.unwrap_err();

        assert_eq!(err.category(), "INPUT");
        assert_eq!(app.runner.calls(), vec![SPEEDTEST_LINE]);
    }
}
