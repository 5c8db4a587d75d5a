//! Single-row CSV rendering

use super::OutputFormatter;
use crate::error::{AppError, Result};
use crate::models::SpeedTestRecord;

/// Renders a record as one CRLF-terminated line without a header
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_record(&self, record: &SpeedTestRecord) -> Result<String> {
        let fields = [
            record.date.clone(),
            record.source_ip.clone(),
            record.destination_ip.clone(),
            record.source_asn.to_string(),
            record.destination_asn.to_string(),
            format_float(record.download_mbps),
            format_float(record.upload_mbps),
            format_float(record.ping_latency_ms),
            format_float(record.ping_jitter_ms),
        ];

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        writer
            .write_record(&fields)
            .map_err(|e| AppError::io(format!("Failed to encode CSV row: {}", e)))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::io(format!("Failed to encode CSV row: {}", e)))?;

        String::from_utf8(bytes)
            .map_err(|e| AppError::io(format!("Failed to encode CSV row: {}", e)))
    }
}

/// Shortest round-trip decimal in the `repr` style: integral values keep
/// `.0`, and exponents below -4 or from 16 up use `e-05`/`e+16` notation.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let scientific = format!("{:e}", value);
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return scientific;
    }

    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
