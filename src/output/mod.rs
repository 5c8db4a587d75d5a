//! Result output
//!
//! The final record is rendered by an [`OutputFormatter`] and written to
//! stdout in a single write, so a failed run never leaves a partial row.

mod csv_row;

pub use csv_row::CsvFormatter;

use crate::{error::Result, models::SpeedTestRecord};
use std::io::Write;

/// Renders a finished record as text
pub trait OutputFormatter {
    /// Format one record, including its line terminator
    fn format_record(&self, record: &SpeedTestRecord) -> Result<String>;
}

/// Format `record` and write it to `writer` in one piece
pub fn write_record<W: Write>(
    writer: &mut W,
    formatter: &dyn OutputFormatter,
    record: &SpeedTestRecord,
) -> Result<()> {
    let output = formatter.format_record(record)?;
    writer.write_all(output.as_bytes())?;
    writer.flush()?;
    Ok(())
}
