pub mod json;
pub mod table;

use std::io::Write;

use crate::cli::OutputFormat;
use crate::error::OpfError;
use crate::model::ScanResult;

pub const NO_OPEN_PORTS: &str = "No open ports found";

/// Write scan results in the requested format.
pub fn write_scan(
    result: &ScanResult,
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<(), OpfError> {
    if result.is_empty() {
        return writeln!(writer, "{NO_OPEN_PORTS}").map_err(OpfError::Output);
    }
    match format {
        OutputFormat::Table => table::write_table(result, writer),
        OutputFormat::Json => json::write_json(result, writer),
    }
}
