use std::io::Write;

use crate::error::OpfError;
use crate::model::ScanResult;

/// Write scan rows as a pretty-printed JSON array.
pub fn write_json(result: &ScanResult, writer: &mut impl Write) -> Result<(), OpfError> {
    let serialized = match result {
        ScanResult::Plain(rows) => serde_json::to_writer_pretty(&mut *writer, rows),
        ScanResult::Enriched(rows) => serde_json::to_writer_pretty(&mut *writer, rows),
    };
    serialized.map_err(|e| OpfError::Output(std::io::Error::other(e.to_string())))?;
    writeln!(writer).map_err(OpfError::Output)
}
