use std::io::Write;

use crate::error::OpfError;
use crate::model::ScanResult;

/// Write scan rows as a right-aligned text table followed by a count line.
pub fn write_table(result: &ScanResult, writer: &mut impl Write) -> Result<(), OpfError> {
    write_table_inner(result, writer).map_err(OpfError::Output)
}

fn write_table_inner(result: &ScanResult, w: &mut impl Write) -> Result<(), std::io::Error> {
    let (headers, rows): (&[&str], Vec<Vec<String>>) = match result {
        ScanResult::Plain(rows) => (
            &["IP", "Port"][..],
            rows.iter()
                .map(|r| vec![r.ip.to_string(), r.port.to_string()])
                .collect(),
        ),
        ScanResult::Enriched(rows) => (
            &["IP", "Port", "PID", "Process Name"][..],
            rows.iter()
                .map(|r| {
                    vec![
                        r.ip.to_string(),
                        r.port.to_string(),
                        r.pid.map_or_else(|| "-".to_string(), |p| p.to_string()),
                        r.process_name.clone(),
                    ]
                })
                .collect(),
        ),
    };

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .fold(h.len(), usize::max)
        })
        .collect();

    write_row(w, headers.iter().copied(), &widths)?;
    for row in &rows {
        write_row(w, row.iter().map(String::as_str), &widths)?;
    }
    writeln!(w, "Total open ports: {}", rows.len())?;

    Ok(())
}

fn write_row<'a>(
    w: &mut impl Write,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> Result<(), std::io::Error> {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect();
    writeln!(w, "{}", line.join("  "))
}
