//! CSV export of report tables
//!
//! The CSV file carries exactly the headers and cells of the terminal
//! table, plus the total row when the report has one. Fields containing a
//! comma, a quote, or a line break are quoted with inner quotes doubled.

use crate::error::{Result, S3CostError};
use crate::output::ReportTable;
use std::fs;
use std::path::Path;
use tracing::debug;

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_record(out: &mut String, fields: &[String]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Render a report as CSV text with a header line
pub fn render_csv(table: &ReportTable) -> String {
    let mut out = String::new();
    push_record(&mut out, &table.headers);
    for row in &table.rows {
        push_record(&mut out, row);
    }
    if let Some(total) = &table.total {
        push_record(&mut out, total);
    }
    out
}

/// Write a report to `path`, replacing any existing file
pub fn write_csv(table: &ReportTable, path: &Path) -> Result<()> {
    fs::write(path, render_csv(table)).map_err(|source| S3CostError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}
