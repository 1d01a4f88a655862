//! CSV export implementation.
//!
//! Exports one row per diagnostic for spreadsheet use.

use super::{Exporter, ReportData};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "path,line,code,severity,variable,function,message")?;

        for (path, diag) in data.diagnostics() {
            writeln!(
                writer,
                "{},{},{},{},{},{},{}",
                Self::escape_field(&path.display().to_string()),
                diag.line + 1,
                diag.code,
                diag.severity,
                Self::escape_field(&diag.variable),
                Self::escape_field(diag.function.as_deref().unwrap_or_default()),
                Self::escape_field(&diag.message)
            )?;
        }

        Ok(())
    }
}
