//! Markdown export implementation.
//!
//! Exports analysis results in Markdown format for review comments and reports.

use super::{Exporter, ReportData};
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

impl MarkdownExporter {
    /// Escape pipes so a value cannot break a table row.
    fn escape_cell(value: &str) -> String {
        value.replace('|', "\\|")
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        // Title
        writeln!(writer, "# Unused Variable Report")?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Count |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Files Analyzed | {} |", data.files.len())?;
        writeln!(
            writer,
            "| Files With Findings | {} |",
            data.files_with_findings()
        )?;
        writeln!(
            writer,
            "| Unused Variables | {} |",
            data.diagnostic_count()
        )?;
        writeln!(writer)?;

        if data.diagnostic_count() == 0 {
            writeln!(writer, "No unused variables found.")?;
            return Ok(());
        }

        // Per-file sections
        writeln!(writer, "## Findings")?;
        writeln!(writer)?;

        for file in data.files.iter().filter(|f| !f.diagnostics.is_empty()) {
            writeln!(
                writer,
                "### {} ({})",
                file.path.display(),
                file.diagnostics.len()
            )?;
            writeln!(writer)?;
            writeln!(writer, "| Line | Scope | Variable |")?;
            writeln!(writer, "|------|-------|----------|")?;
            for diag in &file.diagnostics {
                writeln!(
                    writer,
                    "| {} | {} | `{}` |",
                    diag.line + 1,
                    Self::escape_cell(diag.function.as_deref().unwrap_or("MAIN")),
                    Self::escape_cell(&diag.variable)
                )?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}
