//! JSON export implementation.
//!
//! Exports analysis results in JSON format for machine-readable output.

use super::{Exporter, ReportData};
use crate::analysis::Diagnostic;
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    files: usize,
    files_with_findings: usize,
    unused_variables: usize,
}

/// Per-file section for JSON output.
#[derive(Serialize)]
struct JsonFile<'a> {
    path: String,
    node_count: usize,
    diagnostics: &'a [Diagnostic],
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    summary: JsonSummary,
    files: Vec<JsonFile<'a>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        let files: Vec<JsonFile> = data
            .files
            .iter()
            .map(|f| JsonFile {
                path: f.path.display().to_string(),
                node_count: f.node_count,
                diagnostics: &f.diagnostics,
            })
            .collect();

        let export = JsonExport {
            summary: JsonSummary {
                files: data.files.len(),
                files_with_findings: data.files_with_findings(),
                unused_variables: data.diagnostic_count(),
            },
            files,
        };

        serde_json::to_writer_pretty(&mut *writer, &export)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(writer)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_data;

    fn export_json(data: &ReportData) -> serde_json::Value {
        let mut output = Vec::new();
        JsonExporter.export(data, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_json_export_summary() {
        let json = export_json(&sample_data());
        assert_eq!(json["summary"]["files"], 2);
        assert_eq!(json["summary"]["files_with_findings"], 1);
        assert_eq!(json["summary"]["unused_variables"], 2);
    }

    #[test]
    fn test_json_diagnostic_shape() {
        let json = export_json(&sample_data());
        let diag = &json["files"][0]["diagnostics"][0];
        assert_eq!(diag["line"], 1);
        assert_eq!(diag["severity"], "warning");
        assert_eq!(diag["code"], "unused-variable");
        assert_eq!(diag["variable"], "b");
        assert!(diag.get("function").is_none());

        let in_function = &json["files"][0]["diagnostics"][1];
        assert_eq!(in_function["function"], "f");
    }

    #[test]
    fn test_json_export_empty() {
        let json = export_json(&ReportData::default());
        assert_eq!(json["summary"]["files"], 0);
        assert!(json["files"].as_array().unwrap().is_empty());
    }
}
