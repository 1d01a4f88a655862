//! Plain text export, one line per diagnostic.
//!
//! Lines follow the `path:line: severity[code]: message` shape that
//! editors and CI log viewers already know how to link.

use super::{Exporter, ReportData};
use std::io::{self, Write};

/// Text exporter implementation.
pub struct TextExporter;

impl Exporter for TextExporter {
    fn export<W: Write>(&self, data: &ReportData, writer: &mut W) -> io::Result<()> {
        for (path, diag) in data.diagnostics() {
            writeln!(
                writer,
                "{}:{}: {}[{}]: {}",
                path.display(),
                diag.line + 1,
                diag.severity,
                diag.code,
                diag.message
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sample_data;

    #[test]
    fn test_text_export() {
        let mut output = Vec::new();
        TextExporter.export(&sample_data(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "src/main.4gl:2: warning[unused-variable]: unused variable 'b'",
                "src/main.4gl:6: warning[unused-variable]: function 'f': unused variable 'l_x'",
            ]
        );
    }

    #[test]
    fn test_text_export_clean() {
        let mut output = Vec::new();
        TextExporter
            .export(&ReportData::default(), &mut output)
            .unwrap();
        assert!(output.is_empty());
    }
}
