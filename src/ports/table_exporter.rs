//! Table Exporters
//!
//! Record sinks that print one row per record with the five outline
//! columns. Absent fields print as empty cells.

use crate::domain::record::{Record, COLUMNS};
use crate::ports::RecordSink;
use serde::Deserialize;
use std::io::{Result, Write};

/// Output formats selectable from the CLI and config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Html,
    Csv,
    None,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "html" => Some(OutputFormat::Html),
            "csv" => Some(OutputFormat::Csv),
            "none" => Some(OutputFormat::None),
            _ => None,
        }
    }

    /// The sink implementing this format.
    pub fn sink(&self) -> Box<dyn RecordSink> {
        match self {
            OutputFormat::Text => Box::new(TextTableExporter),
            OutputFormat::Json => Box::new(JsonExporter),
            OutputFormat::Html => Box::new(HtmlTableExporter),
            OutputFormat::Csv => Box::new(CsvExporter),
            OutputFormat::None => Box::new(NullSink),
        }
    }
}

/// Aligned plain-text table with a header row.
pub struct TextTableExporter;

impl TextTableExporter {
    pub fn to_text(records: &[Record]) -> String {
        let rows: Vec<[String; 5]> = records.iter().map(Record::cells).collect();

        let mut widths = COLUMNS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(rows.len() + 2);
        lines.push(Self::format_row(&COLUMNS.map(String::from), &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &rows {
            lines.push(Self::format_row(row, &widths));
        }

        lines.join("\n")
    }

    fn format_row(cells: &[String; 5], widths: &[usize; 5]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        padded.join(" | ").trim_end().to_string()
    }
}

impl RecordSink for TextTableExporter {
    fn export(&self, records: &[Record], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", Self::to_text(records))
    }
}

/// JSON array of records. Literal values keep their JSON type.
pub struct JsonExporter;

impl RecordSink for JsonExporter {
    fn export(&self, records: &[Record], out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, records)?;
        writeln!(out)
    }
}

/// HTML `<table id="resultTable">`, one `<tr>` per record.
pub struct HtmlTableExporter;

impl HtmlTableExporter {
    pub fn to_html(records: &[Record]) -> String {
        let mut lines = Vec::new();
        lines.push("<table id=\"resultTable\">".to_string());

        let header: Vec<String> = COLUMNS.iter().map(|c| format!("<th>{}</th>", c)).collect();
        lines.push(format!("  <tr>{}</tr>", header.join("")));

        for record in records {
            let cells: Vec<String> = record
                .cells()
                .iter()
                .map(|c| format!("<td>{}</td>", Self::escape(c)))
                .collect();
            lines.push(format!("  <tr>{}</tr>", cells.join("")));
        }

        lines.push("</table>".to_string());
        lines.join("\n")
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}

impl RecordSink for HtmlTableExporter {
    fn export(&self, records: &[Record], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", Self::to_html(records))
    }
}

/// Comma-separated values with a header line.
pub struct CsvExporter;

impl CsvExporter {
    pub fn to_csv(records: &[Record]) -> String {
        let mut lines = vec![COLUMNS.join(",")];
        for record in records {
            let cells: Vec<String> = record.cells().iter().map(|c| Self::quote(c)).collect();
            lines.push(cells.join(","));
        }
        lines.join("\n")
    }

    fn quote(cell: &str) -> String {
        if cell.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", cell.replace('"', "\"\""))
        } else {
            cell.to_string()
        }
    }
}

impl RecordSink for CsvExporter {
    fn export(&self, records: &[Record], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", Self::to_csv(records))
    }
}

/// Discards everything. Used for headless runs.
pub struct NullSink;

impl RecordSink for NullSink {
    fn export(&self, _records: &[Record], _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::LiteralValue;

    fn sample() -> Vec<Record> {
        vec![
            Record::named(1, "VariableDeclarator", "x".into(), Some(LiteralValue::Number(1.0).into())),
            Record::conditional(3, "WhileStatement", "x < 10".into()),
        ]
    }

    #[test]
    fn test_to_text() {
        let text = TextTableExporter::to_text(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("line | type"));
        assert!(lines[2].starts_with("1    | VariableDeclarator | x    |"));
        assert!(lines[3].contains("| x < 10"));
    }

    #[test]
    fn test_to_html_escapes_cells() {
        let html = HtmlTableExporter::to_html(&sample());
        assert!(html.starts_with("<table id=\"resultTable\">"));
        assert!(html.contains("<td>x &lt; 10</td>"));
        assert!(html.contains("<td>1</td><td>VariableDeclarator</td><td>x</td><td></td><td>1</td>"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_to_csv_quotes() {
        let records = vec![Record::valued(2, "ReturnStatement", "a, \"b\"".into())];
        let csv = CsvExporter::to_csv(&records);
        assert_eq!(csv, "line,type,name,condition,value\n2,ReturnStatement,,,\"a, \"\"b\"\"\"");
    }

    #[test]
    fn test_json_keeps_literal_types() {
        let mut buf = Vec::new();
        JsonExporter.export(&sample(), &mut buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["value"], serde_json::json!(1));
        assert_eq!(parsed[1]["condition"], serde_json::json!("x < 10"));
        assert!(parsed[1]["value"].is_null());
    }

    #[test]
    fn test_null_sink_writes_nothing() {
        let mut buf = Vec::new();
        NullSink.export(&sample(), &mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("dot"), None);
    }
}
