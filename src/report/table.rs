//! Searchable, sortable string tables and their renderers.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use crate::config::OutputFormat;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("csv writer could not be flushed: {0}")]
    Flush(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Keep rows where any cell contains `query`, ignoring case.
    pub fn filter(&mut self, query: &str) {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return;
        }
        self.rows
            .retain(|row| row.iter().any(|cell| cell.to_lowercase().contains(&needle)));
    }

    /// Stable sort on one column. Cells that both parse as numbers compare
    /// numerically and numbers sort before text. Blank cells always sort last.
    pub fn sort_by(&mut self, column: &str, descending: bool) -> Result<(), ReportError> {
        let index = self
            .column_index(column)
            .ok_or_else(|| ReportError::UnknownColumn(column.to_string()))?;
        self.rows.sort_by(|a, b| {
            let (a, b) = (a[index].trim(), b[index].trim());
            match (a.is_empty(), b.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) if descending => compare_cells(a, b).reverse(),
                (false, false) => compare_cells(a, b),
            }
        });
        Ok(())
    }

    pub fn render(&self, format: OutputFormat) -> Result<String, ReportError> {
        match format {
            OutputFormat::Table => Ok(self.to_text()),
            OutputFormat::Csv => self.to_csv(),
            OutputFormat::Json => self.to_json(),
            OutputFormat::Html => Ok(self.to_html()),
        }
    }

    /// Tab-separated text with a header line.
    pub fn to_text(&self) -> String {
        let mut out = self.columns.join("\t");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|cell| cell.replace(['\t', '\n'], " ")).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn to_csv(&self) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Flush(err.error().to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Array of objects keyed by column name.
    pub fn to_json_value(&self) -> serde_json::Value {
        self.rows
            .iter()
            .map(|row| {
                serde_json::Value::Object(
                    self.columns
                        .iter()
                        .cloned()
                        .zip(row.iter().cloned().map(serde_json::Value::String))
                        .collect(),
                )
            })
            .collect::<Vec<_>>()
            .into()
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&self.to_json_value())?)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<table>\n<thead><tr>");
        for column in &self.columns {
            out.push_str("<th>");
            out.push_str(&escape_html(column));
            out.push_str("</th>");
        }
        out.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            out.push_str("<tr>");
            for cell in row {
                out.push_str("<td>");
                out.push_str(&escape_html(cell).replace('\n', "<br>"));
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
        out
    }
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
