//! Output formatting and persistence for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use folio_domain::{PageText, Row, RunMetrics, RunResult};
use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style, Width},
};

/// Widest value or comment shown in a terminal table cell.
const CELL_WIDTH: usize = 60;

/// Excel's per-cell character limit.
const MAX_CELL_CHARS: usize = 32_767;

/// Worksheet holding every extracted row.
pub const STRUCTURED_SHEET: &str = "Structured";
/// Worksheet holding the text of every page.
pub const RAW_PAGES_SHEET: &str = "Raw_Pages";
/// Worksheet holding the run summary.
pub const METRICS_SHEET: &str = "Metrics";

/// The persisted result of a run, one field per sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    /// Every row in page/chunk order
    #[serde(rename = "Structured")]
    pub structured: Vec<Row>,

    /// Text of every page, processed or not
    #[serde(rename = "Raw_Pages")]
    pub raw_pages: Vec<PageText>,

    /// Single-row run summary
    #[serde(rename = "Metrics")]
    pub metrics: Vec<RunMetrics>,
}

impl Workbook {
    /// Build the workbook for a finished run.
    pub fn from_run(result: &RunResult) -> Self {
        Self {
            structured: result.rows.clone(),
            raw_pages: result.page_backup.clone(),
            metrics: vec![result.metrics()],
        }
    }

    /// Write the workbook to `path`.
    ///
    /// A `.json` extension selects pretty JSON; anything else is written as
    /// an `.xlsx` spreadsheet with one worksheet per sheet.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if is_json_path(path) {
            fs::write(path, serde_json::to_string_pretty(self)?)?;
        } else {
            self.to_xlsx()?.save(path)?;
        }
        Ok(())
    }

    fn to_xlsx(&self) -> Result<XlsxWorkbook> {
        let mut book = XlsxWorkbook::new();

        let sheet = book.add_worksheet().set_name(STRUCTURED_SHEET)?;
        write_header(sheet, &["Key", "Value", "Comments", "Source_Page"])?;
        for (row, record) in (1u32..).zip(&self.structured) {
            sheet.write_string(row, 0, cell_text(&record.key))?;
            sheet.write_string(row, 1, cell_text(&record.value))?;
            sheet.write_string(row, 2, cell_text(&record.comments))?;
            sheet.write_number(row, 3, f64::from(record.source_page))?;
        }

        let sheet = book.add_worksheet().set_name(RAW_PAGES_SHEET)?;
        write_header(sheet, &["page", "text"])?;
        for (row, page) in (1u32..).zip(&self.raw_pages) {
            sheet.write_number(row, 0, f64::from(page.page_number))?;
            sheet.write_string(row, 1, cell_text(&page.text))?;
        }

        let sheet = book.add_worksheet().set_name(METRICS_SHEET)?;
        write_header(sheet, &["num_structured_rows", "num_pages"])?;
        for (row, m) in (1u32..).zip(&self.metrics) {
            sheet.write_number(row, 0, m.num_structured_rows as f64)?;
            sheet.write_number(row, 1, m.num_pages as f64)?;
        }

        Ok(book)
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn write_header(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    for (col, header) in (0u16..).zip(headers) {
        sheet.write_string(0, col, *header)?;
    }
    Ok(())
}

/// Clip text to what a single spreadsheet cell can hold.
fn cell_text(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => Cow::Owned(text[..end].to_string()),
        None => Cow::Borrowed(text),
    }
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the summary of a finished run.
    pub fn format_run(&self, workbook: &Workbook, output_path: &Path) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(workbook)?),
            OutputFormat::Table => Ok(self.format_run_table(workbook, output_path)),
            OutputFormat::Quiet => Ok(output_path.display().to_string()),
        }
    }

    fn format_run_table(&self, workbook: &Workbook, output_path: &Path) -> String {
        let mut sections = vec![self.format_rows_table(&workbook.structured)];
        sections.push(self.format_metrics_table(&workbook.metrics));
        sections.push(self.success(&format!("Saved: {}", output_path.display())));
        sections.join("\n\n")
    }

    /// Format rows as a table.
    pub fn format_rows_table(&self, rows: &[Row]) -> String {
        if rows.is_empty() {
            return self.colorize("No rows extracted.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Key", "Value", "Comments", "Source_Page"]);

        for row in rows {
            builder.push_record([
                row.key.clone(),
                row.value.clone(),
                row.comments.clone(),
                row.source_page.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Width::truncate(CELL_WIDTH).suffix("...")))
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format run metrics as a table.
    pub fn format_metrics_table(&self, metrics: &[RunMetrics]) -> String {
        let mut builder = Builder::default();
        builder.push_record(["num_structured_rows", "num_pages"]);
        for m in metrics {
            builder.push_record([m.num_structured_rows.to_string(), m.num_pages.to_string()]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
