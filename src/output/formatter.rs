//! Core formatting trait and the uncolored implementations

use crate::{error::Result, models::LatencySummary};
use std::fmt::Write as _;

/// Renders latency summaries for stdout
pub trait OutputFormatter {
    /// Format every summary into one block of text (no trailing newline)
    fn format_summaries(&self, summaries: &[LatencySummary]) -> Result<String>;
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: &'static str,
    pub alignment: Alignment,
}

impl Column {
    const fn left(header: &'static str) -> Self {
        Self { header, alignment: Alignment::Left }
    }

    const fn right(header: &'static str) -> Self {
        Self { header, alignment: Alignment::Right }
    }
}

/// Summary table layout shared by the plain and colored tables
pub const SUMMARY_COLUMNS: [Column; 7] = [
    Column::left("Name"),
    Column::right("Count"),
    Column::right("Min (ms)"),
    Column::right("Avg (ms)"),
    Column::right("Max (ms)"),
    Column::right("P99 (ms)"),
    Column::right("StdDev"),
];

/// Cell text of a summary row, in `SUMMARY_COLUMNS` order
pub fn summary_cells(summary: &LatencySummary) -> [String; 7] {
    [
        summary.label.clone(),
        summary.count.to_string(),
        format!("{:.3}", summary.min_ms),
        format!("{:.3}", summary.avg_ms),
        format!("{:.3}", summary.max_ms),
        format!("{:.3}", summary.p99_ms),
        format!("{:.3}", summary.std_dev_ms),
    ]
}

/// Column widths fitting headers and every row
pub fn column_widths(rows: &[[String; 7]]) -> [usize; 7] {
    let mut widths = SUMMARY_COLUMNS.map(|c| c.header.len());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

/// Pad `text` to `width` visible characters; `visible` is the uncolored length
pub fn pad(text: &str, visible: usize, width: usize, alignment: Alignment) -> String {
    let fill = " ".repeat(width.saturating_sub(visible));
    match alignment {
        Alignment::Left => format!("{}{}", text, fill),
        Alignment::Right => format!("{}{}", fill, text),
    }
}

/// `name min max avg`, one line per summary
#[derive(Debug, Default, Clone)]
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn format_summaries(&self, summaries: &[LatencySummary]) -> Result<String> {
        Ok(summaries.iter()
            .map(LatencySummary::plain_line)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Aligned table without colors
#[derive(Debug, Default, Clone)]
pub struct TableFormatter;

impl OutputFormatter for TableFormatter {
    fn format_summaries(&self, summaries: &[LatencySummary]) -> Result<String> {
        let rows: Vec<[String; 7]> = summaries.iter().map(summary_cells).collect();
        let widths = column_widths(&rows);

        let mut output = String::new();
        let header: Vec<String> = SUMMARY_COLUMNS.iter()
            .zip(widths)
            .map(|(column, width)| pad(column.header, column.header.len(), width, column.alignment))
            .collect();
        let _ = write!(output, "{}", header.join("  "));

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = write!(output, "\n{}", rule.join("  "));

        for row in &rows {
            let cells: Vec<String> = row.iter()
                .zip(SUMMARY_COLUMNS.iter().zip(widths))
                .map(|(cell, (column, width))| pad(cell, cell.chars().count(), width, column.alignment))
                .collect();
            let _ = write!(output, "\n{}", cells.join("  ").trim_end());
        }

        Ok(output)
    }
}

/// Pretty-printed JSON array of summaries
#[derive(Debug, Default, Clone)]
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_summaries(&self, summaries: &[LatencySummary]) -> Result<String> {
        Ok(serde_json::to_string_pretty(summaries)?)
    }
}
