//! Colored table formatter
//!
//! Same layout as the plain table, with the average and p99 columns
//! colored by latency band.

use crate::{error::Result, models::LatencySummary};
use super::formatter::{column_widths, pad, summary_cells, OutputFormatter, SUMMARY_COLUMNS};
use colored::*;
use std::fmt::Write as _;

/// Latency band used for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyLevel {
    Fast,  // < 1ms
    Slow,  // 1-10ms
    Stall, // >= 10ms
}

impl LatencyLevel {
    /// Classify a latency in milliseconds
    pub fn from_millis(ms: f64) -> Self {
        if ms < 1.0 {
            Self::Fast
        } else if ms < 10.0 {
            Self::Slow
        } else {
            Self::Stall
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Fast => Color::Green,
            Self::Slow => Color::Yellow,
            Self::Stall => Color::Red,
        }
    }
}

/// Table formatter with ANSI colors
#[derive(Debug, Default, Clone)]
pub struct ColoredFormatter;

impl ColoredFormatter {
    fn color_cell(&self, index: usize, cell: &str, summary: &LatencySummary) -> String {
        let latency = match index {
            3 => summary.avg_ms,
            4 => summary.max_ms,
            5 => summary.p99_ms,
            _ => return if index == 0 { cell.bold().to_string() } else { cell.to_string() },
        };
        cell.color(LatencyLevel::from_millis(latency).color()).to_string()
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_summaries(&self, summaries: &[LatencySummary]) -> Result<String> {
        let rows: Vec<[String; 7]> = summaries.iter().map(summary_cells).collect();
        let widths = column_widths(&rows);

        let mut output = String::new();
        let header: Vec<String> = SUMMARY_COLUMNS.iter()
            .zip(widths)
            .map(|(column, width)| {
                let title = column.header.bold().cyan().to_string();
                pad(&title, column.header.len(), width, column.alignment)
            })
            .collect();
        let _ = write!(output, "{}", header.join("  "));

        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        let _ = write!(output, "\n{}", rule.join("  ").dimmed());

        for (summary, row) in summaries.iter().zip(&rows) {
            let cells: Vec<String> = row.iter()
                .enumerate()
                .zip(SUMMARY_COLUMNS.iter().zip(widths))
                .map(|((index, cell), (column, width))| {
                    let painted = self.color_cell(index, cell, summary);
                    pad(&painted, cell.chars().count(), width, column.alignment)
                })
                .collect();
            let _ = write!(output, "\n{}", cells.join("  "));
        }

        Ok(output)
    }
}
