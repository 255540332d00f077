//! Output formatting for latency summaries
//!
//! Plain lines for scripts, tables for terminals and JSON for tooling.

mod colored;
mod formatter;

pub use colored::{ColoredFormatter, LatencyLevel};
pub use formatter::{
    Alignment,
    Column,
    JsonFormatter,
    OutputFormatter,
    PlainFormatter,
    TableFormatter,
};

use crate::cli::OutputFormat;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the requested format; tables are colored when enabled
    pub fn create_formatter(format: OutputFormat, enable_color: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Plain => Box::new(PlainFormatter),
            OutputFormat::Table if enable_color => Box::new(ColoredFormatter),
            OutputFormat::Table => Box::new(TableFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
        }
    }
}
