//! Call-cost line extraction
//!
//! Object-class execution logs report each method invocation as
//! `call method <class>.<method> cost <ns>` somewhere in the line. The
//! extractor echoes the three captured fields of every such line and
//! silently drops everything else.

use crate::{
    error::{AppError, Result},
    models::metrics::CallCost,
    stats::CallCostAggregator,
};
use regex::Regex;
use std::io::{BufRead, Write};

/// Matches a call-cost report anywhere in a line. Identifier and digit
/// classes are ASCII-only.
pub const CALL_COST_PATTERN: &str =
    r"call method (?P<cls>[A-Za-z0-9_]+)\.(?P<method>[A-Za-z0-9_]+) cost (?P<ns>[0-9]+)";

/// Compiled call-cost matcher
#[derive(Debug, Clone)]
pub struct CallCostParser {
    pattern: Regex,
}

impl CallCostParser {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(CALL_COST_PATTERN)
            .map_err(|e| AppError::internal(format!("Invalid call-cost pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Parse a single log line; `None` when the line carries no call cost
    pub fn parse_line(&self, line: &str) -> Option<CallCost> {
        let captures = self.pattern.captures(line)?;
        Some(CallCost::new(
            &captures["cls"],
            &captures["method"],
            &captures["ns"],
        ))
    }

    /// Iterate over the call costs found in `reader`.
    ///
    /// Lines are decoded lossily so binary noise in a log never aborts the scan.
    pub fn scan<'a, R: BufRead + 'a>(&'a self, mut reader: R) -> impl Iterator<Item = Result<CallCost>> + 'a {
        let mut buf = Vec::new();
        std::iter::from_fn(move || loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(cost) = self.parse_line(&String::from_utf8_lossy(&buf)) {
                        return Some(Ok(cost));
                    }
                }
                Err(e) => return Some(Err(e.into())),
            }
        })
    }
}

/// Echo `class method ns` for every call-cost line; returns the number of lines written
pub fn extract_call_costs<R: BufRead, W: Write>(
    parser: &CallCostParser,
    reader: R,
    writer: &mut W,
) -> Result<usize> {
    let mut emitted = 0;
    for cost in parser.scan(reader) {
        writeln!(writer, "{}", cost?)?;
        emitted += 1;
    }
    writer.flush()?;
    Ok(emitted)
}

/// Collect every call cost in `reader` into a per-method aggregator
pub fn aggregate_call_costs<R: BufRead>(parser: &CallCostParser, reader: R) -> Result<CallCostAggregator> {
    let mut aggregator = CallCostAggregator::new();
    for cost in parser.scan(reader) {
        aggregator.add(&cost?);
    }
    Ok(aggregator)
}
