//! Benchmark result file summaries
//!
//! Result files hold one `<iteration>: <nanoseconds>` line per measured call.
//! Each file is reduced to min / max / mean latency in milliseconds.

use crate::{
    error::{AppError, ErrorContext, Result},
    models::metrics::{LatencySample, LatencySummary},
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Separator between iteration number and latency
pub const SAMPLE_SEPARATOR: &str = ": ";

/// Files that yielded no summary, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Outcome of summarizing every result file
#[derive(Debug, Default)]
pub struct SummaryReport {
    pub summaries: Vec<LatencySummary>,
    pub skipped: Vec<SkippedFile>,
}

/// Parse one result line. Blank lines yield `Ok(None)`.
pub fn parse_sample_line(line: &str) -> Result<Option<LatencySample>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut parts = line.split(SAMPLE_SEPARATOR);
    let head = parts.next().unwrap_or_default();
    let field = parts.next()
        .ok_or_else(|| AppError::parse(format!("missing '{}' separator in {:?}", SAMPLE_SEPARATOR, line.trim_end())))?;

    let nanos = field.trim().parse::<u64>()
        .map_err(|e| AppError::parse(format!("invalid latency {:?}: {}", field.trim(), e)))?;

    Ok(Some(LatencySample {
        iteration: head.trim().parse().ok(),
        nanos,
    }))
}

/// Read every sample from a result stream, tagging errors with `source:line`.
/// Bytes that are not UTF-8 are decoded lossily.
pub fn read_samples<R: BufRead>(mut reader: R, source: &str) -> Result<Vec<LatencySample>> {
    let mut samples = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)
            .with_context(|| format!("{}:{}", source, line_no + 1))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(sample) = parse_sample_line(line).with_context(|| format!("{}:{}", source, line_no))? {
            samples.push(sample);
        }
    }
    Ok(samples)
}

/// Summarize a single result file, labelled with its base name
pub fn summarize_file(path: &Path) -> Result<LatencySummary> {
    let label = base_name(path);
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let samples = read_samples(BufReader::new(file), &path.display().to_string())?;
    let nanos: Vec<u64> = samples.iter().map(|s| s.nanos).collect();
    LatencySummary::from_nanos(label, &nanos)
}

/// Result files matching `pattern`, in sorted path order
pub fn find_result_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths = glob::glob(pattern)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    paths.retain(|p| p.is_file());
    paths.sort();
    Ok(paths)
}

/// Summarize every file matching `pattern`.
///
/// Files without samples are reported in `skipped`; malformed lines abort
/// with a parse error naming the file and line.
pub fn summarize_results(pattern: &str) -> Result<SummaryReport> {
    let mut report = SummaryReport::default();
    for path in find_result_files(pattern)? {
        match summarize_file(&path) {
            Ok(summary) => report.summaries.push(summary),
            Err(AppError::Statistics(reason)) => report.skipped.push(SkippedFile {
                file: base_name(&path),
                reason,
            }),
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
