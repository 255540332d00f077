//! Latency statistics over nanosecond measurements

use crate::{
    error::{AppError, Result},
    models::metrics::{CallCost, LatencySummary, NANOS_PER_MILLI},
};
use std::collections::BTreeMap;

impl LatencySummary {
    /// Summarize nanosecond measurements, reporting every value in milliseconds.
    ///
    /// The mean is the arithmetic mean of the converted millisecond values,
    /// accumulated in input order.
    pub fn from_nanos(label: impl Into<String>, nanos: &[u64]) -> Result<Self> {
        let label = label.into();
        if nanos.is_empty() {
            return Err(AppError::statistics(format!("No latency samples for {}", label)));
        }

        let millis: Vec<f64> = nanos.iter().map(|&ns| ns as f64 / NANOS_PER_MILLI).collect();
        let count = millis.len();

        let min_ms = millis.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = millis.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_ms = millis.iter().sum::<f64>() / count as f64;

        let variance = millis.iter()
            .map(|ms| (ms - avg_ms).powi(2))
            .sum::<f64>() / count as f64;

        let mut sorted = millis;
        sorted.sort_by(|a, b| a.total_cmp(b));

        Ok(Self {
            label,
            count,
            min_ms,
            max_ms,
            avg_ms,
            std_dev_ms: variance.sqrt(),
            p50_ms: percentile(&sorted, 50.0),
            p99_ms: percentile(&sorted, 99.0),
        })
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Groups call costs by `class.method` and summarizes each group
#[derive(Debug, Default)]
pub struct CallCostAggregator {
    groups: BTreeMap<String, Vec<u64>>,
    skipped: usize,
}

impl CallCostAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call cost. Durations that overflow a u64 are counted as skipped.
    pub fn add(&mut self, cost: &CallCost) {
        match cost.nanos_u64() {
            Some(ns) => self.groups.entry(cost.qualified_name()).or_default().push(ns),
            None => self.skipped += 1,
        }
    }

    /// Number of costs that could not be aggregated
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// One summary per method, ordered by qualified name
    pub fn summaries(&self) -> Result<Vec<LatencySummary>> {
        self.groups.iter()
            .map(|(name, nanos)| LatencySummary::from_nanos(name.clone(), nanos))
            .collect()
    }
}
