//! Call-cost and latency data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds per millisecond, used for every ns -> ms conversion
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Significant digits in plain summary output
const PLAIN_DIGITS: usize = 12;

/// `%.12g` with a trailing `.0` on integral values: `2.0`, `1.33333333333`, `1e-05`
pub fn format_general(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let scientific = format!("{:.*e}", PLAIN_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= PLAIN_DIGITS as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs());
    }

    let decimals = (PLAIN_DIGITS as i32 - 1 - exponent) as usize;
    let fixed = format!("{:.*}", decimals, value);
    let fixed = trim_fraction(&fixed);
    if fixed.contains('.') {
        fixed.to_string()
    } else {
        format!("{}.0", fixed)
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// A single matched call-cost log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCost {
    /// Object class name
    pub class: String,

    /// Method name within the class
    pub method: String,

    /// Duration exactly as captured from the log line (ASCII digits)
    pub nanos: String,
}

impl CallCost {
    /// Create a new call-cost record
    pub fn new<C, M, N>(class: C, method: M, nanos: N) -> Self
    where
        C: Into<String>,
        M: Into<String>,
        N: Into<String>,
    {
        Self {
            class: class.into(),
            method: method.into(),
            nanos: nanos.into(),
        }
    }

    /// Numeric view of the duration; `None` if it does not fit in a u64
    pub fn nanos_u64(&self) -> Option<u64> {
        self.nanos.parse().ok()
    }

    /// Key used when grouping costs per method
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class, self.method)
    }
}

impl fmt::Display for CallCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.class, self.method, self.nanos)
    }
}

/// One `<iteration>: <nanoseconds>` line of a result file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySample {
    /// Leading field of the line, kept verbatim when numeric
    pub iteration: Option<u64>,

    /// Measured latency in nanoseconds
    pub nanos: u64,
}

impl LatencySample {
    /// Latency in milliseconds
    pub fn millis(&self) -> f64 {
        self.nanos as f64 / NANOS_PER_MILLI
    }
}

/// Min / max / mean summary of a set of latency measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// File name or method name the summary describes
    pub label: String,

    /// Number of samples
    pub count: usize,

    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,

    /// Population standard deviation
    pub std_dev_ms: f64,

    /// Nearest-rank median
    pub p50_ms: f64,

    /// Nearest-rank 99th percentile
    pub p99_ms: f64,
}

impl LatencySummary {
    /// `label min max avg`, each value to 12 significant digits
    pub fn plain_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.label,
            format_general(self.min_ms),
            format_general(self.max_ms),
            format_general(self.avg_ms)
        )
    }

    /// Spread between slowest and fastest sample
    pub fn range_ms(&self) -> f64 {
        self.max_ms - self.min_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_cost_display() {
        let cost = CallCost::new("Foo", "bar", "123");
        assert_eq!(cost.to_string(), "Foo bar 123");
        assert_eq!(cost.qualified_name(), "Foo.bar");
        assert_eq!(cost.nanos_u64(), Some(123));
    }

    #[test]
    fn test_call_cost_keeps_digits_verbatim() {
        let cost = CallCost::new("lua", "run", "00042");
        assert_eq!(cost.to_string(), "lua run 00042");
        assert_eq!(cost.nanos_u64(), Some(42));
    }

    #[test]
    fn test_oversized_nanos_has_no_numeric_view() {
        let cost = CallCost::new("a", "b", "99999999999999999999999");
        assert_eq!(cost.nanos_u64(), None);
    }

    #[test]
    fn test_sample_millis() {
        let sample = LatencySample { iteration: Some(0), nanos: 1_500_000 };
        assert_eq!(sample.millis(), 1.5);
    }

    #[test]
    fn test_plain_line() {
        let summary = LatencySummary {
            label: "lua_empty.dat".to_string(),
            count: 2,
            min_ms: 1.0,
            max_ms: 3.0,
            avg_ms: 2.0,
            std_dev_ms: 1.0,
            p50_ms: 1.0,
            p99_ms: 3.0,
        };
        assert_eq!(summary.plain_line(), "lua_empty.dat 1.0 3.0 2.0");
        assert_eq!(summary.range_ms(), 2.0);
    }

    #[test]
    fn test_plain_line_rounds_repeating_mean() {
        let summary = LatencySummary {
            label: "a.dat".to_string(),
            count: 3,
            min_ms: 1.0,
            max_ms: 2.0,
            avg_ms: 4.0 / 3.0,
            std_dev_ms: 0.0,
            p50_ms: 1.0,
            p99_ms: 2.0,
        };
        assert_eq!(summary.plain_line(), "a.dat 1.0 2.0 1.33333333333");
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(0.0), "0.0");
        assert_eq!(format_general(0.5), "0.5");
        assert_eq!(format_general(2.0 / 3.0), "0.666666666667");
        assert_eq!(format_general(0.00001), "1e-05");
        assert_eq!(format_general(0.0001234), "0.0001234");
        assert_eq!(format_general(123456789012345.0), "1.23456789012e+14");
        assert_eq!(format_general(1e12), "1e+12");
        assert_eq!(format_general(999999999999.0), "999999999999.0");
        assert_eq!(format_general(-1.5), "-1.5");
        assert_eq!(format_general(f64::INFINITY), "inf");
    }
}
