//! Data models for call costs, latency summaries and configuration

pub mod config;
pub mod metrics;

pub use config::{Config, ConfigScope, MonBackend};
pub use metrics::{CallCost, LatencySample, LatencySummary, NANOS_PER_MILLI};
