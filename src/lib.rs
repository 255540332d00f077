//! cls-overhead
//!
//! Tools for measuring object-class method call overhead: pull call costs
//! out of daemon logs, summarize benchmark result files, and install Lua
//! classes into a pool through the manager REST endpoint or librados.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod lua;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod summarize;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{CallCost, Config, LatencySample, LatencySummary};
pub use extract::{extract_call_costs, CallCostParser};
pub use summarize::{summarize_results, SummaryReport};
pub use stats::CallCostAggregator;
pub use lua::LuaScript;
pub use cluster::{MonClient, ObjectClient, LibradosBridge, RestfulMonClient};
pub use output::{OutputFormatter, OutputFormatterFactory};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Build metadata recorded by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_RESULTS_DIR: &str = "results";
    pub const DEFAULT_RESULTS_EXT: &str = "dat";
    pub const DEFAULT_RESTFUL_USER: &str = "admin";
    pub const DEFAULT_POOL: &str = "rbd";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_CLIENT_ID: &str = "admin";
    pub const DEFAULT_PYTHON: &str = "python3";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
