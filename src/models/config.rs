//! Configuration data model and validation

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Channel used for monitor commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MonBackend {
    /// Manager `restful` module over HTTPS
    #[default]
    Rest,
    /// librados through the Python binding
    Librados,
}

impl std::str::FromStr for MonBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" | "restful" => Ok(Self::Rest),
            "librados" | "rados" => Ok(Self::Librados),
            _ => Err(AppError::config(format!("Invalid CEPH_BACKEND value '{}': expected rest or librados", s))),
        }
    }
}

/// Settings a subcommand reads; anything outside it is neither merged nor validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// Log extraction: display settings only
    Logs,
    /// Result file summaries
    Results,
    /// Cluster commands
    Cluster,
}

impl ConfigScope {
    /// Environment variables read in this scope
    pub fn env_vars(self) -> &'static [&'static str] {
        match self {
            Self::Logs => &["ENABLE_COLOR"],
            Self::Results => &["RESULTS_DIR", "RESULTS_EXT", "ENABLE_COLOR"],
            Self::Cluster => &[
                "CEPH_BACKEND",
                "CEPH_RESTFUL_URL",
                "CEPH_RESTFUL_USER",
                "CEPH_RESTFUL_KEY",
                "CEPH_INSECURE_TLS",
                "CEPH_CONF",
                "CEPH_CLIENT_ID",
                "CEPH_PYTHON",
                "CEPH_POOL",
                "CEPH_TIMEOUT_SECONDS",
                "ENABLE_COLOR",
            ],
        }
    }

    /// Whether a bad value here is an error rather than ignored
    pub fn strict(self) -> bool {
        !matches!(self, Self::Logs)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for benchmark result files
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    /// Extension (without dot) of result files
    #[serde(default = "default_results_ext")]
    pub results_ext: String,

    /// Channel for monitor commands
    #[serde(default)]
    pub backend: MonBackend,

    /// Base URL of the manager REST endpoint, e.g. `https://mgr0:8003`
    #[serde(default)]
    pub restful_url: Option<String>,

    /// User name for the REST endpoint
    #[serde(default = "default_restful_user")]
    pub restful_user: String,

    /// API key for the REST endpoint
    #[serde(default)]
    pub restful_key: Option<String>,

    /// Skip TLS certificate verification (self-signed manager certificates)
    #[serde(default)]
    pub insecure_tls: bool,

    /// ceph.conf for librados; `None` uses the default search path
    #[serde(default)]
    pub ceph_conf: Option<String>,

    /// librados client id (`client.<id>`)
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Interpreter command with the `rados` binding, e.g. `python3`
    #[serde(default = "default_python")]
    pub python: String,

    /// Pool the probe configures and writes into
    #[serde(default = "default_pool")]
    pub pool: String,

    /// Timeout handed to every external call
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            results_ext: default_results_ext(),
            backend: MonBackend::default(),
            restful_url: None,
            restful_user: default_restful_user(),
            restful_key: None,
            insecure_tls: false,
            ceph_conf: None,
            client_id: default_client_id(),
            python: default_python(),
            pool: default_pool(),
            timeout_seconds: default_timeout_secs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Glob pattern matching the result files
    pub fn results_pattern(&self) -> String {
        let dir = self.results_dir.trim_end_matches('/');
        let dir = if dir.is_empty() { "." } else { dir };
        format!("{}/*.{}", dir, self.results_ext)
    }

    /// Validate the settings `scope` uses
    pub fn validate(&self, scope: ConfigScope) -> Result<()> {
        match scope {
            ConfigScope::Logs => Ok(()),
            ConfigScope::Results => self.validate_results(),
            ConfigScope::Cluster => self.validate_cluster(),
        }
    }

    fn validate_results(&self) -> Result<()> {
        if self.results_ext.is_empty() {
            return Err(AppError::config("Result file extension cannot be empty"));
        }

        if self.results_ext.contains(['/', '*', '?', '[']) {
            return Err(AppError::config(format!(
                "Result file extension must be a plain suffix, got: {}",
                self.results_ext
            )));
        }

        Ok(())
    }

    fn validate_cluster(&self) -> Result<()> {
        if self.pool.trim().is_empty() {
            return Err(AppError::config("Pool name cannot be empty"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if let Some(ref endpoint) = self.restful_url {
            match url::Url::parse(endpoint) {
                Ok(parsed) => {
                    if parsed.scheme() != "https" && parsed.scheme() != "http" {
                        return Err(AppError::config(format!(
                            "REST endpoint must use http or https: {}",
                            endpoint
                        )));
                    }
                }
                Err(e) => {
                    return Err(AppError::config(format!("Invalid REST endpoint '{}': {}", endpoint, e)));
                }
            }
        }

        if self.python.trim().is_empty() {
            return Err(AppError::config("Python interpreter command cannot be empty"));
        }

        if self.client_id.trim().is_empty() {
            return Err(AppError::config("Client id cannot be empty"));
        }

        Ok(())
    }

    /// Merge the environment variables `scope` reads into this configuration
    pub fn merge_from_env(&mut self, scope: ConfigScope) -> Result<()> {
        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            match enable_color.trim().parse() {
                Ok(enabled) => self.enable_color = enabled,
                Err(e) if scope.strict() => {
                    return Err(AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)));
                }
                Err(_) => {}
            }
        }

        match scope {
            ConfigScope::Logs => Ok(()),
            ConfigScope::Results => {
                self.merge_results_env();
                Ok(())
            }
            ConfigScope::Cluster => self.merge_cluster_env(),
        }
    }

    fn merge_results_env(&mut self) {
        if let Ok(dir) = std::env::var("RESULTS_DIR") {
            self.results_dir = dir.trim().to_string();
        }

        if let Ok(ext) = std::env::var("RESULTS_EXT") {
            self.results_ext = ext.trim().trim_start_matches('.').to_string();
        }
    }

    fn merge_cluster_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var("CEPH_BACKEND") {
            self.backend = backend.parse()?;
        }

        if let Ok(endpoint) = std::env::var("CEPH_RESTFUL_URL") {
            let endpoint = endpoint.trim();
            self.restful_url = (!endpoint.is_empty()).then(|| endpoint.to_string());
        }

        if let Ok(user) = std::env::var("CEPH_RESTFUL_USER") {
            self.restful_user = user.trim().to_string();
        }

        if let Ok(key) = std::env::var("CEPH_RESTFUL_KEY") {
            let key = key.trim();
            self.restful_key = (!key.is_empty()).then(|| key.to_string());
        }

        if let Ok(insecure) = std::env::var("CEPH_INSECURE_TLS") {
            self.insecure_tls = insecure.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CEPH_INSECURE_TLS value '{}': {}", insecure, e)))?;
        }

        if let Ok(conf) = std::env::var("CEPH_CONF") {
            let conf = conf.trim();
            self.ceph_conf = (!conf.is_empty()).then(|| conf.to_string());
        }

        if let Ok(client_id) = std::env::var("CEPH_CLIENT_ID") {
            self.client_id = client_id.trim().to_string();
        }

        if let Ok(python) = std::env::var("CEPH_PYTHON") {
            self.python = python.trim().to_string();
        }

        if let Ok(pool) = std::env::var("CEPH_POOL") {
            self.pool = pool.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("CEPH_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CEPH_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_results_dir() -> String {
    crate::defaults::DEFAULT_RESULTS_DIR.to_string()
}

fn default_results_ext() -> String {
    crate::defaults::DEFAULT_RESULTS_EXT.to_string()
}

fn default_restful_user() -> String {
    crate::defaults::DEFAULT_RESTFUL_USER.to_string()
}

fn default_pool() -> String {
    crate::defaults::DEFAULT_POOL.to_string()
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_client_id() -> String {
    crate::defaults::DEFAULT_CLIENT_ID.to_string()
}

fn default_python() -> String {
    crate::defaults::DEFAULT_PYTHON.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
