//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::ConfigScope;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "CEPH_RESTFUL_URL" if !value.trim().is_empty() => {
                url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid CEPH_RESTFUL_URL '{}': {}", value, e)))?;
            }
            "CEPH_TIMEOUT_SECONDS" => {
                let secs: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid CEPH_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if secs == 0 || secs > 300 {
                    return Err(AppError::config(format!("CEPH_TIMEOUT_SECONDS must be between 1 and 300, got: {}", secs)));
                }
            }
            "CEPH_INSECURE_TLS" | "ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "CEPH_BACKEND" => {
                value.parse::<crate::models::MonBackend>()?;
            }
            "CEPH_POOL" | "RESULTS_EXT" | "CEPH_PYTHON" | "CEPH_CLIENT_ID" => {
                if value.trim().is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate the variables `scope` reads that are currently set; returns the names checked
    pub fn validate_current_env(scope: ConfigScope) -> Result<Vec<String>> {
        let mut checked = Vec::new();
        if !scope.strict() {
            return Ok(checked);
        }
        for name in scope.env_vars() {
            if let Ok(value) = std::env::var(name) {
                Self::validate_env_var(name, &value)?;
                checked.push(name.to_string());
            }
        }
        Ok(checked)
    }
}
