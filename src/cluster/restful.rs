//! Monitor commands over the manager's REST endpoint
//!
//! `POST {base}/request?wait=1` accepts a monitor command as a JSON object
//! and, with `wait=1`, answers once the command has completed with the
//! per-command `outb`/`outs` buffers.

use super::{MonClient, MonCommand, MonReply};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Return code reported when the endpoint marks a request failed or unfinished
pub const FAILED_STATUS: i32 = -1;

/// REST-backed monitor client
#[derive(Debug, Clone)]
pub struct RestfulMonClient {
    client: Client,
    request_url: Url,
    user: String,
    key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RequestState {
    #[serde(default)]
    is_finished: bool,
    #[serde(default)]
    has_failed: bool,
    #[serde(default)]
    finished: Vec<CommandOutput>,
    #[serde(default)]
    failed: Vec<CommandOutput>,
}

#[derive(Debug, Default, Deserialize)]
struct CommandOutput {
    #[serde(default)]
    outb: String,
    #[serde(default)]
    outs: String,
}

impl RestfulMonClient {
    /// Create a client for the endpoint rooted at `base_url`
    pub fn new(base_url: &str, user: impl Into<String>, key: Option<String>, insecure_tls: bool) -> Result<Self> {
        let mut request_url = Url::parse(&format!("{}/request", base_url.trim_end_matches('/')))?;
        request_url.query_pairs_mut().append_pair("wait", "1");

        let client = Client::builder()
            .danger_accept_invalid_certs(insecure_tls)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            request_url,
            user: user.into(),
            key,
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &crate::models::Config) -> Result<Self> {
        let base_url = config.restful_url.as_deref()
            .ok_or_else(|| AppError::config("CEPH_RESTFUL_URL (or --endpoint) is required for the rest backend"))?;
        Self::new(base_url, config.restful_user.clone(), config.restful_key.clone(), config.insecure_tls)
    }

    /// Full URL commands are posted to
    pub fn request_url(&self) -> &Url {
        &self.request_url
    }
}

#[async_trait]
impl MonClient for RestfulMonClient {
    async fn mon_command(&self, command: &MonCommand, timeout: Duration) -> Result<MonReply> {
        let response = self.client
            .post(self.request_url.clone())
            .basic_auth(&self.user, self.key.as_deref())
            .json(command)
            .timeout(timeout)
            .send()
            .await?;

        let http_status = response.status();
        let body = response.text().await?;
        if !http_status.is_success() {
            return Err(AppError::cluster(format!("HTTP {}: {}", http_status, body.trim())));
        }

        let state: RequestState = serde_json::from_str(&body)?;
        let failed = state.has_failed || !state.failed.is_empty() || !state.is_finished;
        let status = if failed { FAILED_STATUS } else { 0 };

        let output = state.failed.into_iter()
            .chain(state.finished)
            .next()
            .unwrap_or_default();

        Ok(MonReply::new(status, output.outb, output.outs))
    }
}
