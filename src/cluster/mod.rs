//! Clients for the storage cluster's administrative and object endpoints
//!
//! The probes only need two capabilities: submitting one monitor command and,
//! for the exec variant, writing an object and calling a class method on it.
//! Both sit behind traits so the probes run against any backend.

pub mod command;
pub mod librados;
pub mod restful;

pub use command::{ExecReply, MonCommand, MonReply, LUA_CLASS_VAR, OSD_POOL_SET};
pub use librados::LibradosBridge;
pub use restful::RestfulMonClient;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Administrative command channel to the cluster monitors
#[async_trait]
pub trait MonClient: Send + Sync {
    /// Submit `command` and return the raw reply; `timeout` bounds the whole call
    async fn mon_command(&self, command: &MonCommand, timeout: Duration) -> Result<MonReply>;
}

/// Object operations against a single pool
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Replace the full contents of `object`
    async fn write_full(&self, object: &str, data: &[u8]) -> Result<()>;

    /// Invoke `class.method` on `object` with `input`
    async fn exec(&self, object: &str, class: &str, method: &str, input: &[u8]) -> Result<ExecReply>;
}
