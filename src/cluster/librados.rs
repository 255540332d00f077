//! Monitor commands and object operations through librados
//!
//! Each call starts the Python `rados` binding in a child interpreter, hands
//! it one JSON request on stdin and reads one JSON reply from stdout. Return
//! codes from `mon_command` and `exec` are passed through untouched.

use super::{ExecReply, MonClient, MonCommand, MonReply, ObjectClient};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// errno used when the binding raises without one
const EIO: i32 = 5;

/// Program run by the interpreter for every request
const BRIDGE_SCRIPT: &str = r#"
import json
import sys

import rados


def errno_of(e):
    return -(getattr(e, "errno", None) or 5)


def text(value):
    if isinstance(value, bytes):
        return value.decode("utf-8", "replace")
    return value


def run(cluster, req):
    op = req["op"]
    if op == "mon_command":
        ret, outb, outs = cluster.mon_command(req["command"], b"", timeout=req["timeout"])
        return {"status": ret, "outb": text(outb), "outs": text(outs)}

    ioctx = cluster.open_ioctx(req["pool"])
    try:
        if op == "write_full":
            ioctx.write_full(req["object"], bytes(bytearray(req["data"])))
            return {"status": 0}
        try:
            ret, out = ioctx.execute(req["object"], req["class"], req["method"],
                                     bytes(bytearray(req["input"])))
        except rados.Error as e:
            return {"status": errno_of(e), "output": []}
        return {"status": ret, "output": list(bytearray(out))}
    finally:
        ioctx.close()


req = json.load(sys.stdin)
cluster = rados.Rados(conffile=req["conf"], rados_id=req["id"])
try:
    cluster.connect(timeout=req["timeout"])
    reply = run(cluster, req)
except rados.Error as e:
    reply = {"status": errno_of(e), "error": str(e)}
finally:
    cluster.shutdown()
json.dump(reply, sys.stdout)
"#;

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Operation<'a> {
    MonCommand { command: String },
    WriteFull { object: &'a str, data: &'a [u8] },
    Exec { object: &'a str, class: &'a str, method: &'a str, input: &'a [u8] },
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    conf: &'a str,
    id: &'a str,
    pool: &'a str,
    timeout: u64,
    #[serde(flatten)]
    operation: Operation<'a>,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    status: i32,
    #[serde(default)]
    outb: String,
    #[serde(default)]
    outs: String,
    #[serde(default)]
    output: Vec<u8>,
    /// Set when connecting or the operation itself raised
    #[serde(default)]
    error: Option<String>,
}

/// librados client running the Python binding in a child interpreter
#[derive(Debug, Clone)]
pub struct LibradosBridge {
    program: String,
    leading_args: Vec<String>,
    conf: Option<String>,
    client_id: String,
    pool: String,
    timeout: Duration,
}

impl LibradosBridge {
    /// `interpreter` is a whitespace-separated command, e.g. `python3` or `python3 -E`
    pub fn new(
        interpreter: &str,
        client_id: impl Into<String>,
        pool: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut words = interpreter.split_whitespace().map(String::from);
        let program = words.next()
            .ok_or_else(|| AppError::config("Python interpreter command cannot be empty"))?;

        Ok(Self {
            program,
            leading_args: words.collect(),
            conf: None,
            client_id: client_id.into(),
            pool: pool.into(),
            timeout,
        })
    }

    /// Read this ceph.conf instead of the default search path
    pub fn with_conf(mut self, conf: impl Into<String>) -> Self {
        self.conf = Some(conf.into());
        self
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &crate::models::Config) -> Result<Self> {
        let bridge = Self::new(&config.python, config.client_id.clone(), config.pool.clone(), config.timeout())?;
        Ok(match &config.ceph_conf {
            Some(conf) => bridge.with_conf(conf.clone()),
            None => bridge,
        })
    }

    /// Arguments passed to the interpreter
    pub fn command_args(&self) -> Vec<String> {
        self.leading_args.iter()
            .cloned()
            .chain(["-c".to_string(), BRIDGE_SCRIPT.to_string()])
            .collect()
    }

    async fn call(&self, operation: Operation<'_>) -> Result<BridgeReply> {
        let request = BridgeRequest {
            conf: self.conf.as_deref().unwrap_or(""),
            id: &self.client_id,
            pool: &self.pool,
            timeout: self.timeout.as_secs(),
            operation,
        };
        let payload = serde_json::to_vec(&request)?;

        let mut child = Command::new(&self.program)
            .args(self.command_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::io(format!("Failed to start {}: {}", self.program, e)))?;

        // stdin is dropped at the end of this block, which closes the pipe.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload).await?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| AppError::timeout(format!(
                "librados request did not finish within {}s",
                self.timeout.as_secs_f64()
            )))??;

        if !output.status.success() {
            return Err(AppError::cluster(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let reply: BridgeReply = serde_json::from_slice(&output.stdout)?;
        if let Some(error) = reply.error {
            return Err(AppError::cluster(format!("librados error {}: {}", reply.status, error)));
        }
        Ok(reply)
    }
}

#[async_trait]
impl MonClient for LibradosBridge {
    async fn mon_command(&self, command: &MonCommand, _timeout: Duration) -> Result<MonReply> {
        let reply = self.call(Operation::MonCommand { command: command.to_json()? }).await?;
        Ok(MonReply::new(reply.status, reply.outb, reply.outs))
    }
}

#[async_trait]
impl ObjectClient for LibradosBridge {
    async fn write_full(&self, object: &str, data: &[u8]) -> Result<()> {
        let reply = self.call(Operation::WriteFull { object, data }).await?;
        if reply.status < 0 {
            return Err(AppError::cluster(format!("write_full {} failed: {}", object, reply.status)));
        }
        Ok(())
    }

    async fn exec(&self, object: &str, class: &str, method: &str, input: &[u8]) -> Result<ExecReply> {
        let reply = self.call(Operation::Exec { object, class, method, input }).await?;
        Ok(ExecReply { status: reply.status, output: reply.output })
    }
}
