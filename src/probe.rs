//! Administrative probes
//!
//! A probe installs a Lua class into a pool variable with one monitor
//! command and prints whatever comes back. The exec variant then writes an
//! object and calls a class method on it. Replies are printed verbatim and
//! never validated or retried.

use crate::{
    cluster::{ExecReply, MonClient, MonCommand, MonReply, ObjectClient},
    error::Result,
    lua::LuaScript,
};
use rand::Rng;
use std::io::Write;
use std::time::Duration;

/// Parameters for installing a Lua class
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Pool whose `lua_class` variable is set
    pub pool: String,
    /// Script to install; the clock probe is re-stamped with each sequence number
    pub script: LuaScript,
    /// Number of install rounds, sequence numbers start at 0
    pub repeat: u64,
    /// Timeout handed to each monitor command
    pub timeout: Duration,
    /// Pause after each install before continuing
    pub settle: Duration,
}

/// Parameters for the write-then-exec variant
#[derive(Debug, Clone)]
pub struct ExecProbe {
    pub object: String,
    pub class: String,
    pub method: String,
    /// Contents written to the object before the call
    pub payload: Vec<u8>,
    /// Input handed to the method
    pub input: Vec<u8>,
}

/// `count` random bytes for object payloads and call inputs
pub fn random_payload(count: usize) -> Vec<u8> {
    let mut data = vec![0u8; count];
    rand::thread_rng().fill(&mut data[..]);
    data
}

/// Install the Lua class `options.repeat` times, echoing each command and raw reply
pub async fn set_lua_class<W: Write>(
    mon: &dyn MonClient,
    out: &mut W,
    options: &ProbeOptions,
) -> Result<Vec<MonReply>> {
    let mut replies = Vec::new();

    for seq in 0..options.repeat {
        let script = options.script.with_seq(seq);
        let command = MonCommand::set_lua_class(options.pool.clone(), script.source());
        writeln!(out, "{}", command.to_json()?)?;

        let reply = mon.mon_command(&command, options.timeout).await?;
        writeln!(out, "{} {} {} {}", reply.status, reply.outb, reply.outs, seq)?;
        out.flush()?;
        replies.push(reply);

        if !options.settle.is_zero() {
            tokio::time::sleep(options.settle).await;
        }
    }

    Ok(replies)
}

/// Write the probe object, call the method and echo the raw result
pub async fn exec_probe<W: Write>(
    objects: &dyn ObjectClient,
    out: &mut W,
    probe: &ExecProbe,
) -> Result<ExecReply> {
    objects.write_full(&probe.object, &probe.payload).await?;
    writeln!(out, "wrote {} bytes to {}", probe.payload.len(), probe.object)?;

    let reply = objects
        .exec(&probe.object, &probe.class, &probe.method, &probe.input)
        .await?;
    writeln!(out, "{} {}", reply.status, reply.output_lossy())?;
    out.flush()?;

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records commands and answers with a canned reply
    #[derive(Default)]
    struct RecordingMon {
        commands: Mutex<Vec<(MonCommand, Duration)>>,
    }

    #[async_trait]
    impl MonClient for RecordingMon {
        async fn mon_command(&self, command: &MonCommand, timeout: Duration) -> Result<MonReply> {
            self.commands.lock().unwrap().push((command.clone(), timeout));
            Ok(MonReply::new(0, "", "set pool 1 lua_class"))
        }
    }

    struct FailingMon;

    #[async_trait]
    impl MonClient for FailingMon {
        async fn mon_command(&self, _command: &MonCommand, _timeout: Duration) -> Result<MonReply> {
            Err(AppError::cluster("connection refused"))
        }
    }

    /// In-memory objects whose `exec` echoes `<class>.<method>:<input len>`
    #[derive(Default)]
    struct MemoryObjects {
        objects: Mutex<std::collections::HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectClient for MemoryObjects {
        async fn write_full(&self, object: &str, data: &[u8]) -> Result<()> {
            self.objects.lock().unwrap().insert(object.to_string(), data.to_vec());
            Ok(())
        }

        async fn exec(&self, object: &str, class: &str, method: &str, input: &[u8]) -> Result<ExecReply> {
            if !self.objects.lock().unwrap().contains_key(object) {
                return Ok(ExecReply { status: -2, output: Vec::new() });
            }
            Ok(ExecReply {
                status: 0,
                output: format!("{}.{}:{}", class, method, input.len()).into_bytes(),
            })
        }
    }

    fn options(repeat: u64) -> ProbeOptions {
        ProbeOptions {
            pool: "rbd".to_string(),
            script: LuaScript::ClockProbe { seq: 0 },
            repeat,
            timeout: Duration::from_secs(30),
            settle: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_set_lua_class_prints_command_and_reply() {
        let mon = RecordingMon::default();
        let mut out = Vec::new();
        let replies = set_lua_class(&mon, &mut out, &options(1)).await.unwrap();

        assert_eq!(replies.len(), 1);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(r#"{"prefix": "osd pool set", "pool": "rbd", "var": "lua_class", "val": "#));

        let sent: MonCommand = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(sent.prefix(), Some("osd pool set"));
        assert_eq!(sent.get("var"), Some("lua_class"));
        assert_eq!(sent.get("pool"), Some("rbd"));
        assert!(sent.get("val").unwrap().contains("output:append('0'"));
        assert_eq!(lines[1], "0  set pool 1 lua_class 0");

        let commands = mon.commands.lock().unwrap();
        assert_eq!(commands[0].1, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_repeat_stamps_sequence_numbers() {
        let mon = RecordingMon::default();
        let mut out = Vec::new();
        set_lua_class(&mon, &mut out, &options(3)).await.unwrap();

        let commands = mon.commands.lock().unwrap();
        assert_eq!(commands.len(), 3);
        for (seq, (command, _)) in commands.iter().enumerate() {
            let stamp = format!("output:append('{}'", seq);
            assert!(command.get("val").unwrap().contains(&stamp));
        }
    }

    #[tokio::test]
    async fn test_fixed_script_is_not_restamped() {
        let mon = RecordingMon::default();
        let mut out = Vec::new();
        let mut opts = options(2);
        opts.script = LuaScript::Empty;
        set_lua_class(&mon, &mut out, &opts).await.unwrap();

        let commands = mon.commands.lock().unwrap();
        assert_eq!(commands[0].0, commands[1].0);
        assert_eq!(commands[0].0.get("val"), Some(LuaScript::Empty.source().as_str()));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_after_command_echo() {
        let mut out = Vec::new();
        let err = set_lua_class(&FailingMon, &mut out, &options(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Cluster(_)));
        // The serialized command is printed before submission.
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_exec_probe() {
        let objects = MemoryObjects::default();
        let probe = ExecProbe {
            object: "obj.0".to_string(),
            class: "lua".to_string(),
            method: "run".to_string(),
            payload: b"hello".to_vec(),
            input: random_payload(16),
        };

        let mut out = Vec::new();
        let reply = exec_probe(&objects, &mut out, &probe).await.unwrap();
        assert_eq!(reply.status, 0);
        assert_eq!(reply.output_lossy(), "lua.run:16");
        assert_eq!(objects.objects.lock().unwrap()["obj.0"], b"hello");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "wrote 5 bytes to obj.0\n0 lua.run:16\n"
        );
    }

    #[test]
    fn test_settle_waits_between_rounds() {
        let mon = RecordingMon::default();
        let mut out = Vec::new();
        let mut opts = options(2);
        opts.settle = Duration::from_millis(20);

        let started = std::time::Instant::now();
        tokio_test::block_on(set_lua_class(&mon, &mut out, &opts)).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(40));
        assert_eq!(mon.commands.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_random_payload_length() {
        assert_eq!(random_payload(0).len(), 0);
        assert_eq!(random_payload(128).len(), 128);
    }
}
