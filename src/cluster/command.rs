//! Monitor command objects and their JSON wire form

use crate::error::Result;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Prefix of the pool configuration command
pub const OSD_POOL_SET: &str = "osd pool set";

/// Pool variable holding the Lua object class
pub const LUA_CLASS_VAR: &str = "lua_class";

/// An administrative monitor command: string keys to string values.
/// Keys keep the order they were first set in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonCommand {
    args: Vec<(String, String)>,
}

impl MonCommand {
    /// Command with only a `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut command = Self::default();
        command.set("prefix", prefix);
        command
    }

    /// `osd pool set <pool> <var> <val>`
    pub fn set_pool_var(pool: impl Into<String>, var: impl Into<String>, val: impl Into<String>) -> Self {
        Self::new(OSD_POOL_SET)
            .arg("pool", pool)
            .arg("var", var)
            .arg("val", val)
    }

    /// Install `script` as the pool's Lua class
    pub fn set_lua_class(pool: impl Into<String>, script: impl Into<String>) -> Self {
        Self::set_pool_var(pool, LUA_CLASS_VAR, script)
    }

    /// Builder-style argument
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert an argument, or replace its value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.args.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.args.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.args.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn prefix(&self) -> Option<&str> {
        self.get("prefix")
    }

    /// JSON text in `json.dumps` layout: `{"k": "v", "k2": "v2"}`
    pub fn to_json(&self) -> Result<String> {
        let mut fields = Vec::with_capacity(self.args.len());
        for (key, value) in &self.args {
            fields.push(format!("{}: {}", serde_json::to_string(key)?, serde_json::to_string(value)?));
        }
        Ok(format!("{{{}}}", fields.join(", ")))
    }
}

impl Serialize for MonCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.args.len()))?;
        for (key, value) in &self.args {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MonCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CommandVisitor;

        impl<'de> Visitor<'de> for CommandVisitor {
            type Value = MonCommand;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object with string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<MonCommand, A::Error> {
                let mut command = MonCommand::default();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    command.set(key, value);
                }
                Ok(command)
            }
        }

        deserializer.deserialize_map(CommandVisitor)
    }
}

/// Raw monitor reply: return code, output buffer, status string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonReply {
    pub status: i32,
    pub outb: String,
    pub outs: String,
}

impl MonReply {
    pub fn new(status: i32, outb: impl Into<String>, outs: impl Into<String>) -> Self {
        Self {
            status,
            outb: outb.into(),
            outs: outs.into(),
        }
    }
}

/// Raw result of an object-class method call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecReply {
    pub status: i32,
    pub output: Vec<u8>,
}

impl ExecReply {
    /// Output decoded for display
    pub fn output_lossy(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}
