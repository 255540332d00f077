//! Lua object-class scripts installed through the `lua_class` pool variable

use serde::Serialize;
use std::fmt;

/// Script bodies the probe knows how to install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LuaScript {
    /// `run` appends `'<seq>,<osd clock>'` to the output
    ClockProbe { seq: u64 },
    /// `lua_empty` does nothing; measures bare dispatch overhead
    Empty,
    /// `lua_write_input` writes the call input at offset 0 of the object
    WriteInput,
}

impl LuaScript {
    /// Pick the script that registers `method`; unknown names get the clock probe
    pub fn from_method(method: &str, seq: u64) -> Self {
        match method {
            "lua_empty" => Self::Empty,
            "lua_write_input" => Self::WriteInput,
            _ => Self::ClockProbe { seq },
        }
    }

    /// Name of the function the script registers
    pub fn method(&self) -> &'static str {
        match self {
            Self::ClockProbe { .. } => "run",
            Self::Empty => "lua_empty",
            Self::WriteInput => "lua_write_input",
        }
    }

    /// Same script with a new sequence stamp (only the clock probe carries one)
    pub fn with_seq(self, seq: u64) -> Self {
        match self {
            Self::ClockProbe { .. } => Self::ClockProbe { seq },
            other => other,
        }
    }

    /// Lua source text
    pub fn source(&self) -> String {
        match self {
            Self::ClockProbe { seq } => format!(
                "\nfunction run(input, output)\n    output:append('{}' .. ',' .. cls.clock());\nend;\ncls.register(run);\n",
                seq
            ),
            Self::Empty => "function lua_empty(input, output)\nend\ncls.register(lua_empty)\n".to_string(),
            Self::WriteInput => concat!(
                "function lua_write_input(input, output)\n",
                "cls.write(0, #input, input);\n",
                "end\n",
                "cls.register(lua_write_input)\n",
            ).to_string(),
        }
    }
}

impl fmt::Display for LuaScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source())
    }
}

/// Parse a clock-probe reply of the form `<seq>,<clock>`
pub fn parse_clock_reply(reply: &str) -> Option<(u64, u64)> {
    let (seq, clock) = reply.trim().split_once(',')?;
    Some((seq.parse().ok()?, clock.parse().ok()?))
}
