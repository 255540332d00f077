//! Command-line interface

use crate::lua::LuaScript;
use crate::models::{ConfigScope, MonBackend};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;

/// cls-overhead - measure and probe object-class method call overhead
#[derive(Parser, Debug, Clone)]
#[command(name = "cls-overhead")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Force colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log progress to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log debug details to stderr as JSON
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print `class method ns` for every call-cost line on stdin
    Extract(ExtractArgs),

    /// Print min/max/avg latency (ms) for each benchmark result file
    Summarize(SummarizeArgs),

    /// Install a Lua class into a pool and print the raw monitor reply
    SetLuaClass(ProbeArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// Summarize per class.method instead of echoing each line
    #[arg(long)]
    pub summary: bool,

    /// Output format for --summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, requires = "summary")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SummarizeArgs {
    /// Directory holding result files [env: RESULTS_DIR, default: results]
    #[arg(long, value_name = "DIR")]
    pub dir: Option<String>,

    /// Result file extension [env: RESULTS_EXT, default: dat]
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ProbeArgs {
    /// Channel for the monitor command [env: CEPH_BACKEND, default: rest]
    #[arg(long, value_enum)]
    pub backend: Option<MonBackend>,

    /// Manager REST endpoint, e.g. https://mgr0:8003 [env: CEPH_RESTFUL_URL]
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// REST user [env: CEPH_RESTFUL_USER, default: admin]
    #[arg(long)]
    pub user: Option<String>,

    /// REST API key [env: CEPH_RESTFUL_KEY]
    #[arg(long)]
    pub key: Option<String>,

    /// Accept self-signed endpoint certificates
    #[arg(long)]
    pub insecure: bool,

    /// Pool to configure [env: CEPH_POOL, default: rbd]
    #[arg(long)]
    pub pool: Option<String>,

    /// Timeout in seconds for each external call [env: CEPH_TIMEOUT_SECONDS, default: 30]
    #[arg(short, long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Script to install
    #[arg(long, value_enum, default_value_t = ScriptKind::Run)]
    pub script: ScriptKind,

    /// Number of install rounds; the `run` script is stamped with the round number
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub repeat: u64,

    /// Seconds to wait after each install
    #[arg(long, default_value_t = 0)]
    pub settle: u64,

    /// Also write this object and call the class method on it
    #[arg(long, value_name = "NAME")]
    pub object: Option<String>,

    /// Class to call on the object
    #[arg(long = "class", default_value = "lua", requires = "object")]
    pub class: String,

    /// Method to call (defaults to the method the installed script registers)
    #[arg(long, requires = "object")]
    pub method: Option<String>,

    /// Object contents to write
    #[arg(long, conflicts_with = "size", requires = "object")]
    pub data: Option<String>,

    /// Write this many random bytes instead of --data
    #[arg(long, default_value_t = 0, requires = "object")]
    pub size: usize,

    /// Random input bytes handed to the method
    #[arg(long, default_value_t = 0, requires = "object")]
    pub input_size: usize,

    /// ceph.conf used by librados [env: CEPH_CONF]
    #[arg(long, value_name = "PATH")]
    pub conf: Option<String>,

    /// librados client id [env: CEPH_CLIENT_ID, default: admin]
    #[arg(long = "id", value_name = "ID")]
    pub client_id: Option<String>,

    /// Python interpreter with the rados binding [env: CEPH_PYTHON, default: python3]
    #[arg(long, value_name = "COMMAND")]
    pub python: Option<String>,
}

/// Summary output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `name min max avg`, one line per entry
    #[default]
    Plain,
    /// Aligned table with count and spread
    Table,
    /// JSON array
    Json,
}

/// Installable scripts
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    /// Returns `<round>,<osd clock>`
    Run,
    /// Empty method
    #[value(name = "lua_empty")]
    LuaEmpty,
    /// Writes the call input into the object
    #[value(name = "lua_write_input")]
    LuaWriteInput,
}

impl ScriptKind {
    /// Name of the method the script registers
    pub fn method(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::LuaEmpty => "lua_empty",
            Self::LuaWriteInput => "lua_write_input",
        }
    }

    /// Script for the first install round
    pub fn script(self) -> LuaScript {
        LuaScript::from_method(self.method(), 0)
    }
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }
        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Subcommand name for logging
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Command::Extract(_) => "extract",
            Command::Summarize(_) => "summarize",
            Command::SetLuaClass(_) => "set-lua-class",
        }
    }

    /// Configuration the subcommand reads
    pub fn scope(&self) -> ConfigScope {
        match self.command {
            Command::Extract(_) => ConfigScope::Logs,
            Command::Summarize(_) => ConfigScope::Results,
            Command::SetLuaClass(_) => ConfigScope::Cluster,
        }
    }
}

/// Parse a timeout in whole seconds (1-300)
fn parse_timeout(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Timeout cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Detect whether stdout should carry ANSI colors
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_defaults() {
        let cli = Cli::parse_from(["cls-overhead", "extract"]);
        match cli.command {
            Command::Extract(args) => {
                assert!(!args.summary);
                assert_eq!(args.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_format_requires_summary() {
        assert!(Cli::try_parse_from(["cls-overhead", "extract", "--format", "json"]).is_err());
        assert!(Cli::try_parse_from(["cls-overhead", "extract", "--summary", "--format", "json"]).is_ok());
    }

    #[test]
    fn test_summarize_options() {
        let cli = Cli::parse_from([
            "cls-overhead", "--no-color", "summarize",
            "--dir", "out", "--ext", "txt", "--format", "json",
        ]);
        assert!(cli.no_color);
        assert!(!cli.use_colors());
        match cli.command {
            Command::Summarize(args) => {
                assert_eq!(args.dir.as_deref(), Some("out"));
                assert_eq!(args.ext.as_deref(), Some("txt"));
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cls-overhead", "summarize", "--verbose"]);
        assert!(cli.verbose);
        assert_eq!(cli.command_name(), "summarize");
    }

    #[test]
    fn test_probe_defaults() {
        let cli = Cli::parse_from(["cls-overhead", "set-lua-class"]);
        match cli.command {
            Command::SetLuaClass(args) => {
                assert_eq!(args.script, ScriptKind::Run);
                assert_eq!(args.repeat, 1);
                assert_eq!(args.settle, 0);
                assert_eq!(args.class, "lua");
                assert!(args.object.is_none());
                assert!(args.timeout.is_none());
                assert!(args.backend.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_probe_exec_variant() {
        let cli = Cli::parse_from([
            "cls-overhead", "set-lua-class",
            "--script", "lua_write_input",
            "--object", "obj.0",
            "--size", "64",
            "--timeout", "10",
        ]);
        match cli.command {
            Command::SetLuaClass(args) => {
                assert_eq!(args.script.script(), LuaScript::WriteInput);
                assert_eq!(args.object.as_deref(), Some("obj.0"));
                assert_eq!(args.size, 64);
                assert_eq!(args.timeout, Some(10));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_probe_rejects_bad_values() {
        assert!(Cli::try_parse_from(["cls-overhead", "set-lua-class", "--timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["cls-overhead", "set-lua-class", "--timeout", "301"]).is_err());
        assert!(Cli::try_parse_from(["cls-overhead", "set-lua-class", "--repeat", "0"]).is_err());
        assert!(Cli::try_parse_from(["cls-overhead", "set-lua-class", "--method", "run"]).is_err());
        assert!(Cli::try_parse_from([
            "cls-overhead", "set-lua-class", "--object", "o", "--data", "x", "--size", "3",
        ]).is_err());
    }

    #[test]
    fn test_scope_follows_subcommand() {
        assert_eq!(Cli::parse_from(["cls-overhead", "extract"]).scope(), ConfigScope::Logs);
        assert_eq!(Cli::parse_from(["cls-overhead", "summarize"]).scope(), ConfigScope::Results);
        assert_eq!(Cli::parse_from(["cls-overhead", "set-lua-class"]).scope(), ConfigScope::Cluster);
    }

    #[test]
    fn test_librados_options() {
        let cli = Cli::parse_from([
            "cls-overhead", "set-lua-class",
            "--backend", "librados",
            "--conf", "/etc/ceph/ceph.conf",
            "--id", "bench",
        ]);
        match cli.command {
            Command::SetLuaClass(args) => {
                assert_eq!(args.backend, Some(MonBackend::Librados));
                assert_eq!(args.conf.as_deref(), Some("/etc/ceph/ceph.conf"));
                assert_eq!(args.client_id.as_deref(), Some("bench"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["cls-overhead", "set-lua-class", "--backend", "cli"]).is_err());
    }

    #[test]
    fn test_conflicting_color_flags() {
        let cli = Cli::parse_from(["cls-overhead", "--color", "--no-color", "extract"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("30"), Ok(30));
        assert!(parse_timeout("+30").is_err());
        assert!(parse_timeout("0x10").is_err());
        assert!(parse_timeout("abc").is_err());
    }
}
