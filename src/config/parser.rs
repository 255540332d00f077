//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{Cli, Command},
    config::env::EnvManager,
    error::Result,
    models::{Config, ConfigScope},
};

/// Builds the configuration: defaults < .env < environment < command line
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the configuration the subcommand reads
    pub fn parse(&self) -> Result<Config> {
        let scope = self.cli.scope();
        let mut config = Config::default();

        if let Err(e) = EnvManager::load_env_file(self.cli.debug) {
            if scope.strict() {
                return Err(e);
            }
        }
        EnvManager::validate_current_env(scope)?;
        config.merge_from_env(scope)?;

        apply_cli_overrides(&self.cli, &mut config);
        config.validate(scope)?;

        Ok(config)
    }
}

/// Apply command-line values on top of `config`
pub fn apply_cli_overrides(cli: &Cli, config: &mut Config) {
    if cli.color {
        config.enable_color = true;
    }
    if cli.no_color {
        config.enable_color = false;
    }

    config.verbose = cli.verbose;
    config.debug = cli.debug;

    match &cli.command {
        Command::Extract(_) => {}
        Command::Summarize(args) => {
            if let Some(ref dir) = args.dir {
                config.results_dir = dir.clone();
            }
            if let Some(ref ext) = args.ext {
                config.results_ext = ext.trim_start_matches('.').to_string();
            }
        }
        Command::SetLuaClass(args) => {
            if let Some(backend) = args.backend {
                config.backend = backend;
            }
            if let Some(ref endpoint) = args.endpoint {
                config.restful_url = Some(endpoint.clone());
            }
            if let Some(ref user) = args.user {
                config.restful_user = user.clone();
            }
            if let Some(ref key) = args.key {
                config.restful_key = Some(key.clone());
            }
            if args.insecure {
                config.insecure_tls = true;
            }
            if let Some(ref pool) = args.pool {
                config.pool = pool.clone();
            }
            if let Some(timeout) = args.timeout {
                config.timeout_seconds = timeout;
            }
            if let Some(ref conf) = args.conf {
                config.ceph_conf = Some(conf.clone());
            }
            if let Some(ref client_id) = args.client_id {
                config.client_id = client_id.clone();
            }
            if let Some(ref python) = args.python {
                config.python = python.clone();
            }
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Configuration summary for debug output; the API key is never shown
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Results: {}", config.results_pattern()));
    summary.push(format!(
        "REST endpoint: {}",
        config.restful_url.as_deref().unwrap_or("(not set)")
    ));
    summary.push(format!("REST user: {}", config.restful_user));
    summary.push(format!("REST key: {}", if config.restful_key.is_some() { "set" } else { "not set" }));
    summary.push(format!("Pool: {}", config.pool));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Backend: {:?}", config.backend));
    summary.push(format!(
        "librados: {} as client.{} ({})",
        config.python,
        config.client_id,
        config.ceph_conf.as_deref().unwrap_or("default ceph.conf")
    ));
    summary.push(format!("Color Output: {}", config.enable_color));

    summary.join("\n")
}
