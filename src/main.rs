//! cls-overhead - Main CLI Application

use clap::Parser;
use cls_overhead::{
    cli::{Cli, Command, ExtractArgs, ProbeArgs, SummarizeArgs},
    cluster::{LibradosBridge, MonClient, RestfulMonClient},
    config::parser::{display_config_summary, load_config},
    error::{ErrorReporter, Result},
    extract::{aggregate_call_costs, extract_call_costs, CallCostParser},
    logging::Logger,
    lua::parse_clock_reply,
    models::{Config, MonBackend},
    output::OutputFormatterFactory,
    probe::{exec_probe, random_payload, set_lua_class, ExecProbe, ProbeOptions},
    summarize::summarize_results,
    BUILD_TIME, GIT_COMMIT, PKG_NAME, VERSION,
};
use std::io::{self, Write};
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    let reporter = ErrorReporter::new(cli.use_colors(), true);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    let use_colors = cli.use_colors();
    let command_name = cli.command_name();
    let command = cli.command.clone();

    let mut config = load_config(cli)?;
    config.enable_color = config.enable_color && use_colors;
    colored::control::set_override(config.enable_color);

    let logger = Logger::with_config(PKG_NAME, &config).child(command_name);
    logger.start_session().await;
    logger.add_context_field("command", command_name).await;
    logger.debug("starting")
        .field("version", VERSION)
        .field("commit", GIT_COMMIT)
        .field("built", BUILD_TIME)
        .log()
        .await;
    if config.debug {
        eprintln!("{}", display_config_summary(&config));
    }

    match command {
        Command::Extract(args) => run_extract(&args, &config, &logger).await,
        Command::Summarize(args) => run_summarize(&args, &config, &logger).await,
        Command::SetLuaClass(args) => run_probe(&args, &config, &logger).await,
    }
}

async fn run_extract(args: &ExtractArgs, config: &Config, logger: &Logger) -> Result<()> {
    let parser = CallCostParser::new()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.summary {
        let count = extract_call_costs(&parser, stdin.lock(), &mut out)?;
        out.flush()?;
        logger.info("extraction finished").field("matches", count).log().await;
        return Ok(());
    }

    let aggregator = aggregate_call_costs(&parser, stdin.lock())?;
    if aggregator.skipped() > 0 {
        logger.warn("call costs too large to aggregate")
            .field("skipped", aggregator.skipped())
            .log()
            .await;
    }

    let summaries = aggregator.summaries()?;
    let formatter = OutputFormatterFactory::create_formatter(args.format, config.enable_color);
    let rendered = formatter.format_summaries(&summaries)?;
    if !rendered.is_empty() {
        writeln!(out, "{}", rendered)?;
    }
    Ok(())
}

async fn run_summarize(args: &SummarizeArgs, config: &Config, logger: &Logger) -> Result<()> {
    let pattern = config.results_pattern();
    let operation = logger.start_operation("summarize").await;

    let report = match summarize_results(&pattern) {
        Ok(report) => report,
        Err(e) => {
            logger.end_operation(&operation, "summarize", false).await;
            return Err(e);
        }
    };

    for skipped in &report.skipped {
        logger.warn("skipping result file")
            .correlation_id(&operation)
            .field("file", &skipped.file)
            .field("reason", &skipped.reason)
            .log()
            .await;
    }
    for summary in &report.summaries {
        logger.debug("summarized").correlation_id(&operation).summary(summary).log().await;
    }
    if report.summaries.is_empty() && report.skipped.is_empty() {
        logger.warn("no result files matched").field("pattern", &pattern).log().await;
    }

    let formatter = OutputFormatterFactory::create_formatter(args.format, config.enable_color);
    let rendered = formatter.format_summaries(&report.summaries)?;
    let mut out = io::stdout().lock();
    if !rendered.is_empty() {
        writeln!(out, "{}", rendered)?;
    }

    logger.end_operation(&operation, "summarize", true).await;
    Ok(())
}

async fn run_probe(args: &ProbeArgs, config: &Config, logger: &Logger) -> Result<()> {
    let librados = LibradosBridge::from_config(config)?;
    let (mon, channel): (Box<dyn MonClient>, String) = match config.backend {
        MonBackend::Rest => {
            let rest = RestfulMonClient::from_config(config)?;
            let url = rest.request_url().to_string();
            (Box::new(rest), url)
        }
        MonBackend::Librados => (Box::new(librados.clone()), format!("librados client.{}", config.client_id)),
    };
    let options = ProbeOptions {
        pool: config.pool.clone(),
        script: args.script.script(),
        repeat: args.repeat,
        timeout: config.timeout(),
        settle: Duration::from_secs(args.settle),
    };

    logger.info("installing lua class")
        .field("endpoint", &channel)
        .field("pool", &options.pool)
        .field("method", options.script.method())
        .field("repeat", options.repeat)
        .log()
        .await;

    let mut out = io::stdout().lock();
    let replies = set_lua_class(mon.as_ref(), &mut out, &options).await?;
    for reply in &replies {
        logger.debug("monitor reply").mon_reply(reply).log().await;
    }

    let Some(object) = args.object.clone() else {
        return Ok(());
    };

    let payload = match &args.data {
        Some(data) => data.clone().into_bytes(),
        None => random_payload(args.size),
    };
    let probe = ExecProbe {
        object,
        class: args.class.clone(),
        method: args.method.clone()
            .unwrap_or_else(|| options.script.method().to_string()),
        payload,
        input: random_payload(args.input_size),
    };

    match exec_probe(&librados, &mut out, &probe).await {
        Ok(reply) => {
            let mut entry = logger.info("exec finished").field("status", reply.status);
            if let Some((seq, clock)) = parse_clock_reply(&reply.output_lossy()) {
                entry = entry.field("seq", seq).field("osd_clock", clock);
            }
            entry.log().await;
            Ok(())
        }
        Err(e) => {
            logger.error("exec probe failed").error_info(&e).log().await;
            Err(e)
        }
    }
}
