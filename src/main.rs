use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pathhunter::cli::{Cli, Commands, ScanArgs};
use pathhunter::config::{OutputFormat, ScanConfig, ScanOptions, validate_target};
use pathhunter::http::HttpClient;
use pathhunter::reporter::{ConsoleReporter, JsonExporter, LiveView, ReportWriter, output_path};
use pathhunter::scanner::ScanController;
use pathhunter::ScanError;

const LIVE_REFRESH: Duration = Duration::from_millis(200);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Scan(args) => handle_scan(args).await,
        Commands::Report {
            input,
            format,
            output,
        } => handle_report(&input, &format, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
        let exit_code = match e.downcast_ref::<ScanError>() {
            Some(err) if err.is_configuration() => 2,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn handle_scan(args: ScanArgs) -> Result<()> {
    validate_target(&args.url)?;

    let wordlist = args.resolve_wordlist();
    if !wordlist.is_file() {
        return Err(ScanError::WordlistNotFound(wordlist.display().to_string()).into());
    }

    let formats = OutputFormat::parse_list(&args.format)?;

    let mut options = ScanOptions::new(args.url.clone(), wordlist);
    options.threads = args.threads;
    options.delay = args.delay;
    options.jitter = args.jitter;
    options.profile = args.profile;
    options.extensions = args.extensions;
    options.status_codes = args.status;
    options.recursion = args.recursion;
    options.max_depth = args.max_depth;
    options.include_regex = args.include_regex;
    options.exclude_regex = args.exclude_regex;
    options.proxy = args.proxy;
    options.verify_tls = !args.insecure;
    options.timeout = args.timeout;

    let config = ScanConfig::new(options)?;

    let reporter = ConsoleReporter::new();
    reporter.print_banner();
    reporter.print_config(&config, &args.output, &formats);

    let client = HttpClient::new(&config).context("Failed to create HTTP client")?;
    let controller = ScanController::new(config, Arc::new(client));
    let writer = ReportWriter::new(args.output.clone(), formats.clone());

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Scan interrupted by user");
                cancel.cancel();
            }
        }
    });

    println!("Starting {} scan on: {}\n", controller.config().profile, args.url);

    let view = LiveView::start(controller.monitor(), LIVE_REFRESH);
    let outcome = controller.run(&writer, cancel).await;
    view.finish().await;
    let outcome = outcome?;

    reporter.print_results(&outcome.records);
    reporter.print_summary(&outcome);

    if !outcome.records.is_empty() {
        let base = std::path::absolute(&args.output).unwrap_or_else(|_| args.output.clone().into());
        let got: Vec<String> = formats.iter().map(|f| f.to_string()).collect();
        println!(
            "{}",
            format!(
                "Results saved (formats: {}) with base: {}",
                got.join(", "),
                base.display()
            )
            .green()
            .bold()
        );
    }

    Ok(())
}

fn handle_report(input: &str, format: &str, output: Option<&str>) -> Result<()> {
    let records = JsonExporter::load(input)?;

    if format.eq_ignore_ascii_case("console") {
        let reporter = ConsoleReporter::new();
        reporter.print_results(&records);
        return Ok(());
    }

    let format = OutputFormat::parse(format)
        .with_context(|| format!("Unknown format '{}'. Supported: json, csv, txt, html, console", format))?;

    let base = output.unwrap_or_else(|| input.trim_end_matches(".json"));
    let path = output_path(base, format);
    ReportWriter::write(format, &records, &path)?;
    println!("Report written to {}", path);

    Ok(())
}
