use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{OutputFormat, ScanConfig};
use crate::models::{DiscoveryRecord, Severity};
use crate::scanner::{DisplayRow, ScanMonitor, ScanOutcome};

pub fn format_status(status: u16) -> ColoredString {
    let text = status.to_string();
    match status {
        200..=299 => text.green().bold(),
        300..=399 => text.blue().bold(),
        400..=499 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

fn format_label(label: &str) -> ColoredString {
    match label {
        "high" => "HIGH".red().bold(),
        "medium" => "MEDIUM".yellow(),
        "low" => "LOW".blue(),
        other => other.magenta().bold(),
    }
}

pub fn format_row(row: &DisplayRow) -> String {
    format!(
        "{:>5}  {}  {}",
        format_status(row.status),
        row.url,
        format_label(&row.label)
    )
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Finding")]
    finding: String,
}

pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_banner(&self) {
        println!(
            "{}",
            r#"
 ____       _   _     _   _             _
|  _ \ __ _| |_| |__ | | | |_   _ _ __ | |_ ___ _ __
| |_) / _` | __| '_ \| |_| | | | | '_ \| __/ _ \ '__|
|  __/ (_| | |_| | | |  _  | |_| | | | | ||  __/ |
|_|   \__,_|\__|_| |_|_| |_|\__,_|_| |_|\__\___|_|
        Web Content Discovery"#
                .cyan()
                .bold()
        );
    }

    pub fn print_config(&self, config: &ScanConfig, output: &str, formats: &[OutputFormat]) {
        let none = || "None".to_string();
        let formats: Vec<String> = formats.iter().map(|f| f.to_string()).collect();

        println!("\n{}", "Scan Configuration".green().bold().underline());
        println!("  {:<14} {}", "Target", config.target.yellow());
        println!("  {:<14} {}", "Wordlist", config.wordlist.display());
        println!("  {:<14} {}", "Threads", config.threads);
        println!("  {:<14} {}", "Profile", config.profile);
        println!("  {:<14} {}", "Recursion", config.recursion);
        println!("  {:<14} {:.2}s", "Delay", config.delay.as_secs_f64());
        println!(
            "  {:<14} {}",
            "Include Regex",
            config.filter.include_pattern().map(str::to_string).unwrap_or_else(none)
        );
        println!(
            "  {:<14} {}",
            "Exclude Regex",
            config.filter.exclude_pattern().map(str::to_string).unwrap_or_else(none)
        );
        println!("  {:<14} {}", "Output Base", output);
        println!("  {:<14} {}\n", "Formats", formats.join(", "));
    }

    pub fn print_results(&self, records: &[DiscoveryRecord]) {
        if records.is_empty() {
            println!("\n{}", "No interesting paths found.".green());
            return;
        }

        let rows: Vec<TableRow> = records
            .iter()
            .map(|r| TableRow {
                status: r
                    .status
                    .map(|s| format_status(s).to_string())
                    .unwrap_or_else(|| "-".to_string()),
                url: r.url.clone(),
                finding: match (r.severity(), r.technique()) {
                    (Some(severity), _) => format_label(&severity.to_string()).to_string(),
                    (None, Some(technique)) => format!("bypass ({})", technique).magenta().to_string(),
                    (None, None) => String::new(),
                },
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("\n{}", table);
    }

    pub fn print_summary(&self, outcome: &ScanOutcome) {
        let count = |severity: Severity| {
            outcome
                .records
                .iter()
                .filter(|r| r.severity() == Some(severity))
                .count()
        };
        let bypasses = outcome.records.iter().filter(|r| r.is_bypass()).count();

        println!("\n{}", "Summary".bold().underline());
        println!(
            "{}/{} tasks completed in {:.2}s",
            outcome.progress.completed,
            outcome.progress.total,
            outcome.duration.as_secs_f64()
        );
        println!("  {}: {}", "HIGH".red().bold(), count(Severity::High));
        println!("  {}: {}", "MEDIUM".yellow(), count(Severity::Medium));
        println!("  {}: {}", "LOW".blue(), count(Severity::Low));
        println!("  {}: {}", "BYPASS".magenta().bold(), bypasses);

        if outcome.cancelled {
            println!("\n{}", "Scan interrupted; partial results shown.".red().bold());
        }
        println!();
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LiveView {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl LiveView {
    pub fn start(monitor: ScanMonitor, refresh: Duration) -> Self {
        let stop = CancellationToken::new();
        let pb = Self::create_progress_bar();

        let handle = tokio::spawn({
            let stop = stop.clone();
            async move {
                let mut ticker = tokio::time::interval(refresh);
                let mut shown = 0;

                loop {
                    let stopping = tokio::select! {
                        _ = stop.cancelled() => true,
                        _ = ticker.tick() => false,
                    };

                    let progress = monitor.progress();
                    pb.set_length(progress.total as u64);
                    pb.set_position(progress.completed as u64);
                    pb.set_message(format!("Found: {}", monitor.found()));

                    for row in monitor.displayed_since(shown) {
                        pb.println(format_row(&row));
                        shown += 1;
                    }

                    if stopping || monitor.is_finished() {
                        break;
                    }
                }

                pb.finish_with_message(format!("Found: {}", monitor.found()));
            }
        });

        Self { stop, handle }
    }

    fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    pub async fn finish(self) {
        self.stop.cancel();
        let _ = self.handle.await;
    }
}
