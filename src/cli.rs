use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{
    DEFAULT_DELAY_SECS, DEFAULT_EXTENSIONS, DEFAULT_INTERESTING_CODES, DEFAULT_JITTER_SECS,
    DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS, Profile,
};

#[derive(Parser)]
#[command(name = "pathhunter")]
#[command(version, about = "Concurrent web content discovery with recursion and 401/403 bypass probing")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "-v debug, -vv trace (RUST_LOG overrides)")]
    pub verbose: u8,

    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Brute-force paths under a target URL")]
    Scan(ScanArgs),

    #[command(about = "Re-render a saved JSON result file")]
    Report {
        #[arg(short, long)]
        input: String,

        #[arg(short, long, default_value = "console", help = "json, csv, txt, html or console")]
        format: String,

        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Fast,
    Balanced,
    Deep,
}

impl Mode {
    pub fn wordlist(&self) -> &'static str {
        match self {
            Mode::Fast => "wordlists/common.txt",
            Mode::Balanced => "wordlists/medium.txt",
            Mode::Deep => "wordlists/large.txt",
        }
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(help = "Target URL (must start with http:// or https://)")]
    pub url: String,

    #[arg(short, long, help = "Custom wordlist (overrides --mode)")]
    pub wordlist: Option<String>,

    #[arg(long, value_enum, default_value = "balanced")]
    pub mode: Mode,

    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    #[arg(long, default_value_t = DEFAULT_DELAY_SECS, help = "Base delay before each request, in seconds")]
    pub delay: f64,

    #[arg(long, default_value_t = DEFAULT_JITTER_SECS, help = "Random extra delay on top of --delay, in seconds")]
    pub jitter: f64,

    #[arg(long, value_enum, default_value_t = Profile::Balanced)]
    pub profile: Profile,

    #[arg(long, help = "Re-scan discovered directories")]
    pub recursion: bool,

    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long, help = "Only keep responses whose body matches")]
    pub include_regex: Option<String>,

    #[arg(long, help = "Drop responses whose body matches")]
    pub exclude_regex: Option<String>,

    #[arg(short = 'x', long, value_delimiter = ',', default_values_t = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect::<Vec<_>>())]
    pub extensions: Vec<String>,

    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_INTERESTING_CODES.to_vec(), help = "Status codes worth reporting")]
    pub status: Vec<u16>,

    #[arg(long)]
    pub proxy: Option<String>,

    #[arg(short = 'k', long, help = "Skip TLS certificate verification")]
    pub insecure: bool,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Per-request timeout, in seconds")]
    pub timeout: u64,

    #[arg(short, long, default_value = "scan_results", help = "Output base filename; the format extension is added per format")]
    pub output: String,

    #[arg(long, default_value = "json", help = "Comma-separated: json, csv, txt, html or all")]
    pub format: String,
}

impl ScanArgs {
    pub fn resolve_wordlist(&self) -> PathBuf {
        let install_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        resolve_wordlist(self.wordlist.as_deref(), self.mode, install_dir.as_deref())
    }
}

// Relative paths are tried against the working directory first, then next to
// the executable so the bundled wordlists work from anywhere.
pub fn resolve_wordlist(explicit: Option<&str>, mode: Mode, install_dir: Option<&Path>) -> PathBuf {
    let requested = PathBuf::from(explicit.unwrap_or_else(|| mode.wordlist()));
    if requested.is_absolute() || requested.is_file() {
        return requested;
    }

    match install_dir.map(|dir| dir.join(&requested)) {
        Some(candidate) if candidate.is_file() => candidate,
        _ => requested,
    }
}
