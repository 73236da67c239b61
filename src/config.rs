use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use url::Url;

use crate::analyzer::ContentFilter;
use crate::error::{Result, ScanError};

pub const DEFAULT_EXTENSIONS: &[&str] = &["php", "html", "bak", "txt", "zip", "asp", "aspx"];
pub const DEFAULT_INTERESTING_CODES: &[u16] = &[200, 204, 301, 302, 307, 308, 401, 403, 405];
pub const DEFAULT_THREADS: usize = 30;
pub const DEFAULT_DELAY_SECS: f64 = 0.1;
pub const DEFAULT_JITTER_SECS: f64 = 0.5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const STEALTH_MAX_THREADS: usize = 10;
const STEALTH_MIN_DELAY: f64 = 1.5;
const AGGRESSIVE_MIN_THREADS: usize = 100;
const AGGRESSIVE_MIN_DELAY: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Profile {
    Stealth,
    #[default]
    Balanced,
    Aggressive,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Profile::Stealth => "stealth",
            Profile::Balanced => "balanced",
            Profile::Aggressive => "aggressive",
        };
        write!(f, "{}", s)
    }
}

impl Profile {
    /// Delays are only ever floored, never capped: an aggressive scan keeps a
    /// large user-supplied delay as is.
    pub fn tune(&self, threads: usize, delay: f64) -> (usize, f64) {
        match self {
            Profile::Stealth => (threads.min(STEALTH_MAX_THREADS), delay.max(STEALTH_MIN_DELAY)),
            Profile::Aggressive => (
                threads.max(AGGRESSIVE_MIN_THREADS),
                delay.max(AGGRESSIVE_MIN_DELAY),
            ),
            Profile::Balanced => (threads, delay),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Json,
    Csv,
    Txt,
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Txt => "txt",
            OutputFormat::Html => "html",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            "txt" => Some(OutputFormat::Txt),
            "html" => Some(OutputFormat::Html),
            _ => None,
        }
    }

    pub fn parse_list(input: &str) -> Result<Vec<Self>> {
        let mut formats = Vec::new();
        for part in input.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.eq_ignore_ascii_case("all") {
                return Ok(vec![OutputFormat::Json, OutputFormat::Csv, OutputFormat::Txt]);
            }
            let format = Self::parse(trimmed).ok_or_else(|| {
                ScanError::InvalidConfig(format!(
                    "unknown output format '{}'. Supported: json, csv, txt, html, all",
                    trimmed
                ))
            })?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            formats.push(OutputFormat::Json);
        }
        Ok(formats)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub target: String,
    pub wordlist: PathBuf,
    pub threads: usize,
    pub delay: f64,
    pub jitter: f64,
    pub profile: Profile,
    pub extensions: Vec<String>,
    pub status_codes: Vec<u16>,
    pub recursion: bool,
    pub max_depth: Option<usize>,
    pub include_regex: Option<String>,
    pub exclude_regex: Option<String>,
    pub proxy: Option<String>,
    pub verify_tls: bool,
    pub timeout: u64,
}

impl ScanOptions {
    pub fn new(target: impl Into<String>, wordlist: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            wordlist: wordlist.into(),
            threads: DEFAULT_THREADS,
            delay: DEFAULT_DELAY_SECS,
            jitter: DEFAULT_JITTER_SECS,
            profile: Profile::Balanced,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            status_codes: DEFAULT_INTERESTING_CODES.to_vec(),
            recursion: false,
            max_depth: None,
            include_regex: None,
            exclude_regex: None,
            proxy: None,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: String,
    pub wordlist: PathBuf,
    pub threads: usize,
    pub delay: Duration,
    pub jitter: Duration,
    pub profile: Profile,
    pub extensions: Vec<String>,
    pub interesting: BTreeSet<u16>,
    pub recursion: bool,
    pub max_depth: Option<usize>,
    pub filter: ContentFilter,
    pub proxy: Option<String>,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl ScanConfig {
    pub fn new(options: ScanOptions) -> Result<Self> {
        validate_target(&options.target)?;

        if options.threads == 0 {
            return Err(ScanError::InvalidConfig("thread count must be at least 1".into()));
        }
        if !options.delay.is_finite() || options.delay < 0.0 {
            return Err(ScanError::InvalidConfig(format!(
                "delay must be a non-negative number of seconds, got {}",
                options.delay
            )));
        }
        if !options.jitter.is_finite() || options.jitter < 0.0 {
            return Err(ScanError::InvalidConfig(format!(
                "jitter must be a non-negative number of seconds, got {}",
                options.jitter
            )));
        }

        let (threads, delay) = options.profile.tune(options.threads, options.delay);
        let delay = seconds("delay", delay)?;
        let jitter = seconds("jitter", options.jitter)?;

        let extensions = options
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();

        let filter = ContentFilter::new(
            options.include_regex.as_deref(),
            options.exclude_regex.as_deref(),
        )?;

        Ok(Self {
            target: options.target,
            wordlist: options.wordlist,
            threads,
            delay,
            jitter,
            profile: options.profile,
            extensions,
            interesting: options.status_codes.into_iter().collect(),
            recursion: options.recursion,
            max_depth: options.max_depth,
            filter,
            proxy: options.proxy,
            verify_tls: options.verify_tls,
            timeout: Duration::from_secs(options.timeout),
        })
    }

    pub fn is_interesting(&self, status: u16) -> bool {
        self.interesting.contains(&status)
    }

    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }
}

pub fn validate_target(target: &str) -> Result<()> {
    if !(target.starts_with("http://") || target.starts_with("https://")) {
        return Err(ScanError::InvalidTarget(target.to_string()));
    }
    match Url::parse(target) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        _ => Err(ScanError::InvalidTarget(target.to_string())),
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ScanError::InvalidConfig(format!("{} of {} seconds is out of range", name, value))
    })
}
