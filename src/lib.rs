pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod fuzzer;
pub mod http;
pub mod models;
pub mod reporter;
pub mod scanner;

pub use analyzer::{ContentFilter, classify_severity};
pub use config::{OutputFormat, Profile, ScanConfig, ScanOptions};
pub use error::ScanError;
pub use fuzzer::{BypassProbe, HeaderFuzzer, PathMutator, expand};
pub use http::{HttpClient, Prober, TlsPolicy};
pub use models::{DiscoveryRecord, ProbeResult, Severity, Task, Technique};
pub use reporter::{ConsoleReporter, JsonExporter, LiveView, ReportWriter};
pub use scanner::{ResultSink, ScanController, ScanMonitor, ScanOutcome, ScanPhase};
