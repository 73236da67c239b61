use std::collections::HashSet;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pathhunter::config::{OutputFormat, ScanConfig, ScanOptions};
use pathhunter::models::{Finding, ProbeResult, Severity};
use pathhunter::reporter::{JsonExporter, ReportWriter};
use pathhunter::scanner::{ScanController, ScanPhase};
use pathhunter::{Prober, TlsPolicy};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct ScriptedProber {
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedProber {
    fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, url: &str, extra_headers: &[(String, String)], _: TlsPolicy) -> ProbeResult {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), extra_headers.len()));

        let status = if url == "http://example.test/admin/" {
            200
        } else if url.starts_with("http://example.test/backup.php") {
            403
        } else {
            404
        };
        ProbeResult::new(url.to_string(), status, format!("status {}", status))
    }
}

fn setup(dir: &TempDir, words: &str, recursion: bool) -> ScanConfig {
    let wordlist = dir.path().join("words.txt");
    fs::write(&wordlist, words).unwrap();

    let mut options = ScanOptions::new("http://example.test/", wordlist);
    options.threads = 4;
    options.delay = 0.0;
    options.jitter = 0.0;
    options.extensions = vec!["php".to_string()];
    options.recursion = recursion;
    ScanConfig::new(options).unwrap()
}

#[tokio::test]
async fn test_admin_backup_scenario() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "admin\nbackup\n", true);
    let prober = Arc::new(ScriptedProber::default());
    let base = dir.path().join("results");
    let writer = ReportWriter::new(base.to_str().unwrap(), vec![OutputFormat::Json, OutputFormat::Txt]);

    let controller =
        ScanController::new(config, prober.clone()).with_poll_interval(Duration::from_millis(20));
    let outcome = controller.run(&writer, CancellationToken::new()).await.unwrap();

    assert!(!outcome.cancelled);
    assert_eq!(controller.phase(), ScanPhase::Done);

    let mut records = outcome.records.clone();
    records.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, "http://example.test/admin/");
    assert_eq!(records[0].finding, Finding::Severity(Severity::Low));
    assert_eq!(records[1].url, "http://example.test/backup.php");
    assert_eq!(records[1].status, Some(403));
    assert_eq!(records[1].finding, Finding::Severity(Severity::High));

    let calls = prober.calls();

    // Recursion replayed the wordlist under the discovered directory.
    let urls: HashSet<&str> = calls.iter().map(|(u, _)| u.as_str()).collect();
    assert!(urls.contains("http://example.test/admin/admin/"));
    assert!(urls.contains("http://example.test/admin/backup.php"));

    // Six mutated paths plus six header injections against backup.php.
    let header_attempts = calls
        .iter()
        .filter(|(u, h)| u == "http://example.test/backup.php" && *h == 1)
        .count();
    assert_eq!(header_attempts, 6);
    let path_attempts = calls
        .iter()
        .filter(|(u, h)| *h == 0 && u.starts_with("http://example.test/backup.php") && u.len() > 30)
        .count();
    assert_eq!(path_attempts, 6);

    // Outside the bypass probe no URL is requested twice.
    let main_probes: Vec<&str> = calls
        .iter()
        .filter(|(u, h)| *h == 0 && !(u.starts_with("http://example.test/backup.php") && u.len() > 30))
        .map(|(u, _)| u.as_str())
        .collect();
    let unique: HashSet<&str> = main_probes.iter().copied().collect();
    assert_eq!(main_probes.len(), unique.len());

    // seed tasks + directory task + its two children
    assert_eq!(outcome.progress.total, 5);
    assert_eq!(outcome.progress.completed, 5);

    let saved = JsonExporter::load(dir.path().join("results.json").to_str().unwrap()).unwrap();
    assert_eq!(saved.len(), 2);
    let txt = fs::read_to_string(dir.path().join("results.txt")).unwrap();
    assert!(txt.contains("403\thttp://example.test/backup.php\thigh"));
}

#[tokio::test]
async fn test_no_recursion_without_flag() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir, "admin\n", false);
    let prober = Arc::new(ScriptedProber::default());
    let writer = ReportWriter::new(dir.path().join("r").to_str().unwrap(), vec![OutputFormat::Json]);

    let controller =
        ScanController::new(config, prober.clone()).with_poll_interval(Duration::from_millis(20));
    let outcome = controller.run(&writer, CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.progress.total, 1);
    assert_eq!(
        prober.calls(),
        vec![
            ("http://example.test/admin/".to_string(), 0),
            ("http://example.test/admin.php".to_string(), 0),
        ]
    );
}

#[tokio::test]
async fn test_unreachable_target_exports_empty_set() {
    let dir = TempDir::new().unwrap();
    let wordlist = dir.path().join("words.txt");
    fs::write(&wordlist, "admin\nlogin\n").unwrap();

    let mut options = ScanOptions::new("http://127.0.0.1:1/", wordlist);
    options.threads = 2;
    options.delay = 0.0;
    options.jitter = 0.0;
    options.timeout = 2;
    let config = ScanConfig::new(options).unwrap();
    let client = pathhunter::HttpClient::new(&config).unwrap();
    let writer = ReportWriter::new(dir.path().join("r").to_str().unwrap(), vec![OutputFormat::Json]);

    let controller =
        ScanController::new(config, Arc::new(client)).with_poll_interval(Duration::from_millis(20));
    let outcome = controller.run(&writer, CancellationToken::new()).await.unwrap();

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.progress.completed, 2);
    assert!(!dir.path().join("r.json").exists());
}
