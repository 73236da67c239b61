use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::engine::ScanEngine;
use super::state::{DisplayRow, ProgressSnapshot, ScanState};
use super::wordlist::load_wordlist;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::http::Prober;
use crate::models::DiscoveryRecord;

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Loading,
    Seeding,
    Running,
    Draining,
    Cancelling,
    Exporting,
    Done,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanPhase::Idle => "idle",
            ScanPhase::Loading => "loading",
            ScanPhase::Seeding => "seeding",
            ScanPhase::Running => "running",
            ScanPhase::Draining => "draining",
            ScanPhase::Cancelling => "cancelling",
            ScanPhase::Exporting => "exporting",
            ScanPhase::Done => "done",
        };
        write!(f, "{}", s)
    }
}

pub trait ResultSink: Send + Sync {
    fn export(&self, records: &[DiscoveryRecord]);
}

#[derive(Clone)]
pub struct ScanMonitor {
    state: Arc<ScanState>,
    phase: watch::Receiver<ScanPhase>,
}

impl ScanMonitor {
    pub fn records(&self) -> Vec<DiscoveryRecord> {
        self.state.results.snapshot()
    }

    pub fn found(&self) -> usize {
        self.state.results.len()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.state.progress.snapshot()
    }

    pub fn displayed_since(&self, offset: usize) -> Vec<DisplayRow> {
        self.state.results.displayed_since(offset)
    }

    pub fn phase(&self) -> ScanPhase {
        *self.phase.borrow()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase(), ScanPhase::Exporting | ScanPhase::Done)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub records: Vec<DiscoveryRecord>,
    pub progress: ProgressSnapshot,
    pub cancelled: bool,
    pub duration: Duration,
}

pub struct ScanController {
    config: Arc<ScanConfig>,
    prober: Arc<dyn Prober>,
    state: Arc<ScanState>,
    phase: watch::Sender<ScanPhase>,
    poll_interval: Duration,
}

impl ScanController {
    pub fn new(config: ScanConfig, prober: Arc<dyn Prober>) -> Self {
        let (phase, _) = watch::channel(ScanPhase::Idle);
        Self {
            config: Arc::new(config),
            prober,
            state: Arc::new(ScanState::new()),
            phase,
            poll_interval: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn monitor(&self) -> ScanMonitor {
        ScanMonitor {
            state: self.state.clone(),
            phase: self.phase.subscribe(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        *self.phase.borrow()
    }

    fn set_phase(&self, phase: ScanPhase) {
        debug!("Scan phase: {}", phase);
        self.phase.send_replace(phase);
    }

    /// Runs one scan to completion or until `cancel` fires, then hands
    /// whatever was collected to `sink`. Fails only if the wordlist cannot
    /// be loaded, in which case nothing is probed or exported.
    pub async fn run(&self, sink: &dyn ResultSink, cancel: CancellationToken) -> Result<ScanOutcome> {
        let start = Instant::now();

        self.set_phase(ScanPhase::Loading);
        let words = match load_wordlist(&self.config.wordlist).await {
            Ok(words) => words,
            Err(e) => {
                error!("{}", e);
                self.set_phase(ScanPhase::Done);
                return Err(e);
            }
        };
        info!("Loaded {} words from {}", words.len(), self.config.wordlist.display());

        self.set_phase(ScanPhase::Seeding);
        let engine = Arc::new(ScanEngine::new(
            self.config.clone(),
            self.prober.clone(),
            self.state.clone(),
            Arc::new(words),
        ));
        let seeded = engine.seed(&self.config.target, 0);
        debug!("Seeded {} tasks against {}", seeded, self.config.target);

        self.set_phase(ScanPhase::Running);
        let shutdown = cancel.child_token();
        let mut workers = JoinSet::new();
        for id in 0..self.config.threads {
            workers.spawn(engine.clone().worker(id, shutdown.clone()));
        }
        info!("Started {} workers ({} profile)", self.config.threads, self.config.profile);

        let cancelled = self.wait_for_completion(&cancel).await;
        if cancelled {
            self.set_phase(ScanPhase::Cancelling);
            warn!("Scan interrupted; waiting for in-flight tasks");
        }

        shutdown.cancel();
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Worker failed: {}", e);
            }
        }

        self.set_phase(ScanPhase::Exporting);
        let records = self.state.results.snapshot();
        sink.export(&records);

        let progress = self.state.progress.snapshot();
        self.set_phase(ScanPhase::Done);
        info!(
            "Scan finished: {}/{} tasks, {} results in {:.2}s",
            progress.completed,
            progress.total,
            records.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(ScanOutcome {
            records,
            progress,
            cancelled,
            duration: start.elapsed(),
        })
    }

    async fn wait_for_completion(&self, cancel: &CancellationToken) -> bool {
        let mut ticker = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return true,
                _ = ticker.tick() => {
                    let progress = self.state.progress.snapshot();
                    let queue_empty = self.state.queue.is_empty();

                    if progress.is_done() && queue_empty {
                        return false;
                    }
                    if queue_empty && self.phase() == ScanPhase::Running {
                        self.set_phase(ScanPhase::Draining);
                    } else if !queue_empty && self.phase() == ScanPhase::Draining {
                        // recursion refilled the queue
                        self.set_phase(ScanPhase::Running);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanOptions;
    use crate::http::TlsPolicy;
    use crate::models::ProbeResult;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingSink {
        exports: Mutex<Vec<usize>>,
    }

    impl ResultSink for CountingSink {
        fn export(&self, records: &[DiscoveryRecord]) {
            self.exports.lock().unwrap().push(records.len());
        }
    }

    struct SlowProber(Duration);

    #[async_trait]
    impl Prober for SlowProber {
        async fn probe(&self, url: &str, _: &[(String, String)], _: TlsPolicy) -> ProbeResult {
            tokio::time::sleep(self.0).await;
            ProbeResult::new(url.to_string(), 200, String::new())
        }
    }

    fn wordlist(words: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for word in words {
            writeln!(file, "{}", word).unwrap();
        }
        file
    }

    fn controller(path: &std::path::Path, threads: usize, prober: Arc<dyn Prober>) -> ScanController {
        let mut opts = ScanOptions::new("http://example.test/", path);
        opts.threads = threads;
        opts.delay = 0.0;
        opts.jitter = 0.0;
        opts.extensions = vec![];
        ScanController::new(ScanConfig::new(opts).unwrap(), prober)
            .with_poll_interval(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_missing_wordlist_aborts_without_export() {
        let sink = CountingSink::default();
        let controller = controller(
            std::path::Path::new("/nonexistent/words.txt"),
            2,
            Arc::new(SlowProber(Duration::ZERO)),
        );

        let err = controller
            .run(&sink, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(sink.exports.lock().unwrap().is_empty());
        assert_eq!(controller.phase(), ScanPhase::Done);
    }

    #[tokio::test]
    async fn test_empty_wordlist_completes_and_exports_once() {
        let file = wordlist(&[]);
        let sink = CountingSink::default();
        let controller = controller(file.path(), 4, Arc::new(SlowProber(Duration::ZERO)));

        let outcome = controller.run(&sink, CancellationToken::new()).await.unwrap();
        assert!(!outcome.cancelled);
        assert!(outcome.records.is_empty());
        assert_eq!(*sink.exports.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_completes_all_tasks() {
        let file = wordlist(&["a", "b", "c", "d", "e"]);
        let sink = CountingSink::default();
        let controller = controller(file.path(), 3, Arc::new(SlowProber(Duration::from_millis(5))));
        let monitor = controller.monitor();

        let outcome = controller.run(&sink, CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.progress, ProgressSnapshot { completed: 5, total: 5 });
        assert_eq!(outcome.records.len(), 5);
        assert_eq!(monitor.found(), 5);
        assert_eq!(monitor.phase(), ScanPhase::Done);
        assert_eq!(*sink.exports.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_cancel_exports_partial_results() {
        let words: Vec<String> = (0..200).map(|i| format!("w{}", i)).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let file = wordlist(&refs);
        let sink = CountingSink::default();
        let controller = controller(file.path(), 2, Arc::new(SlowProber(Duration::from_millis(20))));
        let monitor = controller.monitor();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcome = controller.run(&sink, cancel).await.unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.progress.completed < 200);
        assert!(outcome.progress.completed <= outcome.progress.total);
        assert_eq!(sink.exports.lock().unwrap().len(), 1);
        assert_eq!(monitor.records().len(), outcome.records.len());
    }
}
