use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use url::Url;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::state::{DisplayRow, ScanState};
use crate::analyzer::classify_severity;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::fuzzer::{BypassProbe, expand};
use crate::http::{Pacer, Prober, TlsPolicy};
use crate::models::{DiscoveryRecord, ProbeResult, ProbeTarget, Task};

pub const QUEUE_POLL: Duration = Duration::from_secs(1);

pub struct ScanEngine {
    config: Arc<ScanConfig>,
    prober: Arc<dyn Prober>,
    state: Arc<ScanState>,
    wordlist: Arc<Vec<String>>,
    pacer: Pacer,
}

impl ScanEngine {
    pub fn new(
        config: Arc<ScanConfig>,
        prober: Arc<dyn Prober>,
        state: Arc<ScanState>,
        wordlist: Arc<Vec<String>>,
    ) -> Self {
        let pacer = Pacer::new(config.delay, config.jitter);
        Self {
            config,
            prober,
            state,
            wordlist,
            pacer,
        }
    }

    pub fn seed(&self, base_url: &str, depth: usize) -> usize {
        for word in self.wordlist.iter() {
            self.state
                .enqueue(Task::new(base_url, word.as_str()).with_depth(depth));
        }
        self.wordlist.len()
    }

    /// Pulls tasks until `shutdown` fires. A failing or panicking task is
    /// logged and still counted as completed.
    pub async fn worker(self: Arc<Self>, id: usize, shutdown: CancellationToken) {
        trace!("Worker {} started", id);

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let task = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                task = self.state.queue.pop_timeout(QUEUE_POLL) => task,
            };

            let Some(task) = task else {
                continue;
            };

            let label = format!("{}{}", task.base_url, task.fragment);
            match AssertUnwindSafe(self.process_task(task)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Error processing {}: {}", label, e),
                Err(_) => error!("Panic while processing {}", label),
            }

            self.state.progress.complete_task();
        }

        trace!("Worker {} exiting", id);
    }

    pub async fn process_task(&self, task: Task) -> Result<()> {
        if task.is_directory() {
            let queued = self.seed(&task.base_url, task.depth);
            debug!("Recursing into {} ({} paths)", task.base_url, queued);
            return Ok(());
        }

        let base = Url::parse(&task.base_url)?;

        for target in expand(&task.fragment, &self.config.extensions) {
            let full_url = base.join(&target.path)?.to_string();

            if !self.state.dedup.insert(&full_url) {
                trace!("Already probed {}", full_url);
                continue;
            }

            self.pacer.wait().await;
            let result = self
                .prober
                .probe(&full_url, &[], TlsPolicy::Configured)
                .await;

            self.handle_result(&task, &target, result).await;
        }

        Ok(())
    }

    async fn handle_result(&self, task: &Task, target: &ProbeTarget, result: ProbeResult) {
        let Some(status) = result.status else {
            return;
        };

        if !self.config.is_interesting(status)
            || !self.config.filter.passes(result.body.as_deref())
        {
            return;
        }

        let url = result.url;
        let severity = classify_severity(&target.path);
        debug!("Found {} [{}] {}", url, status, severity);

        self.state
            .results
            .add(DiscoveryRecord::discovered(url.clone(), status, severity));
        self.state
            .results
            .show(DisplayRow::discovery(status, &url, severity));

        if BypassProbe::should_trigger(Some(status)) {
            self.run_bypass(&url).await;
        }

        if self.should_recurse(task, target, status) {
            self.state.enqueue(Task::directory(url, task.depth + 1));
        }
    }

    async fn run_bypass(&self, url: &str) {
        let bypass = BypassProbe::new(self.prober.as_ref(), &self.config.filter, self.pacer);

        for hit in bypass.run(url).await {
            self.state
                .results
                .add(DiscoveryRecord::bypass(hit.url.clone(), hit.status, &hit.technique));
            self.state
                .results
                .show(DisplayRow::bypass(hit.status, &hit.url, &hit.technique));
        }
    }

    fn should_recurse(&self, task: &Task, target: &ProbeTarget, status: u16) -> bool {
        self.config.recursion
            && target.is_directory()
            && status != 404
            && self.config.allows_depth(task.depth + 1)
    }
}
