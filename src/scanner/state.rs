use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dashmap::DashSet;

use super::queue::TaskQueue;
use crate::models::{DiscoveryRecord, Severity, Technique};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct DedupSet {
    visited: DashSet<String>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.visited.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Task accounting. `total` is bumped before a task is queued and
/// `completed` after it finishes, so `completed <= total` always holds.
#[derive(Default)]
pub struct Progress {
    total: AtomicUsize,
    completed: AtomicUsize,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn complete_task(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        // completed first: total can only have grown since.
        let completed = self.completed.load(Ordering::SeqCst);
        let total = self.total.load(Ordering::SeqCst);
        ProgressSnapshot { completed, total }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub status: u16,
    pub url: String,
    pub label: String,
}

impl DisplayRow {
    pub fn discovery(status: u16, url: &str, severity: Severity) -> Self {
        Self {
            status,
            url: url.to_string(),
            label: severity.to_string(),
        }
    }

    pub fn bypass(status: u16, url: &str, technique: &Technique) -> Self {
        Self {
            status,
            url: url.to_string(),
            label: technique.display_label().to_string(),
        }
    }
}

#[derive(Default)]
struct DisplayFeed {
    urls: HashSet<String>,
    rows: Vec<DisplayRow>,
}

#[derive(Default)]
pub struct ResultCollector {
    records: Mutex<Vec<DiscoveryRecord>>,
    displayed: Mutex<DisplayFeed>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, record: DiscoveryRecord) {
        lock(&self.records).push(record);
    }

    pub fn snapshot(&self) -> Vec<DiscoveryRecord> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    pub fn show(&self, row: DisplayRow) -> bool {
        let mut feed = lock(&self.displayed);
        if !feed.urls.insert(row.url.clone()) {
            return false;
        }
        feed.rows.push(row);
        true
    }

    pub fn displayed_since(&self, offset: usize) -> Vec<DisplayRow> {
        let feed = lock(&self.displayed);
        feed.rows.get(offset..).map(<[_]>::to_vec).unwrap_or_default()
    }
}

#[derive(Default)]
pub struct ScanState {
    pub queue: TaskQueue,
    pub dedup: DedupSet,
    pub progress: Progress,
    pub results: ResultCollector,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, task: crate::models::Task) {
        self.progress.add_task();
        self.queue.push(task);
    }

    pub fn is_complete(&self) -> bool {
        self.progress.snapshot().is_done() && self.queue.is_empty()
    }
}
