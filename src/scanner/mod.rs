mod controller;
mod engine;
mod queue;
mod state;
mod wordlist;

pub use controller::{POLL_INTERVAL, ResultSink, ScanController, ScanMonitor, ScanOutcome, ScanPhase};
pub use engine::{QUEUE_POLL, ScanEngine};
pub use queue::TaskQueue;
pub use state::{DedupSet, DisplayRow, Progress, ProgressSnapshot, ResultCollector, ScanState};
pub use wordlist::{load_wordlist, parse_wordlist};
