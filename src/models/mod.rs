mod record;
mod task;

pub use record::{DiscoveryRecord, Finding, Severity, Technique};
pub use task::{ProbeResult, ProbeTarget, Task};
