mod filter;
mod severity;

pub use filter::ContentFilter;
pub use severity::classify_severity;
