mod bypass;
mod expander;
mod headers;
mod paths;

pub use bypass::{BypassHit, BypassProbe};
pub use expander::expand;
pub use headers::{HeaderFuzzer, HeaderPayload};
pub use paths::PathMutator;
