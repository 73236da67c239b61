use async_trait::async_trait;

use crate::models::ProbeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    Configured,
    Disabled,
}

/// Issues one GET and reports what came back. Transport failures are folded
/// into a `ProbeResult` with no status; implementations never error out.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(
        &self,
        url: &str,
        extra_headers: &[(String, String)],
        tls: TlsPolicy,
    ) -> ProbeResult;
}
