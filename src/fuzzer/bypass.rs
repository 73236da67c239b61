use tracing::{debug, info};

use super::headers::HeaderFuzzer;
use super::paths::PathMutator;
use crate::analyzer::ContentFilter;
use crate::http::{Pacer, Prober, TlsPolicy};
use crate::models::{ProbeResult, Technique};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BypassHit {
    pub url: String,
    pub status: u16,
    pub technique: Technique,
}

pub struct BypassProbe<'a> {
    prober: &'a dyn Prober,
    filter: &'a ContentFilter,
    pacer: Pacer,
}

impl<'a> BypassProbe<'a> {
    pub fn new(prober: &'a dyn Prober, filter: &'a ContentFilter, pacer: Pacer) -> Self {
        Self {
            prober,
            filter,
            pacer,
        }
    }

    pub fn should_trigger(status: Option<u16>) -> bool {
        matches!(status, Some(401 | 403))
    }

    pub async fn run(&self, url: &str) -> Vec<BypassHit> {
        debug!("Attempting bypass on {}", url);

        let mut hits = self.try_paths(url).await;
        hits.extend(self.try_headers(url).await);

        if !hits.is_empty() {
            info!("{} bypass(es) found for {}", hits.len(), url);
        }
        hits
    }

    async fn try_paths(&self, url: &str) -> Vec<BypassHit> {
        let mut hits = Vec::new();

        for variant in PathMutator::mutations(url) {
            self.pacer.wait().await;
            let response = self
                .prober
                .probe(&variant, &[], TlsPolicy::Configured)
                .await;

            if let Some(status) = self.succeeded(&response) {
                hits.push(BypassHit {
                    url: variant,
                    status,
                    technique: Technique::Path,
                });
            }
        }

        hits
    }

    async fn try_headers(&self, url: &str) -> Vec<BypassHit> {
        let mut hits = Vec::new();

        for payload in HeaderFuzzer::get_bypass_payloads(url) {
            self.pacer.wait().await;
            let response = self
                .prober
                .probe(url, &[payload.as_header()], TlsPolicy::Disabled)
                .await;

            if let Some(status) = self.succeeded(&response) {
                hits.push(BypassHit {
                    url: url.to_string(),
                    status,
                    technique: Technique::Header(payload.name),
                });
            } else if response.status.is_none() {
                debug!("Bypass header {} failed for {}", payload.name, url);
            }
        }

        hits
    }

    fn succeeded(&self, response: &ProbeResult) -> Option<u16> {
        match response.status {
            Some(status)
                if !matches!(status, 401 | 403) && self.filter.passes(response.body.as_deref()) =>
            {
                Some(status)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedProber {
        open_urls: Vec<&'static str>,
        open_header: Option<&'static str>,
        calls: Mutex<Vec<(String, Vec<(String, String)>, TlsPolicy)>>,
    }

    impl ScriptedProber {
        fn new(open_urls: Vec<&'static str>, open_header: Option<&'static str>) -> Self {
            Self {
                open_urls,
                open_header,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(
            &self,
            url: &str,
            extra_headers: &[(String, String)],
            tls: TlsPolicy,
        ) -> ProbeResult {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), extra_headers.to_vec(), tls));

            let header_hit = self
                .open_header
                .is_some_and(|h| extra_headers.iter().any(|(name, _)| name == h));
            let status = if self.open_urls.contains(&url) || header_hit {
                200
            } else {
                403
            };
            ProbeResult::new(url.to_string(), status, "body".to_string())
        }
    }

    fn pacer() -> Pacer {
        Pacer::new(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_trigger_condition() {
        assert!(BypassProbe::should_trigger(Some(401)));
        assert!(BypassProbe::should_trigger(Some(403)));
        assert!(!BypassProbe::should_trigger(Some(200)));
        assert!(!BypassProbe::should_trigger(Some(404)));
        assert!(!BypassProbe::should_trigger(Some(500)));
        assert!(!BypassProbe::should_trigger(None));
    }

    #[tokio::test]
    async fn test_twelve_attempts_with_tls_split() {
        let prober = ScriptedProber::new(vec![], None);
        let filter = ContentFilter::default();
        let bypass = BypassProbe::new(&prober, &filter, pacer());

        let hits = bypass.run("http://example.test/admin").await;
        assert!(hits.is_empty());

        let calls = prober.calls.lock().unwrap();
        assert_eq!(calls.len(), 12);
        assert!(calls[..6].iter().all(|(_, h, tls)| h.is_empty() && *tls == TlsPolicy::Configured));
        assert!(calls[6..].iter().all(|(url, h, tls)| {
            url == "http://example.test/admin" && h.len() == 1 && *tls == TlsPolicy::Disabled
        }));
    }

    #[tokio::test]
    async fn test_path_and_header_hits_tagged() {
        let prober = ScriptedProber::new(
            vec!["http://example.test/admin..;/"],
            Some("X-Forwarded-For"),
        );
        let filter = ContentFilter::default();
        let bypass = BypassProbe::new(&prober, &filter, pacer());

        let hits = bypass.run("http://example.test/admin").await;
        assert_eq!(
            hits,
            vec![
                BypassHit {
                    url: "http://example.test/admin..;/".to_string(),
                    status: 200,
                    technique: Technique::Path,
                },
                BypassHit {
                    url: "http://example.test/admin".to_string(),
                    status: 200,
                    technique: Technique::Header("X-Forwarded-For"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_filtered_body_is_not_a_hit() {
        let prober = ScriptedProber::new(vec!["http://example.test/admin."], None);
        let filter = ContentFilter::new(None, Some("body")).unwrap();
        let bypass = BypassProbe::new(&prober, &filter, pacer());

        assert!(bypass.run("http://example.test/admin").await.is_empty());
    }
}
