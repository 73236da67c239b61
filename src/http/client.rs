use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, CONNECTION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Proxy};
use tracing::{error, warn};

use super::prober::{Prober, TlsPolicy};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::models::ProbeResult;

pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0)",
];

pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

pub struct HttpClient {
    client: Client,
    insecure: Client,
}

impl HttpClient {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let client = Self::build(config, !config.verify_tls)?;
        let insecure = Self::build(config, true)?;

        Ok(Self { client, insecure })
    }

    fn build(config: &ScanConfig, accept_invalid_certs: bool) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(accept_invalid_certs);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(builder.build()?)
    }

    fn build_headers(extra_headers: &[(String, String)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(random_user_agent()));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        for (name, value) in extra_headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("Skipping malformed header {}: {}", name, value),
            }
        }

        headers
    }
}

#[async_trait]
impl Prober for HttpClient {
    async fn probe(
        &self,
        url: &str,
        extra_headers: &[(String, String)],
        tls: TlsPolicy,
    ) -> ProbeResult {
        let client = match tls {
            TlsPolicy::Configured => &self.client,
            TlsPolicy::Disabled => &self.insecure,
        };

        let request = client.get(url).headers(Self::build_headers(extra_headers));

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => ProbeResult::new(url.to_string(), status, body),
                    Err(e) => {
                        error!("Request error for {}: {}", url, e);
                        ProbeResult {
                            status: Some(status),
                            body: None,
                            url: url.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                error!("Request error for {}: {}", url, e);
                ProbeResult::failed(url.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let headers = HttpClient::build_headers(&[]);
        assert_eq!(headers.get(ACCEPT).unwrap(), "*/*");
        assert_eq!(headers.get(CONNECTION).unwrap(), "close");
        let ua = headers.get(USER_AGENT).unwrap().to_str().unwrap();
        assert!(USER_AGENTS.contains(&ua));
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let extra = vec![
            ("Accept".to_string(), "text/html".to_string()),
            ("X-Forwarded-For".to_string(), "127.0.0.1".to_string()),
        ];
        let headers = HttpClient::build_headers(&extra);
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/html");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 1);
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "127.0.0.1");
    }

    #[test]
    fn test_malformed_header_skipped() {
        let extra = vec![("bad header".to_string(), "v".to_string())];
        let headers = HttpClient::build_headers(&extra);
        assert_eq!(headers.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_no_status() {
        let mut opts = crate::config::ScanOptions::new("http://127.0.0.1:1/", "words.txt");
        opts.timeout = 2;
        let config = ScanConfig::new(opts).unwrap();
        let client = HttpClient::new(&config).unwrap();

        let result = client
            .probe("http://127.0.0.1:1/admin/", &[], TlsPolicy::Configured)
            .await;
        assert_eq!(result.status, None);
        assert_eq!(result.body, None);
        assert_eq!(result.url, "http://127.0.0.1:1/admin/");
    }
}
