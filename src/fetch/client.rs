//! HTTP client for provider docs pages using wreq for TLS fingerprint
//! emulation.

use crate::cache::CachedPage;
use crate::config::Config;
use crate::fetch::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use wreq::Client;
use wreq_util::Emulation;

/// Trait for page fetching - enables mocking the network in tests.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Issues a plain GET and returns the response snapshot. Non-2xx
    /// statuses are transport failures.
    async fn get(&self, url: &str) -> Result<CachedPage, FetchError>;
}

/// HTTP client with browser impersonation and a polite inter-request delay.
pub struct HttpClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl HttpClient {
    /// Creates a client from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, delay_ms: config.delay_ms, delay_jitter_ms: config.delay_jitter_ms })
    }

    /// Adds a random delay between requests.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn get(&self, url: &str) -> Result<CachedPage, FetchError> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(FetchError::Transport(format!("status {}", status)));
        }

        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        Ok(CachedPage::new(url, status.as_u16(), headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config() -> Config {
        Config { delay_ms: 0, delay_jitter_ms: 0, ..Config::default() }
    }

    #[tokio::test]
    async fn test_get_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/docs/models"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><table></table></body></html>"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&make_test_config()).unwrap();
        let page = client.get(&format!("{}/docs/models", mock_server.uri())).await.unwrap();

        assert_eq!(page.status, 200);
        assert!(page.body.contains("<table>"));
        assert!(page.stored_at > 0);
    }

    #[tokio::test]
    async fn test_get_records_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .insert_header("x-request-id", "abc123"),
            )
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&make_test_config()).unwrap();
        let page = client.get(&format!("{}/page", mock_server.uri())).await.unwrap();
        assert_eq!(page.headers.get("x-request-id").map(String::as_str), Some("abc123"));
    }

    #[tokio::test]
    async fn test_get_4xx_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&make_test_config()).unwrap();
        let err = client.get(&format!("{}/missing", mock_server.uri())).await.unwrap_err();
        match err {
            FetchError::Transport(message) => assert!(message.contains("404")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_5xx_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = HttpClient::new(&make_test_config()).unwrap();
        let err = client.get(&format!("{}/broken", mock_server.uri())).await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = HttpClient::new(&make_test_config()).unwrap();
        // Reserved port with nothing listening
        let err = client.get("http://127.0.0.1:9/none").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
