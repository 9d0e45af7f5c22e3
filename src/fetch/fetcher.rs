//! Fetching with cache, bounded retry, and document validation.

use crate::cache::{CachedPage, CacheStore};
use crate::config::Config;
use crate::fetch::{FetchError, HttpClient, PageSource};
use anyhow::Result;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

static BODY_CHILD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body > *").unwrap());

/// Outcome of one document fetch, cache included.
///
/// Callers treat every non-success variant the same way: an empty record
/// set for that source. The variants stay distinct for diagnostics.
pub enum FetchOutcome {
    Success(Html),
    Transport(String),
    Timeout,
    EmptyBody,
    Unparsable,
}

impl FetchOutcome {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Success(_) => "success",
            FetchOutcome::Transport(_) => "transport failure",
            FetchOutcome::Timeout => "timeout",
            FetchOutcome::EmptyBody => "empty body",
            FetchOutcome::Unparsable => "unparsable body",
        }
    }
}

/// Fetches documents through the cache with retry on timeout.
///
/// Attempt chain per live fetch: `Attempt -> {Success | retryable failure ->
/// backoff -> Attempt | terminal failure}`. Only timeouts are retryable, up
/// to `max_retries` extra attempts, with a linearly growing delay. Cache
/// hits bypass the chain entirely.
pub struct DocFetcher {
    source: Box<dyn PageSource>,
    cache: CacheStore,
    max_retries: u32,
    base_delay: Duration,
}

impl DocFetcher {
    /// Creates a fetcher over an explicit page source.
    pub fn new(
        source: Box<dyn PageSource>,
        cache: CacheStore,
        max_retries: u32,
        base_delay: Duration,
    ) -> Self {
        Self { source, cache, max_retries, base_delay }
    }

    /// Creates a fetcher with a real HTTP client from the configuration.
    pub fn from_config(config: &Config, cache: CacheStore) -> Result<Self> {
        let client = HttpClient::new(config)?;
        Ok(Self::new(
            Box::new(client),
            cache,
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        ))
    }

    /// Fetches `url` and parses it into a document tree.
    pub async fn fetch_document(&self, url: &str) -> FetchOutcome {
        let result = self.cache.get_or_fetch(url, || self.fetch_with_retry(url)).await;

        match result {
            Ok(page) => FetchOutcome::Success(Html::parse_document(&page.body)),
            Err(FetchError::Timeout) => FetchOutcome::Timeout,
            Err(FetchError::Transport(message)) => FetchOutcome::Transport(message),
            Err(FetchError::EmptyBody) => FetchOutcome::EmptyBody,
            Err(FetchError::Unparsable) => FetchOutcome::Unparsable,
        }
    }

    /// The live-fetch attempt chain.
    async fn fetch_with_retry(&self, url: &str) -> Result<CachedPage, FetchError> {
        let mut attempt: u32 = 1;
        loop {
            match self.source.get(url).await {
                Ok(page) => return validate(page),
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    warn!(
                        "attempt {} for {} timed out, retrying in {:?}",
                        attempt, url, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!("terminal failure for {} on attempt {}: {}", url, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// Linear backoff: `base_delay * attempt_number`.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Rejects empty and non-markup bodies before they reach the cache.
fn validate(page: CachedPage) -> Result<CachedPage, FetchError> {
    if page.body.trim().is_empty() {
        return Err(FetchError::EmptyBody);
    }
    let document = Html::parse_document(&page.body);
    if document.select(&BODY_CHILD).next().is_none() {
        return Err(FetchError::Unparsable);
    }
    Ok(page)
}
