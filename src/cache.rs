//! On-disk HTTP response cache, one JSON file per URL hash.

use crate::fetch::FetchError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Default freshness window for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// A persisted HTTP response. Created on a successful live fetch, replaced
/// wholesale on refetch, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPage {
    pub url: String,
    /// Unix seconds at fetch time
    pub stored_at: u64,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl CachedPage {
    /// Creates a page stamped with the current time.
    pub fn new(
        url: impl Into<String>,
        status: u16,
        headers: BTreeMap<String, String>,
        body: String,
    ) -> Self {
        Self { url: url.into(), stored_at: now_secs(), status, headers, body }
    }
}

/// TTL-bound response cache over a directory of independent entries.
///
/// An unusable storage location degrades the store to pass-through: every
/// call invokes the fetch function. Failures are never cached, so a
/// transient outage cannot poison later runs.
pub struct CacheStore {
    root: Option<PathBuf>,
    ttl: Duration,
}

impl CacheStore {
    /// Opens (creating if needed) the cache directory. An unwritable
    /// location logs once and disables caching instead of failing the run.
    pub fn open(root: Option<PathBuf>, ttl: Duration) -> Self {
        let root = root.and_then(|root| match std::fs::create_dir_all(&root) {
            Ok(()) => Some(root),
            Err(e) => {
                warn!("cache disabled, cannot use {}: {}", root.display(), e);
                None
            }
        });
        Self { root, ttl }
    }

    /// A store that never caches; every call goes to the fetch function.
    pub fn disabled() -> Self {
        Self { root: None, ttl: DEFAULT_TTL }
    }

    /// Returns a fresh cached response for `url`, or invokes `fetch` and
    /// persists its result when successful (status 200-299).
    pub async fn get_or_fetch<F, Fut>(&self, url: &str, fetch: F) -> Result<CachedPage, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedPage, FetchError>>,
    {
        if let Some(page) = self.lookup(url) {
            debug!("cache hit for {}", url);
            return Ok(page);
        }

        let page = fetch().await?;
        if (200..300).contains(&page.status) {
            self.store(&page);
        }
        Ok(page)
    }

    /// Returns the entry for `url` if present and fresh. Stale, missing, and
    /// corrupt entries all read as a miss.
    fn lookup(&self, url: &str) -> Option<CachedPage> {
        let path = self.entry_path(url)?;
        let raw = std::fs::read_to_string(&path).ok()?;
        let page: CachedPage = match serde_json::from_str(&raw) {
            Ok(page) => page,
            Err(e) => {
                debug!("corrupt cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        let age = now_secs().saturating_sub(page.stored_at);
        if Duration::from_secs(age) < self.ttl {
            Some(page)
        } else {
            debug!("stale cache entry for {} ({}s old)", url, age);
            None
        }
    }

    /// Persists an entry with atomic replace-on-write. IO errors are logged
    /// and swallowed; caching is best-effort.
    fn store(&self, page: &CachedPage) {
        let Some(path) = self.entry_path(&page.url) else {
            return;
        };
        let tmp = path.with_extension("json.tmp");

        let serialized = match serde_json::to_string(page) {
            Ok(s) => s,
            Err(e) => {
                warn!("cannot serialize cache entry for {}: {}", page.url, e);
                return;
            }
        };
        if let Err(e) =
            std::fs::write(&tmp, serialized).and_then(|()| std::fs::rename(&tmp, &path))
        {
            warn!("cannot write cache entry for {}: {}", page.url, e);
        }
    }

    fn entry_path(&self, url: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(root.join(format!("{}.json", cache_key(url))))
    }
}

/// Fixed-width content hash of a URL.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
