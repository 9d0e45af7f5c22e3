//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cache directory; defaults to the platform cache dir when unset
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Freshness window for cached pages, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a timed-out request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay in milliseconds; attempt N waits N times this
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Directory for the per-provider catalog files
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Providers to harvest; empty means all registered providers
    #[serde(default)]
    pub providers: Vec<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    500
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("catalog")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            out_dir: default_out_dir(),
            providers: Vec::new(),
            proxy: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("llm-catalog.toml");
        if local_config.exists() {
            debug!("Found llm-catalog.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("llm-catalog").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("LLMCAT_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }

        if let Ok(proxy) = std::env::var("LLMCAT_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("LLMCAT_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// The cache directory to use: configured, or the platform default.
    pub fn cache_root(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("llm-catalog")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.cache_dir.is_none());
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay_ms, 1000);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.delay_jitter_ms, 500);
        assert_eq!(config.out_dir, PathBuf::from("catalog"));
        assert!(config.providers.is_empty());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            cache_ttl_secs = 600
            max_retries = 5
            delay_ms = 3000
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.delay_ms, 3000);
        // Unspecified fields keep their defaults
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_config_from_toml_all_fields() {
        let toml = r#"
            cache_dir = "/tmp/llm-catalog-cache"
            cache_ttl_secs = 120
            timeout_secs = 15
            max_retries = 2
            retry_base_delay_ms = 250
            delay_ms = 500
            delay_jitter_ms = 100
            out_dir = "out"
            providers = ["anthropic", "openai"]
            proxy = "socks5://localhost:1080"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/llm-catalog-cache")));
        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_base_delay_ms, 250);
        assert_eq!(config.delay_ms, 500);
        assert_eq!(config.delay_jitter_ms, 100);
        assert_eq!(config.out_dir, PathBuf::from("out"));
        assert_eq!(config.providers, vec!["anthropic", "openai"]);
        assert_eq!(config.proxy, Some("socks5://localhost:1080".to_string()));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            timeout_secs = 10
            delay_ms = 4000
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.delay_ms, 4000);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let result = Config::from_file(file.path());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            max_retries = 7
            "#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_retries, 7);
    }

    #[test]
    fn test_config_with_env() {
        // Save original env vars
        let orig_cache = std::env::var("LLMCAT_CACHE_DIR").ok();
        let orig_proxy = std::env::var("LLMCAT_PROXY").ok();
        let orig_delay = std::env::var("LLMCAT_DELAY").ok();

        std::env::set_var("LLMCAT_CACHE_DIR", "/tmp/cat-cache");
        std::env::set_var("LLMCAT_PROXY", "http://proxy:8080");
        std::env::set_var("LLMCAT_DELAY", "5000");

        let config = Config::new().with_env();
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/cat-cache")));
        assert_eq!(config.proxy, Some("http://proxy:8080".to_string()));
        assert_eq!(config.delay_ms, 5000);

        // Unparsable values are ignored, keeping the default
        std::env::set_var("LLMCAT_DELAY", "not_a_number");
        let config = Config::new().with_env();
        assert_eq!(config.delay_ms, 1000);

        // Restore original env vars
        match orig_cache {
            Some(v) => std::env::set_var("LLMCAT_CACHE_DIR", v),
            None => std::env::remove_var("LLMCAT_CACHE_DIR"),
        }
        match orig_proxy {
            Some(v) => std::env::set_var("LLMCAT_PROXY", v),
            None => std::env::remove_var("LLMCAT_PROXY"),
        }
        match orig_delay {
            Some(v) => std::env::set_var("LLMCAT_DELAY", v),
            None => std::env::remove_var("LLMCAT_DELAY"),
        }
    }

    #[test]
    fn test_cache_root_prefers_configured_dir() {
        let config = Config {
            cache_dir: Some(PathBuf::from("/tmp/explicit")),
            ..Config::default()
        };
        assert_eq!(config.cache_root(), Some(PathBuf::from("/tmp/explicit")));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config {
            cache_dir: Some(PathBuf::from("/tmp/c")),
            cache_ttl_secs: 60,
            timeout_secs: 5,
            max_retries: 1,
            retry_base_delay_ms: 100,
            delay_ms: 0,
            delay_jitter_ms: 0,
            out_dir: PathBuf::from("dist"),
            providers: vec!["google".to_string()],
            proxy: None,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.cache_dir, config.cache_dir);
        assert_eq!(parsed.cache_ttl_secs, config.cache_ttl_secs);
        assert_eq!(parsed.max_retries, config.max_retries);
        assert_eq!(parsed.out_dir, config.out_dir);
        assert_eq!(parsed.providers, config.providers);
    }
}
