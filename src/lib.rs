//! llm-catalog - Model catalog builder for LLM provider docs
//!
//! Scrapes provider documentation and pricing pages with TLS fingerprint
//! emulation, normalizes what it finds into validated catalog records, and
//! writes them as newline-delimited JSON per provider.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod providers;

pub use cache::CacheStore;
pub use catalog::{Catalog, CatalogRecord};
pub use config::Config;
pub use fetch::{DocFetcher, FetchOutcome};
