//! Provider pipelines: one module per provider plus the static profiles.

pub mod anthropic;
pub mod google;
pub mod openai;
pub mod profile;

pub use profile::{ModelSpecs, ProviderProfile};

use crate::catalog::record::CatalogRecord;
use crate::fetch::{DocFetcher, FetchOutcome};
use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;
use tracing::warn;

/// Which data a provider's public pages expose. Declared statically per
/// provider; the feature matrix prints these, the harvest does not consult
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCaps {
    pub api_spec: bool,
    pub model_info: bool,
    pub pricing: bool,
}

/// One provider's harvest pipeline.
#[async_trait]
pub trait Provider: Send + Sync {
    fn profile(&self) -> &'static ProviderProfile;

    fn caps(&self) -> ProviderCaps;

    /// Fetches the provider's pages and returns merged catalog records.
    async fn harvest(&self, fetcher: &DocFetcher) -> Result<Vec<CatalogRecord>>;
}

/// All registered providers. The registry is compile-time and explicit; a
/// new provider means a new module and a new line here.
pub fn registry() -> Vec<Box<dyn Provider>> {
    vec![
        Box::new(anthropic::Anthropic::new()),
        Box::new(google::Google::new()),
        Box::new(openai::OpenAi::new()),
    ]
}

/// Unwraps a fetch outcome, logging non-success as an empty source.
pub(crate) fn document_or_empty(outcome: FetchOutcome, url: &str) -> Option<Html> {
    match outcome {
        FetchOutcome::Success(document) => Some(document),
        other => {
            warn!("{} for {}, treating source as empty", other.label(), url);
            None
        }
    }
}
