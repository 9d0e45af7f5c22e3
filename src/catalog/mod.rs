//! Catalog records, the merge step, and the per-provider assembler.

pub mod normalize;
pub mod record;

pub use record::{CatalogRecord, Capability, Modalities, Modality, PricingTable};

use crate::fetch::DocFetcher;
use crate::providers::Provider;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Assembled catalog: per-provider record vectors, alphabetical by provider
/// key. Providers are independent; nothing reconciles identifiers across
/// them.
#[derive(Debug, Default)]
pub struct Catalog {
    providers: BTreeMap<String, Vec<CatalogRecord>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one provider's harvest. Empty harvests are not recorded.
    pub fn insert(&mut self, provider: &str, records: Vec<CatalogRecord>) {
        if records.is_empty() {
            return;
        }
        self.providers.insert(provider.to_string(), records);
    }

    /// Providers with records, alphabetical.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CatalogRecord])> {
        self.providers.iter().map(|(key, records)| (key.as_str(), records.as_slice()))
    }

    /// Record counts per provider, alphabetical.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.providers.iter().map(|(key, records)| (key.as_str(), records.len())).collect()
    }

    pub fn total(&self) -> usize {
        self.providers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Harvests every provider in turn. A provider that fails or comes back
/// empty is skipped with a warning; the run always completes.
pub async fn assemble(providers: &[Box<dyn Provider>], fetcher: &DocFetcher) -> Catalog {
    let mut catalog = Catalog::new();

    for provider in providers {
        let key = provider.profile().key;
        match provider.harvest(fetcher).await {
            Ok(records) if records.is_empty() => {
                warn!("{}: harvest produced no records, skipping", key);
            }
            Ok(records) => {
                info!("{}: harvested {} records", key, records.len());
                catalog.insert(key, records);
            }
            Err(e) => {
                warn!("{}: harvest failed, skipping: {:#}", key, e);
            }
        }
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::fetch::{FetchError, PageSource};
    use crate::providers::{profile::ModelSpecs, ProviderCaps, ProviderProfile};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::time::Duration;

    fn sample_record(name: &str, id: &str) -> CatalogRecord {
        CatalogRecord {
            name: name.to_string(),
            family: "test".to_string(),
            provider: "test".to_string(),
            id: id.to_string(),
            context_window: 100_000,
            max_output_tokens: 8_192,
            modalities: Modalities { input: vec![Modality::Text], output: vec![Modality::Text] },
            capabilities: vec![],
            pricing: None,
        }
    }

    #[test]
    fn test_catalog_alphabetical_and_counts() {
        let mut catalog = Catalog::new();
        catalog.insert("openai", vec![sample_record("A", "a")]);
        catalog.insert("anthropic", vec![sample_record("B", "b"), sample_record("C", "c")]);

        let keys: Vec<&str> = catalog.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["anthropic", "openai"]);
        assert_eq!(catalog.counts(), vec![("anthropic", 2), ("openai", 1)]);
        assert_eq!(catalog.total(), 3);
    }

    #[test]
    fn test_catalog_ignores_empty_harvest() {
        let mut catalog = Catalog::new();
        catalog.insert("anthropic", vec![]);
        assert!(catalog.is_empty());
    }

    fn noop_synthesize(family: &str, major: u32, _minor: Option<u32>) -> String {
        format!("{}-{}", family, major)
    }

    static TEST_PROFILE: ProviderProfile = ProviderProfile {
        key: "failing",
        display_name: "Failing",
        ident_pattern: r"^x$",
        family_keywords: &[],
        synthesize: noop_synthesize,
        default_specs: &[],
        fallback_specs: ModelSpecs { context_window: 1, max_output_tokens: 1 },
        derive_cache_tiers: false,
        derive_batch_tier: false,
        base_capabilities: &[],
        input_modalities: &[],
        output_modalities: &[],
    };

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn profile(&self) -> &'static ProviderProfile {
            &TEST_PROFILE
        }

        fn caps(&self) -> ProviderCaps {
            ProviderCaps { api_spec: false, model_info: true, pricing: false }
        }

        async fn harvest(&self, _fetcher: &DocFetcher) -> Result<Vec<CatalogRecord>> {
            Err(anyhow!("simulated failure"))
        }
    }

    struct NeverCalled;

    #[async_trait]
    impl PageSource for NeverCalled {
        async fn get(&self, _url: &str) -> Result<crate::cache::CachedPage, FetchError> {
            Err(FetchError::Transport("should not be reached".into()))
        }
    }

    #[tokio::test]
    async fn test_assemble_survives_provider_failure() {
        let providers: Vec<Box<dyn Provider>> = vec![Box::new(FailingProvider)];
        let fetcher = DocFetcher::new(
            Box::new(NeverCalled),
            CacheStore::disabled(),
            0,
            Duration::from_millis(1),
        );

        let catalog = assemble(&providers, &fetcher).await;
        assert!(catalog.is_empty());
    }
}
