//! OpenAI: linked model cards on the models index, price table on the
//! pricing page.

use crate::catalog::normalize::{merge, pricing_index};
use crate::catalog::record::{Capability, CatalogRecord, Modality};
use crate::extract::cards::extract_cards;
use crate::extract::tables::extract_tables;
use crate::extract::SourceKind;
use crate::fetch::DocFetcher;
use crate::providers::profile::{ModelSpecs, ProviderProfile};
use crate::providers::{document_or_empty, Provider, ProviderCaps};
use anyhow::Result;
use async_trait::async_trait;
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

const MODELS_PATH: &str = "/docs/models";
const PRICING_PATH: &str = "/docs/pricing";

/// Per-model docs pages live directly under the models index.
static MODEL_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/docs/models/[a-z0-9.-]+/?$").unwrap());

/// OpenAI versions with a dot: "gpt-4.1", "o3" (no minor).
fn openai_ident(family: &str, major: u32, minor: Option<u32>) -> String {
    match minor {
        Some(minor) => format!("{}-{}.{}", family, major, minor),
        None => format!("{}-{}", family, major),
    }
}

static PROFILE: ProviderProfile = ProviderProfile {
    key: "openai",
    display_name: "OpenAI",
    ident_pattern: r"^(gpt|o[0-9]|chatgpt|dall-e|whisper|tts|text-embedding|sora)[a-z0-9.-]*$",
    family_keywords: &["gpt", "dall-e", "whisper", "sora"],
    synthesize: openai_ident,
    default_specs: &[
        ("gpt-4.1", ModelSpecs { context_window: 1_047_576, max_output_tokens: 32_768 }),
        ("gpt-4o", ModelSpecs { context_window: 128_000, max_output_tokens: 16_384 }),
        ("o3", ModelSpecs { context_window: 200_000, max_output_tokens: 100_000 }),
        ("o4-mini", ModelSpecs { context_window: 200_000, max_output_tokens: 100_000 }),
    ],
    fallback_specs: ModelSpecs { context_window: 128_000, max_output_tokens: 16_384 },
    derive_cache_tiers: false,
    derive_batch_tier: true,
    base_capabilities: &[Capability::ToolUse],
    input_modalities: &[Modality::Text, Modality::Image],
    output_modalities: &[Modality::Text],
};

pub struct OpenAi {
    base_url: String,
}

impl OpenAi {
    pub fn new() -> Self {
        Self::with_base_url("https://platform.openai.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for OpenAi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for OpenAi {
    fn profile(&self) -> &'static ProviderProfile {
        &PROFILE
    }

    fn caps(&self) -> ProviderCaps {
        ProviderCaps { api_spec: true, model_info: true, pricing: true }
    }

    async fn harvest(&self, fetcher: &DocFetcher) -> Result<Vec<CatalogRecord>> {
        let models_url = format!("{}{}", self.base_url, MODELS_PATH);
        let outcome = fetcher.fetch_document(&models_url).await;
        let models = match document_or_empty(outcome, &models_url) {
            Some(document) => extract_cards(&document, &MODEL_LINK, &PROFILE),
            None => Vec::new(),
        };
        debug!("openai: {} model cards", models.len());

        let pricing_url = format!("{}{}", self.base_url, PRICING_PATH);
        let outcome = fetcher.fetch_document(&pricing_url).await;
        let prices = match document_or_empty(outcome, &pricing_url) {
            Some(document) => extract_tables(&document, SourceKind::PricingDescriptor, &PROFILE),
            None => Vec::new(),
        };
        debug!("openai: {} pricing rows", prices.len());

        let records = merge(models, &pricing_index(prices), &PROFILE);
        info!("openai: {} catalog records", records.len());
        Ok(records)
    }
}
