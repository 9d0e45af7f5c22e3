//! Anthropic: spec table on the models page, price table on the pricing page.

use crate::catalog::normalize::{merge, pricing_index};
use crate::catalog::record::{Capability, CatalogRecord, Modality};
use crate::extract::tables::extract_tables;
use crate::extract::SourceKind;
use crate::fetch::DocFetcher;
use crate::providers::profile::{ModelSpecs, ProviderProfile};
use crate::providers::{document_or_empty, Provider, ProviderCaps};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

const MODELS_PATH: &str = "/en/docs/about-claude/models/overview";
const PRICING_PATH: &str = "/en/docs/about-claude/pricing";

/// Anthropic numbers models flat from Claude 4 on ("claude-opus-4-5") and
/// dotted-as-hyphens before that ("claude-3-5-haiku").
fn claude_ident(family: &str, major: u32, minor: Option<u32>) -> String {
    if major >= 4 {
        match minor {
            Some(minor) => format!("claude-{}-{}-{}", family, major, minor),
            None => format!("claude-{}-{}", family, major),
        }
    } else {
        format!("claude-{}-{}-{}", major, minor.unwrap_or(0), family)
    }
}

static PROFILE: ProviderProfile = ProviderProfile {
    key: "anthropic",
    display_name: "Anthropic",
    ident_pattern: r"^claude-[a-z0-9][a-z0-9.-]*$",
    family_keywords: &["haiku", "sonnet", "opus"],
    synthesize: claude_ident,
    default_specs: &[
        ("claude-opus-4", ModelSpecs { context_window: 200_000, max_output_tokens: 32_000 }),
        ("claude-sonnet-4", ModelSpecs { context_window: 200_000, max_output_tokens: 64_000 }),
        ("claude-3-5", ModelSpecs { context_window: 200_000, max_output_tokens: 8_192 }),
    ],
    fallback_specs: ModelSpecs { context_window: 200_000, max_output_tokens: 4_096 },
    derive_cache_tiers: true,
    derive_batch_tier: true,
    base_capabilities: &[Capability::Vision, Capability::ToolUse],
    input_modalities: &[Modality::Text, Modality::Image],
    output_modalities: &[Modality::Text],
};

pub struct Anthropic {
    base_url: String,
}

impl Anthropic {
    pub fn new() -> Self {
        Self::with_base_url("https://docs.anthropic.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for Anthropic {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for Anthropic {
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
            Some(document) => extract_tables(&document, SourceKind::ModelDescriptor, &PROFILE),
            None => Vec::new(),
        };
        debug!("anthropic: {} model rows", models.len());

        let pricing_url = format!("{}{}", self.base_url, PRICING_PATH);
        let outcome = fetcher.fetch_document(&pricing_url).await;
        let prices = match document_or_empty(outcome, &pricing_url) {
            Some(document) => extract_tables(&document, SourceKind::PricingDescriptor, &PROFILE),
            None => Vec::new(),
        };
        debug!("anthropic: {} pricing rows", prices.len());

        let records = merge(models, &pricing_index(prices), &PROFILE);
        info!("anthropic: {} catalog records", records.len());
        Ok(records)
    }
}
