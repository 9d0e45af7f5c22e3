//! Google: model identifiers sit in prose near headings on the models page,
//! prices in a table on the pricing page.

use crate::catalog::normalize::{merge, pricing_index};
use crate::catalog::record::{Capability, CatalogRecord, Modality};
use crate::extract::headings::extract_headings;
use crate::extract::tables::extract_tables;
use crate::extract::SourceKind;
use crate::fetch::DocFetcher;
use crate::providers::profile::{ModelSpecs, ProviderProfile};
use crate::providers::{document_or_empty, Provider, ProviderCaps};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

const MODELS_PATH: &str = "/gemini-api/docs/models";
const PRICING_PATH: &str = "/gemini-api/docs/pricing";

/// Google versions with a dot and a family suffix: "gemini-2.5-flash".
fn gemini_ident(family: &str, major: u32, minor: Option<u32>) -> String {
    if family == "gemini" {
        format!("gemini-{}.{}", major, minor.unwrap_or(0))
    } else {
        format!("gemini-{}.{}-{}", major, minor.unwrap_or(0), family)
    }
}

static PROFILE: ProviderProfile = ProviderProfile {
    key: "google",
    display_name: "Google",
    ident_pattern: r"^(gemini|imagen|veo)-[0-9]+\.[0-9]+(-[a-z0-9.-]+)?$",
    family_keywords: &["flash", "pro", "gemini", "imagen", "veo"],
    synthesize: gemini_ident,
    default_specs: &[
        ("gemini-2.5-pro", ModelSpecs { context_window: 1_048_576, max_output_tokens: 65_536 }),
        ("gemini-2.5-flash", ModelSpecs { context_window: 1_048_576, max_output_tokens: 65_536 }),
        ("gemini-2.0", ModelSpecs { context_window: 1_048_576, max_output_tokens: 8_192 }),
    ],
    fallback_specs: ModelSpecs { context_window: 1_048_576, max_output_tokens: 8_192 },
    derive_cache_tiers: false,
    derive_batch_tier: true,
    base_capabilities: &[Capability::Vision, Capability::ToolUse],
    input_modalities: &[Modality::Text, Modality::Image, Modality::Audio, Modality::Video],
    output_modalities: &[Modality::Text],
};

pub struct Google {
    base_url: String,
}

impl Google {
    pub fn new() -> Self {
        Self::with_base_url("https://ai.google.dev")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for Google {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for Google {
    fn profile(&self) -> &'static ProviderProfile {
        &PROFILE
    }

    fn caps(&self) -> ProviderCaps {
        ProviderCaps { api_spec: false, model_info: true, pricing: true }
    }

    async fn harvest(&self, fetcher: &DocFetcher) -> Result<Vec<CatalogRecord>> {
        let models_url = format!("{}{}", self.base_url, MODELS_PATH);
        let outcome = fetcher.fetch_document(&models_url).await;
        let models = match document_or_empty(outcome, &models_url) {
            Some(document) => extract_headings(&document, &PROFILE),
            None => Vec::new(),
        };
        debug!("google: {} model sections", models.len());

        let pricing_url = format!("{}{}", self.base_url, PRICING_PATH);
        let outcome = fetcher.fetch_document(&pricing_url).await;
        let prices = match document_or_empty(outcome, &pricing_url) {
            Some(document) => extract_tables(&document, SourceKind::PricingDescriptor, &PROFILE),
            None => Vec::new(),
        };
        debug!("google: {} pricing rows", prices.len());

        let records = merge(models, &pricing_index(prices), &PROFILE);
        info!("google: {} catalog records", records.len());
        Ok(records)
    }
}
