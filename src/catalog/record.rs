//! Data models for catalog records, pricing tables, and model metadata.

use serde::{Deserialize, Serialize};

/// A normalized, catalog-ready description of one model.
///
/// `id` is unique within a provider's record set. `pricing` is absent when no
/// price data was obtainable; when present, every retained leaf is
/// non-negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Human-readable display name (e.g. "Claude 3.5 Haiku")
    pub name: String,
    /// Model family keyword (e.g. "haiku", "flash")
    pub family: String,
    /// Provider key (e.g. "anthropic")
    pub provider: String,
    /// API identifier the provider uses for this model
    pub id: String,
    /// Context window in tokens
    pub context_window: u32,
    /// Maximum output tokens per request
    pub max_output_tokens: u32,
    /// Input/output modalities
    pub modalities: Modalities,
    /// Capability set, sorted for stable output
    pub capabilities: Vec<Capability>,
    /// Pricing, when at least one price was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingTable>,
}

/// Input and output modalities of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modalities {
    pub input: Vec<Modality>,
    pub output: Vec<Modality>,
}

/// A single modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Audio,
    Video,
}

/// Model capabilities advertised by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Vision,
    ToolUse,
    Speech,
    Reasoning,
    StructuredOutput,
}

/// Pricing for one model, as a closed set of known categories.
///
/// Only categories with at least one non-null leaf are retained; callers run
/// [`PricingTable::prune`] before serialization so empty branches never
/// appear in output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_tokens: Option<TokenPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_tokens: Option<TokenPrices>,
    /// USD per 1,000 search queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_queries: Option<f64>,
    /// USD per generation step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_step: Option<f64>,
    /// USD per minute of audio/video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_minute: Option<f64>,
    /// USD per generated item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_item: Option<f64>,
}

/// Per-tier token prices for one price category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPrices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<TierPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<TierPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<TierPrices>,
}

/// USD per million tokens for one tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TierPrices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_per_million: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_per_million: Option<f64>,
}

impl TierPrices {
    /// Creates a tier with both prices set.
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million: Some(input_per_million),
            output_per_million: Some(output_per_million),
        }
    }

    /// Returns true if neither price is set.
    pub fn is_empty(&self) -> bool {
        self.input_per_million.is_none() && self.output_per_million.is_none()
    }

    fn drop_negative(&mut self) {
        if self.input_per_million.is_some_and(|v| v < 0.0) {
            self.input_per_million = None;
        }
        if self.output_per_million.is_some_and(|v| v < 0.0) {
            self.output_per_million = None;
        }
    }
}

impl TokenPrices {
    /// Returns true if no tier has a price.
    pub fn is_empty(&self) -> bool {
        [&self.standard, &self.cached, &self.batch]
            .iter()
            .all(|tier| tier.map_or(true, |t| t.is_empty()))
    }

    fn prune(&mut self) {
        for tier in [&mut self.standard, &mut self.cached, &mut self.batch] {
            if let Some(t) = tier {
                t.drop_negative();
            }
            if tier.is_some_and(|t| t.is_empty()) {
                *tier = None;
            }
        }
    }
}

impl PricingTable {
    /// Returns true if every category is empty.
    pub fn is_empty(&self) -> bool {
        self.text_tokens.as_ref().is_none_or(|t| t.is_empty())
            && self.citation_tokens.as_ref().is_none_or(|t| t.is_empty())
            && self.search_queries.is_none()
            && self.per_step.is_none()
            && self.per_minute.is_none()
            && self.per_item.is_none()
    }

    /// Removes negative leaves and empty branches.
    pub fn prune(&mut self) {
        for category in [&mut self.text_tokens, &mut self.citation_tokens] {
            if let Some(prices) = category {
                prices.prune();
            }
            if category.as_ref().is_some_and(|p| p.is_empty()) {
                *category = None;
            }
        }
        for scalar in
            [&mut self.search_queries, &mut self.per_step, &mut self.per_minute, &mut self.per_item]
        {
            if scalar.is_some_and(|v| v < 0.0) {
                *scalar = None;
            }
        }
    }

    /// Prunes and wraps into `Option`, collapsing fully-empty tables to `None`.
    pub fn into_option(mut self) -> Option<Self> {
        self.prune();
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_record() -> CatalogRecord {
        CatalogRecord {
            name: "Claude 3.5 Haiku".to_string(),
            family: "haiku".to_string(),
            provider: "anthropic".to_string(),
            id: "claude-3-5-haiku-20241022".to_string(),
            context_window: 200_000,
            max_output_tokens: 8_192,
            modalities: Modalities {
                input: vec![Modality::Text, Modality::Image],
                output: vec![Modality::Text],
            },
            capabilities: vec![Capability::Vision, Capability::ToolUse],
            pricing: Some(PricingTable {
                text_tokens: Some(TokenPrices {
                    standard: Some(TierPrices::new(0.8, 4.0)),
                    cached: None,
                    batch: None,
                }),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_tier_prices_empty() {
        assert!(TierPrices::default().is_empty());
        assert!(!TierPrices::new(1.0, 2.0).is_empty());
    }

    #[test]
    fn test_pricing_table_prune_empty_branches() {
        let mut table = PricingTable {
            text_tokens: Some(TokenPrices {
                standard: Some(TierPrices::default()),
                cached: None,
                batch: None,
            }),
            citation_tokens: Some(TokenPrices::default()),
            ..Default::default()
        };
        table.prune();
        assert!(table.text_tokens.is_none());
        assert!(table.citation_tokens.is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_pricing_table_prune_keeps_populated() {
        let mut table = PricingTable {
            text_tokens: Some(TokenPrices {
                standard: Some(TierPrices::new(3.0, 15.0)),
                cached: None,
                batch: None,
            }),
            per_minute: Some(0.1),
            ..Default::default()
        };
        table.prune();
        assert!(!table.is_empty());
        let std = table.text_tokens.unwrap().standard.unwrap();
        assert_eq!(std.input_per_million, Some(3.0));
        assert_eq!(std.output_per_million, Some(15.0));
        assert_eq!(table.per_minute, Some(0.1));
    }

    #[test]
    fn test_pricing_table_prune_drops_negative_leaves() {
        let mut table = PricingTable {
            text_tokens: Some(TokenPrices {
                standard: Some(TierPrices::new(-1.0, 15.0)),
                cached: None,
                batch: None,
            }),
            per_step: Some(-0.5),
            ..Default::default()
        };
        table.prune();
        let std = table.text_tokens.unwrap().standard.unwrap();
        assert!(std.input_per_million.is_none());
        assert_eq!(std.output_per_million, Some(15.0));
        assert!(table.per_step.is_none());
    }

    #[test]
    fn test_into_option_collapses_empty() {
        assert!(PricingTable::default().into_option().is_none());

        let table = PricingTable {
            text_tokens: Some(TokenPrices {
                standard: Some(TierPrices::new(1.0, 2.0)),
                cached: None,
                batch: None,
            }),
            ..Default::default()
        };
        assert!(table.into_option().is_some());
    }

    #[test]
    fn test_record_serde_skips_missing_pricing() {
        let mut record = make_test_record();
        record.pricing = None;
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("pricing"));

        let parsed: CatalogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, record.id);
        assert!(parsed.pricing.is_none());
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = make_test_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("claude-3-5-haiku-20241022"));
        assert!(json.contains("tool_use"));

        let parsed: CatalogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, record.name);
        assert_eq!(parsed.context_window, 200_000);
        let std = parsed.pricing.unwrap().text_tokens.unwrap().standard.unwrap();
        assert_eq!(std.input_per_million, Some(0.8));
    }

    #[test]
    fn test_modality_serde_names() {
        assert_eq!(serde_json::to_string(&Modality::Image).unwrap(), "\"image\"");
        assert_eq!(serde_json::to_string(&Capability::StructuredOutput).unwrap(), "\"structured_output\"");
    }
}
