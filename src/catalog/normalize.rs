//! Merging raw model and pricing records into catalog records.

use crate::catalog::record::{
    CatalogRecord, Modalities, PricingTable, TierPrices, TokenPrices,
};
use crate::extract::RawRecord;
use crate::providers::profile::ProviderProfile;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, trace};

/// Multiplier for the derived cache-write price over standard input.
const CACHE_WRITE_FACTOR: f64 = 1.25;
/// Multiplier for the derived batch tier over standard prices.
const BATCH_FACTOR: f64 = 0.5;

/// Indexes pricing records by validated identifier, first occurrence wins.
pub fn pricing_index(records: Vec<RawRecord>) -> HashMap<String, RawRecord> {
    let mut index = HashMap::new();
    for record in records {
        let Some(id) = record.api_name.clone() else {
            continue;
        };
        if index.contains_key(&id) {
            trace!("duplicate pricing record for {}, keeping first", id);
            continue;
        }
        index.insert(id, record);
    }
    index
}

/// Joins model records against pricing records by identifier and produces
/// catalog records sorted by display name.
///
/// A model without pricing is kept with `pricing: None`; missing scalar
/// fields fall back to the profile's default table, then its provider-wide
/// defaults. The sort is ordinal and ascending so repeated runs over the
/// same input are byte-identical.
pub fn merge(
    models: Vec<RawRecord>,
    pricing: &HashMap<String, RawRecord>,
    profile: &ProviderProfile,
) -> Vec<CatalogRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for model in models {
        let Some(id) = model.api_name.clone() else {
            debug!("model record without identifier, dropping");
            continue;
        };
        if !profile.valid_ident(&id) {
            debug!("identifier {:?} fails {} grammar, dropping", id, profile.key);
            continue;
        }
        if !seen.insert(id.clone()) {
            trace!("duplicate model record for {}, keeping first", id);
            continue;
        }

        let priced = pricing.get(&id);
        let name = model
            .text("name")
            .map(str::to_string)
            .unwrap_or_else(|| prettify_ident(&id));
        let family =
            profile.family_of(&id).or_else(|| profile.family_of(&name)).unwrap_or(profile.key);
        let specs = profile.specs_for(&id);

        let context_window = model
            .number("context_window")
            .map(|n| n as u32)
            .unwrap_or(specs.context_window);
        let max_output_tokens = model
            .number("max_output_tokens")
            .map(|n| n as u32)
            .unwrap_or(specs.max_output_tokens);

        let mut capabilities: BTreeSet<_> = model.capabilities.iter().copied().collect();
        capabilities.extend(profile.base_capabilities.iter().copied());

        records.push(CatalogRecord {
            name,
            family: family.to_string(),
            provider: profile.key.to_string(),
            id,
            context_window,
            max_output_tokens,
            modalities: Modalities {
                input: profile.input_modalities.to_vec(),
                output: profile.output_modalities.to_vec(),
            },
            capabilities: capabilities.into_iter().collect(),
            pricing: build_pricing(&model, priced, profile),
        });
    }

    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

/// Assembles the pricing table for one model from its pricing record (price
/// fields on the model record fill gaps for card-style pages).
fn build_pricing(
    model: &RawRecord,
    priced: Option<&RawRecord>,
    profile: &ProviderProfile,
) -> Option<PricingTable> {
    let field = |key: &str| priced.and_then(|p| p.number(key)).or_else(|| model.number(key));

    let input = field("input_per_million");
    let output = field("output_per_million");

    let standard = match (input, output) {
        (None, None) => None,
        _ => Some(TierPrices { input_per_million: input, output_per_million: output }),
    };

    let cached = match field("cached_input_per_million") {
        Some(cached_input) => Some(TierPrices {
            input_per_million: Some(cached_input),
            output_per_million: output,
        }),
        None if profile.derive_cache_tiers => input.map(|input| TierPrices {
            input_per_million: Some(input * CACHE_WRITE_FACTOR),
            output_per_million: output,
        }),
        None => None,
    };

    let batch = if profile.derive_batch_tier {
        standard.map(|std| TierPrices {
            input_per_million: std.input_per_million.map(|v| v * BATCH_FACTOR),
            output_per_million: std.output_per_million.map(|v| v * BATCH_FACTOR),
        })
    } else {
        None
    };

    let text_tokens = match (standard, cached, batch) {
        (None, None, None) => None,
        _ => Some(TokenPrices { standard, cached, batch }),
    };

    let citation_tokens = match (field("citation_input_per_million"), field("citation_output_per_million")) {
        (None, None) => None,
        (input, output) => Some(TokenPrices {
            standard: Some(TierPrices { input_per_million: input, output_per_million: output }),
            cached: None,
            batch: None,
        }),
    };

    PricingTable {
        text_tokens,
        citation_tokens,
        search_queries: field("search_per_thousand"),
        per_step: field("per_step"),
        per_minute: field("per_minute"),
        per_item: field("per_item"),
    }
    .into_option()
}

/// "claude-3-5-haiku" -> "Claude 3 5 Haiku"; used only when a page gave us
/// an identifier but no display name.
fn prettify_ident(id: &str) -> String {
    id.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
