//! Linked-card extraction: model cards that link to a per-model docs page.
//!
//! The identifier comes from the link target, never the visible text; the
//! surrounding card text is scanned for labeled prices and capability
//! keywords.

use crate::extract::selectors::ANCHOR;
use crate::extract::{clean_text, scan_capabilities, RawRecord, SourceKind};
use crate::providers::profile::ProviderProfile;
use regex_lite::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, trace};

static PRICE_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*M\b[^$]*?input").unwrap()
});

static PRICE_OUTPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*M\b[^$]*?output").unwrap()
});

static PRICE_STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*step\b").unwrap());

static PRICE_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*min(?:ute)?\b").unwrap());

static PRICE_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*ea(?:ch)?\b").unwrap());

/// Scans anchors whose href path matches `path_pattern` and yields one
/// record per card. Duplicate targets keep the first card seen.
pub fn extract_cards(
    document: &Html,
    path_pattern: &Regex,
    profile: &ProviderProfile,
) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for anchor in document.select(&ANCHOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let path = strip_origin(href);
        if !path_pattern.is_match(path) {
            continue;
        }

        // Identifier from the link target itself
        let Some(candidate) = path.trim_end_matches('/').rsplit('/').next() else {
            continue;
        };
        if !profile.valid_ident(candidate) {
            debug!("link target {:?} fails {} grammar, dropping card", candidate, profile.key);
            continue;
        }
        if !seen.insert(candidate.to_string()) {
            trace!("duplicate card for {}, keeping first", candidate);
            continue;
        }

        records.push(card_record(anchor, candidate, path_pattern));
    }

    debug!("extracted {} records from cards", records.len());
    records
}

fn card_record(anchor: ElementRef, id: &str, path_pattern: &Regex) -> RawRecord {
    let mut record = RawRecord::new(SourceKind::ModelDescriptor);
    record.api_name = Some(id.to_string());
    record.set_text("name", clean_text(anchor));

    let card_text = surrounding_text(anchor, path_pattern);
    for (pattern, field) in [
        (&PRICE_INPUT, "input_per_million"),
        (&PRICE_OUTPUT, "output_per_million"),
        (&PRICE_STEP, "per_step"),
        (&PRICE_MINUTE, "per_minute"),
        (&PRICE_ITEM, "per_item"),
    ] {
        if let Some(value) = labeled_price(pattern, &card_text) {
            record.set_number(field, value);
        }
    }

    record.capabilities = scan_capabilities(&card_text);
    record
}

/// Text of the card fragment around an anchor: up to three ancestors, so
/// sibling labels inside the same card are in scope. The climb never enters
/// a container holding a second model link; those are card grids, and
/// scanning them would attribute a neighbor card's prices to this record.
fn surrounding_text(anchor: ElementRef, path_pattern: &Regex) -> String {
    let mut node = anchor;
    for _ in 0..3 {
        match node.parent().and_then(ElementRef::wrap) {
            Some(parent)
                if parent.value().name() != "body"
                    && parent.value().name() != "html"
                    && model_links_in(parent, path_pattern) <= 1 =>
            {
                node = parent;
            }
            _ => break,
        }
    }
    clean_text(node)
}

/// Number of descendant anchors whose path matches the model-link pattern.
fn model_links_in(element: ElementRef, path_pattern: &Regex) -> usize {
    element
        .select(&ANCHOR)
        .filter(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| path_pattern.is_match(strip_origin(href)))
        })
        .count()
}

fn labeled_price(pattern: &Regex, text: &str) -> Option<f64> {
    pattern.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Drops a scheme+host prefix so patterns only ever see the path.
fn strip_origin(href: &str) -> &str {
    if let Some(rest) = href.strip_prefix("https://").or_else(|| href.strip_prefix("http://")) {
        match rest.find('/') {
            Some(index) => &rest[index..],
            None => "/",
        }
    } else {
        href
    }
}
