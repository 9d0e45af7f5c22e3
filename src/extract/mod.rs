//! Record extraction from parsed provider pages.
//!
//! Three independent strategies cover the page shapes seen across providers:
//! spec tables ([`tables`]), linked model cards ([`cards`]), and
//! heading-plus-code-fragment docs ([`headings`]). Each strategy yields
//! [`RawRecord`]s; a bad row or card is skipped without aborting the rest of
//! the page.

pub mod cards;
pub mod headings;
pub mod tables;

use crate::catalog::record::Capability;
use scraper::{ElementRef, Selector};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Which side of the catalog a raw record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Descriptive attributes: display name, context window, max output
    ModelDescriptor,
    /// Price attributes keyed by identifier
    PricingDescriptor,
}

/// A loosely-typed field value pulled out of a document fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

/// An unvalidated record extracted from one row, card, or heading block.
///
/// Consumed by the normalizer immediately after the page scan; nothing here
/// is trusted until the identifier has passed the provider grammar.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub kind: SourceKind,
    pub api_name: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub capabilities: BTreeSet<Capability>,
}

impl RawRecord {
    /// Creates an empty record of the given kind.
    pub fn new(kind: SourceKind) -> Self {
        Self { kind, api_name: None, fields: BTreeMap::new(), capabilities: BTreeSet::new() }
    }

    /// Sets a text field, ignoring empty values.
    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.fields.insert(key.to_string(), FieldValue::Text(value));
        }
    }

    /// Sets a numeric field.
    pub fn set_number(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_string(), FieldValue::Number(value));
    }

    /// Returns a numeric field if present.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a text field if present.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Shared selectors for structural scanning.
pub mod selectors {
    use super::*;

    pub static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());

    pub static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

    pub static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());

    pub static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

    pub static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2, h3").unwrap());

    pub static CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").unwrap());
}

/// Collects an element's text with whitespace collapsed.
pub fn clean_text(element: ElementRef) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a money value from cell text like "$3.00", "$0.80 / MTok", "3".
///
/// Returns `None` for dashes, "n/a", and anything without a digit.
pub fn parse_price(text: &str) -> Option<f64> {
    // Take the first digit run only; "per 1M tokens" style units carry their
    // own digits that must not be swallowed
    let mut digits = String::new();
    let mut started = false;
    for c in text.chars() {
        if c.is_ascii_digit() || (started && c == '.') {
            digits.push(c);
            started = true;
        } else if started {
            break;
        }
    }

    if !started {
        return None;
    }
    digits.parse().ok()
}

/// Parses a token count from cell text like "200K", "1M", "128,000", "8192".
pub fn parse_token_count(text: &str) -> Option<u32> {
    let compact = text.trim().to_lowercase().replace(',', "");
    let mut digits = String::new();
    let mut suffix = None;
    for c in compact.chars() {
        if c.is_ascii_digit() || c == '.' {
            digits.push(c);
        } else if !digits.is_empty() {
            if c == 'k' || c == 'm' {
                suffix = Some(c);
            }
            break;
        }
    }

    let base: f64 = digits.parse().ok()?;
    let scaled = match suffix {
        Some('k') => base * 1_000.0,
        Some('m') => base * 1_000_000.0,
        _ => base,
    };
    Some(scaled as u32)
}

/// Scans fragment text for capability keywords.
pub fn scan_capabilities(text: &str) -> BTreeSet<Capability> {
    const KEYWORDS: &[(&str, Capability)] = &[
        ("vision", Capability::Vision),
        ("image input", Capability::Vision),
        ("tool", Capability::ToolUse),
        ("function calling", Capability::ToolUse),
        ("speech", Capability::Speech),
        ("audio", Capability::Speech),
        ("reasoning", Capability::Reasoning),
        ("thinking", Capability::Reasoning),
        ("structured output", Capability::StructuredOutput),
        ("json mode", Capability::StructuredOutput),
    ];

    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, capability)| *capability)
        .collect()
}
