//! Per-provider naming grammar, defaults, and pricing conventions.

use crate::catalog::record::{Capability, Modality};
use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use tracing::debug;

/// Scalar spec defaults for one model or one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpecs {
    pub context_window: u32,
    pub max_output_tokens: u32,
}

/// Static description of how one provider names, specs, and prices models.
///
/// Profiles are compile-time data; the extraction strategies and the
/// normalizer consult them but never mutate them.
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    /// Stable provider key, also the output file stem
    pub key: &'static str,
    pub display_name: &'static str,
    /// Anchored regex an API identifier must match
    pub ident_pattern: &'static str,
    /// Family keywords recognized in free-text names, lowercase
    pub family_keywords: &'static [&'static str],
    /// Builds an identifier from a (family, version) pair pulled out of a
    /// free-text name
    pub synthesize: fn(family: &str, major: u32, minor: Option<u32>) -> String,
    /// Identifier-prefix keyed spec defaults
    pub default_specs: &'static [(&'static str, ModelSpecs)],
    /// Provider-wide fallback when no identifier-specific entry matches
    pub fallback_specs: ModelSpecs,
    /// Derive a cached tier (write = input x 1.25, hit = output) when the
    /// page only lists standard prices
    pub derive_cache_tiers: bool,
    /// Derive a batch tier at 50% of standard prices
    pub derive_batch_tier: bool,
    /// Capabilities every model from this provider carries
    pub base_capabilities: &'static [Capability],
    pub input_modalities: &'static [Modality],
    pub output_modalities: &'static [Modality],
}

impl ProviderProfile {
    /// Returns true if `candidate` matches this provider's naming grammar.
    pub fn valid_ident(&self, candidate: &str) -> bool {
        if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
            return false;
        }
        compiled_grammar(self.ident_pattern).is_match(candidate)
    }

    /// Normalizes a free-text model name to an API identifier.
    ///
    /// Slugified names that already satisfy the grammar pass through;
    /// otherwise a `(family, version)` pair is extracted and formatted with
    /// the provider's synthesis rule. Names that fit neither path yield no
    /// identifier and the row is dropped by the caller.
    pub fn normalize_name(&self, text: &str) -> Option<String> {
        let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if trimmed.is_empty() {
            return None;
        }

        // Already an identifier, case aside. Checked before slugifying
        // because slugs flatten dots ("gpt-4.1" -> "gpt-4-1")
        let lower = trimmed.to_lowercase();
        if self.valid_ident(&lower) {
            return Some(lower);
        }

        let slug = slugify(&trimmed);
        if self.valid_ident(&slug) {
            return Some(slug);
        }

        let family = self.family_of(&trimmed)?;
        let (major, minor) = extract_version(&trimmed)?;
        let synthesized = (self.synthesize)(family, major, minor);

        if self.valid_ident(&synthesized) {
            Some(synthesized)
        } else {
            debug!("synthesized identifier {:?} fails grammar for {}", synthesized, self.key);
            None
        }
    }

    /// Returns the first family keyword found in `text`, if any.
    pub fn family_of(&self, text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        self.family_keywords.iter().copied().find(|keyword| lower.contains(keyword))
    }

    /// Looks up spec defaults by identifier prefix, then provider-wide.
    pub fn specs_for(&self, id: &str) -> ModelSpecs {
        self.default_specs
            .iter()
            .find(|(prefix, _)| id.starts_with(prefix))
            .map(|(_, specs)| *specs)
            .unwrap_or(self.fallback_specs)
    }
}

/// Compiled identifier grammars, one per distinct pattern. Patterns are
/// static literals, so a pattern that does not compile is a programming
/// error and panics instead of silently failing every match.
fn compiled_grammar(pattern: &'static str) -> &'static Regex {
    static COMPILED: LazyLock<Mutex<HashMap<&'static str, &'static Regex>>> =
        LazyLock::new(|| Mutex::new(HashMap::new()));

    let mut grammars = COMPILED.lock().unwrap_or_else(PoisonError::into_inner);
    *grammars.entry(pattern).or_insert_with(|| {
        match Regex::new(pattern) {
            Ok(grammar) => Box::leak(Box::new(grammar)),
            Err(e) => panic!("identifier grammar {:?} does not compile: {}", pattern, e),
        }
    })
}

/// Lowercases and hyphenates free text: "Claude 3.5 Haiku" -> "claude-3-5-haiku".
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Pulls the first version number out of free text.
fn extract_version(text: &str) -> Option<(u32, Option<u32>)> {
    let pattern = Regex::new(r"([0-9]+)(?:\.([0-9]+))?").ok()?;
    let captures = pattern.captures(text)?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2).and_then(|m| m.as_str().parse().ok());
    Some((major, minor))
}
