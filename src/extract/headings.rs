//! Heading-proximity extraction: docs pages where a model heading is
//! followed by prose containing the identifier in an inline code fragment.

use crate::extract::selectors::{CODE, HEADING};
use crate::extract::{clean_text, RawRecord, SourceKind};
use crate::providers::profile::ProviderProfile;
use regex_lite::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// How many sibling elements to walk past a heading before giving up.
const MAX_SIBLING_HOPS: usize = 10;

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(\.[0-9]+)?").unwrap());

/// Scans `h2`/`h3` headings naming a model family plus a version, then walks
/// forward through siblings (stopping at the next heading) for an inline
/// `code` fragment that satisfies the identifier grammar.
pub fn extract_headings(document: &Html, profile: &ProviderProfile) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for heading in document.select(&HEADING) {
        let title = clean_text(heading);
        if profile.family_of(&title).is_none() || !VERSION.is_match(&title) {
            continue;
        }

        let Some(id) = identifier_after(heading, profile) else {
            trace!("no identifier near heading {:?}", title);
            continue;
        };

        if !seen.insert(id.clone()) {
            trace!("duplicate identifier {} under heading {:?}, keeping first", id, title);
            continue;
        }

        let mut record = RawRecord::new(SourceKind::ModelDescriptor);
        record.api_name = Some(id);
        record.set_text("name", title);
        records.push(record);
    }

    debug!("extracted {} records from headings", records.len());
    records
}

/// Bounded forward walk from a heading to the first matching code fragment.
fn identifier_after(heading: ElementRef, profile: &ProviderProfile) -> Option<String> {
    for sibling in heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take(MAX_SIBLING_HOPS)
    {
        if is_heading(sibling) {
            return None;
        }

        if sibling.value().name() == "code" {
            let text = clean_text(sibling);
            if profile.valid_ident(&text) {
                return Some(text);
            }
        }

        for code in sibling.select(&CODE) {
            let text = clean_text(code);
            if profile.valid_ident(&text) {
                return Some(text);
            }
        }
    }
    None
}

fn is_heading(element: ElementRef) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3" | "h4")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::record::Modality;
    use crate::providers::profile::ModelSpecs;

    fn gemini_style(family: &str, major: u32, minor: Option<u32>) -> String {
        format!("gemini-{}.{}-{}", major, minor.unwrap_or(0), family)
    }

    fn test_profile() -> ProviderProfile {
        ProviderProfile {
            key: "google",
            display_name: "Google",
            ident_pattern: r"^gemini-[a-z0-9.-]+$",
            family_keywords: &["flash", "pro", "gemini"],
            synthesize: gemini_style,
            default_specs: &[],
            fallback_specs: ModelSpecs { context_window: 1_048_576, max_output_tokens: 8_192 },
            derive_cache_tiers: false,
            derive_batch_tier: false,
            base_capabilities: &[],
            input_modalities: &[Modality::Text],
            output_modalities: &[Modality::Text],
        }
    }

    #[test]
    fn test_heading_with_code_sibling() {
        let html = Html::parse_document(
            r#"<article>
                <h2>Gemini 2.5 Flash</h2>
                <p>Our fast workhorse model.</p>
                <p>Model code: <code>gemini-2.5-flash</code></p>
            </article>"#,
        );
        let records = extract_headings(&html, &test_profile());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].api_name.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(records[0].text("name"), Some("Gemini 2.5 Flash"));
    }

    #[test]
    fn test_walk_stops_at_next_heading() {
        // The identifier sits past the next heading, so it belongs to that
        // section, not this one
        let html = Html::parse_document(
            r#"<article>
                <h2>Gemini 2.5 Pro</h2>
                <p>Details to follow.</p>
                <h2>Gemini 2.5 Flash</h2>
                <p><code>gemini-2.5-flash</code></p>
            </article>"#,
        );
        let records = extract_headings(&html, &test_profile());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].api_name.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(records[0].text("name"), Some("Gemini 2.5 Flash"));
    }

    #[test]
    fn test_heading_without_version_ignored() {
        let html = Html::parse_document(
            r#"<article>
                <h2>Flash models</h2>
                <p><code>gemini-2.5-flash</code></p>
            </article>"#,
        );
        let records = extract_headings(&html, &test_profile());
        assert!(records.is_empty());
    }

    #[test]
    fn test_heading_without_family_keyword_ignored() {
        let html = Html::parse_document(
            r#"<article>
                <h2>Release notes 2.5</h2>
                <p><code>gemini-2.5-flash</code></p>
            </article>"#,
        );
        let records = extract_headings(&html, &test_profile());
        assert!(records.is_empty());
    }

    #[test]
    fn test_code_failing_grammar_skipped() {
        let html = Html::parse_document(
            r#"<article>
                <h2>Gemini 2.5 Flash</h2>
                <p><code>pip install google-genai</code> then <code>gemini-2.5-flash</code></p>
            </article>"#,
        );
        let records = extract_headings(&html, &test_profile());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].api_name.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_bounded_walk_gives_up() {
        let mut body = String::from("<article><h2>Gemini 2.5 Flash</h2>");
        for _ in 0..12 {
            body.push_str("<p>filler paragraph</p>");
        }
        body.push_str("<p><code>gemini-2.5-flash</code></p></article>");

        let records = extract_headings(&Html::parse_document(&body), &test_profile());
        assert!(records.is_empty());
    }

    #[test]
    fn test_duplicate_identifier_first_heading_wins() {
        let html = Html::parse_document(
            r#"<article>
                <h2>Gemini 2.5 Flash</h2>
                <p><code>gemini-2.5-flash</code></p>
                <h3>Gemini 2.5 Flash preview</h3>
                <p><code>gemini-2.5-flash</code></p>
            </article>"#,
        );
        let records = extract_headings(&html, &test_profile());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text("name"), Some("Gemini 2.5 Flash"));
    }
}
