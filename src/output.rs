//! Catalog output: NDJSON files per provider and text reports.

use crate::catalog::{Catalog, CatalogRecord};
use crate::providers::Provider;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Renders records as newline-delimited JSON, one object per line.
pub fn render_ndjson(records: &[CatalogRecord]) -> Result<String> {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        lines.push(
            serde_json::to_string(record)
                .with_context(|| format!("Failed to serialize record {}", record.id))?,
        );
    }
    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }
    Ok(body)
}

/// Writes one `{provider}.ndjson` file per harvested provider under `dir`.
///
/// Providers absent from the catalog are not touched, so a failed harvest
/// leaves the previous run's file in place.
pub fn write_catalog(catalog: &Catalog, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    for (provider, records) in catalog.iter() {
        let path = dir.join(format!("{}.ndjson", provider));
        let body = render_ndjson(records)?;
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("wrote {} records to {}", records.len(), path.display());
    }

    info!("catalog written to {} ({} records)", dir.display(), catalog.total());
    Ok(())
}

/// Renders the provider feature matrix as an aligned text table.
pub fn render_feature_matrix(providers: &[Box<dyn Provider>]) -> String {
    let provider_width = 12;
    let column_width = 10;

    let mut lines = Vec::new();
    lines.push(format!(
        "{:<provider_width$}  {:<column_width$}  {:<column_width$}  {:<column_width$}",
        "Provider", "API spec", "Model info", "Pricing"
    ));
    lines.push(format!(
        "{:-<provider_width$}  {:-<column_width$}  {:-<column_width$}  {:-<column_width$}",
        "", "", "", ""
    ));

    for provider in providers {
        let caps = provider.caps();
        let mark = |present: bool| if present { "yes" } else { "-" };
        lines.push(format!(
            "{:<provider_width$}  {:<column_width$}  {:<column_width$}  {:<column_width$}",
            provider.profile().display_name,
            mark(caps.api_spec),
            mark(caps.model_info),
            mark(caps.pricing)
        ));
    }

    lines.push(String::new());
    lines.push(format!("Total: {} providers", providers.len()));
    lines.join("\n")
}

/// One-line-per-provider harvest summary.
pub fn render_summary(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return "No records harvested.".to_string();
    }

    let mut lines = Vec::new();
    for (provider, count) in catalog.counts() {
        lines.push(format!("{:<12}  {:>5} records", provider, count));
    }
    lines.push(String::new());
    lines.push(format!("Total: {} records", catalog.total()));
    lines.join("\n")
}
