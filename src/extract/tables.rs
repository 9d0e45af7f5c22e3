//! Tabular extraction: spec and pricing tables with a header row.

use crate::extract::selectors::{CELL, ROW, TABLE};
use crate::extract::{clean_text, parse_price, parse_token_count, RawRecord, SourceKind};
use crate::providers::profile::ProviderProfile;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Column semantics resolved from a header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    InputPrice,
    OutputPrice,
    CachedInput,
    CitationInput,
    CitationOutput,
    SearchQueries,
    ContextWindow,
    MaxOutput,
    Skip,
}

/// Scans every table in the document and yields one record per usable row.
///
/// Column meaning comes from header keywords; when a pricing table has no
/// recognizable price columns, position decides (first data column = input,
/// last = output). Duplicate identifiers keep the first row seen.
pub fn extract_tables(
    document: &Html,
    kind: SourceKind,
    profile: &ProviderProfile,
) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for table in document.select(&TABLE) {
        let rows: Vec<ElementRef> = table.select(&ROW).collect();
        let Some((header, data_rows)) = rows.split_first() else {
            continue;
        };

        let header_cells: Vec<String> =
            header.select(&CELL).map(|cell| clean_text(cell)).collect();
        let columns = classify_columns(&header_cells, kind);

        if !columns.contains(&Column::Name) {
            trace!("table without a name column, skipping");
            continue;
        }

        for row in data_rows {
            let cells: Vec<String> = row.select(&CELL).map(|cell| clean_text(cell)).collect();
            let Some((id, record)) = row_record(&cells, &columns, kind, profile) else {
                continue;
            };
            if seen.insert(id) {
                records.push(record);
            } else {
                trace!("duplicate identifier in table, keeping first row");
            }
        }
    }

    debug!("extracted {} records from tables ({:?})", records.len(), kind);
    records
}

/// Maps header cells to column semantics, with a positional fallback for
/// price columns when keyword matching is inconclusive.
fn classify_columns(headers: &[String], kind: SourceKind) -> Vec<Column> {
    let mut columns: Vec<Column> = headers.iter().map(|text| classify_header(text)).collect();

    if kind == SourceKind::PricingDescriptor
        && columns.iter().all(|column| matches!(column, Column::Name | Column::Skip))
    {
        // First data column after the name is input, last column is output
        let data_indices: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| **column != Column::Name)
            .map(|(index, _)| index)
            .collect();
        if let (Some(&first), Some(&last)) = (data_indices.first(), data_indices.last()) {
            columns[first] = Column::InputPrice;
            if last != first {
                columns[last] = Column::OutputPrice;
            }
        }
    }

    columns
}

fn classify_header(text: &str) -> Column {
    let lower = text.to_lowercase();
    if lower.contains("model") || lower.contains("name") {
        Column::Name
    } else if lower.contains("citation") && lower.contains("output") {
        Column::CitationOutput
    } else if lower.contains("citation") {
        Column::CitationInput
    } else if lower.contains("search") {
        Column::SearchQueries
    } else if lower.contains("cache") {
        Column::CachedInput
    } else if lower.contains("context") {
        Column::ContextWindow
    } else if lower.contains("max") && lower.contains("output") {
        Column::MaxOutput
    } else if lower.contains("input") {
        Column::InputPrice
    } else if lower.contains("output") {
        Column::OutputPrice
    } else {
        Column::Skip
    }
}

/// True for first cells that repeat the header inside the table body.
fn is_repeated_header(cell: &str) -> bool {
    matches!(
        cell.to_lowercase().as_str(),
        "model" | "name" | "api" | "id" | "model name" | "api name" | "model id"
    )
}

/// Builds one record from a data row, keyed by its validated identifier;
/// `None` drops the row without touching the rest of the table.
fn row_record(
    cells: &[String],
    columns: &[Column],
    kind: SourceKind,
    profile: &ProviderProfile,
) -> Option<(String, RawRecord)> {
    let name_index = columns.iter().position(|column| *column == Column::Name)?;
    let name_text = cells.get(name_index)?;

    if is_repeated_header(name_text) {
        trace!("skipping repeated header row");
        return None;
    }

    let api_name = match profile.normalize_name(name_text) {
        Some(id) => id,
        None => {
            debug!("no identifier for row {:?}, dropping", name_text);
            return None;
        }
    };

    let mut record = RawRecord::new(kind);
    record.api_name = Some(api_name.clone());
    record.set_text("name", name_text.clone());

    for (index, column) in columns.iter().enumerate() {
        let Some(cell) = cells.get(index) else {
            continue;
        };
        match column {
            Column::InputPrice => {
                if let Some(price) = parse_price(cell) {
                    record.set_number("input_per_million", price);
                }
            }
            Column::OutputPrice => {
                if let Some(price) = parse_price(cell) {
                    record.set_number("output_per_million", price);
                }
            }
            Column::CachedInput => {
                if let Some(price) = parse_price(cell) {
                    record.set_number("cached_input_per_million", price);
                }
            }
            Column::CitationInput => {
                if let Some(price) = parse_price(cell) {
                    record.set_number("citation_input_per_million", price);
                }
            }
            Column::CitationOutput => {
                if let Some(price) = parse_price(cell) {
                    record.set_number("citation_output_per_million", price);
                }
            }
            Column::SearchQueries => {
                if let Some(price) = parse_price(cell) {
                    record.set_number("search_per_thousand", price);
                }
            }
            Column::ContextWindow => {
                if let Some(tokens) = parse_token_count(cell) {
                    record.set_number("context_window", tokens as f64);
                }
            }
            Column::MaxOutput => {
                if let Some(tokens) = parse_token_count(cell) {
                    record.set_number("max_output_tokens", tokens as f64);
                }
            }
            Column::Name | Column::Skip => {}
        }
    }

    Some((api_name, record))
}
