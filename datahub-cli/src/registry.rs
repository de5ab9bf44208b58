//! External station registry (VATEUD) fetch and HTML table extraction.
//!
//! The registry publishes its stations as an HTML page. Rows are read from
//! one `<table>` by index; the first row is the header and rows with fewer
//! than five cells are ignored.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info};

use datahub_core::reconcile::ExternalStation;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("page has {found} table(s), expected table #{index}")]
    MissingTable { index: usize, found: usize },
    #[error("bad selector: {0}")]
    Selector(String),
}

/// Download the registry page.
pub fn fetch_page(url: &str, timeout: Duration) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let body = client.get(url).send()?.error_for_status()?.text()?;
    debug!(url, bytes = body.len(), "fetched registry page");
    Ok(body)
}

/// Download and parse the registry rows.
pub fn fetch_stations(
    url: &str,
    timeout: Duration,
    table_index: usize,
) -> Result<Vec<ExternalStation>, FetchError> {
    let rows = parse_stations(&fetch_page(url, timeout)?, table_index)?;
    info!(rows = rows.len(), "fetched external stations");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// HTML extraction
// ---------------------------------------------------------------------------

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Selector(e.to_string()))
}

/// Text content of a cell: every text node trimmed, empty ones dropped, the
/// rest joined without a separator. Entities are already decoded.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Extract station rows from table `table_index` of `html`.
///
/// Tables are numbered in document order, nested tables included. Rows and
/// cells are matched at any depth below the chosen table.
pub fn parse_stations(html: &str, table_index: usize) -> Result<Vec<ExternalStation>, FetchError> {
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;
    let document = Html::parse_document(html);

    let tables: Vec<ElementRef<'_>> = document.select(&table_sel).collect();
    let table = tables.get(table_index).ok_or(FetchError::MissingTable {
        index: table_index,
        found: tables.len(),
    })?;

    let mut stations = Vec::new();
    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
        // country, callsign, name, frequency, region; shorter rows are layout
        let [country_id, callsign, name, frequency, region, ..] = cells.as_slice() else {
            continue;
        };
        stations.push(ExternalStation {
            country_id: country_id.clone(),
            callsign: callsign.clone(),
            name: name.clone(),
            frequency: frequency.clone(),
            region: region.clone(),
        });
    }
    debug!(table = table_index, rows = stations.len(), "extracted registry table");
    Ok(stations)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
