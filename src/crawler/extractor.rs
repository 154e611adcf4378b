//! Page extraction for overview and markets pages
//!
//! Every structural assumption about bitdegree.org's markup lives in this
//! module. If the site changes its layout, this is the only file to touch.
//!
//! # Overview pages
//!
//! Statistics are the `span.stats-value` elements inside `div.overall-stats`,
//! read **by position**:
//!
//! | Position | Field |
//! |----------|-------|
//! | 0 | total volume |
//! | 1 | volume in base asset |
//! | 2 | listed asset count |
//! | 3 | market count |
//! | second-to-last | market dominance |
//! | last | market rank |
//!
//! This contract is brittle: the page offers no labels we can key on, so an
//! inserted or removed stat silently shifts the mapping. Fewer than four values
//! is detected and reported as `ExtractError::MalformedOverview`; a shifted
//! layout with four or more values is not detectable here.
//!
//! # Markets pages
//!
//! Each `tbody tr` of the currencies table becomes one `MarketRow`. Cells are
//! read by column position; a missing cell becomes `None` for that field only.

use crate::record::{tokenize, MarketRow, OverviewStats};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

const STATS_VALUE_SELECTOR: &str = "div.overall-stats span.stats-value";
const MARKET_ROW_SELECTOR: &str =
    "div.exchange-currencies-table div.table-wrp table.table tbody tr";
const BASE_COIN_SELECTOR: &str = "td:nth-child(2) div.mr-1";
const NAME_SELECTOR: &str = "td:nth-child(4) strong";
const VOLUME_SELECTOR: &str = "td:nth-child(6) span";
const VOLUME_PERCENT_SELECTOR: &str = "td:nth-child(7)";

/// Minimum number of stats values an overview page must carry
pub const MIN_OVERVIEW_VALUES: usize = 4;

/// Errors raised while extracting data from a page
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("expected at least {min} stats values, found {found}", min = MIN_OVERVIEW_VALUES)]
    MalformedOverview { found: usize },
}

/// Compiled selectors for the two page kinds
#[derive(Debug, Clone)]
pub struct PageExtractor {
    stats_value: Selector,
    market_row: Selector,
    base_coin: Selector,
    name: Selector,
    volume: Selector,
    volume_percent: Selector,
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

impl PageExtractor {
    /// Compiles all selectors
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            stats_value: compile(STATS_VALUE_SELECTOR)?,
            market_row: compile(MARKET_ROW_SELECTOR)?,
            base_coin: compile(BASE_COIN_SELECTOR)?,
            name: compile(NAME_SELECTOR)?,
            volume: compile(VOLUME_SELECTOR)?,
            volume_percent: compile(VOLUME_PERCENT_SELECTOR)?,
        })
    }

    /// Extracts overview statistics from an overview page body
    ///
    /// # Returns
    ///
    /// * `Ok(OverviewStats)` - Positional mapping succeeded
    /// * `Err(ExtractError::MalformedOverview)` - Fewer than four stats values
    pub fn extract_overview(&self, html: &str) -> Result<OverviewStats, ExtractError> {
        let document = Html::parse_document(html);

        let values: Vec<String> = document
            .select(&self.stats_value)
            .map(own_text_joined)
            .collect();

        if values.len() < MIN_OVERVIEW_VALUES {
            return Err(ExtractError::MalformedOverview {
                found: values.len(),
            });
        }

        let last = values.len() - 1;
        Ok(OverviewStats {
            total_volume: tokenize(&values[0]),
            volume_in_base_asset: tokenize(&values[1]),
            listed_asset_count: tokenize(&values[2]),
            market_count_raw: tokenize(&values[3]),
            market_dominance: tokenize(&values[last - 1]),
            market_rank: tokenize(&values[last]),
        })
    }

    /// Extracts every market row from a markets page body, in document order
    ///
    /// A page without the currencies table yields an empty list.
    pub fn extract_market_rows(&self, html: &str) -> Vec<MarketRow> {
        let document = Html::parse_document(html);

        document
            .select(&self.market_row)
            .map(|row| self.extract_row(row))
            .collect()
    }

    fn extract_row(&self, row: ElementRef<'_>) -> MarketRow {
        MarketRow {
            base_coin: first_text(row, &self.base_coin).map(|t| tokenize(&t)),
            name: first_text(row, &self.name),
            volume: first_text(row, &self.volume),
            volume_percent: first_text(row, &self.volume_percent).map(|t| tokenize(&t)),
        }
    }
}

/// First direct text node among the elements of `scope` matching `selector`
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).find_map(first_own_text)
}

/// First text node that is a direct child of `element`
fn first_own_text(element: ElementRef<'_>) -> Option<String> {
    element
        .children()
        .find_map(|node| node.value().as_text().map(|text| String::from(&**text)))
}

/// All direct text children of `element`, concatenated
fn own_text_joined(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}
