//! Crawler module for walking exchange page chains
//!
//! This module contains the core crawling logic, including:
//! - The fixed exchange targets and their page URLs
//! - HTTP fetching behind the `PageFetcher` trait
//! - Positional extraction of overview statistics and market rows
//! - The per-exchange chain walker and the run coordinator

mod chain;
mod coordinator;
mod extractor;
mod fetcher;
mod targets;

#[cfg(test)]
pub(crate) mod test_support;

pub use chain::ChainWalker;
pub use coordinator::{run_crawl, Coordinator};
pub use extractor::{ExtractError, PageExtractor, MIN_OVERVIEW_VALUES};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use targets::{exchange_targets, ExchangeTarget, ALLOWED_DOMAIN};

use crate::config::Config;
use crate::record::ExchangeRecord;
use crate::ScrapeError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher
/// 2. Open the configured outputs and start a run
/// 3. Walk BtcTurk Pro, Binance TR and Paribu in that order
/// 4. Emit each exchange's record as soon as its chain completes
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `config_hash` - Hash of the configuration file
///
/// # Returns
///
/// * `Ok(Vec<ExchangeRecord>)` - Crawl completed successfully
/// * `Err(ScrapeError)` - Crawl failed
pub async fn crawl(config: &Config, config_hash: &str) -> Result<Vec<ExchangeRecord>, ScrapeError> {
    run_crawl(config, config_hash).await
}
