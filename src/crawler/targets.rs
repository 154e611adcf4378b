//! The fixed set of exchanges crawled on each run
//!
//! Targets are data, not configuration: the ids, URLs and page counts below
//! match the pages the site actually serves for each exchange.

use crate::url::{markets_url, parse_page_url};
use crate::UrlResult;
use url::Url;

/// Domain every fetch must stay within
pub const ALLOWED_DOMAIN: &str = "bitdegree.org";

const BASE: &str = "https://www.bitdegree.org/top-crypto-exchanges";

/// One exchange and the page chain that describes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeTarget {
    /// Identity used to tag the emitted record
    pub id: String,

    /// Human-readable exchange name
    pub display_name: String,

    /// URL of the overview page; markets pages live under it
    pub base_url: String,

    /// Number of markets pages to walk (k)
    pub market_pages: u32,

    /// Domain the chain's URLs must belong to
    pub allowed_domain: String,
}

impl ExchangeTarget {
    /// Creates a target
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        base_url: impl Into<String>,
        market_pages: u32,
        allowed_domain: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            base_url: base_url.into(),
            market_pages,
            allowed_domain: allowed_domain.into(),
        }
    }

    /// URL of the overview page
    pub fn overview_url(&self) -> UrlResult<Url> {
        parse_page_url(&self.base_url)
    }

    /// URL of markets page `page` (1-based)
    pub fn markets_url(&self, page: u32) -> UrlResult<Url> {
        markets_url(&self.base_url, page)
    }

    /// Total number of pages in the chain, overview included
    pub fn chain_len(&self) -> u32 {
        self.market_pages + 1
    }
}

/// Returns the exchanges in crawl order
///
/// BtcTurk Pro has five markets pages; Binance TR and Paribu have four.
pub fn exchange_targets() -> Vec<ExchangeTarget> {
    vec![
        ExchangeTarget::new(
            "btcturk",
            "BtcTurk Pro",
            format!("{}/btcturk-pro", BASE),
            5,
            ALLOWED_DOMAIN,
        ),
        ExchangeTarget::new(
            "binance",
            "Binance TR",
            format!("{}/binance-tr", BASE),
            4,
            ALLOWED_DOMAIN,
        ),
        ExchangeTarget::new(
            "Paribu",
            "Paribu",
            format!("{}/paribu", BASE),
            4,
            ALLOWED_DOMAIN,
        ),
    ]
}
