//! Per-exchange crawl accumulator
//!
//! A `CrawlState` is created from an exchange's overview statistics, grows by
//! one markets page at a time, and is consumed by `finalize` into an
//! immutable `ExchangeRecord`. It is owned by exactly one chain at a time.

use crate::record::{ExchangeRecord, MarketRow, OverviewStats};
use crate::state::ChainStep;
use crate::ScrapeError;
use chrono::Utc;

/// The in-flight aggregate for one exchange
#[derive(Debug, Clone)]
pub struct CrawlState {
    exchange: String,
    overview: OverviewStats,
    markets: Vec<MarketRow>,
    step: ChainStep,
}

impl CrawlState {
    /// Starts an accumulator from the exchange's overview statistics
    pub fn new(exchange: impl Into<String>, overview: OverviewStats) -> Self {
        Self {
            exchange: exchange.into(),
            overview,
            markets: Vec::new(),
            step: ChainStep::Overview,
        }
    }

    /// Appends one markets page worth of rows
    ///
    /// Pages must arrive in ascending order starting at 1. Rows are appended
    /// as-is: nothing is deduplicated or reordered.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of rows appended from this page
    /// * `Err(ScrapeError::InvalidTransition)` - Page arrived out of order
    pub fn append_page(&mut self, page: u32, rows: Vec<MarketRow>) -> Result<usize, ScrapeError> {
        let to = ChainStep::Markets { page };
        let expected = ChainStep::Markets {
            page: self.pages_visited() + 1,
        };

        if to != expected {
            return Err(ScrapeError::InvalidTransition {
                exchange: self.exchange.clone(),
                from: self.step,
                to,
            });
        }

        let appended = rows.len();
        self.markets.extend(rows);
        self.step = to;
        Ok(appended)
    }

    /// The exchange this state belongs to
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// The last step applied to this state
    pub fn step(&self) -> ChainStep {
        self.step
    }

    /// Number of markets pages appended so far
    pub fn pages_visited(&self) -> u32 {
        self.step.page().unwrap_or(0)
    }

    /// Number of market rows collected so far
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Converts the accumulator into a finished record
    pub fn finalize(self) -> ExchangeRecord {
        let market_pages = self.pages_visited();
        ExchangeRecord {
            exchange: self.exchange,
            overview: self.overview,
            markets: self.markets,
            market_pages,
            scraped_at: Utc::now(),
        }
    }
}
