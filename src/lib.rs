//! Bitdegree-Scraper: exchange statistics collector
//!
//! This crate walks a fixed chain of bitdegree.org pages for three Turkish
//! cryptocurrency exchanges, extracting each exchange's overview statistics
//! and its paginated market listings into one record per exchange.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Bitdegree-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {exchange} at {step}: {source}")]
    Fetch {
        exchange: String,
        step: state::ChainStep,
        source: crawler::FetchError,
    },

    #[error("Malformed overview for {exchange}: expected at least {min} stats values, found {found}", min = crawler::MIN_OVERVIEW_VALUES)]
    MalformedOverview { exchange: String, found: usize },

    #[error("Extraction error: {0}")]
    Extract(#[from] crawler::ExtractError),

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("URL {url} is outside the allowed domain {allowed}")]
    OffsiteUrl { url: String, allowed: String },

    #[error("Invalid chain transition for {exchange}: {from} -> {to}")]
    InvalidTransition {
        exchange: String,
        from: state::ChainStep,
        to: state::ChainStep,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL: {0}")]
    MissingDomain(String),
}

/// Result type alias for Bitdegree-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{exchange_targets, ChainWalker, Coordinator, ExchangeTarget, PageFetcher};
pub use record::{ExchangeRecord, MarketRow, OverviewStats};
pub use state::{ChainStep, CrawlState};
