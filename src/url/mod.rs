//! URL handling module for Bitdegree-Scraper
//!
//! This module builds the fixed page URLs for each exchange and provides the
//! domain checks used to keep every fetch on the allowed site.

mod domain;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_within_domain};

/// Fragment appended to markets page URLs, matching the site's own pagination links
pub const MARKETS_FRAGMENT: &str = "all-markets";

/// Parses an absolute HTTP(S) URL that must have a host
///
/// # Examples
///
/// ```
/// use bitdegree_scraper::url::parse_page_url;
///
/// assert!(parse_page_url("https://www.bitdegree.org/top-crypto-exchanges/paribu").is_ok());
/// assert!(parse_page_url("ftp://www.bitdegree.org/").is_err());
/// assert!(parse_page_url("not a url").is_err());
/// ```
pub fn parse_page_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if extract_domain(&url).is_none() {
        return Err(UrlError::MissingDomain(raw.to_string()));
    }

    Ok(url)
}

/// Builds the URL of an exchange's markets page
///
/// The page number is 1-based: `{base}/markets?page={page}#all-markets`.
///
/// # Examples
///
/// ```
/// use bitdegree_scraper::url::markets_url;
///
/// let url = markets_url("https://www.bitdegree.org/top-crypto-exchanges/paribu", 2).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.bitdegree.org/top-crypto-exchanges/paribu/markets?page=2#all-markets"
/// );
/// ```
pub fn markets_url(base_url: &str, page: u32) -> UrlResult<Url> {
    let raw = format!(
        "{}/markets?page={}#{}",
        base_url.trim_end_matches('/'),
        page,
        MARKETS_FRAGMENT
    );
    parse_page_url(&raw)
}

/// Returns the robots.txt URL for the origin of `url`
pub fn robots_url(url: &Url) -> UrlResult<Url> {
    url.join("/robots.txt")
        .map_err(|e| UrlError::Parse(format!("robots.txt for {}: {}", url, e)))
}

/// Returns `scheme://host[:port]` for a URL, used to key per-origin caches
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}
