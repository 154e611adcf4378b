//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Every page of a chain is checked against its origin's rules before it is requested.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::crawler::PageFetcher;
use crate::url::robots_url;
use url::Url;

/// Fetches robots.txt for the origin of `url`
///
/// Any failure (unreachable host, non-2xx status, bad URL) yields an
/// allow-all policy.
///
/// # Arguments
///
/// * `fetcher` - Fetcher used for page requests
/// * `url` - Any URL on the origin
pub async fn fetch_robots<F: PageFetcher + ?Sized>(fetcher: &F, url: &Url) -> ParsedRobots {
    let robots = match robots_url(url) {
        Ok(robots) => robots,
        Err(e) => {
            tracing::debug!("No robots.txt URL for {}: {}", url, e);
            return ParsedRobots::allow_all();
        }
    };

    match fetcher.fetch(&robots).await {
        Ok(page) => {
            tracing::debug!("Fetched {} ({} bytes)", robots, page.body.len());
            ParsedRobots::from_content(&page.body)
        }
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}; allowing all", robots, e);
            ParsedRobots::allow_all()
        }
    }
}
