//! Per-origin robots.txt cache
//!
//! Each origin's robots.txt is fetched at most once per run. A chain touches a
//! single origin, so in practice this is one fetch per site.

use crate::crawler::PageFetcher;
use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::origin_key;
use std::collections::HashMap;
use url::Url;

/// Robots rules keyed by origin
#[derive(Debug, Clone)]
pub struct RobotsCache {
    /// Product token matched against `User-agent` groups
    user_agent: String,

    /// Rules fetched so far, keyed by `scheme://host[:port]`
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    /// Creates an empty cache for the given user agent token
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            entries: HashMap::new(),
        }
    }

    /// Checks whether `url` may be fetched, fetching robots.txt on first use
    pub async fn allows<F: PageFetcher + ?Sized>(&mut self, fetcher: &F, url: &Url) -> bool {
        let key = origin_key(url);

        if !self.entries.contains_key(&key) {
            let robots = fetch_robots(fetcher, url).await;
            self.entries.insert(key.clone(), robots);
        }

        self.entries
            .get(&key)
            .map_or(true, |robots| robots.is_allowed(url.as_str(), &self.user_agent))
    }

    /// Seeds the cache with already-known rules for an origin
    pub fn insert(&mut self, url: &Url, robots: ParsedRobots) {
        self.entries.insert(origin_key(url), robots);
    }

    /// Number of origins cached
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
