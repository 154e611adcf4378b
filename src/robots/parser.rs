//! Robots.txt rule matching
//!
//! Matching is delegated to the robotstxt crate, which follows Google's
//! reference parser: the most specific `User-agent` group wins and, within a
//! group, the longest matching `Allow`/`Disallow` path decides.

use robotstxt::DefaultMatcher;

/// Rules from one origin's robots.txt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRobots {
    /// No usable robots.txt; every path is allowed
    AllowAll,

    /// Raw robots.txt body, matched on demand
    Rules(String),
}

impl ParsedRobots {
    /// Wraps a robots.txt body
    ///
    /// An empty or whitespace-only body allows everything.
    pub fn from_content(content: &str) -> Self {
        if content.trim().is_empty() {
            Self::AllowAll
        } else {
            Self::Rules(content.to_string())
        }
    }

    /// A policy that allows every URL
    pub fn allow_all() -> Self {
        Self::AllowAll
    }

    /// Checks whether `url` may be fetched by `user_agent`
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to check, absolute or path-only (e.g., "/page.html")
    /// * `user_agent` - Product token, e.g. the configured crawler name
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Rules(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, user_agent, url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "BitdegreeScraper";
    const PARIBU: &str = "https://www.bitdegree.org/top-crypto-exchanges/paribu";

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed(PARIBU, AGENT));
        assert!(robots.is_allowed("/admin", AGENT));
    }

    #[test]
    fn test_blank_content_allows_all() {
        assert_eq!(ParsedRobots::from_content(" \n"), ParsedRobots::AllowAll);
    }

    #[test]
    fn test_disallow_everything() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allowed(PARIBU, AGENT));
    }

    #[test]
    fn test_markets_pages_disallowed_overview_allowed() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nDisallow: /top-crypto-exchanges/paribu/markets",
        );
        assert!(robots.is_allowed(PARIBU, AGENT));
        assert!(!robots.is_allowed(&format!("{}/markets?page=1", PARIBU), AGENT));
    }

    #[test]
    fn test_longest_match_wins() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nDisallow: /top-crypto-exchanges\nAllow: /top-crypto-exchanges/paribu",
        );
        assert!(robots.is_allowed(PARIBU, AGENT));
        assert!(!robots.is_allowed(
            "https://www.bitdegree.org/top-crypto-exchanges/binance-tr",
            AGENT
        ));
    }

    #[test]
    fn test_group_for_other_agent_ignored() {
        let robots = ParsedRobots::from_content("User-agent: OtherBot\nDisallow: /");
        assert!(robots.is_allowed(PARIBU, AGENT));
        assert!(!robots.is_allowed(PARIBU, "OtherBot"));
    }

    #[test]
    fn test_garbage_content_allows() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed(PARIBU, AGENT));
    }
}
