//! Chain walker - walks one exchange's pages from overview to done
//!
//! The walker fetches the overview page, then markets pages 1 through k in
//! ascending order, threading a single `CrawlState` through the loop. Any
//! failure ends the chain; nothing partial is returned.

use crate::crawler::{ExchangeTarget, ExtractError, PageExtractor, PageFetcher};
use crate::record::ExchangeRecord;
use crate::robots::RobotsCache;
use crate::state::{ChainStep, CrawlState};
use crate::url::{is_within_domain, parse_page_url};
use crate::ScrapeError;
use url::Url;

/// Walks exchange page chains with a given fetcher
pub struct ChainWalker<F> {
    fetcher: F,
    extractor: PageExtractor,
    robots: Option<RobotsCache>,
}

impl<F: PageFetcher> ChainWalker<F> {
    /// Creates a walker
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of page bodies
    /// * `user_agent` - Product token matched against robots.txt groups
    /// * `respect_robots` - Whether to consult robots.txt before each page
    pub fn new(fetcher: F, user_agent: &str, respect_robots: bool) -> Result<Self, ScrapeError> {
        Ok(Self {
            fetcher,
            extractor: PageExtractor::new()?,
            robots: respect_robots.then(|| RobotsCache::new(user_agent)),
        })
    }

    /// The fetcher this walker uses
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Walks the full chain for `target` and returns its finished record
    ///
    /// # Returns
    ///
    /// * `Ok(ExchangeRecord)` - Overview plus all k markets pages, in page order
    /// * `Err(ScrapeError)` - The chain stopped at the failing step
    pub async fn walk(&mut self, target: &ExchangeTarget) -> Result<ExchangeRecord, ScrapeError> {
        tracing::info!(
            "Crawling {} ({} markets pages)",
            target.id,
            target.market_pages
        );

        let overview_url = target.overview_url()?;
        let body = self
            .fetch_step(target, ChainStep::Overview, &overview_url)
            .await?;

        let overview = self
            .extractor
            .extract_overview(&body)
            .map_err(|e| match e {
                ExtractError::MalformedOverview { found } => {
                    tracing::warn!(
                        "Malformed overview for {}: {} stats values",
                        target.id,
                        found
                    );
                    ScrapeError::MalformedOverview {
                        exchange: target.id.clone(),
                        found,
                    }
                }
                other => ScrapeError::Extract(other),
            })?;

        let mut state = CrawlState::new(target.id.clone(), overview);
        let mut step = ChainStep::Overview.next(target.market_pages);

        while let ChainStep::Markets { page } = step {
            let url = target.markets_url(page)?;
            let body = self.fetch_step(target, step, &url).await?;

            let rows = self.extractor.extract_market_rows(&body);
            let incomplete = rows.iter().filter(|row| row.has_missing_fields()).count();
            if incomplete > 0 {
                tracing::debug!(
                    "{} {}: {} rows with missing cells",
                    target.id,
                    step,
                    incomplete
                );
            }

            let appended = state.append_page(page, rows)?;
            tracing::debug!(
                "{} {}: {} rows ({} total)",
                target.id,
                step,
                appended,
                state.market_count()
            );

            step = step.next(target.market_pages);
        }

        let record = state.finalize();
        tracing::info!(
            "Finished {}: {} market rows from {} pages",
            record.exchange,
            record.market_count(),
            record.market_pages
        );

        Ok(record)
    }

    /// Fetches one page of the chain after the offsite and robots checks
    async fn fetch_step(
        &mut self,
        target: &ExchangeTarget,
        step: ChainStep,
        url: &Url,
    ) -> Result<String, ScrapeError> {
        ensure_onsite(target, url)?;

        if let Some(robots) = self.robots.as_mut() {
            if !robots.allows(&self.fetcher, url).await {
                tracing::warn!("{} {}: {} disallowed by robots.txt", target.id, step, url);
                return Err(ScrapeError::RobotsDenied {
                    url: url.to_string(),
                });
            }
        }

        tracing::debug!("{} {}: fetching {}", target.id, step, url);

        match self.fetcher.fetch(url).await {
            Ok(page) => {
                // Redirects are followed by the fetcher; the page must still end up onsite
                let final_url = parse_page_url(&page.final_url)?;
                if final_url != *url {
                    tracing::debug!("{} {}: redirected to {}", target.id, step, final_url);
                }
                ensure_onsite(target, &final_url)?;
                Ok(page.body)
            }
            Err(source) => {
                tracing::error!("{} {}: fetch failed: {}", target.id, step, source);
                Err(ScrapeError::Fetch {
                    exchange: target.id.clone(),
                    step,
                    source,
                })
            }
        }
    }
}

/// Rejects URLs outside the target's allowed domain
fn ensure_onsite(target: &ExchangeTarget, url: &Url) -> Result<(), ScrapeError> {
    if is_within_domain(url, &target.allowed_domain) {
        return Ok(());
    }

    tracing::warn!("{}: {} is outside {}", target.id, url, target.allowed_domain);
    Err(ScrapeError::OffsiteUrl {
        url: url.to_string(),
        allowed: target.allowed_domain.clone(),
    })
}
