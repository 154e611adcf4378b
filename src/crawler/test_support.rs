//! Canned pages and an in-memory fetcher shared by crawler tests

use crate::crawler::{ExchangeTarget, FetchError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// A response the fake fetcher gives for one URL
#[derive(Debug, Clone)]
pub enum Canned {
    Body(String),
    Status(u16),
    /// Body served after following a redirect to another URL
    Redirect { to: String, body: String },
}

/// Fetcher that serves canned responses and records every request in order
///
/// URLs are matched without their fragment, as a real HTTP request would be.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
}

fn key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &Url, body: impl Into<String>) -> Self {
        self.pages.insert(key(url), Canned::Body(body.into()));
        self
    }

    pub fn status(mut self, url: &Url, status: u16) -> Self {
        self.pages.insert(key(url), Canned::Status(status));
        self
    }

    pub fn redirect(mut self, url: &Url, to: &str, body: impl Into<String>) -> Self {
        self.pages.insert(
            key(url),
            Canned::Redirect {
                to: to.to_string(),
                body: body.into(),
            },
        );
        self
    }

    /// Serves an overview page and `rows_per_page` rows on each markets page
    pub fn with_target(mut self, target: &ExchangeTarget, rows_per_page: usize) -> Self {
        self = self.page(&target.overview_url().unwrap(), overview_html(&target.id));
        for page in 1..=target.market_pages {
            let rows: Vec<String> = (0..rows_per_page)
                .map(|i| market_row(&format!("{}-p{}-r{}", target.id, page, i)))
                .collect();
            self = self.page(&target.markets_url(page).unwrap(), markets_html(&rows));
        }
        self
    }

    /// Requested URLs, robots.txt included, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let key = key(url);
        self.requests.lock().unwrap().push(key.clone());

        match self.pages.get(&key) {
            Some(Canned::Body(body)) => Ok(FetchedPage {
                final_url: key,
                status_code: 200,
                body: body.clone(),
            }),
            Some(Canned::Redirect { to, body }) => Ok(FetchedPage {
                final_url: to.clone(),
                status_code: 200,
                body: body.clone(),
            }),
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url: key,
                status: *status,
            }),
            None => Err(FetchError::Status {
                url: key,
                status: 404,
            }),
        }
    }
}

/// Overview page with six stats values labelled by exchange
pub fn overview_html(exchange: &str) -> String {
    let values = [
        format!("$1.{}M USD", exchange.len()),
        "812.4 BTC".to_string(),
        "98".to_string(),
        "187".to_string(),
        "0.12 %".to_string(),
        format!("#{}", exchange),
    ];
    let spans: String = values
        .iter()
        .map(|v| format!(r#"<span class="stats-value">{}</span>"#, v))
        .collect();
    format!(
        r#"<html><body><div class="overall-stats">{}</div></body></html>"#,
        spans
    )
}

/// A complete markets table row named `name`
pub fn market_row(name: &str) -> String {
    format!(
        concat!(
            "<tr><td>1</td><td><div class=\"mr-1\">BTC</div></td><td>pair</td>",
            "<td><strong>{}</strong></td><td>price</td><td><span>$10,000</span></td>",
            "<td>1.5 %</td></tr>"
        ),
        name
    )
}

/// A row whose name cell is empty
pub fn market_row_without_name() -> String {
    concat!(
        "<tr><td>1</td><td><div class=\"mr-1\">ETH</div></td><td>pair</td>",
        "<td></td><td>price</td><td><span>$5</span></td><td>0.1 %</td></tr>"
    )
    .to_string()
}

/// Markets page wrapping the given rows
pub fn markets_html(rows: &[String]) -> String {
    format!(
        concat!(
            "<html><body><div class=\"exchange-currencies-table\"><div class=\"table-wrp\">",
            "<table class=\"table\"><tbody>{}</tbody></table></div></div></body></html>"
        ),
        rows.concat()
    )
}

/// A target served from a local test origin
pub fn local_target(id: &str, market_pages: u32) -> ExchangeTarget {
    ExchangeTarget::new(
        id,
        id,
        format!("https://www.bitdegree.test/top-crypto-exchanges/{}", id),
        market_pages,
        "bitdegree.test",
    )
}
