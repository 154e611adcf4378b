//! Exchange record types
//!
//! Values scraped from bitdegree.org are kept as whitespace-split string
//! fragments ("tokens") and are never parsed into numbers, so "$1.2M USD"
//! stays `["$1.2M", "USD"]`. Downstream consumers decide how to interpret them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A text fragment split on whitespace
pub type Tokens = Vec<String>;

/// Splits a text fragment into whitespace-separated tokens
///
/// # Examples
///
/// ```
/// use bitdegree_scraper::record::tokenize;
///
/// assert_eq!(tokenize("  $12.5M\n USD "), vec!["$12.5M", "USD"]);
/// assert!(tokenize("   ").is_empty());
/// ```
pub fn tokenize(text: &str) -> Tokens {
    text.split_whitespace().map(str::to_string).collect()
}

/// Summary statistics from an exchange's overview page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total_volume: Tokens,
    pub volume_in_base_asset: Tokens,
    pub listed_asset_count: Tokens,
    pub market_count_raw: Tokens,
    pub market_dominance: Tokens,
    pub market_rank: Tokens,
}

/// One row of an exchange's markets table
///
/// `None` marks a cell that was absent from the page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketRow {
    #[serde(rename = "Base Coin")]
    pub base_coin: Option<Tokens>,

    #[serde(rename = "Name")]
    pub name: Option<String>,

    #[serde(rename = "Volume")]
    pub volume: Option<String>,

    #[serde(rename = "Volume %")]
    pub volume_percent: Option<Tokens>,
}

impl MarketRow {
    /// Returns true if any cell of this row was missing
    pub fn has_missing_fields(&self) -> bool {
        self.base_coin.is_none()
            || self.name.is_none()
            || self.volume.is_none()
            || self.volume_percent.is_none()
    }
}

/// The finalized, immutable result of crawling one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Exchange identity, used as the emission tag
    pub exchange: String,

    /// Overview statistics
    pub overview: OverviewStats,

    /// Market rows in page order, then row order within each page
    pub markets: Vec<MarketRow>,

    /// Number of markets pages that contributed rows
    pub market_pages: u32,

    /// When the record was finalized
    pub scraped_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct TaggedBody<'a> {
    #[serde(flatten)]
    overview: &'a OverviewStats,
    markets: &'a [MarketRow],
}

impl ExchangeRecord {
    /// Number of market rows collected across all pages
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    /// Renders the record as `{"<exchange>": {<overview fields>, "markets": [...]}}`
    pub fn to_tagged_json(&self) -> Result<Value, serde_json::Error> {
        let body = serde_json::to_value(TaggedBody {
            overview: &self.overview,
            markets: &self.markets,
        })?;

        let mut tagged = Map::new();
        tagged.insert(self.exchange.clone(), body);
        Ok(Value::Object(tagged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ExchangeRecord {
        ExchangeRecord {
            exchange: "btcturk".to_string(),
            overview: OverviewStats {
                total_volume: tokenize("$52.3M"),
                volume_in_base_asset: tokenize("812.4 BTC"),
                listed_asset_count: tokenize("98"),
                market_count_raw: tokenize("187 markets"),
                market_dominance: tokenize("0.12 %"),
                market_rank: tokenize("#41"),
            },
            markets: vec![
                MarketRow {
                    base_coin: Some(tokenize("BTC")),
                    name: Some("BTC/TRY".to_string()),
                    volume: Some("$10.1M".to_string()),
                    volume_percent: Some(tokenize("19.3%")),
                },
                MarketRow {
                    base_coin: Some(tokenize("ETH")),
                    name: None,
                    volume: Some("$4.0M".to_string()),
                    volume_percent: Some(tokenize("7.6%")),
                },
            ],
            market_pages: 5,
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_tokenize_splits_on_any_whitespace() {
        assert_eq!(tokenize("a\tb\nc  d"), vec!["a", "b", "c", "d"]);
        assert_eq!(tokenize("single"), vec!["single"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tagged_json_shape() {
        let record = sample_record();
        let json = record.to_tagged_json().unwrap();

        let body = &json["btcturk"];
        assert_eq!(body["total_volume"], serde_json::json!(["$52.3M"]));
        assert_eq!(body["market_rank"], serde_json::json!(["#41"]));
        assert_eq!(body["markets"].as_array().unwrap().len(), 2);
        assert_eq!(body["markets"][0]["Base Coin"], serde_json::json!(["BTC"]));
        assert_eq!(body["markets"][0]["Volume %"], serde_json::json!(["19.3%"]));
    }

    #[test]
    fn test_tagged_json_missing_name_is_null() {
        let record = sample_record();
        let json = record.to_tagged_json().unwrap();
        assert!(json["btcturk"]["markets"][1]["Name"].is_null());
    }

    #[test]
    fn test_tagged_json_has_single_tag() {
        let json = sample_record().to_tagged_json().unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_has_missing_fields() {
        let record = sample_record();
        assert!(!record.markets[0].has_missing_fields());
        assert!(record.markets[1].has_missing_fields());
        assert!(MarketRow::default().has_missing_fields());
    }
}
