//! Integration tests for the crawler
//!
//! These tests use wiremock to serve bitdegree-shaped pages and run the full
//! chain end-to-end over HTTP: fetch, extract, accumulate, emit, persist.

use bitdegree_scraper::config::{HttpConfig, UserAgentConfig};
use bitdegree_scraper::crawler::{ChainWalker, Coordinator, ExchangeTarget, FetchError, HttpFetcher};
use bitdegree_scraper::output::{JsonLinesSink, SinkSet, SqliteSink};
use bitdegree_scraper::storage::{RunStatus, SqliteStorage, Storage};
use bitdegree_scraper::{ChainStep, ScrapeError};
use serde_json::Value;
use std::path::Path;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "TestBot/1.0.0 (+https://example.com/contact; test@example.com)";

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// The three exchanges, served from the mock server
fn targets(base_url: &str) -> Vec<ExchangeTarget> {
    [("btcturk", "btcturk-pro", 5), ("binance", "binance-tr", 4), ("Paribu", "paribu", 4)]
        .into_iter()
        .map(|(id, slug, pages)| {
            ExchangeTarget::new(
                id,
                id,
                format!("{}/top-crypto-exchanges/{}", base_url, slug),
                pages,
                "127.0.0.1",
            )
        })
        .collect()
}

fn overview_html(rank: &str) -> String {
    format!(
        r#"<html><body>
        <div class="overall-stats">
          <div><span class="stats-value">$52.3M USD</span></div>
          <div><span class="stats-value">812.4 BTC</span></div>
          <div><span class="stats-value">98</span></div>
          <div><span class="stats-value">187</span></div>
          <div><span class="stats-value">0.12 %</span></div>
          <div><span class="stats-value">{}</span></div>
        </div>
        </body></html>"#,
        rank
    )
}

fn markets_html(prefix: &str, rows: usize) -> String {
    let rows: String = (0..rows)
        .map(|i| {
            format!(
                r#"<tr>
                  <td>{i}</td>
                  <td><div class="mr-1">BTC</div></td>
                  <td>BTC/TRY</td>
                  <td><strong>{prefix}-{i}</strong></td>
                  <td>$26,000</td>
                  <td><span>$1,204,553</span></td>
                  <td>12.5 %</td>
                </tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <div class="exchange-currencies-table"><div class="table-wrp">
          <table class="table"><tbody>{}</tbody></table>
        </div></div>
        </body></html>"#,
        rows
    )
}

/// Mounts an overview page and every markets page for `target`
async fn mount_target(server: &MockServer, target: &ExchangeTarget, rows_per_page: usize) {
    let overview_path = url::Url::parse(&target.base_url).unwrap().path().to_string();

    Mock::given(method("GET"))
        .and(path(overview_path.as_str()))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(overview_html(&format!("#{}", target.id))))
        .mount(server)
        .await;

    for page in 1..=target.market_pages {
        Mock::given(method("GET"))
            .and(path(format!("{}/markets", overview_path)))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(markets_html(&format!("{}-p{}", target.id, page), rows_per_page)),
            )
            .mount(server)
            .await;
    }
}

fn sinks(json_path: &Path, db_path: &Path) -> (SinkSet, i64) {
    let mut set = SinkSet::new();
    set.push(JsonLinesSink::create(json_path).unwrap());

    let storage = SqliteStorage::new(db_path).unwrap();
    let sink = SqliteSink::start(storage, "test-hash").unwrap();
    let run_id = sink.run_id();
    set.push(sink);

    (set, run_id)
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn walker(respect_robots: bool) -> ChainWalker<HttpFetcher> {
    let fetcher = HttpFetcher::new(&user_agent(), &HttpConfig::default()).unwrap();
    ChainWalker::new(fetcher, "TestBot", respect_robots).unwrap()
}

#[tokio::test]
async fn test_full_crawl_three_exchanges() {
    let server = MockServer::start().await;
    let targets = targets(&server.uri());
    for target in &targets {
        mount_target(&server, target, 2).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("exchanges.jsonl");
    let db_path = dir.path().join("exchanges.db");
    let (set, run_id) = sinks(&json_path, &db_path);

    let mut coordinator = Coordinator::new(walker(true), targets, set);
    coordinator.run().await.unwrap();
    drop(coordinator);

    // JSON lines: one tagged object per exchange, in order
    let lines = read_lines(&json_path);
    assert_eq!(lines.len(), 3);
    let tags: Vec<_> = lines
        .iter()
        .map(|line| line.as_object().unwrap().keys().next().unwrap().clone())
        .collect();
    assert_eq!(tags, vec!["btcturk", "binance", "Paribu"]);

    let btcturk = &lines[0]["btcturk"];
    assert_eq!(btcturk["total_volume"], serde_json::json!(["$52.3M", "USD"]));
    assert_eq!(btcturk["market_rank"], serde_json::json!(["#btcturk"]));
    assert_eq!(btcturk["markets"].as_array().unwrap().len(), 10);
    assert_eq!(btcturk["markets"][0]["Name"], "btcturk-p1-0");
    assert_eq!(btcturk["markets"][9]["Name"], "btcturk-p5-1");
    assert_eq!(btcturk["markets"][0]["Volume"], "$1,204,553");
    assert_eq!(btcturk["markets"][0]["Volume %"], serde_json::json!(["12.5", "%"]));
    assert_eq!(lines[1]["binance"]["markets"].as_array().unwrap().len(), 8);
    assert_eq!(lines[2]["Paribu"]["markets"].as_array().unwrap().len(), 8);

    // Database: completed run with every record and row
    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(storage.count_exchange_records(run_id).unwrap(), 3);
    assert_eq!(storage.count_market_rows(run_id).unwrap(), 26);

    let stored = storage.load_exchange_records(run_id).unwrap();
    assert_eq!(stored[2].exchange, "Paribu");
    assert_eq!(stored[2].market_pages, 4);
}

#[tokio::test]
async fn test_server_error_stops_run_after_prior_emission() {
    let server = MockServer::start().await;
    let targets = targets(&server.uri());

    // binance page 3 fails; mounted first so it wins over the page mock
    Mock::given(method("GET"))
        .and(path("/top-crypto-exchanges/binance-tr/markets"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    for target in &targets {
        mount_target(&server, target, 1).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("exchanges.jsonl");
    let db_path = dir.path().join("exchanges.db");
    let (set, run_id) = sinks(&json_path, &db_path);

    let mut coordinator = Coordinator::new(walker(false), targets, set);
    let err = coordinator.run().await.unwrap_err();

    match err {
        ScrapeError::Fetch {
            exchange,
            step,
            source,
        } => {
            assert_eq!(exchange, "binance");
            assert_eq!(step, ChainStep::Markets { page: 3 });
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(coordinator.completed().len(), 1);
    drop(coordinator);

    // btcturk was emitted before the failure and stays emitted
    let lines = read_lines(&json_path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].get("btcturk").is_some());

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.get_run(run_id).unwrap().status, RunStatus::Failed);
    assert_eq!(storage.count_exchange_records(run_id).unwrap(), 1);

    // Paribu was never requested
    let requests = server.received_requests().await.unwrap();
    assert!(!requests
        .iter()
        .any(|r| r.url.path().starts_with("/top-crypto-exchanges/paribu")));
}

#[tokio::test]
async fn test_robots_disallow_stops_chain() {
    let server = MockServer::start().await;
    let targets = targets(&server.uri());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: TestBot\nDisallow: /top-crypto-exchanges/paribu/markets\n"),
        )
        .expect(1)
        .mount(&server)
        .await;
    for target in &targets {
        mount_target(&server, target, 1).await;
    }

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("exchanges.jsonl");
    let db_path = dir.path().join("exchanges.db");
    let (set, _) = sinks(&json_path, &db_path);

    let mut coordinator = Coordinator::new(walker(true), targets, set);
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, ScrapeError::RobotsDenied { ref url } if url.contains("/paribu/markets")));
    assert_eq!(coordinator.completed().len(), 2);
    drop(coordinator);

    assert_eq!(read_lines(&json_path).len(), 2);
}

#[tokio::test]
async fn test_missing_stats_is_malformed_overview() {
    let server = MockServer::start().await;
    let targets: Vec<_> = targets(&server.uri()).into_iter().take(1).collect();

    Mock::given(method("GET"))
        .and(path("/top-crypto-exchanges/btcturk-pro"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="overall-stats"><span class="stats-value">1</span><span class="stats-value">2</span></div>"#,
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("exchanges.jsonl");
    let mut set = SinkSet::new();
    set.push(JsonLinesSink::create(&json_path).unwrap());

    let mut coordinator = Coordinator::new(walker(false), targets, set);
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::MalformedOverview { ref exchange, found: 2 } if exchange == "btcturk"
    ));
    assert!(read_lines(&json_path).is_empty());
}

#[tokio::test]
async fn test_redirect_off_allowed_domain_is_rejected() {
    let server = MockServer::start().await;
    let targets: Vec<_> = targets(&server.uri()).into_iter().take(1).collect();
    let port = server.address().port();

    // Same server, reached under a host name outside the allowed domain
    Mock::given(method("GET"))
        .and(path("/top-crypto-exchanges/btcturk-pro"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("http://localhost:{}/evil", port).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/evil"))
        .respond_with(ResponseTemplate::new(200).set_body_string(overview_html("#offsite")))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("exchanges.jsonl");
    let mut set = SinkSet::new();
    set.push(JsonLinesSink::create(&json_path).unwrap());

    let mut coordinator = Coordinator::new(walker(false), targets, set);
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::OffsiteUrl { ref url, ref allowed }
            if url.starts_with("http://localhost:") && allowed == "127.0.0.1"
    ));
    assert!(coordinator.completed().is_empty());
    drop(coordinator);
    assert!(read_lines(&json_path).is_empty());
}
