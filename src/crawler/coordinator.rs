//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator walks each exchange's chain in target order, emits every
//! finished record to the sink before starting the next exchange, and closes
//! the sink with the run's final status. The first failing chain ends the run.

use crate::config::Config;
use crate::crawler::{exchange_targets, ChainWalker, ExchangeTarget, HttpFetcher, PageFetcher};
use crate::output::{
    generate_markdown_summary, CrawlSummary, JsonLinesSink, RecordSink, SinkSet, SqliteSink,
};
use crate::record::ExchangeRecord;
use crate::storage::{open_storage, RunStatus};
use crate::ScrapeError;
use chrono::Utc;
use std::path::Path;

/// Main crawler coordinator structure
pub struct Coordinator<F, S> {
    walker: ChainWalker<F>,
    targets: Vec<ExchangeTarget>,
    sink: S,
    completed: Vec<ExchangeRecord>,
}

impl<F: PageFetcher, S: RecordSink> Coordinator<F, S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `walker` - Walker used for every exchange chain
    /// * `targets` - Exchanges to crawl, in emission order
    /// * `sink` - Destination for finished records
    pub fn new(walker: ChainWalker<F>, targets: Vec<ExchangeTarget>, sink: S) -> Self {
        Self {
            walker,
            targets,
            sink,
            completed: Vec::new(),
        }
    }

    /// Runs every target's chain in order
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All records emitted; the sink was finished as completed
    /// * `Err(ScrapeError)` - A chain or emission failed; records emitted
    ///   before the failure stay emitted and the sink was finished as failed
    pub async fn run(&mut self) -> Result<(), ScrapeError> {
        self.completed.clear();
        let start_time = std::time::Instant::now();
        tracing::info!("Starting crawl of {} exchanges", self.targets.len());

        match self.crawl_targets().await {
            Ok(()) => {
                self.sink.finish(RunStatus::Completed)?;
                tracing::info!(
                    "Crawl completed: {} exchanges, {} market rows in {:?}",
                    self.completed.len(),
                    self.completed
                        .iter()
                        .map(ExchangeRecord::market_count)
                        .sum::<usize>(),
                    start_time.elapsed()
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    "Crawl stopped after {} of {} exchanges: {}",
                    self.completed.len(),
                    self.targets.len(),
                    e
                );
                if let Err(finish_error) = self.sink.finish(RunStatus::Failed) {
                    tracing::error!("Failed to close output: {}", finish_error);
                }
                Err(e)
            }
        }
    }

    async fn crawl_targets(&mut self) -> Result<(), ScrapeError> {
        for target in &self.targets {
            let record = self.walker.walk(target).await?;

            // A finished record counts as emitted once every sink has been offered it
            let emitted = self.sink.emit(&record);
            if emitted.is_ok() {
                tracing::info!(
                    "Emitted {} ({} market rows)",
                    record.exchange,
                    record.market_count()
                );
            }
            self.completed.push(record);
            emitted?;
        }
        Ok(())
    }

    /// Records emitted during the last run, in emission order
    ///
    /// A record whose emission failed on some sink is still listed; the run
    /// stopped right after it.
    pub fn completed(&self) -> &[ExchangeRecord] {
        &self.completed
    }

    /// The sink records are emitted to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the coordinator, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Runs a complete crawl operation
///
/// This function:
/// 1. Builds the HTTP fetcher from configuration
/// 2. Opens the JSON-lines feed and, if configured, the results database
/// 3. Walks every exchange chain in order, emitting records as they finish
/// 4. Writes the markdown summary, if configured
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
///
/// # Returns
///
/// * `Ok(Vec<ExchangeRecord>)` - Every record, in emission order
/// * `Err(ScrapeError)` - Crawl failed with an error
///
/// # Example
///
/// ```no_run
/// use bitdegree_scraper::config::load_config_with_hash;
/// use bitdegree_scraper::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("bitdegree.toml"))?;
/// let records = run_crawl(&config, &hash).await?;
/// println!("{} exchanges", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
) -> Result<Vec<ExchangeRecord>, ScrapeError> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.http)?;
    let walker = ChainWalker::new(
        fetcher,
        &config.user_agent.crawler_name,
        config.http.respect_robots,
    )?;

    let mut sinks = SinkSet::new();
    sinks.push(JsonLinesSink::create(Path::new(&config.output.json_path))?);

    let mut run_id = None;
    if let Some(database_path) = &config.output.database_path {
        let storage = open_storage(Path::new(database_path))?;
        let sink = SqliteSink::start(storage, config_hash)?;
        run_id = Some(sink.run_id());
        sinks.push(sink);
    }

    let started_at = Utc::now();
    let mut coordinator = Coordinator::new(walker, exchange_targets(), sinks);
    let result = coordinator.run().await;
    let finished_at = Utc::now();

    if let Some(summary_path) = &config.output.summary_path {
        let summary = CrawlSummary {
            run_id,
            started_at: started_at.to_rfc3339(),
            finished_at: Some(finished_at.to_rfc3339()),
            duration_seconds: u64::try_from((finished_at - started_at).num_seconds()).ok(),
            status: if result.is_ok() {
                RunStatus::Completed
            } else {
                RunStatus::Failed
            },
            config_hash: config_hash.to_string(),
            records: coordinator.completed().to_vec(),
        };
        let written = generate_markdown_summary(&summary, Path::new(summary_path));
        if written.is_ok() {
            tracing::info!("Wrote summary to {}", summary_path);
        }
        crawl_error_first(result, written.map_err(ScrapeError::from))?;
    } else {
        result?;
    }

    Ok(coordinator.completed().to_vec())
}

/// Combines the crawl outcome with the summary write outcome
///
/// A crawl error wins; a summary error alongside it is only logged.
fn crawl_error_first(
    crawl: Result<(), ScrapeError>,
    summary: Result<(), ScrapeError>,
) -> Result<(), ScrapeError> {
    match (crawl, summary) {
        (Err(crawl_error), Err(summary_error)) => {
            tracing::error!("Failed to write summary: {}", summary_error);
            Err(crawl_error)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    }
}
