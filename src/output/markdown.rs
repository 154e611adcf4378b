//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results:
//! run metadata, then one section per exchange with its overview values and
//! market row counts.

use crate::output::traits::{CrawlSummary, OutputResult};
use crate::record::Tokens;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary from crawl results
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

fn join(tokens: &Tokens) -> String {
    if tokens.is_empty() {
        "-".to_string()
    } else {
        tokens.join(" ").replace('|', "\\|")
    }
}

/// Formats a crawl summary as markdown
///
/// # Arguments
///
/// * `summary` - The crawl summary data
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Bitdegree Exchange Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    if let Some(run_id) = summary.run_id {
        md.push_str(&format!("- **Run ID**: {}\n", run_id));
    }
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!("- **Duration**: {} seconds\n", duration));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Totals
    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Exchanges**: {}\n", summary.records.len()));
    md.push_str(&format!(
        "- **Market Rows**: {}\n",
        summary.total_market_rows()
    ));
    md.push_str(&format!(
        "- **Rows With Missing Cells**: {}\n\n",
        summary.incomplete_rows()
    ));

    if summary.records.is_empty() {
        md.push_str("No exchange records were emitted.\n");
        return md;
    }

    // Per-exchange overview
    md.push_str("## Exchanges\n\n");
    md.push_str("| Exchange | Total Volume | Base Asset Volume | Assets | Markets | Dominance | Rank | Rows | Pages |\n");
    md.push_str("|----------|--------------|-------------------|--------|---------|-----------|------|------|-------|\n");
    for record in &summary.records {
        let overview = &record.overview;
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            record.exchange,
            join(&overview.total_volume),
            join(&overview.volume_in_base_asset),
            join(&overview.listed_asset_count),
            join(&overview.market_count_raw),
            join(&overview.market_dominance),
            join(&overview.market_rank),
            record.market_count(),
            record.market_pages
        ));
    }
    md.push('\n');

    // Largest markets per exchange, in page order
    for record in &summary.records {
        md.push_str(&format!("### {}\n\n", record.exchange));
        md.push_str(&format!("- **Scraped**: {}\n", record.scraped_at.to_rfc3339()));

        let named: Vec<_> = record
            .markets
            .iter()
            .filter_map(|row| row.name.as_deref())
            .take(5)
            .map(str::trim)
            .collect();
        if named.is_empty() {
            md.push_str("- **First Markets**: none\n\n");
        } else {
            md.push_str(&format!("- **First Markets**: {}\n\n", named.join(", ")));
        }
    }

    md
}
