//! State module for tracking crawl progress
//!
//! This module provides state management for an exchange's page chain.
//!
//! # Components
//!
//! - `ChainStep`: Tracks where an exchange's chain is (overview, markets page N, done)
//! - `CrawlState`: The per-exchange accumulator threaded through the chain

mod chain_step;
mod crawl_state;

// Re-export main types
pub use chain_step::ChainStep;
pub use crawl_state::CrawlState;
