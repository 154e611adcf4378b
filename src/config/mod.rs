//! Configuration module for Bitdegree-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The exchange targets themselves are fixed and live in `crawler::targets`.
//!
//! # Example
//!
//! ```no_run
//! use bitdegree_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("bitdegree.toml")).unwrap();
//! println!("Records will be written to: {}", config.output.json_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
