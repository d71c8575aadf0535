//! Configuration module
//!
//! The crawl is driven by compiled-in constants. An optional TOML file can
//! override them, which is mostly useful to point the crawler at a test
//! server or a staging registration endpoint.
//!
//! # Example
//!
//! ```no_run
//! use everystocks_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawling {}", config.source.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, EventScope, FetcherConfig, RegistrationConfig, SourceConfig,
    UserAgentConfig, BASE_URL, END_YEAR_MONTH, START_YEAR_MONTH,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
