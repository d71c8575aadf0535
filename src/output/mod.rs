//! Output module for crawl results
//!
//! This module handles:
//! - Exporting crawled events as JSON
//! - Summarizing a crawl for the console

mod json;
pub mod stats;

pub use json::write_events_json;
pub use stats::{print_statistics, CrawlStatistics};
