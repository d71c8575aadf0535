//! Crawler module for calendar page fetching and event extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry
//! - HTML parsing helpers
//! - Calendar date arithmetic and URL building
//! - Event extraction from fragments and detail pages
//! - The month/day crawl loop

pub mod calendar;
mod coordinator;
mod extractor;
mod fetcher;
pub mod parser;

pub use coordinator::{collect_fragments, run_crawl, Coordinator, EVENT_FRAGMENT_SELECTOR};
pub use extractor::{
    parse_detail_content, EventExtractor, EventFragment, CONTENT_SELECTOR, POPUP_MENU_SELECTOR,
};
pub use fetcher::{build_http_client, retry_with_delay, Fetcher, RetryPolicy};
