//! Everystocks calendar crawler
//!
//! This crate walks the monthly stock-event calendar of everystocks.com,
//! extracts each listed event together with the body of its detail page,
//! and forwards the resulting records to a remote registration endpoint.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod registration;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Extraction task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Giving up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether the failure is worth another attempt
    ///
    /// Transport failures, rate limiting and server errors are retried.
    /// Everything else (4xx, client construction) is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Http { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::RetriesExhausted { .. } | FetchError::Client(_) => false,
        }
    }
}

/// Structural mismatches between a page and the expected layout
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Missing {what} (selector `{selector}`)")]
    MissingElement { what: String, selector: String },

    #[error("Missing attribute `{attribute}` on {what}")]
    MissingAttribute { what: String, attribute: String },

    #[error("Cannot resolve link {href}: {source}")]
    InvalidUrl {
        href: String,
        source: ::url::ParseError,
    },
}

/// Errors raised while submitting an event to the registration endpoint
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Registration request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registration rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for parse operations
pub type ParseResult<T> = std::result::Result<T, ParseError>;

// Re-export commonly used types
pub use config::{Config, EventScope};
pub use crawler::{Coordinator, EventExtractor, Fetcher};
pub use model::StockCalendarEvent;
pub use registration::{submit_all, EventRegistrar, HttpRegistrar};
