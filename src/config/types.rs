use chrono::NaiveDate;
use serde::Deserialize;

/// Site the calendar is scraped from
pub const BASE_URL: &str = "http://everystocks.com/";

/// First and last month of the historical crawl window
pub const START_YEAR_MONTH: (i32, u32) = (2017, 8);
pub const END_YEAR_MONTH: (i32, u32) = (2019, 1);

/// Main configuration structure
///
/// Every section falls back to the production constants, so an empty file
/// (or no file at all) reproduces the fixed batch run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Which part of the calendar page the event query is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventScope {
    /// Only fragments inside the day's own container
    #[default]
    Day,

    /// Every fragment of the whole page, repeated for each day
    Document,
}

/// Source site and crawl window
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Base URL that calendar and detail links are resolved against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// First month crawled (any day of the month; normalized to the 1st)
    #[serde(rename = "start-date", default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last month crawled, inclusive
    #[serde(rename = "end-date", default = "default_end_date")]
    pub end_date: NaiveDate,

    #[serde(rename = "event-scope", default)]
    pub event_scope: EventScope,
}

/// HTTP fetch and retry behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Total attempts per URL, including the first one
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Crawl fan-out
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Upper bound on detail pages fetched concurrently within one day
    #[serde(
        rename = "max-concurrent-events",
        default = "default_max_concurrent_events"
    )]
    pub max_concurrent_events: usize,
}

/// Remote registration endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Pause between two submissions (milliseconds)
    #[serde(rename = "submit-delay-ms", default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Marks submissions as test traffic on the receiving side
    #[serde(rename = "test-mode", default)]
    pub test_mode: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,
}

fn default_base_url() -> String {
    BASE_URL.to_string()
}

fn first_of_month((year, month): (i32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("constant crawl window is a valid date")
}

fn default_start_date() -> NaiveDate {
    first_of_month(START_YEAR_MONTH)
}

fn default_end_date() -> NaiveDate {
    first_of_month(END_YEAR_MONTH)
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_events() -> usize {
    16
}

fn default_endpoint() -> String {
    "http://localhost:8080/api/calendar/events".to_string()
}

fn default_submit_delay_ms() -> u64 {
    100
}

fn default_crawler_name() -> String {
    "EverystocksCrawler".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "http://localhost/".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_date: default_start_date(),
            end_date: default_end_date(),
            event_scope: EventScope::default(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_events: default_max_concurrent_events(),
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            submit_delay_ms: default_submit_delay_ms(),
            test_mode: false,
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
        }
    }
}
