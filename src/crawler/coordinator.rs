//! Crawler coordinator - the month/day/event walk
//!
//! This module contains the main crawl loop:
//! - Iterating the months of the crawl window
//! - Fetching and parsing each month's calendar page once
//! - Locating every day's container and its event fragments
//! - Fanning event extraction out across a bounded task group per day

use crate::config::{Config, EventScope};
use crate::crawler::calendar::{build_calendar_url, day_container_id, days_of_month, month_range};
use crate::crawler::extractor::{EventExtractor, EventFragment};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{parse_document, select_all, select_first};
use crate::model::StockCalendarEvent;
use crate::{CrawlerError, ParseResult};
use chrono::{Datelike, NaiveDate};
use scraper::Html;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Event entries on the calendar page
pub const EVENT_FRAGMENT_SELECTOR: &str = r#"div[class="drag"]"#;

/// Collects the event fragments listed for `day`
///
/// The day's container must exist on the page. With `EventScope::Day` the
/// fragment query is limited to that container; with `EventScope::Document`
/// it runs against the whole page, so every day yields the month's full
/// list of events.
pub fn collect_fragments(
    document: &Html,
    day: NaiveDate,
    scope: EventScope,
) -> ParseResult<Vec<EventFragment>> {
    let container_selector = format!(r#"div[id="{}"]"#, day_container_id(day));
    let container = select_first(document.root_element(), &container_selector, "day container")?;

    let search_root = match scope {
        EventScope::Day => container,
        EventScope::Document => document.root_element(),
    };

    select_all(search_root, EVENT_FRAGMENT_SELECTOR)?
        .into_iter()
        .map(EventFragment::from_element)
        .collect()
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    extractor: Arc<EventExtractor>,
}

impl Coordinator {
    /// Creates a new coordinator, building the HTTP client from `config`
    pub fn new(config: Config) -> Result<Self, CrawlerError> {
        let fetcher = Fetcher::new(&config.fetcher, &config.user_agent)?;
        let extractor = EventExtractor::new(fetcher.clone(), &config.source.base_url)?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor: Arc::new(extractor),
        })
    }

    /// First-of-month dates of the crawl window
    pub fn months(&self) -> Vec<NaiveDate> {
        month_range(self.config.source.start_date, self.config.source.end_date)
    }

    /// Calendar page URLs of the crawl window, in crawl order
    pub fn calendar_urls(&self) -> Vec<String> {
        self.months()
            .into_iter()
            .map(|month| build_calendar_url(&self.config.source.base_url, month.year(), month.month()))
            .collect()
    }

    /// Crawls every month of the window
    ///
    /// The first failing month aborts the run.
    pub async fn crawl_all(&self) -> Result<Vec<StockCalendarEvent>, CrawlerError> {
        let months = self.months();
        let total = months.len();
        let start_time = std::time::Instant::now();
        let mut all_events = Vec::new();

        tracing::info!(
            "Crawling {} months from {} to {} ({:?} scope)",
            total,
            self.config.source.start_date,
            self.config.source.end_date,
            self.config.source.event_scope
        );

        for (index, month) in months.into_iter().enumerate() {
            let events = self.parse_month(month.year(), month.month()).await?;
            tracing::info!(
                "Progress: month {}/{} ({}-{:02}) yielded {} events",
                index + 1,
                total,
                month.year(),
                month.month(),
                events.len()
            );
            all_events.extend(events);
        }

        tracing::info!(
            "Crawl completed: {} events in {:?}",
            all_events.len(),
            start_time.elapsed()
        );

        Ok(all_events)
    }

    /// Crawls one calendar month
    ///
    /// The calendar page is fetched once; each day with at least one
    /// fragment is then extracted. Days without events are skipped.
    pub async fn parse_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<StockCalendarEvent>, CrawlerError> {
        let url = build_calendar_url(&self.config.source.base_url, year, month);
        tracing::debug!("Fetching calendar page {}", url);

        let body = self.fetcher.fetch(&url).await?;
        let days = self.collect_month_fragments(&body, year, month)?;

        let mut events = Vec::new();
        for (day, fragments) in days {
            if fragments.is_empty() {
                tracing::debug!("No events on {}", day);
                continue;
            }

            events.extend(self.extract_day(day, fragments).await?);
        }

        Ok(events)
    }

    /// Parses a calendar page into per-day fragment lists
    fn collect_month_fragments(
        &self,
        body: &str,
        year: i32,
        month: u32,
    ) -> ParseResult<Vec<(NaiveDate, Vec<EventFragment>)>> {
        let document = parse_document(body);
        let scope = self.config.source.event_scope;

        days_of_month(year, month)
            .map(|day| collect_fragments(&document, day, scope).map(|fragments| (day, fragments)))
            .collect()
    }

    /// Extracts all fragments of one day concurrently
    ///
    /// At most `max-concurrent-events` detail pages are in flight. Results
    /// are returned in fragment order regardless of completion order. The
    /// first failure cancels the remaining tasks of the day and is returned.
    async fn extract_day(
        &self,
        day: NaiveDate,
        fragments: Vec<EventFragment>,
    ) -> Result<Vec<StockCalendarEvent>, CrawlerError> {
        let workers = fragments
            .len()
            .min(self.config.crawler.max_concurrent_events)
            .max(1);
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        tracing::debug!("{}: extracting {} events with {} workers", day, fragments.len(), workers);

        for (index, fragment) in fragments.into_iter().enumerate() {
            let extractor = Arc::clone(&self.extractor);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| CrawlerError::Task(e.to_string()))?;
                let event = extractor.extract_event(&fragment, day).await?;
                Ok::<_, CrawlerError>((index, event))
            });
        }

        let mut events = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(indexed)) => events.push(indexed),
                Ok(Err(e)) => {
                    tracing::error!("Event extraction failed on {}: {}", day, e);
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(CrawlerError::Task(e.to_string()));
                }
            }
        }

        events.sort_unstable_by_key(|(index, _)| *index);
        Ok(events.into_iter().map(|(_, event)| event).collect())
    }
}

/// Runs the complete crawl for `config`
///
/// # Example
///
/// ```no_run
/// use everystocks_crawler::config::Config;
/// use everystocks_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let events = run_crawl(Config::default()).await?;
/// println!("{} events", events.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<Vec<StockCalendarEvent>, CrawlerError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.crawl_all().await
}
