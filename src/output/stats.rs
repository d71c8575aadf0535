//! Crawl statistics
//!
//! Summarizes crawled events per month and per day for the console.

use crate::model::StockCalendarEvent;
use crate::registration::SubmissionReport;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of events extracted
    pub total_events: usize,

    /// Event count per `(year, month)`
    pub events_by_month: BTreeMap<(i32, u32), usize>,

    /// Number of distinct days that had at least one event
    pub days_with_events: usize,

    /// Number of distinct detail pages linked
    pub unique_links: usize,
}

impl CrawlStatistics {
    /// Computes statistics over a crawl result
    pub fn from_events(events: &[StockCalendarEvent]) -> Self {
        let mut events_by_month = BTreeMap::new();
        let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
        let mut links: BTreeSet<&str> = BTreeSet::new();

        for event in events {
            let day = event.event_time();
            *events_by_month.entry((day.year(), day.month())).or_insert(0) += 1;
            days.insert(day);
            links.extend(event.links().iter().map(String::as_str));
        }

        Self {
            total_events: events.len(),
            events_by_month,
            days_with_events: days.len(),
            unique_links: links.len(),
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics, submission: Option<&SubmissionReport>) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Events extracted: {}", stats.total_events);
    println!("  Days with events: {}", stats.days_with_events);
    println!("  Unique detail pages: {}", stats.unique_links);
    println!();

    println!("Events by Month:");
    for ((year, month), count) in &stats.events_by_month {
        println!("  {}-{:02}: {}", year, month, count);
    }
    println!();

    if let Some(report) = submission {
        let success_rate = if report.total > 0 {
            (report.submitted as f64 / report.total as f64) * 100.0
        } else {
            0.0
        };

        println!(
            "Registration: {} submitted, {} failed ({:.1}% success)",
            report.submitted, report.failed, success_rate
        );
    }
}
