//! Registration of crawled events with the remote server
//!
//! Submission happens after the crawl has finished, one event at a time
//! with a fixed pause in between.

mod http;
mod traits;

pub use http::HttpRegistrar;
pub use traits::{EventRegistrar, RegistrationResult};

use crate::model::StockCalendarEvent;
use std::time::Duration;

/// Outcome of a submission run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub total: usize,
    pub submitted: usize,
    pub failed: usize,
}

/// Submits `events` sequentially, sleeping `delay` between two submissions
///
/// A rejected or failed submission is logged and counted; the remaining
/// events are still submitted. There is no retry.
pub async fn submit_all<R>(
    events: &[StockCalendarEvent],
    registrar: &R,
    delay: Duration,
) -> SubmissionReport
where
    R: EventRegistrar + ?Sized,
{
    let mut report = SubmissionReport {
        total: events.len(),
        ..SubmissionReport::default()
    };

    for (index, event) in events.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        tracing::info!("Current: {}  Total: {}", index, report.total);

        match registrar.register(event).await {
            Ok(()) => report.submitted += 1,
            Err(e) => {
                tracing::error!(
                    "Failed to register '{}' ({}): {}",
                    event.event_name(),
                    event.event_time(),
                    e
                );
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        "Submission finished: {} submitted, {} failed, {} total",
        report.submitted,
        report.failed,
        report.total
    );

    report
}
