//! Registration sink trait
//!
//! The registration endpoint is a black box: the crawler only needs to hand
//! it one record at a time and learn whether the hand-off failed.

use crate::model::StockCalendarEvent;
use crate::RegistrationError;
use async_trait::async_trait;

/// Result type for registration operations
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Destination for crawled events
#[async_trait]
pub trait EventRegistrar: Send + Sync {
    /// Submits a single event
    async fn register(&self, event: &StockCalendarEvent) -> RegistrationResult<()>;
}
