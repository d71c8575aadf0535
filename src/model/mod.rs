//! Event records produced by the crawl
//!
//! - `StockCalendarEvent`: one calendar entry with the body of its detail page
//! - provenance constants attached to every record's extra fields

mod event;

pub use event::{
    provenance_fields, StockCalendarEvent, PROVENANCE_PRODUCTION, PROVENANCE_PRODUCTION_KEY,
    PROVENANCE_SOURCE, PROVENANCE_SOURCE_KEY, PROVENANCE_VERSION, PROVENANCE_VERSION_KEY,
};
