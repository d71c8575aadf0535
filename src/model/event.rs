//! Stock calendar event record
//!
//! A record is built once per event fragment, handed to the registration
//! client and then dropped. Fields are private so a record cannot change
//! after construction.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

pub const PROVENANCE_SOURCE_KEY: &str = "source";
pub const PROVENANCE_VERSION_KEY: &str = "version";
pub const PROVENANCE_PRODUCTION_KEY: &str = "production";

pub const PROVENANCE_SOURCE: &str = "everystocks.com";
pub const PROVENANCE_VERSION: &str = "0.0.1";
pub const PROVENANCE_PRODUCTION: bool = true;

/// Builds the fixed `{source, version, production}` triple
pub fn provenance_fields() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(PROVENANCE_SOURCE_KEY.to_string(), PROVENANCE_SOURCE.into());
    fields.insert(PROVENANCE_VERSION_KEY.to_string(), PROVENANCE_VERSION.into());
    fields.insert(
        PROVENANCE_PRODUCTION_KEY.to_string(),
        PROVENANCE_PRODUCTION.into(),
    );
    fields
}

/// One event listed on the stock calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCalendarEvent {
    event_name: String,
    event_content: String,
    event_time: NaiveDate,
    links: Vec<String>,
    extra_fields: Map<String, Value>,
}

impl StockCalendarEvent {
    /// Creates a record for an event discovered under `event_time`
    ///
    /// `detail_url` becomes the single entry of `links`, and the extra
    /// fields are seeded with the provenance triple.
    pub fn new(
        event_name: impl Into<String>,
        event_content: impl Into<String>,
        event_time: NaiveDate,
        detail_url: impl Into<String>,
    ) -> Self {
        Self {
            event_name: event_name.into(),
            event_content: event_content.into(),
            event_time,
            links: vec![detail_url.into()],
            extra_fields: provenance_fields(),
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn event_content(&self) -> &str {
        &self.event_content
    }

    pub fn event_time(&self) -> NaiveDate {
        self.event_time
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn extra_fields(&self) -> &Map<String, Value> {
        &self.extra_fields
    }
}
