//! Event extraction
//!
//! Turns one event fragment of a calendar page into a `StockCalendarEvent`:
//! the fragment provides the name and the detail link, the detail page
//! provides the article body.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{
    child_anchor_href, parse_document, remove_first, select_first, text_content,
};
use crate::model::StockCalendarEvent;
use crate::{ParseError, ParseResult};
use chrono::NaiveDate;
use scraper::ElementRef;
use url::Url;

/// Share/print menu embedded in every detail page
pub const POPUP_MENU_SELECTOR: &str = r#"div[class="document_popup_menu"]"#;

/// Article body region of a detail page
pub const CONTENT_SELECTOR: &str =
    "#content > div > div:nth-of-type(3) > div > div:nth-of-type(2) > div";

/// Owned copy of the parts of a fragment needed for extraction
///
/// Parsed documents cannot cross task boundaries, so fragments are captured
/// into this form before the per-day fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFragment {
    /// Raw, possibly relative, detail link
    pub href: String,

    /// Full text content of the fragment
    pub name: String,
}

impl EventFragment {
    /// Captures a fragment element
    ///
    /// Fails when the fragment has no direct `<a href>` child.
    pub fn from_element(element: ElementRef<'_>) -> ParseResult<Self> {
        Ok(Self {
            href: child_anchor_href(element)?,
            name: text_content(element),
        })
    }
}

/// Extracts the body text of a detail page
///
/// The popup menu is detached first so its labels never leak into the
/// content. Both the menu and the content region are required.
pub fn parse_detail_content(raw_html: &str) -> ParseResult<String> {
    let mut document = parse_document(raw_html);
    remove_first(&mut document, POPUP_MENU_SELECTOR, "popup menu")?;

    let content = select_first(document.root_element(), CONTENT_SELECTOR, "content region")?;
    Ok(text_content(content))
}

/// Builds event records from fragments
#[derive(Debug, Clone)]
pub struct EventExtractor {
    fetcher: Fetcher,
    base_url: Url,
}

impl EventExtractor {
    pub fn new(fetcher: Fetcher, base_url: &str) -> ParseResult<Self> {
        let base_url = Url::parse(base_url).map_err(|source| ParseError::InvalidUrl {
            href: base_url.to_string(),
            source,
        })?;

        Ok(Self { fetcher, base_url })
    }

    /// Resolves a fragment link against the site's base URL
    pub fn resolve_link(&self, href: &str) -> ParseResult<String> {
        self.base_url
            .join(href)
            .map(String::from)
            .map_err(|source| ParseError::InvalidUrl {
                href: href.to_string(),
                source,
            })
    }

    /// Fetches the fragment's detail page and assembles its record
    ///
    /// Any failure aborts this event only; the caller decides what that
    /// means for the rest of the batch.
    pub async fn extract_event(
        &self,
        fragment: &EventFragment,
        day: NaiveDate,
    ) -> crate::Result<StockCalendarEvent> {
        let detail_url = self.resolve_link(&fragment.href)?;
        let body = self.fetcher.fetch(&detail_url).await?;
        let content = parse_detail_content(&body)?;

        tracing::debug!(
            event_name = %fragment.name,
            url = %detail_url,
            date = %day,
            "Extracted event"
        );

        Ok(StockCalendarEvent::new(
            fragment.name.clone(),
            content,
            day,
            detail_url,
        ))
    }
}
