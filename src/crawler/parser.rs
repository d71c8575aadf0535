//! HTML parsing helpers
//!
//! Thin, fallible wrappers around `scraper` for the structural queries the
//! crawler performs. The calendar and detail pages are treated as a fixed
//! layout: whenever an expected element or attribute is absent the helpers
//! return a `ParseError` naming what was missing instead of guessing.

use crate::{ParseError, ParseResult};
use scraper::{ElementRef, Html, Selector};

/// Parses raw HTML into a document tree
pub fn parse_document(raw: &str) -> Html {
    Html::parse_document(raw)
}

/// Compiles a CSS selector, mapping failures to `ParseError::Selector`
pub fn selector(css: &str) -> ParseResult<Selector> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{}: {:?}", css, e)))
}

/// Returns every element under `scope` matching `css`, in document order
pub fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> ParseResult<Vec<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(scope.select(&selector).collect())
}

/// Returns the first element under `scope` matching `css`
///
/// `what` is a human readable name used in the error when nothing matches.
pub fn select_first<'a>(
    scope: ElementRef<'a>,
    css: &str,
    what: &str,
) -> ParseResult<ElementRef<'a>> {
    let selector = selector(css)?;
    scope
        .select(&selector)
        .next()
        .ok_or_else(|| ParseError::MissingElement {
            what: what.to_string(),
            selector: css.to_string(),
        })
}

/// Concatenates every descendant text node of `element`
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Reads a required attribute from `element`
pub fn attribute(element: ElementRef<'_>, name: &str, what: &str) -> ParseResult<String> {
    element
        .value()
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingAttribute {
            what: what.to_string(),
            attribute: name.to_string(),
        })
}

/// Reads the `href` of the first direct `<a>` child that carries one
pub fn child_anchor_href(element: ElementRef<'_>) -> ParseResult<String> {
    let anchor = element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "a" && child.value().attr("href").is_some())
        .ok_or_else(|| ParseError::MissingAttribute {
            what: "event anchor".to_string(),
            attribute: "href".to_string(),
        })?;

    attribute(anchor, "href", "event anchor")
}

/// Detaches the first element matching `css` from the document
///
/// A text node directly following the element is detached with it, so the
/// element's tail text does not survive in the surrounding content.
pub fn remove_first(document: &mut Html, css: &str, what: &str) -> ParseResult<()> {
    let id = {
        let selector = selector(css)?;
        document.select(&selector).next().map(|element| element.id())
    };

    let id = id.ok_or_else(|| ParseError::MissingElement {
        what: what.to_string(),
        selector: css.to_string(),
    })?;

    let tail = document
        .tree
        .get(id)
        .and_then(|node| node.next_sibling())
        .filter(|sibling| sibling.value().is_text())
        .map(|sibling| sibling.id());

    for node_id in tail.into_iter().chain(std::iter::once(id)) {
        if let Some(mut node) = document.tree.get_mut(node_id) {
            node.detach();
        }
    }

    Ok(())
}
