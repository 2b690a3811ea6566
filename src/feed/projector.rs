// src/feed/projector.rs

//! Projection of indexed documents into feed entries and calendar events.

use crate::feed::dates::normalize;
use crate::feed::fields::{resolve_field, resolve_link_url, resolve_location, resolve_text};
use crate::feed::markup;
use crate::models::{CalendarEvent, FeedContent, FeedEntry, HTML_CONTENT_TYPE, RawDocument};

pub const TITLE_FIELD: &str = "title";
pub const BODY_FIELD: &str = "body";
pub const PRIMARY_LINK_FIELD: &str = "primaryLink";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const COORDINATES_FIELD: &str = "coordinates";
pub const START_FIELD: &str = "start";
pub const END_FIELD: &str = "end";

/// Build an RSS/Atom entry.
///
/// The entry links to the document's own primary link when it has one for
/// `locale`, and to `{base_link}/{id}` otherwise.
pub fn to_feed_entry(doc: &RawDocument, id: &str, locale: &str, base_link: &str) -> FeedEntry {
    FeedEntry {
        id: id.to_string(),
        title: resolve_field(doc, TITLE_FIELD, locale).map(markup::to_inline_html),
        content: FeedContent {
            content_type: HTML_CONTENT_TYPE.to_string(),
            value: resolve_field(doc, BODY_FIELD, locale).map(markup::to_html),
        },
        link: resolve_link_url(doc, PRIMARY_LINK_FIELD, locale)
            .map(str::to_string)
            .unwrap_or_else(|| document_link(base_link, id)),
        published: normalize(resolve_text(doc, CREATED_AT_FIELD)).map(|date| date.instant),
    }
}

/// Build an iCal event.
///
/// The event URL is always `{base_link}/{id}`, whatever link the document
/// carries.
pub fn to_calendar_event(
    doc: &RawDocument,
    id: &str,
    locale: &str,
    base_link: &str,
) -> CalendarEvent {
    CalendarEvent {
        uid: id.to_string(),
        summary: resolve_field(doc, TITLE_FIELD, locale).map(markup::to_plain_text),
        description: resolve_field(doc, BODY_FIELD, locale).map(markup::to_plain_text),
        url: document_link(base_link, id),
        location: resolve_location(doc, COORDINATES_FIELD),
        start: normalize(resolve_text(doc, START_FIELD)),
        end: normalize(resolve_text(doc, END_FIELD)),
    }
}

fn document_link(base_link: &str, id: &str) -> String {
    format!("{base_link}/{id}")
}
