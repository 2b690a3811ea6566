// src/feed/syndication.rs

//! RSS 2.0 and iCalendar rendering of projected entries and events.

use icalendar::{Calendar, Component, Event, EventLike};
use rss::{Channel, Guid, Item};

use crate::feed::dates::{DatePrecision, NormalizedDate};
use crate::models::{CalendarEvent, FeedEntry};

/// Content type of RSS documents.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// Content type of iCalendar documents.
pub const ICAL_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

const FEED_LANGUAGE: &str = "en";

/// Channel metadata of an RSS document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    pub link: String,
}

impl FeedChannel {
    /// Channel used for news and data use feeds.
    pub fn news(portal_url: &str) -> Self {
        Self {
            title: "GBIF news feed".to_string(),
            description: "GBIF News".to_string(),
            link: format!("{portal_url}newsroom/news/rss"),
        }
    }

    /// Channel used for the upcoming events feed.
    pub fn events(portal_url: &str) -> Self {
        Self {
            title: "Upcoming events".to_string(),
            description: "GBIF Upcoming News".to_string(),
            link: format!("{portal_url}newsroom/events/upcoming.xml"),
        }
    }
}

/// Render entries as an RSS 2.0 document.
pub fn to_rss(channel: &FeedChannel, entries: &[FeedEntry]) -> String {
    let mut rss = Channel::default();
    rss.set_title(channel.title.as_str());
    rss.set_description(channel.description.as_str());
    rss.set_link(channel.link.as_str());
    rss.set_language(Some(FEED_LANGUAGE.to_string()));
    rss.set_items(entries.iter().map(to_item).collect::<Vec<_>>());
    rss.to_string()
}

fn to_item(entry: &FeedEntry) -> Item {
    let mut guid = Guid::default();
    guid.set_value(entry.id.as_str());
    guid.set_permalink(false);

    let mut item = Item::default();
    item.set_guid(Some(guid));
    item.set_title(entry.title.clone());
    item.set_link(Some(entry.link.clone()));
    item.set_description(entry.content.value.clone());
    item.set_pub_date(entry.published.map(|date| date.to_rfc2822()));
    item
}

/// Render events as an iCalendar document.
pub fn to_ical(events: &[CalendarEvent]) -> String {
    let mut calendar = Calendar::new();
    for event in events {
        calendar.push(to_vevent(event));
    }
    calendar.to_string()
}

fn to_vevent(event: &CalendarEvent) -> Event {
    let mut vevent = Event::new();
    vevent.uid(&event.uid);
    vevent.add_property("URL", event.url.as_str());
    if let Some(summary) = &event.summary {
        vevent.summary(summary);
    }
    if let Some(description) = &event.description {
        vevent.description(description);
    }
    if let Some(location) = &event.location {
        vevent.add_property("LOCATION", location.as_str());
    }
    if let Some(start) = &event.start {
        set_date(&mut vevent, start, Boundary::Start);
    }
    if let Some(end) = &event.end {
        set_date(&mut vevent, end, Boundary::End);
    }
    vevent.done()
}

enum Boundary {
    Start,
    End,
}

/// Dates without a time of day become all-day values.
fn set_date(vevent: &mut Event, date: &NormalizedDate, boundary: Boundary) {
    match (date.precision, boundary) {
        (DatePrecision::DateTime, Boundary::Start) => vevent.starts(date.instant),
        (DatePrecision::DateTime, Boundary::End) => vevent.ends(date.instant),
        (_, Boundary::Start) => vevent.starts(date.instant.date_naive()),
        (_, Boundary::End) => vevent.ends(date.instant.date_naive()),
    };
}
