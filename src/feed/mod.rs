//! Feed projection: turning raw search documents into feed entries and
//! calendar events.
//!
//! - `fields`: locale-aware lookup over loosely-typed documents
//! - `dates`: normalization of heterogeneous date strings
//! - `markup`: markdown rendering to HTML or plain text
//! - `projector`: composition of the above into `FeedEntry` / `CalendarEvent`
//! - `syndication`: RSS 2.0 and iCalendar documents

pub mod dates;
pub mod fields;
pub mod markup;
pub mod projector;
pub mod syndication;

pub use dates::{DatePrecision, NormalizedDate};
pub use projector::{to_calendar_event, to_feed_entry};
pub use syndication::{FeedChannel, to_ical, to_rss};
