// src/models/feed.rs

//! Feed entries and calendar events projected from indexed documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::dates::NormalizedDate;

/// Content type of rendered entry bodies.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// An RSS/Atom entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,

    /// Title rendered to inline HTML
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub content: FeedContent,

    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

/// Typed entry body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedContent {
    pub content_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// An iCal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,

    /// Plain-text summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Plain-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub url: String,

    /// `"<lat>;<lon>"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NormalizedDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NormalizedDate>,
}
