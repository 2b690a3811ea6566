// src/models/event.rs

//! Change notifications received from the content source.

use std::fmt;

use serde::Serialize;

/// Environment used when a notification does not name one.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Kind of change announced by a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Topic {
    EntryPublish,
    EntryUnpublish,
    EntryDelete,
    AssetPublish,
    AssetUnpublish,
    AssetDelete,
    /// Missing or unrecognized topic header
    Unknown,
}

impl Topic {
    /// All recognized topics.
    pub const KNOWN: [Topic; 6] = [
        Topic::EntryPublish,
        Topic::EntryUnpublish,
        Topic::EntryDelete,
        Topic::AssetPublish,
        Topic::AssetUnpublish,
        Topic::AssetDelete,
    ];

    /// Wire string carried in the topic header.
    pub fn wire(&self) -> &'static str {
        match self {
            Topic::EntryPublish => "ContentManagement.Entry.publish",
            Topic::EntryUnpublish => "ContentManagement.Entry.unpublish",
            Topic::EntryDelete => "ContentManagement.Entry.delete",
            Topic::AssetPublish => "ContentManagement.Asset.publish",
            Topic::AssetUnpublish => "ContentManagement.Asset.unpublish",
            Topic::AssetDelete => "ContentManagement.Asset.delete",
            Topic::Unknown => "unknown",
        }
    }

    /// Classify a header value. Never fails: anything unrecognized is `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|topic| topic.wire() == value.trim())
            .unwrap_or(Topic::Unknown)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

/// A parsed change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEvent {
    pub topic: Topic,

    /// `Entry` or `Asset`, as reported by the source
    pub entity_type: String,

    /// Content type of the changed element (empty for assets)
    pub content_type_id: String,

    /// Id of the changed element
    pub entry_id: String,

    /// Target environment name
    pub environment: String,
}
