// src/models/mod.rs

//! Domain models for the content sync service.
//!
//! This module contains the data structures shared across the service,
//! organized by their primary purpose.

pub mod config;
mod event;
mod feed;

use serde_json::{Map, Value};

// Re-export all public types
pub use config::{
    Config, EnvironmentConfig, FeedConfig, HttpConfig, JobEnvironment, ServerConfig, SyncConfig,
};
pub use event::{DEFAULT_ENVIRONMENT, SyncEvent, Topic};
pub use feed::{CalendarEvent, FeedContent, FeedEntry, HTML_CONTENT_TYPE};

/// A document source as returned by the search engine.
pub type RawDocument = Map<String, Value>;
