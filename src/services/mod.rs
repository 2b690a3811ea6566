//! Service layer for the content sync application.
//!
//! This module contains the business logic for:
//! - Webhook parsing (`webhook::parse`)
//! - Notification dispatch (`SyncDispatcher`)
//! - Crawl job triggering (`JobTrigger`)
//! - Feed generation (`FeedService`)

pub mod dispatcher;
mod feeds;
pub mod trigger;
pub mod webhook;

pub use dispatcher::{SyncAction, SyncDispatcher, SyncOutcome};
pub use feeds::FeedService;
pub use trigger::{CrawlTrigger, JobTrigger, JobTriggerResult};
