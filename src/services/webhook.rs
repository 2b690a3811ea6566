// src/services/webhook.rs

//! Webhook notification parsing.
//!
//! The interesting part of a notification body looks like
//!
//! ```json
//! { "sys": { "type": "Entry", "id": "82531",
//!            "contentType": { "sys": { "type": "Link", "id": "DataUse" } } } }
//! ```

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{DEFAULT_ENVIRONMENT, SyncEvent, Topic};

/// Header carrying the change topic.
pub const TOPIC_HEADER: &str = "X-Contentful-Topic";

/// Media type sent by the content source.
pub const CONTENTFUL_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Build a [`SyncEvent`] from a raw notification.
///
/// A missing or unrecognized topic yields [`Topic::Unknown`]; only a body
/// that is not valid JSON is an error.
pub fn parse(topic_header: Option<&str>, body: &[u8], env: Option<&str>) -> Result<SyncEvent> {
    let topic = topic_header.map(Topic::from_wire).unwrap_or(Topic::Unknown);
    let json: Value = serde_json::from_slice(body).map_err(AppError::parse)?;

    let environment = env
        .map(str::trim)
        .filter(|env| !env.is_empty())
        .unwrap_or(DEFAULT_ENVIRONMENT);

    Ok(SyncEvent {
        topic,
        entity_type: text_at(&json, "/sys/type"),
        content_type_id: text_at(&json, "/sys/contentType/sys/id"),
        entry_id: text_at(&json, "/sys/id"),
        environment: environment.to_string(),
    })
}

/// Scalar at a JSON pointer rendered as text, empty when absent.
fn text_at(json: &Value, pointer: &str) -> String {
    match json.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
