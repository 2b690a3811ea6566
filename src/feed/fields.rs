// src/feed/fields.rs

//! Field lookup over loosely-typed search documents.
//!
//! Every accessor is a thin wrapper around [`resolve`], which walks a path of
//! map keys and yields `None` as soon as a segment is missing or the value at
//! that point is not a map. Missing data is never an error.

use serde_json::Value;

use crate::models::RawDocument;

/// Walk `path` through nested maps, starting at `doc`.
pub fn resolve<'a>(doc: &'a RawDocument, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(doc.get(*first)?, |value, segment| value.as_object()?.get(*segment))
}

/// String value of a nested path.
pub fn resolve_nested_field<'a>(doc: &'a RawDocument, path: &[&str]) -> Option<&'a str> {
    resolve(doc, path)?.as_str()
}

/// Value of a locale-scoped field: `doc[field][locale]`.
pub fn resolve_field<'a>(doc: &'a RawDocument, field: &str, locale: &str) -> Option<&'a str> {
    resolve_nested_field(doc, &[field, locale])
}

/// Value of a plain string field: `doc[field]`.
pub fn resolve_text<'a>(doc: &'a RawDocument, field: &str) -> Option<&'a str> {
    resolve_nested_field(doc, &[field])
}

/// URL of a localized link element: `doc[field].url[locale]`.
pub fn resolve_link_url<'a>(doc: &'a RawDocument, field: &str, locale: &str) -> Option<&'a str> {
    resolve_nested_field(doc, &[field, "url", locale])
}

/// Geo point formatted as an iCal GEO value, `"<lat>;<lon>"`.
///
/// Both coordinates must be numbers; they are rendered as stored.
pub fn resolve_location(doc: &RawDocument, field: &str) -> Option<String> {
    let point = resolve(doc, &[field])?.as_object()?;
    match (point.get("lat")?, point.get("lon")?) {
        (Value::Number(lat), Value::Number(lon)) => Some(format!("{lat};{lon}")),
        _ => None,
    }
}
