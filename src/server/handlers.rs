// src/server/handlers.rs

//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppError;
use crate::feed::syndication::{ICAL_CONTENT_TYPE, RSS_CONTENT_TYPE};
use crate::feed::{FeedChannel, to_ical, to_rss};
use crate::models::{CalendarEvent, FeedEntry};
use crate::services::webhook::{self, CONTENTFUL_CONTENT_TYPE, TOPIC_HEADER};
use crate::services::SyncOutcome;
use crate::utils::http::media_type_matches;

/// Media types accepted on the webhook endpoint.
const SYNC_MEDIA_TYPES: [&str; 2] = [CONTENTFUL_CONTENT_TYPE, "application/json"];

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Caller mistakes become 400, everything else 500.
fn error_response(err: AppError) -> ApiError {
    if err.is_client_error() {
        log::warn!("Bad request: {}", err);
        api_error(StatusCode::BAD_REQUEST, err.to_string())
    } else {
        log::error!("Request failed: {}", err);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncParams {
    env: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    limit: Option<usize>,
}

/// `POST /content/sync`
pub async fn sync(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SyncParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !media_type_matches(content_type, &SYNC_MEDIA_TYPES) {
        return api_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported content type '{content_type}'"),
        )
        .into_response();
    }

    let topic = headers.get(TOPIC_HEADER).and_then(|value| value.to_str().ok());
    let event = match webhook::parse(topic, &body, params.env.as_deref()) {
        Ok(event) => event,
        Err(e) => return error_response(e).into_response(),
    };

    match state.dispatcher.dispatch(&event).await {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => error_response(e).into_response(),
    }
}

fn outcome_response(outcome: SyncOutcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if let Some(location) = outcome.location() {
        return match HeaderValue::from_str(location) {
            Ok(value) => (status, [(LOCATION, value)]).into_response(),
            Err(_) => {
                log::warn!("Dropping unrepresentable Location {:?}", location);
                status.into_response()
            }
        };
    }

    match outcome {
        SyncOutcome::Triggered(result) => (status, Json(result)).into_response(),
        _ => status.into_response(),
    }
}

/// `GET /newsroom/news/json`
pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    state
        .feeds
        .news(params.limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /newsroom/news/json/{region}`
pub async fn news_by_region(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    state
        .feeds
        .news_by_region(&region, params.limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /newsroom/news/json/{acronym}/{language}`
pub async fn programme_news(
    State(state): State<Arc<AppState>>,
    Path((acronym, language)): Path<(String, String)>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    state
        .feeds
        .programme_news(&acronym, &language, params.limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /newsroom/uses/json`
pub async fn data_uses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    state
        .feeds
        .data_uses(params.limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /newsroom/events/upcoming.json`
pub async fn upcoming_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<FeedEntry>>, ApiError> {
    state
        .feeds
        .upcoming_events(params.limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /newsroom/events/calendar/upcoming.json`
pub async fn upcoming_calendar(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    state
        .feeds
        .upcoming_calendar(params.limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// `GET /newsroom/events/{id}`
pub async fn event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, ApiError> {
    state.feeds.event(&id).await.map(Json).map_err(event_error)
}

/// A missing event is 404 rather than a caller mistake.
fn event_error(err: AppError) -> ApiError {
    match err {
        AppError::NotFound(message) => api_error(StatusCode::NOT_FOUND, message),
        e => error_response(e),
    }
}

fn document(content_type: &'static str, body: String) -> Response {
    ([(CONTENT_TYPE, content_type)], body).into_response()
}

fn news_rss_document(state: &AppState, entries: &[FeedEntry]) -> Response {
    let channel = FeedChannel::news(state.feeds.portal_url());
    document(RSS_CONTENT_TYPE, to_rss(&channel, entries))
}

/// `GET /newsroom/news/rss`
pub async fn news_rss(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ApiError> {
    let entries = state.feeds.news(params.limit).await.map_err(error_response)?;
    Ok(news_rss_document(&state, &entries))
}

/// `GET /newsroom/news/rss/{region}`
pub async fn news_by_region_rss(
    State(state): State<Arc<AppState>>,
    Path(region): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ApiError> {
    let entries = state
        .feeds
        .news_by_region(&region, params.limit)
        .await
        .map_err(error_response)?;
    Ok(news_rss_document(&state, &entries))
}

/// `GET /newsroom/news/rss/{acronym}/{language}`
pub async fn programme_news_rss(
    State(state): State<Arc<AppState>>,
    Path((acronym, language)): Path<(String, String)>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ApiError> {
    let entries = state
        .feeds
        .programme_news(&acronym, &language, params.limit)
        .await
        .map_err(error_response)?;
    Ok(news_rss_document(&state, &entries))
}

/// `GET /newsroom/uses/rss`
pub async fn data_uses_rss(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ApiError> {
    let entries = state.feeds.data_uses(params.limit).await.map_err(error_response)?;
    Ok(news_rss_document(&state, &entries))
}

/// `GET /newsroom/events/upcoming.xml`
pub async fn upcoming_events_rss(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ApiError> {
    let entries = state
        .feeds
        .upcoming_events(params.limit)
        .await
        .map_err(error_response)?;
    let channel = FeedChannel::events(state.feeds.portal_url());
    Ok(document(RSS_CONTENT_TYPE, to_rss(&channel, &entries)))
}

/// `GET /newsroom/events/calendar/upcoming.ics`
pub async fn upcoming_calendar_ical(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Response, ApiError> {
    let events = state
        .feeds
        .upcoming_calendar(params.limit)
        .await
        .map_err(error_response)?;
    Ok(document(ICAL_CONTENT_TYPE, to_ical(&events)))
}

/// `GET /newsroom/events/calendar/{id}`
pub async fn event_ical(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let event = state.feeds.event(&id).await.map_err(event_error)?;
    Ok(document(ICAL_CONTENT_TYPE, to_ical(&[event])))
}
