// src/services/feeds.rs

//! News, data use and event feeds served from the primary search cluster.

use std::sync::Arc;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::feed::projector::{CREATED_AT_FIELD, START_FIELD};
use crate::feed::{to_calendar_event, to_feed_entry};
use crate::models::{CalendarEvent, FeedConfig, FeedEntry};
use crate::search::{SearchHit, SearchIndex, SearchRequest};

const GBIF_REGION_FIELD: &str = "gbifRegion";
const PROGRAMME_TAG_FIELD: &str = "programmeTag";
const ACRONYM_FIELD: &str = "acronym";

/// Language tags such as `en`, `en-GB`, `zh_Hant_TW`.
const LANGUAGE_TAG_PATTERN: &str = r"^[A-Za-z]{2,8}(?:[-_][A-Za-z0-9]{1,8})*$";

/// Builds feed entries and calendar events from indexed content.
pub struct FeedService {
    index: Arc<dyn SearchIndex>,
    config: FeedConfig,
    language_tag: Regex,
}

impl FeedService {
    pub fn new(index: Arc<dyn SearchIndex>, config: FeedConfig) -> Result<Self> {
        let language_tag = Regex::new(LANGUAGE_TAG_PATTERN)
            .map_err(|e| AppError::config(format!("language tag pattern: {e}")))?;
        Ok(Self {
            index,
            config,
            language_tag,
        })
    }

    /// Latest news.
    pub async fn news(&self, limit: Option<usize>) -> Result<Vec<FeedEntry>> {
        let request = SearchRequest::new(&self.config.news_index, CREATED_AT_FIELD).limit(limit);
        self.entries(&request, &self.config.default_locale).await
    }

    /// Latest news tagged with a GBIF region.
    pub async fn news_by_region(&self, region: &str, limit: Option<usize>) -> Result<Vec<FeedEntry>> {
        let request = SearchRequest::new(&self.config.news_index, CREATED_AT_FIELD)
            .term(GBIF_REGION_FIELD, region)
            .limit(limit);
        self.entries(&request, &self.config.default_locale).await
    }

    /// Latest news of a programme, rendered in `language`.
    pub async fn programme_news(
        &self,
        acronym: &str,
        language: &str,
        limit: Option<usize>,
    ) -> Result<Vec<FeedEntry>> {
        let locale = self.locale(Some(language))?;
        let programme_id = self.find_programme_id(acronym).await?;
        let request = SearchRequest::new(&self.config.news_index, CREATED_AT_FIELD)
            .term(PROGRAMME_TAG_FIELD, programme_id)
            .limit(limit);
        self.entries(&request, locale).await
    }

    /// Latest data use stories.
    pub async fn data_uses(&self, limit: Option<usize>) -> Result<Vec<FeedEntry>> {
        let request =
            SearchRequest::new(&self.config.data_use_index, CREATED_AT_FIELD).limit(limit);
        self.entries(&request, &self.config.default_locale).await
    }

    /// Events starting today or later, as feed entries.
    pub async fn upcoming_events(&self, limit: Option<usize>) -> Result<Vec<FeedEntry>> {
        self.entries(&self.upcoming_request(limit), &self.config.default_locale)
            .await
    }

    /// Events starting today or later, as calendar events.
    pub async fn upcoming_calendar(&self, limit: Option<usize>) -> Result<Vec<CalendarEvent>> {
        let base_link = self.config.base_link(&self.config.events_index);
        let hits = self.index.search(&self.upcoming_request(limit)).await?;
        Ok(hits
            .iter()
            .map(|hit| {
                to_calendar_event(&hit.source, &hit.id, &self.config.default_locale, &base_link)
            })
            .collect())
    }

    /// A single event as a calendar event.
    pub async fn event(&self, id: &str) -> Result<CalendarEvent> {
        let index = &self.config.events_index;
        let doc = self
            .index
            .get(index, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))?;
        Ok(to_calendar_event(
            &doc,
            id,
            &self.config.default_locale,
            &self.config.base_link(index),
        ))
    }

    /// Portal URL feed channel links are built from.
    pub fn portal_url(&self) -> &str {
        &self.config.portal_url
    }

    /// Validate a requested language, falling back to the default locale.
    pub fn locale<'a>(&'a self, language: Option<&'a str>) -> Result<&'a str> {
        match language {
            None => Ok(&self.config.default_locale),
            Some(tag) if self.language_tag.is_match(tag) => Ok(tag),
            Some(tag) => {
                log::error!("Error generating locale from {:?}", tag);
                Err(AppError::LocaleParse(tag.to_string()))
            }
        }
    }

    async fn find_programme_id(&self, acronym: &str) -> Result<String> {
        let request = SearchRequest::new(&self.config.programme_index, CREATED_AT_FIELD)
            .term(ACRONYM_FIELD, acronym)
            .limit(Some(1));
        self.index
            .search(&request)
            .await?
            .into_iter()
            .next()
            .map(|hit| hit.id)
            .ok_or_else(|| AppError::not_found(format!("Project acronym {acronym} not found")))
    }

    fn upcoming_request(&self, limit: Option<usize>) -> SearchRequest {
        SearchRequest::new(&self.config.events_index, START_FIELD)
            .upcoming(START_FIELD)
            .limit(limit)
    }

    async fn entries(&self, request: &SearchRequest, locale: &str) -> Result<Vec<FeedEntry>> {
        let base_link = self.config.base_link(&request.index);
        let hits = self.index.search(request).await?;
        log::debug!("{} hit(s) from {}", hits.len(), request.index);
        Ok(project_entries(&hits, locale, &base_link))
    }
}

fn project_entries(hits: &[SearchHit], locale: &str, base_link: &str) -> Vec<FeedEntry> {
    hits.iter()
        .map(|hit| to_feed_entry(&hit.source, &hit.id, locale, base_link))
        .collect()
}
