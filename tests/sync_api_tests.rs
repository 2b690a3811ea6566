use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use content_sync::error::{AppError, Result};
use content_sync::models::{
    EnvironmentConfig, FeedEntry, HttpConfig, JobEnvironment, RawDocument, SyncConfig,
};
use content_sync::search::{
    ClientFactory, DeleteOutcome, EnvironmentClientRegistry, SearchHit, SearchIndex,
    SearchRequest,
};
use content_sync::server::{AppState, UNAUTHORIZED_MESSAGE, build_router};
use content_sync::services::{FeedService, JobTrigger, SyncDispatcher};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "sync-token";
const JOB_PATH: &str = "/job/run-content-crawler/buildWithParameters";
const CONTENTFUL_JSON: &str = "application/vnd.contentful.management.v1+json";

/// In-memory index holding `(index, id)` documents.
#[derive(Default)]
struct MemoryIndex {
    docs: Mutex<HashSet<(String, String)>>,
    news: Vec<SearchHit>,
    events: Vec<SearchHit>,
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn delete(&self, index: &str, id: &str) -> Result<DeleteOutcome> {
        let found = self
            .docs
            .lock()
            .unwrap()
            .remove(&(index.to_string(), id.to_string()));
        Ok(DeleteOutcome {
            status: if found { 200 } else { 404 },
            found,
        })
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<RawDocument>> {
        let hits = if index == "event" { &self.events } else { &self.news };
        Ok(hits.iter().find(|hit| hit.id == id).map(|hit| hit.source.clone()))
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let hits = match request.index.as_str() {
            "news" => &self.news,
            "event" => &self.events,
            _ => return Ok(Vec::new()),
        };
        Ok(hits.iter().take(request.size).cloned().collect())
    }
}

struct NoFactory;

impl ClientFactory for NoFactory {
    fn open(&self, _config: &EnvironmentConfig) -> Result<Arc<dyn SearchIndex>> {
        Err(AppError::config("no extra clusters in tests"))
    }
}

fn hit(id: &str, source: Value) -> SearchHit {
    let source = match source {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    SearchHit {
        id: id.to_string(),
        source,
    }
}

fn news_hit(id: &str, title: &str) -> SearchHit {
    hit(id, json!({ "title": { "en-GB": title }, "createdAt": "2021-03-04" }))
}

fn event_hit(id: &str, title: &str) -> SearchHit {
    hit(
        id,
        json!({
            "title": { "en-GB": title },
            "body": { "en-GB": "Held in **Copenhagen**." },
            "start": "2030-10-04T09:00:00Z",
            "end": "2030-10-08",
            "createdAt": "2029-01-01"
        }),
    )
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
async fn spawn_test_server(job: &MockServer) -> String {
    let primary = EnvironmentConfig::default();
    let index = Arc::new(MemoryIndex {
        docs: Mutex::new(HashSet::from([(
            "datause".to_string(),
            "82531".to_string(),
        )])),
        news: vec![news_hit("n1", "First"), news_hit("n2", "Second")],
        events: vec![event_hit("e1", "Governing Board")],
    });

    let environments = HashMap::from([
        ("dev".to_string(), primary.clone()),
        ("prod".to_string(), primary.clone()),
    ]);
    let registry =
        EnvironmentClientRegistry::build(&environments, &primary, index.clone(), &NoFactory)
            .unwrap();

    let mut sync = SyncConfig {
        job_url: format!("{}{}", job.uri(), JOB_PATH),
        token: TOKEN.to_string(),
        ..SyncConfig::default()
    };
    sync.environments.insert(
        "prod".to_string(),
        JobEnvironment {
            repository: Some("releases".to_string()),
            ..JobEnvironment::default()
        },
    );
    let trigger = JobTrigger::new(sync, &HttpConfig::default()).unwrap();

    let state = AppState::new(
        SyncDispatcher::new(Arc::new(registry), Arc::new(trigger)),
        FeedService::new(index, Default::default()).unwrap(),
        TOKEN,
    );

    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

fn data_use_body() -> String {
    json!({
        "sys": {
            "type": "Entry",
            "id": "82531",
            "contentType": { "sys": { "type": "Link", "linkType": "ContentType", "id": "DataUse" } }
        }
    })
    .to_string()
}

async fn post_sync(base: &str, topic: &str, env: &str, token: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/content/sync?env={}", base, env))
        .bearer_auth(token)
        .header("Content-Type", CONTENTFUL_JSON)
        .header("X-Contentful-Topic", topic)
        .body(data_use_body())
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn delete_then_repeat_mirrors_index_status() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let first = post_sync(&base, "ContentManagement.Entry.delete", "dev", TOKEN).await;
    assert_eq!(first.status(), 200);

    let second = post_sync(&base, "ContentManagement.Entry.delete", "dev", TOKEN).await;
    assert_eq!(second.status(), 404);
}

#[tokio::test]
async fn publish_triggers_crawl_with_location() {
    let job = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .and(query_param("token", TOKEN))
        .and(query_param("environment", "prod"))
        .and(query_param("repository", "releases"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", "http://jobs/123/"))
        .expect(1)
        .mount(&job)
        .await;
    let base = spawn_test_server(&job).await;

    let resp = post_sync(&base, "ContentManagement.Entry.publish", "prod", TOKEN).await;
    assert_eq!(resp.status(), 202);
    assert_eq!(resp.headers()["location"], "http://jobs/123/");
}

#[tokio::test]
async fn publish_with_ok_job_response_is_accepted() {
    let job = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .and(query_param("environment", "dev"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", "http://jobs/123/"))
        .expect(1)
        .mount(&job)
        .await;
    let base = spawn_test_server(&job).await;

    let resp = post_sync(&base, "ContentManagement.Entry.publish", "dev", TOKEN).await;
    assert_eq!(resp.status(), 202);
    assert_eq!(resp.headers()["location"], "http://jobs/123/");
}

#[tokio::test]
async fn unknown_topic_is_bad_request() {
    let job = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&job)
        .await;
    let base = spawn_test_server(&job).await;

    let resp = post_sync(&base, "ContentManagement.Entry.archive", "dev", TOKEN).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn delete_in_unconfigured_environment_is_server_error() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = post_sync(&base, "ContentManagement.Entry.unpublish", "staging", TOKEN).await;
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = post_sync(&base, "ContentManagement.Entry.delete", "dev", "guess").await;
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.text().await.unwrap(), UNAUTHORIZED_MESSAGE);

    let resp = reqwest::Client::new()
        .post(format!("{}/content/sync", base))
        .header("Content-Type", CONTENTFUL_JSON)
        .body(data_use_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn malformed_body_and_wrong_media_type() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/content/sync", base))
        .bearer_auth(TOKEN)
        .header("Content-Type", CONTENTFUL_JSON)
        .header("X-Contentful-Topic", "ContentManagement.Entry.delete")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .post(format!("{}/content/sync", base))
        .bearer_auth(TOKEN)
        .header("Content-Type", "text/plain")
        .header("X-Contentful-Topic", "ContentManagement.Entry.delete")
        .body(data_use_body())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 415);
}

#[tokio::test]
async fn news_feed_is_public_and_limited() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/news/json?limit=1", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let entries: Vec<FeedEntry> = resp.json().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].link, "http://www.gbif.org/news/n1");
    assert_eq!(entries[0].title.as_deref(), Some("First"));
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/events/nope", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unknown_programme_is_bad_request() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/news/json/NOPE/en", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn news_rss_feed() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/news/rss", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "application/rss+xml; charset=utf-8");

    let xml = resp.text().await.unwrap();
    assert!(xml.contains("<title>GBIF news feed</title>"));
    assert!(xml.contains("<link>http://www.gbif.org/newsroom/news/rss</link>"));
    assert_eq!(xml.matches("<item>").count(), 2);
    assert!(xml.contains("<title>First</title>"));
    assert!(xml.contains("<link>http://www.gbif.org/news/n2</link>"));
}

#[tokio::test]
async fn upcoming_events_rss_feed() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/events/upcoming.xml", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let xml = resp.text().await.unwrap();
    assert!(xml.contains("<title>Upcoming events</title>"));
    assert!(xml.contains("http://www.gbif.org/newsroom/events/upcoming.xml"));
    assert!(xml.contains("<title>Governing Board</title>"));
    assert!(xml.contains("<link>http://www.gbif.org/event/e1</link>"));
}

#[tokio::test]
async fn upcoming_events_calendar() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/events/calendar/upcoming.ics", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/calendar; charset=utf-8");

    let ical = resp.text().await.unwrap();
    assert!(ical.contains("BEGIN:VCALENDAR"));
    assert_eq!(ical.matches("BEGIN:VEVENT").count(), 1);
    assert!(ical.contains("UID:e1"));
    assert!(ical.contains("SUMMARY:Governing Board"));
    assert!(ical.contains("URL:http://www.gbif.org/event/e1"));
    assert!(ical.contains("20301004T090000Z"));
}

#[tokio::test]
async fn single_event_calendar() {
    let job = MockServer::start().await;
    let base = spawn_test_server(&job).await;

    let resp = reqwest::get(format!("{}/newsroom/events/calendar/e1", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let ical = resp.text().await.unwrap();
    assert!(ical.contains("UID:e1"));

    let resp = reqwest::get(format!("{}/newsroom/events/calendar/nope", base))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
