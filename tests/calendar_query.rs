mod common;

use chrono::NaiveDate;
use classbot::components::google_calendar::client::http_client;
use classbot::components::google_calendar::models::EventTime;
use classbot::components::google_calendar::CalendarClient;
use classbot::error::Error;
use common::valid_token;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendar/v3/calendars/primary/events";

fn calendar_for(server: &MockServer) -> CalendarClient {
    CalendarClient::new(
        reqwest::Client::new(),
        &format!("{}/calendar/v3", server.uri()),
        "primary",
    )
    .unwrap()
}

fn march_4th() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

#[tokio::test]
async fn test_request_covers_the_whole_utc_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", "Bearer ya29.test"))
        .and(query_param("timeMin", "2024-03-04T00:00:00Z"))
        .and(query_param("timeMax", "2024-03-04T23:59:59Z"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("conferenceDataVersion", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let events = calendar_for(&server)
        .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
        .await
        .unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn test_provider_order_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#events",
            "items": [
                {
                    "id": "late",
                    "summary": "MA201 Linear Algebra (NRC-7)",
                    "start": { "dateTime": "2024-03-04T15:00:00-05:00" },
                    "end": { "dateTime": "2024-03-04T16:30:00-05:00" }
                },
                {
                    "id": "early",
                    "summary": "CS101 Intro to Systems (NRC-42)",
                    "start": { "dateTime": "2024-03-04T09:00:00Z" },
                    "end": { "dateTime": "2024-03-04T10:30:00Z" }
                },
                {
                    "id": "holiday",
                    "summary": "Feriado",
                    "start": { "date": "2024-03-04" },
                    "end": { "date": "2024-03-05" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let events = calendar_for(&server)
        .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["late", "early", "holiday"]);
    assert!(matches!(events[0].start, EventTime::Instant(_)));
    assert!(matches!(events[2].start, EventTime::AllDay(_)));
}

#[tokio::test]
async fn test_missing_items_is_an_empty_day() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "calendar#events" })))
        .mount(&server)
        .await;

    let events = calendar_for(&server)
        .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
        .await
        .unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "first", "summary": "A" }],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "second", "summary": "B" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = calendar_for(&server)
        .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second"]);
}

#[tokio::test]
async fn test_http_errors_become_query_errors() {
    for status in [401u16, 403, 429, 500] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .expect(1)
            .mount(&server)
            .await;

        let result = calendar_for(&server)
            .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
            .await;

        match result {
            Err(Error::CalendarQuery(message)) => {
                assert!(message.contains(&status.to_string()), "{message}")
            }
            other => panic!("expected a query error for {status}, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_undecodable_body_is_a_query_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = calendar_for(&server)
        .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
        .await;
    assert!(matches!(result, Err(Error::CalendarQuery(_))));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [] }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = CalendarClient::new(
        http_client(Duration::from_millis(200)).unwrap(),
        &format!("{}/calendar/v3", server.uri()),
        "primary",
    )
    .unwrap();

    let result = client
        .fetch_events_for_day(&valid_token("ya29.test"), march_4th())
        .await;
    assert!(matches!(result, Err(Error::CalendarQuery(_))));
}
