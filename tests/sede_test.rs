//! Data explorer bookmarkers, end to end against a mock server.

use chrono::NaiveDate;
use huginn::config::SedeConfig;
use huginn::{HuginnError, SedeClient, StackExchangeApi, User, UserFetcher, bookmark_users};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CSV: &str = "\"CreationDate\",\"UserId\"\r\n\
                   \"2020-05-01 00:00:00\",\"42\"\r\n\
                   \"2021-06-02 00:00:00\",\"7\"\r\n\
                   \"2022-07-03 00:00:00\",\"13\"\r\n";

fn sede(server: &MockServer) -> SedeClient {
    let config = SedeConfig {
        base_url: server.uri(),
        ..SedeConfig::default()
    };
    SedeClient::from_config(&config, "stackoverflow").unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn bookmarkers_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stackoverflow/csv/1894927"))
        .and(query_param("postId", "11227809"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV))
        .expect(1)
        .mount(&server)
        .await;

    let rows = sede(&server).bookmarkers(11227809).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|b| b.user_id).collect();
    assert_eq!(ids, vec![42, 7, 13]);
    assert_eq!(rows[0].date, date(2020, 5, 1));
}

#[tokio::test]
async fn error_status_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let err = sede(&server).bookmarkers(1).await.unwrap_err();
    assert!(matches!(err, HuginnError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn bookmark_users_pairs_dates_with_users() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stackoverflow/csv/1894927"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CSV))
        .mount(&server)
        .await;
    // user 7 has been deleted
    Mock::given(method("GET"))
        .and(path("/2.3/users/42;7;13"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"user_id": 13, "display_name": "thirteen"},
                {"user_id": 42, "display_name": "forty-two"}
            ],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = StackExchangeApi::builder()
        .site("stackoverflow")
        .base_url(format!("{}/2.3", server.uri()))
        .build()
        .unwrap();
    let fetcher = UserFetcher::new(api);

    let bookmarks = bookmark_users(&sede(&server), &fetcher, 99).await.unwrap();

    let summary: Vec<_> = bookmarks
        .iter()
        .map(|(d, u)| (*d, u.user_id(), u.is_missing()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (date(2020, 5, 1), 42, false),
            (date(2021, 6, 2), 7, true),
            (date(2022, 7, 3), 13, false),
        ]
    );
    assert!(matches!(&bookmarks[2].1, User::Existing(u) if u.display_name == "thirteen"));
    // the caller's fetcher keeps its own setting
    assert!(!fetcher.assumes_missing_deleted());
}

#[tokio::test]
async fn no_bookmarks_means_no_api_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stackoverflow/csv/1894927"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"CreationDate\",\"UserId\"\n"))
        .expect(1)
        .mount(&server)
        .await;

    let api = StackExchangeApi::builder()
        .site("stackoverflow")
        .base_url(format!("{}/2.3", server.uri()))
        .build()
        .unwrap();

    let bookmarks = bookmark_users(&sede(&server), &UserFetcher::new(api), 1)
        .await
        .unwrap();
    assert!(bookmarks.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
