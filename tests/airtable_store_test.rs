//! Airtable store against a mocked REST API
//!
//! Run with: cargo test --test airtable_store_test

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lernbot::core::config::AirtableConfig;
use lernbot::core::error::AppError;
use lernbot::core::retry::RetryConfig;
use lernbot::core::types::{NewMessage, NewUser, Role, User, UserLevel, UserState, VideoFilter};
use lernbot::storage::{AirtableStore, Store};

const VIDEOS: &str = "/v0/appCourse/tblVideos";
const USERS: &str = "/v0/appCourse/tblUsers";
const MESSAGES: &str = "/v0/appCourse/tblMessages";

fn store(server: &MockServer) -> AirtableStore {
    let config = AirtableConfig {
        api_key: SecretString::from("patTest"),
        base_id: "appCourse".to_string(),
        videos_table: "tblVideos".to_string(),
        users_table: "tblUsers".to_string(),
        messages_table: "tblMessages".to_string(),
        api_url: Url::parse(&server.uri()).unwrap(),
    };
    AirtableStore::new(&config).unwrap().with_retry(RetryConfig::none())
}

fn video_record(id: &str, level: &str, number: u32, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "createdTime": "2024-01-01T00:00:00.000Z",
        "fields": {
            "Title": title,
            "Description": "Beschreibung",
            "Question": "Frage?",
            "YouTube Link": "https://youtu.be/x",
            "Level": level,
            "Video Number": number,
        }
    })
}

#[tokio::test]
async fn test_list_videos_by_level() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .and(header("authorization", "Bearer patTest"))
        .and(query_param("filterByFormula", "{Level}='Beginner'"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                video_record("recB1", "Beginner", 1, "Variablen"),
                video_record("recB2", "Beginner", 2, "Funktionen"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let videos = store(&server)
        .list_videos(VideoFilter::Level(UserLevel::Beginner))
        .await
        .unwrap();

    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].record_id, "recB1");
    assert_eq!(videos[1].title, "Funktionen");
    assert_eq!(videos[1].number, 2);
}

#[tokio::test]
async fn test_list_follows_offset_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .and(query_param("offset", "itrPage2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [video_record("recA1", "Advanced", 1, "Async")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [video_record("recB1", "Beginner", 1, "Variablen")],
            "offset": "itrPage2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let videos = store(&server).list_videos(VideoFilter::All).await.unwrap();

    let ids: Vec<&str> = videos.iter().map(|v| v.record_id.as_str()).collect();
    assert_eq!(ids, vec!["recB1", "recA1"]);
}

#[tokio::test]
async fn test_exact_video_falls_back_to_level_scan() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .and(query_param("filterByFormula", "AND({Level}='Beginner', {Video Number}=2)"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"type": "INVALID_FILTER_BY_FORMULA", "message": "Unknown field names: video number"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .and(query_param("filterByFormula", "AND({Level}='Beginner', {# Video Number}=2)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .and(query_param("filterByFormula", "{Level}='Beginner'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                video_record("recB1", "Beginner", 1, "Variablen"),
                video_record("recB2", "Beginner", 2, "Funktionen"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let videos = store(&server)
        .list_videos(VideoFilter::Exact {
            level: UserLevel::Beginner,
            number: 2,
        })
        .await
        .unwrap();

    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].record_id, "recB2");
}

#[tokio::test]
async fn test_find_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS))
        .and(query_param("filterByFormula", "{Telegram ID}=42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "id": "recU1",
                "fields": {
                    "Telegram ID": 42,
                    "Level": "Intermediate",
                    "Video Number": 2,
                    "State": "Chat Mode"
                }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USERS))
        .and(query_param("filterByFormula", "{Telegram ID}=7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .mount(&server)
        .await;

    let store = store(&server);
    let user = store.find_user(42).await.unwrap().unwrap();

    assert_eq!(
        user,
        User {
            record_id: "recU1".to_string(),
            telegram_id: 42,
            level: Some(UserLevel::Intermediate),
            video_number: 2,
            state: Some(UserState::ChatMode),
        }
    );
    assert_eq!(store.find_user(7).await.unwrap(), None);
}

#[tokio::test]
async fn test_create_user_sends_typecast_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(USERS))
        .and(body_partial_json(json!({
            "typecast": true,
            "fields": {
                "Telegram ID": 42,
                "Level": "Entry",
                "Video Number": 0,
                "State": "Placement Test"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "recNew",
            "fields": {"Telegram ID": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = store(&server).create_user(NewUser::placement(42)).await.unwrap();

    assert_eq!(user.record_id, "recNew");
    assert_eq!(user.level, Some(UserLevel::Entry));
    assert_eq!(user.state, Some(UserState::PlacementTest));
}

#[tokio::test]
async fn test_update_user_patches_record() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/recU1", USERS)))
        .and(body_partial_json(json!({
            "fields": {"Level": "Advanced", "Video Number": 1, "State": "Showing Video"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "recU1", "fields": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let user = User {
        record_id: "recU1".to_string(),
        telegram_id: 42,
        level: Some(UserLevel::Advanced),
        video_number: 1,
        state: Some(UserState::ShowingVideo),
    };
    store(&server).update_user(&user).await.unwrap();
}

#[tokio::test]
async fn test_create_message_links_video() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MESSAGES))
        .and(body_partial_json(json!({
            "fields": {"Role": "User", "Message": "Antwort", "Video": ["recB1"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "recMsg",
            "fields": {"Role": "User", "Message": "Antwort", "Video": ["recB1"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = store(&server)
        .create_message(NewMessage {
            role: Role::User,
            text: "Antwort".to_string(),
            video_id: Some("recB1".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(record.record_id, "recMsg");
    assert_eq!(record.video_id.as_deref(), Some("recB1"));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"error": "RATE_LIMIT_REACHED"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(USERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server).with_retry(
        RetryConfig::none()
            .max_retries(2)
            .initial_delay(Duration::from_millis(1))
            .no_jitter(),
    );

    assert_eq!(store.find_user(42).await.unwrap(), None);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(USERS))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "NOT_FOUND"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server).with_retry(RetryConfig::none().max_retries(3).initial_delay(Duration::from_millis(1)));
    let err = store.find_user(42).await.unwrap_err();

    match err {
        AppError::Airtable { status, message } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "NOT_FOUND");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_ping_reads_one_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(VIDEOS))
        .and(query_param("maxRecords", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).ping().await.unwrap();
}
