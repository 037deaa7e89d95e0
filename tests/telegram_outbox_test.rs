//! Telegram outbox against a mocked Bot API
//!
//! Run with: cargo test --test telegram_outbox_test

use serde_json::{Value, json};
use teloxide::prelude::*;
use wiremock::matchers::{body_partial_json, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lernbot::conversation::{CallbackAction, Markup, OverviewButton, Outbox, Reply};
use lernbot::core::messages;
use lernbot::telegram::TelegramOutbox;

const CHAT_ID: i64 = 4242;
/// Method names are case-insensitive in the Bot API
const SEND_MESSAGE: &str = r"(?i)/bot[^/]+/sendmessage$";

fn message_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": true,
        "result": {
            "message_id": 1,
            "date": 1700000000,
            "chat": {"id": CHAT_ID, "type": "private", "first_name": "Lea"},
            "text": text
        }
    }))
}

fn test_bot(server: &MockServer) -> Bot {
    Bot::new("123456:TEST-TOKEN").set_api_url(server.uri().parse().unwrap())
}

async fn sent_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().to_ascii_lowercase().ends_with("/sendmessage"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_overview_is_sent_as_markdown_with_inline_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(SEND_MESSAGE))
        .respond_with(message_response("ok"))
        .mount(&server)
        .await;

    let outbox = TelegramOutbox::new(test_bot(&server), ChatId(CHAT_ID));
    let reply = Reply::text("📋 **Kursübersicht**")
        .markdown()
        .with_markup(Markup::Overview(vec![OverviewButton {
            text: "✅ Beginner Video 1: Variablen".to_string(),
            callback: CallbackAction::SelectVideo {
                video_id: "recB1".to_string(),
                review: true,
            },
        }]));
    outbox.send(reply).await.unwrap();

    let bodies = sent_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["chat_id"], CHAT_ID);
    assert_eq!(bodies[0]["parse_mode"], "Markdown");
    assert_eq!(
        bodies[0]["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
        "select_video:recB1:true"
    );
}

#[tokio::test]
async fn test_next_video_keyboard_is_a_reply_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(SEND_MESSAGE))
        .respond_with(message_response("ok"))
        .mount(&server)
        .await;

    let outbox = TelegramOutbox::new(test_bot(&server), ChatId(CHAT_ID));
    outbox
        .send(Reply::text("💭 Gut!").with_markup(Markup::NextVideo))
        .await
        .unwrap();

    let bodies = sent_bodies(&server).await;
    assert_eq!(bodies[0]["reply_markup"]["keyboard"][0][0]["text"], "Verstanden!");
    assert_eq!(bodies[0]["reply_markup"]["resize_keyboard"], true);
    assert!(bodies[0].get("parse_mode").is_none());
}

#[tokio::test]
async fn test_failed_send_falls_back_to_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(SEND_MESSAGE))
        .and(body_partial_json(json!({"parse_mode": "Markdown"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: can't parse entities"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(SEND_MESSAGE))
        .respond_with(message_response(messages::GENERAL_ERROR))
        .mount(&server)
        .await;

    let outbox = TelegramOutbox::new(test_bot(&server), ChatId(CHAT_ID));
    outbox.send(Reply::text("**kaputt").markdown()).await.unwrap();

    let bodies = sent_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1]["text"], messages::GENERAL_ERROR);
}

#[tokio::test]
async fn test_answer_callback_without_query_is_a_no_op() {
    let server = MockServer::start().await;

    let outbox = TelegramOutbox::new(test_bot(&server), ChatId(CHAT_ID));
    outbox.answer_callback("Video wird geladen").await.unwrap();

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
