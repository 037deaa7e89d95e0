//! Mapping between Airtable records and domain types
//!
//! Column names are fixed by the course base. Airtable returns numbers as JSON
//! floats and omits empty cells entirely, so every reader tolerates absence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::core::error::{AppError, AppResult};
use crate::core::types::{MessageRecord, NewMessage, NewUser, Role, User, Video};

pub const TITLE: &str = "Title";
pub const DESCRIPTION: &str = "Description";
pub const QUESTION: &str = "Question";
pub const YOUTUBE_LINK: &str = "YouTube Link";
pub const LEVEL: &str = "Level";
pub const VIDEO_NUMBER: &str = "Video Number";
/// Some bases name the number column with a leading hash
pub const VIDEO_NUMBER_ALT: &str = "# Video Number";
pub const BENCHMARK: &str = "Understanding Benchmark";
pub const TELEGRAM_ID: &str = "Telegram ID";
pub const STATE: &str = "State";
pub const ROLE: &str = "Role";
pub const MESSAGE: &str = "Message";
pub const VIDEO: &str = "Video";

/// Both spellings of the video number column, in lookup order
pub const VIDEO_NUMBER_COLUMNS: [&str; 2] = [VIDEO_NUMBER, VIDEO_NUMBER_ALT];

/// One page of a list request
#[derive(Debug, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    pub offset: Option<String>,
}

/// A raw Airtable record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Body of create and update requests
#[derive(Debug, Serialize)]
pub struct FieldsBody {
    pub fields: Map<String, Value>,
    pub typecast: bool,
}

impl FieldsBody {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields, typecast: true }
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    Some(text(fields, key)).filter(|s| !s.trim().is_empty())
}

fn number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_negative(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value.round() as u32)
}

/// Reads the video number from whichever column is filled
pub fn video_number(fields: &Map<String, Value>) -> Option<u32> {
    VIDEO_NUMBER_COLUMNS
        .iter()
        .find_map(|column| number(fields, column))
        .and_then(non_negative)
}

pub fn video_from_record(record: &Record) -> Video {
    let fields = &record.fields;
    Video {
        record_id: record.id.clone(),
        title: text(fields, TITLE),
        description: text(fields, DESCRIPTION),
        question: text(fields, QUESTION),
        url: text(fields, YOUTUBE_LINK),
        level: text(fields, LEVEL),
        number: video_number(fields).unwrap_or(0),
        benchmark: optional_text(fields, BENCHMARK),
    }
}

/// Converts a users-table record
///
/// # Errors
/// Returns `AppError::Validation` when the record carries no Telegram ID.
pub fn user_from_record(record: &Record) -> AppResult<User> {
    let fields = &record.fields;
    let telegram_id = number(fields, TELEGRAM_ID)
        .filter(|id| id.is_finite())
        .map(|id| id as i64)
        .ok_or_else(|| AppError::Validation(format!("user record {} has no Telegram ID", record.id)))?;

    Ok(User {
        record_id: record.id.clone(),
        telegram_id,
        level: text(fields, LEVEL).parse().ok(),
        video_number: number(fields, VIDEO_NUMBER).and_then(non_negative).unwrap_or(1),
        state: text(fields, STATE).parse().ok(),
    })
}

pub fn message_from_record(record: &Record) -> MessageRecord {
    let fields = &record.fields;
    let role = match text(fields, ROLE).as_str() {
        "Bot" => Role::Bot,
        _ => Role::User,
    };
    let video_id = fields
        .get(VIDEO)
        .and_then(Value::as_array)
        .and_then(|ids| ids.first())
        .and_then(Value::as_str)
        .map(str::to_string);

    MessageRecord {
        record_id: record.id.clone(),
        role,
        text: text(fields, MESSAGE),
        video_id,
    }
}

pub fn new_user_fields(user: &NewUser) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(TELEGRAM_ID.into(), json!(user.telegram_id));
    fields.insert(LEVEL.into(), json!(user.level.as_str()));
    fields.insert(VIDEO_NUMBER.into(), json!(user.video_number));
    fields.insert(STATE.into(), json!(user.state.as_str()));
    fields
}

/// Writable user columns only; computed columns such as timestamps are never sent
pub fn user_fields(user: &User) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(TELEGRAM_ID.into(), json!(user.telegram_id));
    if let Some(level) = user.level {
        fields.insert(LEVEL.into(), json!(level.as_str()));
    }
    fields.insert(VIDEO_NUMBER.into(), json!(user.video_number));
    if let Some(state) = user.state {
        fields.insert(STATE.into(), json!(state.as_str()));
    }
    fields
}

pub fn message_fields(message: &NewMessage) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(ROLE.into(), json!(message.role.as_str()));
    fields.insert(MESSAGE.into(), json!(message.text));
    if let Some(video_id) = &message.video_id {
        fields.insert(VIDEO.into(), json!([video_id]));
    }
    fields
}

/// Quotes `value` as a formula string literal
pub fn formula_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

pub fn level_formula(level: &str) -> String {
    format!("{{{}}}={}", LEVEL, formula_string(level))
}

pub fn level_and_number_formula(level: &str, column: &str, number: u32) -> String {
    format!("AND({}, {{{}}}={})", level_formula(level), column, number)
}

pub fn telegram_id_formula(telegram_id: i64) -> String {
    format!("{{{}}}={}", TELEGRAM_ID, telegram_id)
}
