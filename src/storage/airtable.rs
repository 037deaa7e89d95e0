//! Airtable REST client for the course base
//!
//! Lists are fetched page by page (`offset` cursor, 100 records per page).
//! Every request is retried on 429 and 5xx answers.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use super::Store;
use super::fields::{self, FieldsBody, Record, RecordPage};
use crate::core::config::{AirtableConfig, network};
use crate::core::error::{AppError, AppResult};
use crate::core::retry::{RetryConfig, retry};
use crate::core::types::{MessageRecord, NewMessage, NewUser, User, Video, VideoFilter};

const PAGE_SIZE: &str = "100";

/// Store backed by three Airtable tables
pub struct AirtableStore {
    client: Client,
    api_key: SecretString,
    api_url: Url,
    base_id: String,
    videos_table: String,
    users_table: String,
    messages_table: String,
    retry: RetryConfig,
}

impl AirtableStore {
    /// Creates a client for the base described by `config`
    ///
    /// # Errors
    /// Returns `AppError::Http` if the HTTP client cannot be built.
    pub fn new(config: &AirtableConfig) -> AppResult<Self> {
        let client = Client::builder().timeout(network::airtable_timeout()).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            base_id: config.base_id.clone(),
            videos_table: config.videos_table.clone(),
            users_table: config.users_table.clone(),
            messages_table: config.messages_table.clone(),
            retry: RetryConfig::network(),
        })
    }

    /// Replaces the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn table_url(&self, table: &str, record_id: Option<&str>) -> AppResult<Url> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::Config(format!("AIRTABLE_API_URL cannot be a base URL: {}", self.api_url)))?;
            segments.pop_if_empty().extend(["v0", self.base_id.as_str(), table]);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn execute<T, F>(&self, operation: &str, build: F) -> AppResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        retry(&self.retry, operation, || async {
            let response = build().bearer_auth(self.api_key.expose_secret()).send().await?;
            decode(response).await
        })
        .await
    }

    /// Fetches every record of `table` matching `formula`, following the offset cursor
    async fn list_records(&self, table: &str, formula: Option<&str>) -> AppResult<Vec<Record>> {
        let url = self.table_url(table, None)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page: RecordPage = self
                .execute("airtable_list", || {
                    let mut query: Vec<(&str, &str)> = vec![("pageSize", PAGE_SIZE)];
                    if let Some(formula) = formula {
                        query.push(("filterByFormula", formula));
                    }
                    if let Some(offset) = offset.as_deref() {
                        query.push(("offset", offset));
                    }
                    self.client.get(url.clone()).query(&query)
                })
                .await?;

            records.extend(page.records);
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(table, formula, count = records.len(), "airtable records listed");
        Ok(records)
    }

    async fn create_record(&self, table: &str, fields: serde_json::Map<String, serde_json::Value>) -> AppResult<Record> {
        let url = self.table_url(table, None)?;
        let body = FieldsBody::new(fields);
        self.execute("airtable_create", || self.client.post(url.clone()).json(&body))
            .await
    }

    async fn videos_by_formula(&self, formula: &str) -> AppResult<Vec<Video>> {
        let records = self.list_records(&self.videos_table, Some(formula)).await?;
        Ok(records.iter().map(fields::video_from_record).collect())
    }

    /// Tries both number column spellings, then filters the level locally
    async fn exact_video(&self, level: &str, number: u32) -> AppResult<Vec<Video>> {
        for column in fields::VIDEO_NUMBER_COLUMNS {
            let formula = fields::level_and_number_formula(level, column, number);
            match self.videos_by_formula(&formula).await {
                Ok(videos) if !videos.is_empty() => return Ok(videos),
                Ok(_) => {}
                Err(e) => tracing::warn!(column, error = %e, "video query by number column failed"),
            }
        }

        tracing::info!(level, number, "video query falling back to level scan");
        let videos = self.videos_by_formula(&fields::level_formula(level)).await?;
        Ok(videos.into_iter().filter(|v| v.number == number).collect())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Airtable {
        status,
        message: error_message(&body),
    })
}

/// Extracts the message of an Airtable error body
///
/// Airtable answers either `{"error": {"type": .., "message": ..}}` or `{"error": "TYPE"}`.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    match error {
        Some(serde_json::Value::String(kind)) => kind.clone(),
        Some(serde_json::Value::Object(obj)) => {
            let kind = obj.get("type").and_then(|v| v.as_str()).unwrap_or("UNKNOWN");
            match obj.get("message").and_then(|v| v.as_str()) {
                Some(message) => format!("{}: {}", kind, message),
                None => kind.to_string(),
            }
        }
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl Store for AirtableStore {
    async fn list_videos(&self, filter: VideoFilter) -> AppResult<Vec<Video>> {
        match filter {
            VideoFilter::All => {
                let records = self.list_records(&self.videos_table, None).await?;
                Ok(records.iter().map(fields::video_from_record).collect())
            }
            VideoFilter::Level(level) => self.videos_by_formula(&fields::level_formula(level.as_str())).await,
            VideoFilter::Exact { level, number } => self.exact_video(level.as_str(), number).await,
        }
    }

    async fn find_user(&self, telegram_id: i64) -> AppResult<Option<User>> {
        let formula = fields::telegram_id_formula(telegram_id);
        let records = self.list_records(&self.users_table, Some(&formula)).await?;
        records.first().map(fields::user_from_record).transpose()
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let record = self
            .create_record(&self.users_table, fields::new_user_fields(&user))
            .await?;
        tracing::info!(user_id = user.telegram_id, record_id = %record.id, "user created");

        Ok(User {
            record_id: record.id,
            telegram_id: user.telegram_id,
            level: Some(user.level),
            video_number: user.video_number,
            state: Some(user.state),
        })
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        let url = self.table_url(&self.users_table, Some(&user.record_id))?;
        let body = FieldsBody::new(fields::user_fields(user));
        let _: Record = self
            .execute("airtable_update", || self.client.patch(url.clone()).json(&body))
            .await?;
        tracing::debug!(user_id = user.telegram_id, record_id = %user.record_id, "user updated");
        Ok(())
    }

    async fn create_message(&self, message: NewMessage) -> AppResult<MessageRecord> {
        let record = self
            .create_record(&self.messages_table, fields::message_fields(&message))
            .await?;
        Ok(fields::message_from_record(&record))
    }

    async fn ping(&self) -> AppResult<()> {
        let url = self.table_url(&self.videos_table, None)?;
        let _: RecordPage = self
            .execute("airtable_ping", || {
                self.client
                    .get(url.clone())
                    .query(&[("pageSize", "1"), ("maxRecords", "1")])
            })
            .await?;
        Ok(())
    }
}
