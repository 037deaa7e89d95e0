use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::Store;
use crate::core::error::{AppError, AppResult};
use crate::core::types::{MessageRecord, NewMessage, NewUser, User, Video, VideoFilter};

#[derive(Default)]
struct Tables {
    videos: Vec<Video>,
    users: Vec<User>,
    messages: Vec<MessageRecord>,
}

/// Store kept entirely in memory
///
/// Used for local runs without an Airtable base and by the test suite.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with a video catalog
    pub fn with_videos(videos: Vec<Video>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                videos,
                ..Tables::default()
            }),
            ..Self::default()
        }
    }

    /// Makes every operation fail as if the backend were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn users(&self) -> Vec<User> {
        self.tables.read().await.users.clone()
    }

    pub async fn messages(&self) -> Vec<MessageRecord> {
        self.tables.read().await.messages.clone()
    }

    /// Inserts or replaces a user directly, bypassing `create_user`
    pub async fn put_user(&self, user: User) {
        let mut tables = self.tables.write().await;
        tables.users.retain(|u| u.record_id != user.record_id);
        tables.users.push(user);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE))
        } else {
            Ok(())
        }
    }

    fn record_id(&self) -> String {
        format!("rec{:014}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn list_videos(&self, filter: VideoFilter) -> AppResult<Vec<Video>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let videos = tables
            .videos
            .iter()
            .filter(|video| match filter {
                VideoFilter::All => true,
                VideoFilter::Level(level) => video.level == level.as_str(),
                VideoFilter::Exact { level, number } => video.level == level.as_str() && video.number == number,
            })
            .cloned()
            .collect();
        Ok(videos)
    }

    async fn find_user(&self, telegram_id: i64) -> AppResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.telegram_id == telegram_id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        self.check_available()?;
        let created = User {
            record_id: self.record_id(),
            telegram_id: user.telegram_id,
            level: Some(user.level),
            video_number: user.video_number,
            state: Some(user.state),
        };
        self.tables.write().await.users.push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> AppResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.record_id == user.record_id)
            .ok_or_else(|| AppError::Airtable {
                status: StatusCode::NOT_FOUND,
                message: format!("NOT_FOUND: {}", user.record_id),
            })?;
        *stored = user.clone();
        Ok(())
    }

    async fn create_message(&self, message: NewMessage) -> AppResult<MessageRecord> {
        self.check_available()?;
        let record = MessageRecord {
            record_id: self.record_id(),
            role: message.role,
            text: message.text,
            video_id: message.video_id,
        };
        self.tables.write().await.messages.push(record.clone());
        Ok(record)
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }
}
