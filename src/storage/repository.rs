use std::sync::Arc;

use super::Store;
use super::cache::{CacheStats, TtlCache};
use crate::core::config;
use crate::core::error::AppResult;
use crate::core::logging::timed;
use crate::core::messages;
use crate::core::types::{NewMessage, NewUser, Role, User, UserLevel, Video, VideoFilter, Welcome};

/// Cached access to the course store
///
/// Catalog reads are cached for 10 minutes, users for 5 minutes and the
/// welcome texts for an hour. User writes go through to the cache so the next
/// read sees the new state without another round trip.
pub struct Repository {
    store: Arc<dyn Store>,
    videos: TtlCache<VideoFilter, Vec<Video>>,
    users: TtlCache<i64, User>,
    welcome: TtlCache<(), Welcome>,
}

impl Repository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            videos: TtlCache::new("videos", config::cache::videos_ttl()),
            users: TtlCache::new("users", config::cache::users_ttl()),
            welcome: TtlCache::new("welcome", config::cache::welcome_ttl()),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    async fn videos(&self, filter: VideoFilter) -> AppResult<Vec<Video>> {
        if let Some(videos) = self.videos.get(&filter).await {
            return Ok(videos);
        }

        let videos = timed("get_videos", self.store.list_videos(filter)).await?;
        self.videos.insert(filter, videos.clone()).await;
        Ok(videos)
    }

    /// The video with the given number on `level`
    pub async fn video(&self, level: UserLevel, number: u32) -> AppResult<Option<Video>> {
        let videos = self.videos(VideoFilter::Exact { level, number }).await?;
        Ok(videos.into_iter().next())
    }

    pub async fn videos_for_level(&self, level: UserLevel) -> AppResult<Vec<Video>> {
        self.videos(VideoFilter::Level(level)).await
    }

    pub async fn all_videos(&self) -> AppResult<Vec<Video>> {
        self.videos(VideoFilter::All).await
    }

    pub async fn video_by_id(&self, record_id: &str) -> AppResult<Option<Video>> {
        let videos = self.all_videos().await?;
        Ok(videos.into_iter().find(|v| v.record_id == record_id))
    }

    /// Title, description and question of the first Entry-level video
    pub async fn welcome(&self) -> AppResult<Welcome> {
        if let Some(welcome) = self.welcome.get(&()).await {
            return Ok(welcome);
        }

        let welcome = match self.videos_for_level(UserLevel::Entry).await?.into_iter().next() {
            Some(video) => Welcome {
                title: video.title,
                description: video.description,
                question: video.question,
            },
            None => {
                tracing::warn!("no Entry level video found for the welcome message");
                Welcome {
                    title: messages::WELCOME_NOT_FOUND.to_string(),
                    description: String::new(),
                    question: String::new(),
                }
            }
        };

        self.welcome.insert((), welcome.clone()).await;
        Ok(welcome)
    }

    /// Looks a user up by Telegram ID; unknown users are not cached
    pub async fn user(&self, telegram_id: i64) -> AppResult<Option<User>> {
        if let Some(user) = self.users.get(&telegram_id).await {
            return Ok(Some(user));
        }

        let user = timed("get_user", self.store.find_user(telegram_id)).await?;
        if let Some(user) = &user {
            self.users.insert(telegram_id, user.clone()).await;
        }
        Ok(user)
    }

    /// Creates the user unless one with the same Telegram ID already exists
    pub async fn create_user(&self, user: NewUser) -> AppResult<User> {
        if let Some(existing) = self.user(user.telegram_id).await? {
            tracing::info!(user_id = user.telegram_id, "user already exists");
            return Ok(existing);
        }

        let created = timed("create_user", self.store.create_user(user)).await?;
        self.users.insert(created.telegram_id, created.clone()).await;
        Ok(created)
    }

    pub async fn update_user(&self, user: &User) -> AppResult<()> {
        timed("update_user", self.store.update_user(user)).await?;
        self.users.insert(user.telegram_id, user.clone()).await;
        Ok(())
    }

    pub async fn invalidate_user(&self, telegram_id: i64) {
        self.users.invalidate(&telegram_id).await;
    }

    /// Appends a message to the conversation log
    ///
    /// Logging never aborts a turn: failures are reported and `None` is returned.
    pub async fn record_message(&self, text: &str, role: Role, video_id: Option<&str>) -> Option<String> {
        let message = NewMessage {
            role,
            text: text.to_string(),
            video_id: video_id.map(str::to_string),
        };

        match timed("create_message", self.store.create_message(message)).await {
            Ok(record) => Some(record.record_id),
            Err(e) => {
                tracing::error!(role = role.as_str(), video_id, error = %e, "failed to log message");
                None
            }
        }
    }

    pub async fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            (self.videos.name(), self.videos.stats().await),
            (self.users.name(), self.users.stats().await),
            (self.welcome.name(), self.welcome.stats().await),
        ]
    }
}
