//! Persistence: user sessions, the video catalog and the conversation log
//!
//! [`Store`] is the raw record store (Airtable in production, memory in tests
//! and local runs). [`Repository`] layers the read caches on top of it.

pub mod airtable;
pub mod cache;
pub mod fields;
pub mod memory;
pub mod repository;

use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::core::types::{MessageRecord, NewMessage, NewUser, User, Video, VideoFilter};

// Re-exports for convenience
pub use airtable::AirtableStore;
pub use cache::{CacheStats, TtlCache};
pub use memory::InMemoryStore;
pub use repository::Repository;

/// Record store holding the three course tables
#[async_trait]
pub trait Store: Send + Sync {
    /// Videos matching `filter`, in store order
    async fn list_videos(&self, filter: VideoFilter) -> AppResult<Vec<Video>>;

    /// First user with the given Telegram ID
    async fn find_user(&self, telegram_id: i64) -> AppResult<Option<User>>;

    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    /// Writes level, video number and state of an existing user
    async fn update_user(&self, user: &User) -> AppResult<()>;

    async fn create_message(&self, message: NewMessage) -> AppResult<MessageRecord>;

    /// Cheap request proving the store is reachable and the credentials work
    async fn ping(&self) -> AppResult<()>;
}
