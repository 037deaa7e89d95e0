//! In-memory conversation state per user
//!
//! Nothing here is persisted: after a restart the history of the current video
//! starts empty and is rebuilt as the learner keeps talking.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::core::types::{UserLevel, Video};

/// Messages kept in the prompt summary
const SUMMARY_MESSAGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationMessage {
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Record of the message in the conversation log, if it was stored
    pub message_id: Option<String>,
}

/// Conversation about one video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConversation {
    pub video_id: String,
    pub title: String,
    pub question: String,
    pub benchmark: Option<String>,
    pub history: Vec<ConversationMessage>,
    pub created_at: DateTime<Utc>,
}

impl VideoConversation {
    pub fn new(video: &Video) -> Self {
        Self {
            video_id: video.record_id.clone(),
            title: video.title.clone(),
            question: video.question.clone(),
            benchmark: video.benchmark.clone(),
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_message(&mut self, speaker: Speaker, content: impl Into<String>, message_id: Option<String>) {
        self.history.push(ConversationMessage {
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
            message_id,
        });
    }

    /// The last few messages as `User: ..` / `Assistant: ..` lines
    pub fn summary(&self) -> String {
        let start = self.history.len().saturating_sub(SUMMARY_MESSAGES);
        self.history[start..]
            .iter()
            .map(|m| format!("{}: {}", m.speaker.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Progress to restore when a learner finishes reviewing an earlier video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession {
    pub original_level: Option<UserLevel>,
    pub original_video_number: u32,
    pub review_video_id: String,
}

/// Conversations and review sessions of all users
#[derive(Default)]
pub struct ConversationStore {
    conversations: DashMap<i64, VideoConversation>,
    reviews: DashMap<i64, ReviewSession>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's conversation, starting one about `video` if there is none
    pub fn get_or_create(&self, user_id: i64, video: &Video) -> VideoConversation {
        self.conversations
            .entry(user_id)
            .or_insert_with(|| VideoConversation::new(video))
            .clone()
    }

    /// Replaces the user's conversation with a fresh one about `video`
    pub fn reset_for_video(&self, user_id: i64, video: &Video) {
        self.conversations.insert(user_id, VideoConversation::new(video));
    }

    pub fn get(&self, user_id: i64) -> Option<VideoConversation> {
        self.conversations.get(&user_id).map(|c| c.clone())
    }

    pub fn add_user_message(&self, user_id: i64, content: &str, message_id: Option<String>) {
        if let Some(mut conversation) = self.conversations.get_mut(&user_id) {
            conversation.add_message(Speaker::User, content, message_id);
        }
    }

    pub fn add_assistant_message(&self, user_id: i64, content: &str, message_id: Option<String>) {
        if let Some(mut conversation) = self.conversations.get_mut(&user_id) {
            conversation.add_message(Speaker::Assistant, content, message_id);
        }
    }

    pub fn summary(&self, user_id: i64) -> Option<String> {
        self.conversations.get(&user_id).map(|c| c.summary())
    }

    /// Forgets everything held for the user
    pub fn cleanup_user(&self, user_id: i64) {
        if self.conversations.remove(&user_id).is_some() {
            tracing::debug!(user_id, "conversation cleaned up");
        }
        if self.reviews.remove(&user_id).is_some() {
            tracing::debug!(user_id, "review session cleaned up");
        }
    }

    pub fn start_review(&self, user_id: i64, session: ReviewSession) {
        self.reviews.insert(user_id, session);
    }

    /// Ends and returns the user's review session
    pub fn take_review(&self, user_id: i64) -> Option<ReviewSession> {
        self.reviews.remove(&user_id).map(|(_, session)| session)
    }

    pub fn review(&self, user_id: i64) -> Option<ReviewSession> {
        self.reviews.get(&user_id).map(|session| session.clone())
    }

    pub fn has_review(&self, user_id: i64) -> bool {
        self.reviews.contains_key(&user_id)
    }

    /// Number of users with an active conversation
    pub fn active_conversations(&self) -> usize {
        self.conversations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn video(id: &str) -> Video {
        Video {
            record_id: id.to_string(),
            title: format!("Title {}", id),
            description: String::new(),
            question: "Q?".to_string(),
            url: String::new(),
            level: "Beginner".to_string(),
            number: 1,
            benchmark: Some("B".to_string()),
        }
    }

    #[test]
    fn test_summary_keeps_last_five_messages() {
        let mut conversation = VideoConversation::new(&video("rec1"));
        assert_eq!(conversation.summary(), "");

        for i in 1..=6 {
            let speaker = if i % 2 == 1 { Speaker::User } else { Speaker::Assistant };
            conversation.add_message(speaker, format!("m{}", i), None);
        }

        assert_eq!(
            conversation.summary(),
            "Assistant: m2\nUser: m3\nAssistant: m4\nUser: m5\nAssistant: m6"
        );
    }

    #[test]
    fn test_get_or_create_keeps_existing_conversation() {
        let store = ConversationStore::new();
        store.get_or_create(1, &video("recA"));
        store.add_user_message(1, "hallo", Some("recM".into()));

        let conversation = store.get_or_create(1, &video("recB"));
        assert_eq!(conversation.video_id, "recA");
        assert_eq!(conversation.history.len(), 1);
        assert_eq!(conversation.history[0].message_id.as_deref(), Some("recM"));
    }

    #[test]
    fn test_reset_for_video_clears_history() {
        let store = ConversationStore::new();
        store.get_or_create(1, &video("recA"));
        store.add_user_message(1, "hallo", None);
        store.reset_for_video(1, &video("recB"));

        let conversation = store.get(1).unwrap();
        assert_eq!(conversation.video_id, "recB");
        assert!(conversation.history.is_empty());
    }

    #[test]
    fn test_messages_without_conversation_are_dropped() {
        let store = ConversationStore::new();
        store.add_assistant_message(7, "ignored", None);
        assert_eq!(store.summary(7), None);
    }

    #[test]
    fn test_review_sessions() {
        let store = ConversationStore::new();
        let session = ReviewSession {
            original_level: Some(UserLevel::Intermediate),
            original_video_number: 2,
            review_video_id: "recOld".into(),
        };
        store.start_review(1, session.clone());
        assert!(store.has_review(1));

        store.get_or_create(1, &video("recA"));
        store.cleanup_user(1);
        assert!(!store.has_review(1));
        assert_eq!(store.get(1), None);

        store.start_review(2, session.clone());
        assert_eq!(store.take_review(2), Some(session));
        assert_eq!(store.take_review(2), None);
    }
}
