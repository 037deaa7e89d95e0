//! Language model access and the assessments built on it

pub mod assessment;
pub mod mistral;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::error::AppResult;

// Re-exports for convenience
pub use assessment::Assessor;
pub use mistral::MistralClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A single chat-completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Chat-completion backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the content of the first choice
    async fn complete(&self, request: ChatRequest) -> AppResult<String>;

    /// Checks that the API is reachable with the configured key
    async fn ping(&self) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_in_api_shape() {
        let request = ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            max_tokens: 2,
            temperature: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "u");
        assert_eq!(json["max_tokens"], 2);
        assert_eq!(json["temperature"], 0.5);
    }
}
