//! Transport-neutral input and output of a conversation turn

use async_trait::async_trait;
use std::time::Duration;

use super::overview::OverviewButton;
use crate::core::error::AppResult;

const READY_FOR_VIDEO: &str = "ready_for_video";
const NEXT_VIDEO: &str = "next_video";
const SELECT_VIDEO_PREFIX: &str = "select_video:";

/// Inline button payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    ReadyForVideo,
    NextVideo,
    SelectVideo { video_id: String, review: bool },
}

impl CallbackAction {
    /// Parses callback data; unknown payloads yield `None`
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            READY_FOR_VIDEO => Some(CallbackAction::ReadyForVideo),
            NEXT_VIDEO => Some(CallbackAction::NextVideo),
            _ => {
                let rest = data.strip_prefix(SELECT_VIDEO_PREFIX)?;
                let mut parts = rest.splitn(2, ':');
                let video_id = parts.next().filter(|id| !id.is_empty())?.to_string();
                let review = parts.next().is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
                Some(CallbackAction::SelectVideo { video_id, review })
            }
        }
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::ReadyForVideo => READY_FOR_VIDEO.to_string(),
            CallbackAction::NextVideo => NEXT_VIDEO.to_string(),
            CallbackAction::SelectVideo { video_id, review } => {
                format!("{}{}:{}", SELECT_VIDEO_PREFIX, video_id, review)
            }
        }
    }
}

/// What a learner sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Start,
    Text(String),
    Callback(CallbackAction),
}

/// Keyboard attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    None,
    /// Inline "ready" button shown after the placement test
    Ready,
    /// Reply keyboard with the "understood" and "overview" buttons
    NextVideo,
    /// Inline keyboard listing selectable videos
    Overview(Vec<OverviewButton>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
    /// Send with Markdown parse mode
    pub markdown: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::None,
            markdown: false,
        }
    }

    #[must_use]
    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    #[must_use]
    pub fn markdown(mut self) -> Self {
        self.markdown = true;
        self
    }
}

/// Where a turn's output goes
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send(&self, reply: Reply) -> AppResult<()>;

    /// Waits between two messages
    async fn pause(&self, duration: Duration);

    /// Acknowledges the button press that started the turn; a no-op for text turns
    async fn answer_callback(&self, text: &str) -> AppResult<()>;
}
