use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Learner level, stored in Airtable as the plain level name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserLevel {
    Entry,
    Beginner,
    Intermediate,
    Advanced,
}

impl UserLevel {
    /// Course order of the levels
    pub const ALL: [UserLevel; 4] = [
        UserLevel::Entry,
        UserLevel::Beginner,
        UserLevel::Intermediate,
        UserLevel::Advanced,
    ];

    /// Levels a placement test may assign
    pub const PLACEMENT: [UserLevel; 3] = [UserLevel::Beginner, UserLevel::Intermediate, UserLevel::Advanced];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserLevel::Entry => "Entry",
            UserLevel::Beginner => "Beginner",
            UserLevel::Intermediate => "Intermediate",
            UserLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for UserLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entry" => Ok(UserLevel::Entry),
            "Beginner" => Ok(UserLevel::Beginner),
            "Intermediate" => Ok(UserLevel::Intermediate),
            "Advanced" => Ok(UserLevel::Advanced),
            _ => Err(format!("Unknown level: {}", s)),
        }
    }
}

/// Conversation state of a user, stored in the `State` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserState {
    #[serde(rename = "Placement Test")]
    PlacementTest,
    #[serde(rename = "Showing Video")]
    ShowingVideo,
    #[serde(rename = "Waiting for Response")]
    WaitingForResponse,
    #[serde(rename = "Chat Mode")]
    ChatMode,
    #[serde(rename = "Course Overview")]
    CourseOverview,
}

impl UserState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserState::PlacementTest => "Placement Test",
            UserState::ShowingVideo => "Showing Video",
            UserState::WaitingForResponse => "Waiting for Response",
            UserState::ChatMode => "Chat Mode",
            UserState::CourseOverview => "Course Overview",
        }
    }

    /// States in which the "understood" and "overview" reply buttons are honoured
    pub fn accepts_navigation(&self) -> bool {
        matches!(self, UserState::WaitingForResponse | UserState::ChatMode)
    }
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Placement Test" => Ok(UserState::PlacementTest),
            "Showing Video" => Ok(UserState::ShowingVideo),
            "Waiting for Response" => Ok(UserState::WaitingForResponse),
            "Chat Mode" => Ok(UserState::ChatMode),
            "Course Overview" => Ok(UserState::CourseOverview),
            _ => Err(format!("Unknown state: {}", s)),
        }
    }
}

/// Author of a logged message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Bot => "Bot",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the video catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub record_id: String,
    pub title: String,
    pub description: String,
    pub question: String,
    pub url: String,
    /// Raw level name; catalogs may contain levels outside [`UserLevel`]
    pub level: String,
    pub number: u32,
    pub benchmark: Option<String>,
}

impl Video {
    pub fn user_level(&self) -> Option<UserLevel> {
        self.level.parse().ok()
    }

    pub fn has_link(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Learning state of a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub record_id: String,
    pub telegram_id: i64,
    /// `None` when the stored level is empty or unknown
    pub level: Option<UserLevel>,
    pub video_number: u32,
    /// `None` when the stored state is empty or unknown
    pub state: Option<UserState>,
}

/// Fields of a user about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub telegram_id: i64,
    pub level: UserLevel,
    pub video_number: u32,
    pub state: UserState,
}

impl NewUser {
    /// A fresh learner who still has to take the placement test
    pub fn placement(telegram_id: i64) -> Self {
        Self {
            telegram_id,
            level: UserLevel::Entry,
            video_number: 0,
            state: UserState::PlacementTest,
        }
    }
}

/// Message about to be appended to the conversation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub role: Role,
    pub text: String,
    pub video_id: Option<String>,
}

/// A stored conversation log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub record_id: String,
    pub role: Role,
    pub text: String,
    pub video_id: Option<String>,
}

/// Catalog query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoFilter {
    All,
    Level(UserLevel),
    Exact { level: UserLevel, number: u32 },
}

/// Texts sent to a new user before the placement question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welcome {
    pub title: String,
    pub description: String,
    pub question: String,
}

/// Outcome of an AI assessment
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResult {
    pub feedback: String,
    pub level: Option<UserLevel>,
    pub confidence: Option<f32>,
}

impl AssessmentResult {
    pub fn feedback(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            level: None,
            confidence: None,
        }
    }
}
