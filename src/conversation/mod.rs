//! Conversation handling: session state machine, context and course navigation

pub mod context;
pub mod engine;
pub mod locks;
pub mod overview;
pub mod progression;
pub mod reply;

// Re-exports for convenience
pub use context::{ConversationStore, ReviewSession, VideoConversation};
pub use engine::Engine;
pub use locks::SessionLocks;
pub use overview::{CourseOverview, OverviewButton};
pub use reply::{CallbackAction, Incoming, Markup, Outbox, Reply};
