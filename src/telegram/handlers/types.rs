//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::User;

use crate::conversation::Engine;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub engine: Arc<Engine>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

/// Telegram user id as stored in the course tables
pub fn learner_id(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}
