//! Telegram bot handler tree configuration
//!
//! The handlers only translate updates into conversation input; every decision
//! is made by the [`Engine`](crate::conversation::Engine). Integration tests can
//! use the same handler tree as production code.

mod schema;
mod types;

pub use schema::schema;
pub use types::{learner_id, HandlerDeps, HandlerError};
