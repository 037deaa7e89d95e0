//! Telegram bot integration and handlers

pub mod bot;
pub mod dispatcher;
pub mod handlers;
pub mod keyboards;
pub mod outbox;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use dispatcher::build_dispatcher;
pub use handlers::{schema, HandlerDeps, HandlerError};
pub use outbox::TelegramOutbox;
