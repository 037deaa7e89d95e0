//! Update dispatching

use std::convert::Infallible;

use teloxide::dispatching::DispatcherBuilder;
use teloxide::prelude::*;

use super::handlers::{schema, HandlerDeps, HandlerError};

/// Dispatcher over the bot's handler tree
///
/// Every update runs in its own task, also for the same chat. Overlapping
/// turns of one learner are turned away by the engine's per-user locks.
pub fn build_dispatcher(bot: Bot, deps: HandlerDeps) -> DispatcherBuilder<Bot, HandlerError, Infallible> {
    Dispatcher::builder(bot, schema(deps))
        .distribution_function(|_| None::<Infallible>)
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
}
