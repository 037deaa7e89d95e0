//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{learner_id, HandlerDeps, HandlerError};
use crate::conversation::{CallbackAction, Incoming};
use crate::telegram::bot::Command;
use crate::telegram::outbox::TelegramOutbox;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// # Arguments
/// * `deps` - Handler dependencies
///
/// # Returns
/// The complete handler tree for the bot
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler(deps.clone()))
        .branch(text_handler(deps.clone()))
        .branch(callback_handler(deps))
}

/// /start
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let Some(user_id) = msg.from.as_ref().and_then(learner_id) else {
                    return Ok(());
                };
                tracing::info!(user_id, command = ?cmd, "received command");

                let incoming = match cmd {
                    Command::Start => Incoming::Start,
                };
                let outbox = TelegramOutbox::new(bot, msg.chat.id);
                deps.engine.handle(user_id, incoming, &outbox).await?;
                Ok(())
            }
        },
    ))
}

/// Plain text, including the reply keyboard buttons
fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !text.starts_with('/')))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let (Some(user_id), Some(text)) = (msg.from.as_ref().and_then(learner_id), msg.text()) else {
                    return Ok(());
                };
                tracing::debug!(user_id, length = text.len(), "received text");

                let outbox = TelegramOutbox::new(bot, msg.chat.id);
                deps.engine
                    .handle(user_id, Incoming::Text(text.to_string()), &outbox)
                    .await?;
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let Some(user_id) = learner_id(&q.from) else {
                return Ok(());
            };
            let data = q.data.as_deref().unwrap_or_default();
            let Some(action) = CallbackAction::parse(data) else {
                tracing::warn!(user_id, data, "unknown callback data");
                bot.answer_callback_query(q.id.clone()).await?;
                return Ok(());
            };
            tracing::debug!(user_id, ?action, "received callback");

            // private chats share the user's id
            let chat_id = q
                .message
                .as_ref()
                .map(|m| m.chat().id)
                .unwrap_or(ChatId(user_id));
            let outbox = TelegramOutbox::for_callback(bot, chat_id, q.id.clone());
            deps.engine
                .handle(user_id, Incoming::Callback(action), &outbox)
                .await?;
            Ok(())
        }
    })
}
