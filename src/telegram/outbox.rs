//! Delivers conversation replies to a Telegram chat

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ParseMode};

use crate::conversation::{Outbox, Reply};
use crate::core::error::AppResult;
use crate::core::messages;
use crate::telegram::keyboards;

/// Outbox bound to one chat, and to the button press that started the turn if any
pub struct TelegramOutbox {
    bot: Bot,
    chat_id: ChatId,
    callback_id: Option<CallbackQueryId>,
}

impl TelegramOutbox {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            callback_id: None,
        }
    }

    pub fn for_callback(bot: Bot, chat_id: ChatId, callback_id: CallbackQueryId) -> Self {
        Self {
            bot,
            chat_id,
            callback_id: Some(callback_id),
        }
    }

    async fn deliver(&self, reply: &Reply) -> Result<(), teloxide::RequestError> {
        let mut request = self.bot.send_message(self.chat_id, reply.text.as_str());
        if reply.markdown {
            request = request.parse_mode(ParseMode::Markdown);
        }
        if let Some(markup) = keyboards::reply_markup(&reply.markup) {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }
}

#[async_trait]
impl Outbox for TelegramOutbox {
    /// A failed send is answered with a single plain apology; the turn goes on
    async fn send(&self, reply: Reply) -> AppResult<()> {
        if let Err(e) = self.deliver(&reply).await {
            tracing::error!(chat_id = self.chat_id.0, error = %e, "failed to send message");
            self.bot
                .send_message(self.chat_id, messages::GENERAL_ERROR)
                .await?;
        }
        Ok(())
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn answer_callback(&self, text: &str) -> AppResult<()> {
        if let Some(id) = &self.callback_id {
            self.bot.answer_callback_query(id.clone()).text(text).await?;
        }
        Ok(())
    }
}
