//! Keyboards attached to course messages

use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::conversation::{CallbackAction, Markup, OverviewButton};
use crate::core::messages;

/// Inline "ready" button shown after the placement test
pub fn ready_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        messages::READY_BUTTON,
        CallbackAction::ReadyForVideo.to_data(),
    )]])
}

/// Reply keyboard offered while discussing a video
pub fn next_video_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(messages::UNDERSTOOD_BUTTON)],
        vec![KeyboardButton::new(messages::OVERVIEW_BUTTON)],
    ])
    .resize_keyboard()
    .one_time_keyboard()
}

/// One row per selectable video
pub fn overview_keyboard(buttons: &[OverviewButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        buttons
            .iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.text.clone(), b.callback.to_data())]),
    )
}

pub fn reply_markup(markup: &Markup) -> Option<ReplyMarkup> {
    match markup {
        Markup::None => None,
        Markup::Ready => Some(ready_keyboard().into()),
        Markup::NextVideo => Some(next_video_keyboard().into()),
        Markup::Overview(buttons) if buttons.is_empty() => None,
        Markup::Overview(buttons) => Some(overview_keyboard(buttons).into()),
    }
}
