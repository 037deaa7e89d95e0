//! The course state machine
//!
//! One call to [`Engine::handle`] is one turn: the learner's input is routed by
//! the stored [`UserState`], replies go to the [`Outbox`] and the new state is
//! written back through the [`Repository`].

use std::sync::Arc;

use super::context::{ConversationStore, ReviewSession};
use super::locks::SessionLocks;
use super::overview::{CourseOverview, build_overview};
use super::progression;
use super::reply::{CallbackAction, Incoming, Markup, Outbox, Reply};
use crate::ai::Assessor;
use crate::core::config::{self, CourseSettings};
use crate::core::error::AppResult;
use crate::core::messages;
use crate::core::types::{NewUser, Role, User, UserLevel, UserState, Video};
use crate::storage::{CacheStats, Repository, TtlCache};

pub struct Engine {
    repo: Arc<Repository>,
    assessor: Assessor,
    conversations: ConversationStore,
    locks: SessionLocks,
    overviews: TtlCache<(Option<UserLevel>, u32), CourseOverview>,
    course: CourseSettings,
}

impl Engine {
    pub fn new(repo: Arc<Repository>, assessor: Assessor, course: CourseSettings) -> Self {
        Self {
            repo,
            assessor,
            conversations: ConversationStore::new(),
            locks: SessionLocks::new(),
            overviews: TtlCache::new("overviews", config::cache::overview_ttl()),
            course,
        }
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repo
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub async fn cache_stats(&self) -> Vec<(&'static str, CacheStats)> {
        let mut stats = self.repo.cache_stats().await;
        stats.push((self.overviews.name(), self.overviews.stats().await));
        stats
    }

    /// Runs one turn for `user_id`
    ///
    /// Turns of the same user never overlap: input arriving while a turn is
    /// still running is answered with a "please wait" notice. Store failures
    /// end the turn with a generic apology.
    ///
    /// # Errors
    /// Only fails when not even the apology could be delivered.
    pub async fn handle(&self, user_id: i64, incoming: Incoming, outbox: &dyn Outbox) -> AppResult<()> {
        let Some(_turn) = self.locks.try_acquire(user_id) else {
            tracing::info!(user_id, "turn rejected, previous turn still running");
            return match incoming {
                Incoming::Callback(_) => outbox.answer_callback(messages::VIDEO_PROCESSING).await,
                _ => outbox.send(Reply::text(messages::VIDEO_PROCESSING)).await,
            };
        };

        let result = match incoming {
            Incoming::Start => self.start(user_id, outbox).await,
            Incoming::Text(text) => self.on_text(user_id, &text, outbox).await,
            Incoming::Callback(action) => self.on_callback(user_id, action, outbox).await,
        };

        if let Err(e) = result {
            tracing::error!(user_id, error = %e, "turn failed");
            outbox.send(Reply::text(messages::GENERAL_ERROR)).await?;
        }
        Ok(())
    }

    async fn start(&self, user_id: i64, outbox: &dyn Outbox) -> AppResult<()> {
        if self.repo.user(user_id).await?.is_some() {
            self.repo
                .record_message(messages::ALREADY_REGISTERED, Role::Bot, None)
                .await;
            return outbox.send(Reply::text(messages::ALREADY_REGISTERED)).await;
        }

        // stale in-memory data from a user deleted in the store
        self.conversations.cleanup_user(user_id);
        self.repo.invalidate_user(user_id).await;

        if let Err(e) = self.repo.create_user(NewUser::placement(user_id)).await {
            tracing::error!(user_id, error = %e, "failed to create user");
            return outbox.send(Reply::text(messages::USER_CREATION_ERROR)).await;
        }
        tracing::info!(user_id, action = "registered", "new user registered");

        let welcome = self.repo.welcome().await?;
        let parts = [
            (welcome.title, None),
            (welcome.description, Some(config::timing::welcome_description_delay())),
            (welcome.question, Some(config::timing::welcome_question_delay())),
        ];
        for (text, delay) in parts {
            if text.trim().is_empty() {
                continue;
            }
            if let Some(delay) = delay {
                outbox.pause(delay).await;
            }
            self.repo.record_message(&text, Role::Bot, None).await;
            outbox.send(Reply::text(text)).await?;
        }
        Ok(())
    }

    async fn on_text(&self, user_id: i64, text: &str, outbox: &dyn Outbox) -> AppResult<()> {
        let Some(user) = self.repo.user(user_id).await? else {
            return outbox.send(Reply::text(messages::START_BOT_FIRST)).await;
        };

        let navigable = user.state.is_some_and(|state| state.accepts_navigation());
        if navigable && text.trim() == messages::UNDERSTOOD_BUTTON {
            return self.understood(user, text, outbox).await;
        }
        if navigable && text.trim() == messages::OVERVIEW_BUTTON {
            return self.show_overview(user, text, outbox).await;
        }

        match user.state {
            Some(UserState::PlacementTest) => self.placement(user, text, outbox).await,
            Some(UserState::ShowingVideo) => outbox.send(Reply::text(messages::VIDEO_PROCESSING)).await,
            Some(UserState::WaitingForResponse | UserState::ChatMode) => self.discuss(user, text, outbox).await,
            Some(UserState::CourseOverview) => self.course_help(user_id, text, outbox).await,
            None => outbox.send(Reply::text(text)).await,
        }
    }

    async fn on_callback(&self, user_id: i64, action: CallbackAction, outbox: &dyn Outbox) -> AppResult<()> {
        let Some(user) = self.repo.user(user_id).await? else {
            return outbox.answer_callback(messages::USER_NOT_FOUND).await;
        };

        match action {
            CallbackAction::ReadyForVideo => {
                outbox.answer_callback(messages::VIDEO_LOADING).await?;
                let video = self.current_video(&user).await?;
                self.show_video(user, video, outbox).await
            }
            CallbackAction::NextVideo => self.advance(user, outbox, true).await,
            // a failed selection is reported on the button only
            CallbackAction::SelectVideo { video_id, review } => {
                if let Err(e) = self.select_video(user, &video_id, review, outbox).await {
                    tracing::error!(user_id, video_id = %video_id, error = %e, "video selection failed");
                    if let Err(e) = outbox.answer_callback(messages::VIDEO_LOAD_ERROR).await {
                        tracing::debug!(user_id, error = %e, "callback already answered");
                    }
                }
                Ok(())
            }
        }
    }

    async fn current_video(&self, user: &User) -> AppResult<Option<Video>> {
        match user.level {
            Some(level) => self.repo.video(level, user.video_number).await,
            None => Ok(None),
        }
    }

    /// Grades the placement answer against the welcome question and unlocks the first video
    async fn placement(&self, mut user: User, text: &str, outbox: &dyn Outbox) -> AppResult<()> {
        self.repo.record_message(text, Role::User, None).await;

        let welcome = self.repo.welcome().await?;
        let level = self.assessor.placement_level_or_random(&welcome.question, text).await;

        user.level = Some(level);
        user.video_number = 1;
        user.state = Some(UserState::ShowingVideo);
        self.repo.update_user(&user).await?;

        self.repo
            .record_message(messages::PLACEMENT_DONE, Role::Bot, None)
            .await;
        outbox
            .send(Reply::text(messages::PLACEMENT_DONE).with_markup(Markup::Ready))
            .await?;

        tracing::info!(
            user_id = user.telegram_id,
            action = "placement_test_completed",
            level = level.as_str(),
            "placement test completed"
        );
        Ok(())
    }

    /// Answers a learner talking about the current video
    async fn discuss(&self, mut user: User, text: &str, outbox: &dyn Outbox) -> AppResult<()> {
        let user_id = user.telegram_id;
        let waiting = user.state == Some(UserState::WaitingForResponse);

        match self.current_video(&user).await? {
            Some(video) => {
                self.conversations.get_or_create(user_id, &video);
                let message_id = self
                    .repo
                    .record_message(text, Role::User, Some(&video.record_id))
                    .await;
                self.conversations.add_user_message(user_id, text, message_id);

                let history = self.conversations.summary(user_id).unwrap_or_default();
                let history = Some(history.as_str()).filter(|h| !h.is_empty());
                let assessment = self
                    .assessor
                    .assess_video_response(&video.question, text, video.benchmark.as_deref(), history)
                    .await;

                let response = messages::feedback(&assessment.feedback);
                let response_id = self
                    .repo
                    .record_message(&response, Role::Bot, Some(&video.record_id))
                    .await;
                self.conversations
                    .add_assistant_message(user_id, &response, response_id);
                outbox
                    .send(Reply::text(response).with_markup(Markup::NextVideo))
                    .await?;

                tracing::info!(
                    user_id,
                    action = "video_response_assessed",
                    video = %video.title,
                    response_length = text.len(),
                    "answer discussed"
                );
            }
            None => {
                self.repo.record_message(text, Role::User, None).await;
                let response = if waiting {
                    messages::thanks_for_answer(text)
                } else {
                    messages::you_said(text)
                };
                self.repo.record_message(&response, Role::Bot, None).await;
                outbox
                    .send(Reply::text(response).with_markup(Markup::NextVideo))
                    .await?;
            }
        }

        if waiting {
            user.state = Some(UserState::ChatMode);
            self.repo.update_user(&user).await?;
        }
        Ok(())
    }

    async fn course_help(&self, user_id: i64, text: &str, outbox: &dyn Outbox) -> AppResult<()> {
        self.repo.record_message(text, Role::User, None).await;
        self.repo
            .record_message(messages::COURSE_HELP, Role::Bot, None)
            .await;
        outbox.send(Reply::text(messages::COURSE_HELP)).await?;
        tracing::info!(user_id, action = "course_overview_interaction", "course question answered");
        Ok(())
    }

    /// "Understood": ends a review session, or moves on to the next video
    async fn understood(&self, user: User, text: &str, outbox: &dyn Outbox) -> AppResult<()> {
        let user_id = user.telegram_id;
        let video = self.current_video(&user).await?;
        let video_id = video.as_ref().map(|v| v.record_id.as_str());

        if let Some(review) = self.conversations.review(user_id) {
            let mut restored = user;
            restored.level = review.original_level;
            restored.video_number = review.original_video_number;
            self.repo.update_user(&restored).await?;
            self.conversations.take_review(user_id);

            let level = review.original_level.map(|l| l.as_str()).unwrap_or_default();
            let response = messages::review_finished(level, review.original_video_number);
            self.repo.record_message(text, Role::User, video_id).await;
            self.repo.record_message(&response, Role::Bot, video_id).await;
            outbox
                .send(Reply::text(response).with_markup(Markup::NextVideo))
                .await?;

            tracing::info!(user_id, action = "review_finished", "review session finished");
            return Ok(());
        }

        self.repo.record_message(text, Role::User, video_id).await;
        self.repo
            .record_message(messages::NEXT_VIDEO_START, Role::Bot, video_id)
            .await;
        outbox.send(Reply::text(messages::NEXT_VIDEO_START)).await?;
        outbox.pause(config::timing::next_video_delay()).await;

        self.advance(user, outbox, false).await
    }

    /// Moves to the next video, promoting to the next level when the current one is finished
    async fn advance(&self, mut user: User, outbox: &dyn Outbox, from_callback: bool) -> AppResult<()> {
        let step = progression::advance(user.level, user.video_number, self.course.max_videos_per_level);

        if let (true, Some(level)) = (step.promoted, step.level) {
            outbox.send(Reply::text(messages::congratulations(level))).await?;
            tracing::info!(user_id = user.telegram_id, action = "level_up", level = level.as_str(), "level up");
        }

        user.level = step.level;
        user.video_number = step.video_number;
        user.state = Some(UserState::ShowingVideo);
        self.repo.update_user(&user).await?;

        let video = self.current_video(&user).await?;
        if let Some(video) = &video {
            self.conversations.reset_for_video(user.telegram_id, video);
        }

        if from_callback {
            outbox.answer_callback(messages::NEXT_VIDEO_LOADING).await?;
        }
        self.show_video(user, video, outbox).await
    }

    /// Jumps to a video picked in the course overview
    async fn select_video(&self, mut user: User, video_id: &str, review: bool, outbox: &dyn Outbox) -> AppResult<()> {
        let user_id = user.telegram_id;
        let Some(video) = self.repo.video_by_id(video_id).await? else {
            return outbox.answer_callback(messages::SELECTED_VIDEO_NOT_FOUND).await;
        };

        // a second review keeps the progress saved by the first one, and
        // without a known level there is no progress to return to
        if review && user.level.is_none() {
            tracing::warn!(user_id, "review requested without a known level, jumping instead");
        } else if review && !self.conversations.has_review(user_id) {
            self.conversations.start_review(
                user_id,
                ReviewSession {
                    original_level: user.level,
                    original_video_number: user.video_number,
                    review_video_id: video.record_id.clone(),
                },
            );
            tracing::info!(
                user_id,
                action = "review_started",
                video = %video.title,
                original_video_number = user.video_number,
                "review session started"
            );
        }

        match video.user_level() {
            Some(level) => user.level = Some(level),
            None => tracing::warn!(user_id, level = %video.level, "selected video has an unknown level"),
        }
        user.video_number = video.number;
        user.state = Some(UserState::ShowingVideo);
        self.repo.update_user(&user).await?;

        self.conversations.reset_for_video(user_id, &video);
        outbox
            .answer_callback(&messages::video_selected(&video.title, review))
            .await?;
        self.show_video(user, Some(video), outbox).await
    }

    /// Sends the video, waits, asks its question and waits for the answer
    async fn show_video(&self, mut user: User, video: Option<Video>, outbox: &dyn Outbox) -> AppResult<()> {
        let user_id = user.telegram_id;
        let Some(video) = video else {
            tracing::error!(
                user_id,
                level = ?user.level,
                video_number = user.video_number,
                "video not found"
            );
            return outbox.send(Reply::text(messages::VIDEO_NOT_FOUND)).await;
        };

        if video.has_link() {
            outbox
                .send(Reply::text(messages::video_intro(&video.title, &video.description)))
                .await?;
            outbox.pause(config::timing::video_link_delay()).await;
            outbox.send(Reply::text(messages::video_link(&video.url))).await?;
        } else {
            outbox.send(Reply::text(messages::video_title(&video.title))).await?;
        }

        outbox.pause(self.course.video_wait).await;
        outbox
            .send(Reply::text(messages::video_question(&video.question)))
            .await?;

        user.state = Some(UserState::WaitingForResponse);
        self.repo.update_user(&user).await?;

        tracing::info!(
            user_id,
            action = "video_shown",
            video = %video.title,
            level = %video.level,
            video_number = video.number,
            "video shown"
        );
        Ok(())
    }

    async fn show_overview(&self, mut user: User, text: &str, outbox: &dyn Outbox) -> AppResult<()> {
        let overview = self.overview(user.level, user.video_number).await?;

        self.repo.record_message(text, Role::User, None).await;
        self.repo.record_message(&overview.text, Role::Bot, None).await;

        user.state = Some(UserState::CourseOverview);
        self.repo.update_user(&user).await?;

        outbox
            .send(
                Reply::text(overview.text)
                    .markdown()
                    .with_markup(Markup::Overview(overview.buttons)),
            )
            .await
    }

    async fn overview(&self, level: Option<UserLevel>, video_number: u32) -> AppResult<CourseOverview> {
        let key = (level, video_number);
        if let Some(overview) = self.overviews.get(&key).await {
            return Ok(overview);
        }

        let videos = self.repo.all_videos().await?;
        let overview = build_overview(&videos, level, video_number);
        self.overviews.insert(key, overview.clone()).await;
        Ok(overview)
    }
}
