//! Test doubles for the conversation engine

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use lernbot::ai::{Assessor, ChatRequest, LanguageModel};
use lernbot::conversation::{Engine, Outbox, Reply};
use lernbot::core::config::CourseSettings;
use lernbot::core::error::{AppError, AppResult};
use lernbot::core::types::User;
use lernbot::storage::{InMemoryStore, Repository, Store};

use super::fixtures::catalog;

/// Everything an outbox was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Sent(Reply),
    Pause(Duration),
    Callback(String),
}

/// Outbox that records instead of delivering; pauses return immediately
#[derive(Default)]
pub struct RecordingOutbox {
    events: Mutex<Vec<Event>>,
}

impl RecordingOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Sent(reply) => Some(reply),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.replies().into_iter().map(|r| r.text).collect()
    }

    pub fn callbacks(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Callback(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pause(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Outbox for RecordingOutbox {
    async fn send(&self, reply: Reply) -> AppResult<()> {
        self.push(Event::Sent(reply));
        Ok(())
    }

    async fn pause(&self, duration: Duration) {
        self.push(Event::Pause(duration));
    }

    async fn answer_callback(&self, text: &str) -> AppResult<()> {
        self.push(Event::Callback(text.to_string()));
        Ok(())
    }
}

/// Language model answering from a script; an exhausted script fails every call
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(AppError::Mistral("scripted failure".to_string())));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: ChatRequest) -> AppResult<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Mistral("script exhausted".to_string())))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Engine wired to an in-memory store and a scripted model
pub struct TestCourse {
    pub store: Arc<InMemoryStore>,
    pub model: Arc<ScriptedModel>,
    pub engine: Arc<Engine>,
}

impl TestCourse {
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::with_videos(catalog()))
    }

    pub fn with_store(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        let model = Arc::new(ScriptedModel::new());

        let dyn_store: Arc<dyn Store> = store.clone();
        let dyn_model: Arc<dyn LanguageModel> = model.clone();
        let course = CourseSettings {
            video_wait: Duration::from_secs(10),
            max_videos_per_level: 2,
        };
        let engine = Engine::new(Arc::new(Repository::new(dyn_store)), Assessor::new(dyn_model), course);

        Self {
            store,
            model,
            engine: Arc::new(engine),
        }
    }

    pub async fn user(&self, telegram_id: i64) -> Option<User> {
        self.store
            .users()
            .await
            .into_iter()
            .find(|u| u.telegram_id == telegram_id)
    }
}
