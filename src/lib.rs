//! Lernbot - Telegram course bot for educational videos
//!
//! Learners take a placement test, watch the videos of their level one by one
//! and answer a question after each of them. Answers are discussed by a Mistral
//! model; course content, learner progress and the message log live in Airtable.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, retry and user-facing texts
//! - `storage`: Airtable store, caching repository and an in-memory store
//! - `ai`: Mistral client, prompts and answer assessment
//! - `conversation`: The course state machine and per-user context
//! - `telegram`: Telegram bot integration and handlers

pub mod ai;
pub mod cli;
pub mod conversation;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Config};
pub use conversation::Engine;
pub use storage::{AirtableStore, Repository, Store};
