//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod helpers;

#[allow(unused_imports)]
pub use fixtures::{catalog, learner, video};
#[allow(unused_imports)]
pub use helpers::{Event, RecordingOutbox, ScriptedModel, TestCourse};
