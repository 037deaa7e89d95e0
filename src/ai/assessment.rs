//! Placement test grading and feedback on answers to video questions

use std::sync::Arc;

use super::{ChatMessage, ChatRequest, LanguageModel, prompts};
use crate::core::config::models;
use crate::core::error::{AppError, AppResult};
use crate::core::types::{AssessmentResult, UserLevel};

/// Turns model completions into course decisions
pub struct Assessor {
    model: Arc<dyn LanguageModel>,
}

impl Assessor {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// Asks the model to place the learner based on one answer
    ///
    /// # Errors
    /// Fails when the model is unreachable or answers anything but a placement level.
    pub async fn placement_level(&self, question: &str, answer: &str) -> AppResult<UserLevel> {
        let request = ChatRequest {
            model: models::PLACEMENT_MODEL.to_string(),
            messages: vec![
                ChatMessage::system(prompts::placement_system(question)),
                ChatMessage::user(answer),
            ],
            max_tokens: models::PLACEMENT_MAX_TOKENS,
            temperature: models::PLACEMENT_TEMPERATURE,
        };

        let completion = self.model.complete(request).await?;
        let level = parse_placement(&completion)?;
        tracing::info!(
            event = "placement_assessment_completed",
            level = level.as_str(),
            answer_length = answer.len(),
            "placement assessed"
        );
        Ok(level)
    }

    /// Like [`Assessor::placement_level`], but picks a random placement level on failure
    pub async fn placement_level_or_random(&self, question: &str, answer: &str) -> UserLevel {
        match self.placement_level(question, answer).await {
            Ok(level) => level,
            Err(e) => {
                let level = random_placement();
                tracing::warn!(error = %e, fallback = level.as_str(), "placement assessment failed, using random level");
                level
            }
        }
    }

    /// Discusses the learner's answer to a video question
    ///
    /// Never fails: model errors yield a fixed apology as feedback.
    pub async fn assess_video_response(
        &self,
        question: &str,
        answer: &str,
        benchmark: Option<&str>,
        history: Option<&str>,
    ) -> AssessmentResult {
        let request = ChatRequest {
            model: models::ASSESSMENT_MODEL.to_string(),
            messages: vec![
                ChatMessage::system(prompts::VIDEO_ASSESSMENT_SYSTEM),
                ChatMessage::user(prompts::video_assessment_user(question, answer, benchmark, history)),
            ],
            max_tokens: models::ASSESSMENT_MAX_TOKENS,
            temperature: models::ASSESSMENT_TEMPERATURE,
        };

        match self.model.complete(request).await {
            Ok(completion) => {
                tracing::debug!(
                    event = "video_assessment_completed",
                    has_context = benchmark.is_some(),
                    has_history = history.is_some_and(|h| !h.is_empty()),
                    "video answer assessed"
                );
                AssessmentResult::feedback(extract_feedback(&completion))
            }
            Err(e) => {
                tracing::error!(error = %e, answer_length = answer.len(), "video assessment failed");
                AssessmentResult::feedback(prompts::FALLBACK_FEEDBACK)
            }
        }
    }
}

/// Accepts exactly one of the placement levels, surrounding whitespace ignored
pub fn parse_placement(completion: &str) -> AppResult<UserLevel> {
    let trimmed = completion.trim();
    UserLevel::PLACEMENT
        .into_iter()
        .find(|level| level.as_str() == trimmed)
        .ok_or_else(|| AppError::Mistral(format!("unexpected placement group: {}", trimmed)))
}

fn random_placement() -> UserLevel {
    let index = rand::random::<u32>() as usize % UserLevel::PLACEMENT.len();
    UserLevel::PLACEMENT[index]
}

/// Removes a surrounding Markdown code fence (```json or ```)
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Takes the `feedback` field of a JSON answer, or the cleaned text itself
pub fn extract_feedback(completion: &str) -> String {
    let cleaned = strip_code_fence(completion);
    match serde_json::from_str::<serde_json::Value>(cleaned) {
        Ok(serde_json::Value::Object(obj)) => match obj.get("feedback") {
            Some(serde_json::Value::String(feedback)) => feedback.clone(),
            Some(other) => other.to_string(),
            None => cleaned.to_string(),
        },
        _ => cleaned.to_string(),
    }
}
