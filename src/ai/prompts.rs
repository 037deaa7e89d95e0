//! Prompt texts sent to the model

pub const PLACEMENT_SYSTEM: &str = "You are a placement test evaluator. \
Given a question and a user's answer, respond with ONLY ONE WORD: \
\"Beginner\", \"Intermediate\", or \"Advanced\". \
Do not include any explanation or extra text.";

pub const VIDEO_ASSESSMENT_SYSTEM: &str = "You are an educational assistant AI. \
Help the user improve their understanding of the video content. \
Engage with the user answer in a short chat style. Stay positive and encouraging. \
Finish with a question to the user to deepen their understanding.";

pub const FALLBACK_FEEDBACK: &str =
    "Thank you for your response. We're having technical difficulties with assessment right now.";

pub fn placement_system(question: &str) -> String {
    format!("{} Question: {}", PLACEMENT_SYSTEM, question)
}

/// User prompt for discussing an answer to a video question
///
/// `context` is the understanding benchmark of the video, `history` the
/// rendered conversation summary. Both sections are left out when empty.
pub fn video_assessment_user(question: &str, answer: &str, context: Option<&str>, history: Option<&str>) -> String {
    let context_section = context
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("\nContext: {}", c))
        .unwrap_or_default();
    let conversation_section = history
        .filter(|h| !h.trim().is_empty())
        .map(|h| format!("\nPrevious conversation:\n{}", h))
        .unwrap_or_default();

    format!(
        "Question: {question}\n\
         User's Answer: {answer}\n\
         {context_section}\n\
         {conversation_section}\n\
         \n\
         Please provide a JSON response with the following structure:\n\
         {{\n    \"feedback\": \"<constructive feedback about their response>\"\n}}\n"
    )
}
