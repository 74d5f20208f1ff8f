//! Interview model: the language-model side of the interview.
//!
//! Three operations: pick the topic from a resume, ask a question for a
//! topic at a difficulty, grade a transcribed answer.
//!
//! `AppState` holds an `Arc<dyn InterviewModel>`. The default backend is
//! `GeminiInterviewModel`; tests swap in a scripted model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::AppError;
use crate::interview::prompts::{
    GRADE_PROMPT, GRADE_SYSTEM, QUESTION_PROMPT, QUESTION_SYSTEM, TOPIC_PICK_PROMPT,
    TOPIC_PICK_SYSTEM,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SPOKEN_OUTPUT_INSTRUCTION};
use crate::llm_client::LlmClient;

/// Only the head of a resume is sent for topic extraction.
pub const RESUME_PROMPT_CHARS: usize = 2000;

/// Everything the question generator needs for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionContext {
    pub job_description: String,
    pub topic: String,
    pub difficulty: u8,
    /// 1-based index of the question within the current topic.
    pub question_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerGrade {
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TopicList {
    #[serde(default)]
    topics: Vec<String>,
}

#[async_trait]
pub trait InterviewModel: Send + Sync {
    async fn pick_topics(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<Vec<String>, AppError>;

    async fn ask_question(&self, ctx: &QuestionContext) -> Result<String, AppError>;

    async fn grade_answer(&self, question: &str, answer: &str) -> Result<AnswerGrade, AppError>;
}

/// Gemini-backed interview model. One client per role so each role can
/// run on its own API key and quota.
pub struct GeminiInterviewModel {
    topics: LlmClient,
    asker: LlmClient,
    grader: LlmClient,
}

impl GeminiInterviewModel {
    pub fn new(topics: LlmClient, asker: LlmClient, grader: LlmClient) -> Self {
        Self {
            topics,
            asker,
            grader,
        }
    }
}

#[async_trait]
impl InterviewModel for GeminiInterviewModel {
    async fn pick_topics(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<Vec<String>, AppError> {
        let prompt = TOPIC_PICK_PROMPT
            .replace("{resume_text}", truncate_chars(resume_text, RESUME_PROMPT_CHARS))
            .replace("{job_description}", job_description);
        let system = format!("{TOPIC_PICK_SYSTEM} {JSON_ONLY_SYSTEM}");
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "topics": {
                    "type": "ARRAY",
                    "description": "List of 1 technical topic.",
                    "items": {"type": "STRING"}
                }
            },
            "required": ["topics"]
        });

        let list: TopicList = self
            .topics
            .call_json(&prompt, &system, &schema)
            .await
            .map_err(|e| AppError::Llm(format!("Topic extraction failed: {e}")))?;
        Ok(list.topics)
    }

    async fn ask_question(&self, ctx: &QuestionContext) -> Result<String, AppError> {
        let prompt = QUESTION_PROMPT
            .replace("{job_description}", &ctx.job_description)
            .replace("{topic}", &ctx.topic)
            .replace("{difficulty}", &ctx.difficulty.to_string())
            .replace("{question_number}", &ctx.question_number.to_string());
        let system = format!("{QUESTION_SYSTEM} {SPOKEN_OUTPUT_INSTRUCTION}");

        self.asker
            .call_text(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))
    }

    async fn grade_answer(&self, question: &str, answer: &str) -> Result<AnswerGrade, AppError> {
        let prompt = GRADE_PROMPT
            .replace("{question}", question)
            .replace("{answer}", answer);
        let system = format!("{GRADE_SYSTEM} {JSON_ONLY_SYSTEM}");
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "is_correct": {"type": "BOOLEAN", "description": "True if correct"},
                "feedback": {"type": "STRING", "description": "Reason"}
            },
            "required": ["is_correct", "feedback"]
        });

        self.grader
            .call_json(&prompt, &system, &schema)
            .await
            .map_err(|e| AppError::Llm(format!("Answer grading failed: {e}")))
    }
}

/// Truncates on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
