//! Interview session: drives the state machine with the interview model.
//!
//! Flow per turn: next_question → (client answers) → submit_answer.
//! Every model failure has a deterministic fallback.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::model::{AnswerGrade, InterviewModel, QuestionContext};
use crate::interview::state_machine::{AdaptiveInterview, AnswerOutcome};
use crate::interview::text::normalize_answer;
use crate::interview::webhook::QuestionNotifier;

pub const FALLBACK_TOPIC: &str = "General Skills";
pub const DEFAULT_JOB_DESCRIPTION: &str = "Software Engineer";

const CORRECT_ANSWER_SCORE: u32 = 85;
const WRONG_ANSWER_SCORE: u32 = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextQuestion {
    Question(String),
    Finished,
}

#[derive(Debug, Clone)]
pub struct AnswerFeedback {
    pub transcription: String,
    pub used_placeholder: bool,
    pub grade: AnswerGrade,
    pub answer_score: u32,
    pub outcome: AnswerOutcome,
}

#[derive(Debug, Clone)]
pub struct InterviewSummary {
    pub skill_scores: Vec<u32>,
    pub final_score: Option<f64>,
}

pub struct InterviewSession {
    model: Arc<dyn InterviewModel>,
    notifier: QuestionNotifier,
    job_description: String,
    state: AdaptiveInterview,
    current_question: Option<String>,
}

impl InterviewSession {
    /// Extracts the interview topic from the resume and prepares the state machine.
    pub async fn start(
        model: Arc<dyn InterviewModel>,
        notifier: QuestionNotifier,
        resume_text: &str,
        job_description: &str,
    ) -> Self {
        let job_description = match job_description.trim() {
            "" => DEFAULT_JOB_DESCRIPTION.to_string(),
            jd => jd.to_string(),
        };

        let mut topics: Vec<String> = match model.pick_topics(resume_text, &job_description).await
        {
            Ok(topics) => topics
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .take(1)
                .collect(),
            Err(e) => {
                warn!("Topic extraction failed, using fallback: {e}");
                Vec::new()
            }
        };
        if topics.is_empty() {
            topics.push(FALLBACK_TOPIC.to_string());
        }
        info!("Topic locked: {:?}", topics);

        let mut state = AdaptiveInterview::new(topics);
        state.ensure_minimum_topics();

        Self {
            model,
            notifier,
            job_description,
            state,
            current_question: None,
        }
    }

    pub fn state(&self) -> &AdaptiveInterview {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Generates the next question, or reports that the interview is over.
    ///
    /// If the generator repeats the previous question verbatim the topic is
    /// abandoned and a generic transition question for the next topic is used.
    pub async fn next_question(&mut self) -> NextQuestion {
        let Some(topic) = self.state.current_topic().map(str::to_string) else {
            return NextQuestion::Finished;
        };

        let ctx = QuestionContext {
            job_description: self.job_description.clone(),
            topic: topic.clone(),
            difficulty: self.state.difficulty(),
            question_number: self.state.questions_in_topic() + 1,
        };

        let generated = match self.model.ask_question(&ctx).await {
            Ok(q) if !q.trim().is_empty() => q.trim().to_string(),
            Ok(_) => format!("Tell me about {topic}."),
            Err(e) => {
                warn!("Question generation failed, using fallback: {e}");
                format!("Tell me about {topic}.")
            }
        };

        let question = if self.current_question.as_deref() == Some(generated.as_str()) {
            warn!("Question generator repeated itself; moving to next topic");
            self.state.skip_topic();
            match self.state.current_topic() {
                Some(next) => {
                    format!("Let's move on. Please tell me about your experience with {next}.")
                }
                None => return NextQuestion::Finished,
            }
        } else {
            generated
        };

        self.notifier.notify(&question);
        self.current_question = Some(question.clone());
        NextQuestion::Question(question)
    }

    /// Grades a transcribed answer against the current question and
    /// advances the state machine.
    pub async fn submit_answer(
        &mut self,
        transcript: Option<&str>,
    ) -> Result<AnswerFeedback, AppError> {
        if self.state.is_complete() {
            return Err(AppError::Validation(
                "Interview is already complete".to_string(),
            ));
        }
        let question = self.current_question.clone().ok_or_else(|| {
            AppError::Validation("No question has been asked yet".to_string())
        })?;

        let (transcription, used_placeholder) = normalize_answer(transcript);
        if used_placeholder {
            warn!("Audio invalid or empty; grading placeholder answer");
        }
        info!("User said: {transcription}");

        let grade = match self.model.grade_answer(&question, &transcription).await {
            Ok(grade) => grade,
            Err(e) => {
                warn!("Grading failed, accepting answer: {e}");
                AnswerGrade {
                    is_correct: true,
                    feedback: "Grader unavailable; answer accepted.".to_string(),
                }
            }
        };

        let outcome = self.state.record_answer(grade.is_correct);
        let answer_score = if grade.is_correct {
            CORRECT_ANSWER_SCORE
        } else {
            WRONG_ANSWER_SCORE
        };

        Ok(AnswerFeedback {
            transcription,
            used_placeholder,
            grade,
            answer_score,
            outcome,
        })
    }

    pub fn summary(&self) -> InterviewSummary {
        InterviewSummary {
            skill_scores: self.state.skill_scores().to_vec(),
            final_score: self.state.final_score(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedModel;
    use super::*;
    use crate::interview::text::PLACEHOLDER_ANSWER;

    async fn start(model: ScriptedModel) -> (InterviewSession, Arc<ScriptedModel>) {
        let model = Arc::new(model);
        let session = InterviewSession::start(
            model.clone(),
            QuestionNotifier::disabled(),
            "Built services in Rust and Tokio",
            "",
        )
        .await;
        (session, model)
    }

    #[tokio::test]
    async fn test_start_pads_single_topic_and_defaults_job() {
        let (session, model) = start(ScriptedModel::new(&["Rust"]).with_questions(&["Q1?"])).await;
        assert_eq!(
            session.state().topics(),
            &["Rust", "System Design", "Problem Solving", "Communication"]
        );

        let mut session = session;
        session.next_question().await;
        let asked = model.asked.lock().unwrap();
        assert_eq!(asked[0].job_description, DEFAULT_JOB_DESCRIPTION);
        assert_eq!(asked[0].difficulty, 2);
        assert_eq!(asked[0].question_number, 1);
    }

    #[tokio::test]
    async fn test_start_keeps_only_first_topic() {
        let (session, _) = start(ScriptedModel::new(&["Rust", "Go", "SQL"])).await;
        assert_eq!(session.state().topics()[0], "Rust");
        assert_eq!(session.state().topics().len(), 4);
    }

    #[tokio::test]
    async fn test_start_falls_back_when_topic_extraction_fails() {
        let (session, _) = start(ScriptedModel::default()).await;
        assert_eq!(session.state().current_topic(), Some(FALLBACK_TOPIC));
    }

    #[tokio::test]
    async fn test_question_falls_back_on_model_error() {
        let (mut session, _) = start(ScriptedModel::new(&["Rust"])).await;
        assert_eq!(
            session.next_question().await,
            NextQuestion::Question("Tell me about Rust.".to_string())
        );
    }

    #[tokio::test]
    async fn test_repeated_question_skips_topic() {
        let model = ScriptedModel::new(&["Rust"])
            .with_questions(&["What is a lifetime?", "What is a lifetime?"])
            .with_grades(&[false]);
        let (mut session, _) = start(model).await;

        session.next_question().await;
        session.submit_answer(Some("It is a scope for references")).await.unwrap();

        let next = session.next_question().await;
        assert_eq!(
            next,
            NextQuestion::Question(
                "Let's move on. Please tell me about your experience with System Design."
                    .to_string()
            )
        );
        assert!(session.state().skill_scores().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_on_last_topic_finishes() {
        let model = ScriptedModel::new(&["Rust"]).with_questions(&["Q?", "Q?"]);
        let (mut session, _) = start(model).await;
        // Jump to the last of the four padded topics.
        for _ in 0..3 {
            session.state.skip_topic();
        }
        assert_eq!(session.state().current_topic(), Some("Communication"));
        session.next_question().await;
        assert_eq!(session.next_question().await, NextQuestion::Finished);
    }

    #[tokio::test]
    async fn test_submit_answer_scores_and_cleans_transcript() {
        let model = ScriptedModel::new(&["Rust"])
            .with_questions(&["What does the borrow checker do?"])
            .with_grades(&[true]);
        let (mut session, model) = start(model).await;
        session.next_question().await;

        let feedback = session
            .submit_answer(Some("It it enforces enforces aliasing rules"))
            .await
            .unwrap();
        assert_eq!(feedback.transcription, "It enforces aliasing rules");
        assert_eq!(feedback.answer_score, 85);
        assert_eq!(feedback.outcome, AnswerOutcome::Continue);
        assert_eq!(session.state().current_topic_score(), 34);

        let graded = model.graded.lock().unwrap();
        assert_eq!(graded[0].0, "What does the borrow checker do?");
    }

    #[tokio::test]
    async fn test_wrong_answer_scores_forty() {
        let model = ScriptedModel::new(&["Rust"])
            .with_questions(&["Q?"])
            .with_grades(&[false]);
        let (mut session, _) = start(model).await;
        session.next_question().await;
        let feedback = session.submit_answer(Some("No idea at all")).await.unwrap();
        assert_eq!(feedback.answer_score, 40);
        assert_eq!(session.state().difficulty(), 1);
    }

    #[tokio::test]
    async fn test_silence_grades_placeholder() {
        let model = ScriptedModel::new(&["Rust"])
            .with_questions(&["Q?"])
            .with_grades(&[true]);
        let (mut session, model) = start(model).await;
        session.next_question().await;
        let feedback = session.submit_answer(None).await.unwrap();
        assert!(feedback.used_placeholder);
        assert_eq!(model.graded.lock().unwrap()[0].1, PLACEHOLDER_ANSWER);
    }

    #[tokio::test]
    async fn test_grader_failure_accepts_answer() {
        let model = ScriptedModel::new(&["Rust"]).with_questions(&["Q?"]);
        let (mut session, _) = start(model).await;
        session.next_question().await;
        let feedback = session.submit_answer(Some("Some real answer")).await.unwrap();
        assert!(feedback.grade.is_correct);
        assert_eq!(feedback.answer_score, 85);
    }

    #[tokio::test]
    async fn test_submit_before_question_is_rejected() {
        let (mut session, _) = start(ScriptedModel::new(&["Rust"])).await;
        assert!(session.submit_answer(Some("An answer")).await.is_err());
    }

    #[tokio::test]
    async fn test_full_interview_runs_to_completion() {
        let questions: Vec<String> = (0..20).map(|n| format!("Question {n}?")).collect();
        let refs: Vec<&str> = questions.iter().map(String::as_str).collect();
        let model = ScriptedModel::new(&["Rust"])
            .with_questions(&refs)
            .with_grades(&[true; 12]);
        let (mut session, _) = start(model).await;

        let mut turns = 0;
        while let NextQuestion::Question(_) = session.next_question().await {
            session.submit_answer(Some("A correct answer")).await.unwrap();
            turns += 1;
        }

        // Four topics, three correct answers each.
        assert_eq!(turns, 12);
        assert!(session.is_complete());
        let summary = session.summary();
        assert_eq!(summary.skill_scores, vec![106; 4]);
        assert_eq!(summary.final_score, Some(106.0));
    }
}
