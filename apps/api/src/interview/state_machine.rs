//! Adaptive questioning state machine.
//!
//! Tracks the topic under examination, its difficulty (1–3), the
//! correctness streak inside the topic, and the per-topic point totals.
//! Pure and synchronous: the session drives it with graded answers.

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 3;
pub const START_DIFFICULTY: u8 = 2;

/// A topic is closed after this many correct answers...
pub const CORRECT_ANSWERS_PER_TOPIC: u32 = 3;
/// ...or after this many questions, whichever comes first.
pub const MAX_QUESTIONS_PER_TOPIC: u32 = 5;

const BASE_POINTS: u32 = 30;
const POINTS_PER_DIFFICULTY: u32 = 2;

/// Topics appended when topic extraction produced one topic or fewer.
pub const DEFAULT_EXTRA_TOPICS: [&str; 3] = ["System Design", "Problem Solving", "Communication"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Continue,
    SwitchedTopic,
}

#[derive(Debug, Clone)]
pub struct AdaptiveInterview {
    topics: Vec<String>,
    topic_index: usize,
    difficulty: u8,
    questions_in_topic: u32,
    correct_in_topic: u32,
    current_topic_score: u32,
    skill_scores: Vec<u32>,
}

impl AdaptiveInterview {
    pub fn new(topics: Vec<String>) -> Self {
        Self {
            topics,
            topic_index: 0,
            difficulty: START_DIFFICULTY,
            questions_in_topic: 0,
            correct_in_topic: 0,
            current_topic_score: 0,
            skill_scores: Vec::new(),
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn current_topic(&self) -> Option<&str> {
        self.topics.get(self.topic_index).map(String::as_str)
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    pub fn questions_in_topic(&self) -> u32 {
        self.questions_in_topic
    }

    pub fn correct_in_topic(&self) -> u32 {
        self.correct_in_topic
    }

    pub fn current_topic_score(&self) -> u32 {
        self.current_topic_score
    }

    pub fn skill_scores(&self) -> &[u32] {
        &self.skill_scores
    }

    pub fn is_complete(&self) -> bool {
        self.topic_index >= self.topics.len()
    }

    /// Pads a thin topic list so an interview always has some breadth.
    pub fn ensure_minimum_topics(&mut self) {
        if self.topics.len() <= 1 {
            self.topics
                .extend(DEFAULT_EXTRA_TOPICS.iter().map(|t| t.to_string()));
        }
    }

    /// Applies a graded answer to the current topic.
    ///
    /// Points are awarded at the difficulty the question was asked at,
    /// then difficulty steps up on a correct answer and down on a wrong one.
    pub fn record_answer(&mut self, is_correct: bool) -> AnswerOutcome {
        self.questions_in_topic += 1;

        if is_correct {
            let points = BASE_POINTS + POINTS_PER_DIFFICULTY * u32::from(self.difficulty);
            self.current_topic_score += points;
            self.correct_in_topic += 1;
            self.difficulty = (self.difficulty + 1).min(MAX_DIFFICULTY);
            tracing::debug!(points, difficulty = self.difficulty, "Correct answer");
        } else {
            self.difficulty = self.difficulty.saturating_sub(1).max(MIN_DIFFICULTY);
            tracing::debug!(difficulty = self.difficulty, "Wrong answer");
        }

        if self.correct_in_topic >= CORRECT_ANSWERS_PER_TOPIC
            || self.questions_in_topic >= MAX_QUESTIONS_PER_TOPIC
        {
            self.advance_topic();
            return AnswerOutcome::SwitchedTopic;
        }

        AnswerOutcome::Continue
    }

    /// Locks the current topic's score and moves on.
    pub fn advance_topic(&mut self) {
        tracing::info!(
            topic = self.current_topic().unwrap_or("<none>"),
            score = self.current_topic_score,
            "Section score locked"
        );
        self.skill_scores.push(self.current_topic_score);
        self.topic_index += 1;
        self.reset_topic_counters();
    }

    /// Moves on without locking a score for the abandoned topic.
    pub fn skip_topic(&mut self) {
        self.topic_index += 1;
        self.reset_topic_counters();
    }

    /// Mean of the locked per-topic scores.
    pub fn final_score(&self) -> Option<f64> {
        if self.skill_scores.is_empty() {
            return None;
        }
        let total: u32 = self.skill_scores.iter().sum();
        Some(f64::from(total) / self.skill_scores.len() as f64)
    }

    fn reset_topic_counters(&mut self) {
        self.current_topic_score = 0;
        self.questions_in_topic = 0;
        self.correct_in_topic = 0;
        self.difficulty = START_DIFFICULTY;
    }
}
