use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub user_id: String,
    pub duration_seconds: Option<i32>,
    pub confidence: Option<f64>,
    pub attention: Option<f64>,
    pub stability: Option<f64>,
    pub smoothness: Option<f64>,
    pub audio_confidence: Option<f64>,
    pub answer_quality: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Final scores of one interview as the client reports them. Any may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewScores {
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub attention: Option<f64>,
    #[serde(default)]
    pub stability: Option<f64>,
    #[serde(default)]
    pub smoothness: Option<f64>,
    #[serde(default)]
    pub audio_confidence: Option<f64>,
    #[serde(default)]
    pub answer_quality: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Option<i32>,
    pub scores: InterviewScores,
}

impl From<InterviewRow> for InterviewRecord {
    fn from(row: InterviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            timestamp: row.created_at,
            duration: row.duration_seconds,
            scores: InterviewScores {
                confidence: row.confidence,
                attention: row.attention,
                stability: row.stability,
                smoothness: row.smoothness,
                audio_confidence: row.audio_confidence,
                answer_quality: row.answer_quality,
            },
        }
    }
}
