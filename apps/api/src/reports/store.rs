use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::{InterviewRow, InterviewScores};

pub struct NewInterview<'a> {
    pub user_id: &'a str,
    pub duration_seconds: Option<i32>,
    pub scores: &'a InterviewScores,
}

/// Inserts one interview report and returns its id.
pub async fn save_interview(pool: &PgPool, interview: NewInterview<'_>) -> Result<Uuid, AppError> {
    let NewInterview {
        user_id,
        duration_seconds,
        scores,
    } = interview;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO interviews
            (id, user_id, duration_seconds, confidence, attention, stability,
             smoothness, audio_confidence, answer_quality)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(duration_seconds)
    .bind(scores.confidence)
    .bind(scores.attention)
    .bind(scores.stability)
    .bind(scores.smoothness)
    .bind(scores.audio_confidence)
    .bind(scores.answer_quality)
    .execute(pool)
    .await?;

    info!("Saved interview {id} for user {user_id}");
    Ok(id)
}

/// All reports of a user, newest first.
pub async fn interview_history(pool: &PgPool, user_id: &str) -> Result<Vec<InterviewRow>, AppError> {
    let rows = sqlx::query_as::<_, InterviewRow>(
        r#"
        SELECT id, user_id, duration_seconds, confidence, attention, stability,
               smoothness, audio_confidence, answer_quality, created_at
        FROM interviews
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
