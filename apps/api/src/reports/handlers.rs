use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::interview::{InterviewRecord, InterviewScores};
use crate::reports::store::{interview_history, save_interview, NewInterview};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInterviewRequest {
    /// Optional; when present it must name the authenticated user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub scores: InterviewScores,
}

#[derive(Debug, Serialize)]
pub struct SaveInterviewResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/interviews/save
pub async fn handle_save_interview(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SaveInterviewRequest>,
) -> Result<(StatusCode, Json<SaveInterviewResponse>), AppError> {
    let user_id = auth.user_id.to_string();
    if let Some(claimed) = req.user_id.as_deref().map(str::trim) {
        if !claimed.is_empty() && claimed != user_id {
            return Err(AppError::Forbidden);
        }
    }
    let duration_seconds = req.duration.map(duration_seconds).transpose()?;

    save_interview(
        &state.db,
        NewInterview {
            user_id: &user_id,
            duration_seconds,
            scores: &req.scores,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveInterviewResponse {
            success: true,
            message: "Saved",
        }),
    ))
}

/// GET /api/interviews/history/:user_id
pub async fn handle_interview_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<InterviewRecord>>, AppError> {
    if user_id.trim() != auth.user_id.to_string() {
        return Err(AppError::Forbidden);
    }
    let rows = interview_history(&state.db, &user_id).await?;
    Ok(Json(rows.into_iter().map(InterviewRecord::from).collect()))
}

/// Seconds, rounded to the nearest whole second.
fn duration_seconds(raw: f64) -> Result<i32, AppError> {
    let rounded = raw.round();
    if !(0.0..=f64::from(i32::MAX)).contains(&rounded) {
        return Err(AppError::Validation(
            "duration must be a non-negative number of seconds".to_string(),
        ));
    }
    Ok(rounded as i32)
}
