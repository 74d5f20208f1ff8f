use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::resume::extract_resume_text;

#[derive(Debug, Serialize)]
pub struct ParsePdfResponse {
    pub status: &'static str,
    pub text: String,
}

/// POST /parse-pdf
///
/// Multipart upload with the PDF in the `file` field. A file that cannot be
/// parsed is reported in the body (`status: "error"`) so the client can fall
/// back to a manual resume.
pub async fn handle_parse_pdf(mut multipart: Multipart) -> Result<Json<ParsePdfResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        info!("PDF upload received: {filename} ({} bytes)", data.len());

        return Ok(Json(match extract_resume_text(data.to_vec()).await {
            Ok(text) => ParsePdfResponse {
                status: "success",
                text,
            },
            Err(e) => {
                warn!("PDF parse error: {e}");
                ParsePdfResponse {
                    status: "error",
                    text: "Could not parse PDF".to_string(),
                }
            }
        }));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}
