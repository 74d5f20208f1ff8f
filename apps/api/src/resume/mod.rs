// Resume ingestion: PDF text extraction for topic selection.
// pdf-extract is synchronous and CPU-bound, so it runs on the blocking pool.

pub mod handlers;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::errors::AppError;

pub async fn extract_resume_text(pdf: Vec<u8>) -> Result<String, AppError> {
    if pdf.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    let size = pdf.len();

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in PDF extraction: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not parse PDF: {e}")))?;

    debug!("Extracted {} chars from {size} byte PDF", text.len());
    Ok(text.trim().to_string())
}

/// Reads a resume from disk, used when a client starts an interview without one.
pub async fn load_resume_file(path: &str) -> Result<String, AppError> {
    let pdf = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Failed to read resume {path}: {e}")))?;
    let text = extract_resume_text(pdf).await?;
    info!("Loaded fallback resume from {path}");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let result = extract_resume_text(Vec::new()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected() {
        let result = extract_resume_text(b"definitely not a pdf".to_vec()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_fallback_file_is_an_error() {
        let result = load_resume_file("/nonexistent/resume.pdf").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
