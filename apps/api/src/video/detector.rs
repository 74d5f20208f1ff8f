//! Pose-landmark detection seam. Detection itself runs in a pretrained model
//! outside this process.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use super::landmarks::PoseLandmarks;
use crate::errors::AppError;

#[async_trait]
pub trait PoseDetector: Send + Sync {
    /// Returns `None` when no person (or no face) is visible in the frame.
    async fn detect(&self, jpeg: Bytes) -> Result<Option<PoseLandmarks>, AppError>;
}

/// Sends each JPEG frame to a landmark sidecar that answers
/// `{"landmarks": PoseLandmarks | null}`.
pub struct HttpPoseDetector {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    #[serde(default)]
    landmarks: Option<PoseLandmarks>,
}

impl HttpPoseDetector {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl PoseDetector for HttpPoseDetector {
    async fn detect(&self, jpeg: Bytes) -> Result<Option<PoseLandmarks>, AppError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(jpeg)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Pose detector request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Pose detector returned {status}"
            )));
        }

        let parsed: DetectionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid pose detector response: {e}")))?;
        Ok(parsed.landmarks)
    }
}

/// Used when no detector is configured. Clients can still send landmarks.
pub struct NoopPoseDetector;

#[async_trait]
impl PoseDetector for NoopPoseDetector {
    async fn detect(&self, _jpeg: Bytes) -> Result<Option<PoseLandmarks>, AppError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_detector_sees_nobody() {
        let result = NoopPoseDetector
            .detect(Bytes::from_static(b"\xff\xd8\xff"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_null_landmarks_parse_as_none() {
        let parsed: DetectionResponse = serde_json::from_str(r#"{"landmarks": null}"#).unwrap();
        assert!(parsed.landmarks.is_none());
        let parsed: DetectionResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.landmarks.is_none());
    }
}
