//! Speech-to-text seam. The recognizer itself is an external service.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;

/// Buffers smaller than this cannot hold a decodable recording.
pub const MIN_AUDIO_BYTES: usize = 100;

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Returns `None` when nothing intelligible was recognized.
    async fn transcribe(&self, audio: Bytes) -> Result<Option<String>, AppError>;
}

/// Posts the recorded answer (browser WebM/Opus) to an OpenAI-compatible
/// `/v1/audio/transcriptions` endpoint. Container decoding happens remotely.
pub struct HttpTranscriber {
    client: Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl HttpTranscriber {
    pub fn new(client: Client, url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, audio: Bytes) -> Result<Option<String>, AppError> {
        if audio.len() < MIN_AUDIO_BYTES {
            return Ok(None);
        }

        let file = Part::bytes(audio.to_vec())
            .file_name("answer.webm")
            .mime_str("audio/webm")
            .map_err(|e| AppError::Upstream(format!("Invalid audio part: {e}")))?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", file);

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Transcription request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Transcription service returned {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid transcription response: {e}")))?;
        debug!("Transcribed {} bytes of audio", audio.len());

        let text = parsed.text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

/// Used when no recognizer is configured: every answer is "not heard".
pub struct DisabledTranscriber;

#[async_trait]
impl Transcriber for DisabledTranscriber {
    async fn transcribe(&self, _audio: Bytes) -> Result<Option<String>, AppError> {
        Ok(None)
    }
}
