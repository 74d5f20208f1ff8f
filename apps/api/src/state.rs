use std::sync::Arc;

use sqlx::PgPool;

use crate::audio::transcribe::Transcriber;
use crate::audio::voice::VoiceConfidenceModel;
use crate::config::Config;
use crate::interview::model::InterviewModel;
use crate::interview::webhook::QuestionNotifier;
use crate::video::detector::PoseDetector;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Topic extraction, question generation and grading. Default: Gemini.
    pub model: Arc<dyn InterviewModel>,
    /// Speech-to-text for recorded answers. Disabled when STT_URL is unset.
    pub transcriber: Arc<dyn Transcriber>,
    /// Server-side landmark detection for video frames. Disabled when
    /// POSE_DETECTOR_URL is unset.
    pub pose_detector: Arc<dyn PoseDetector>,
    /// Loaded from VOICE_MODEL_PATH; live voice scores are skipped without it.
    pub voice_model: Option<Arc<VoiceConfidenceModel>>,
    pub notifier: QuestionNotifier,
}
