mod audio;
mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod reports;
mod resume;
mod routes;
mod state;
mod video;

use anyhow::Result;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::audio::transcribe::{DisabledTranscriber, HttpTranscriber, Transcriber};
use crate::audio::voice::VoiceConfidenceModel;
use crate::config::Config;
use crate::db::create_pool;
use crate::interview::model::GeminiInterviewModel;
use crate::interview::webhook::QuestionNotifier;
use crate::llm_client::LlmClient;
use crate::routes::{build_interview_router, build_video_router};
use crate::state::AppState;
use crate::video::detector::{HttpPoseDetector, NoopPoseDetector, PoseDetector};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview Coach v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // One LLM client per role so each can use its own key
    let model = Arc::new(GeminiInterviewModel::new(
        LlmClient::new(config.gemini_key_topics.clone())?,
        LlmClient::new(config.gemini_key_asker.clone())?,
        LlmClient::new(config.gemini_key_grader.clone())?,
    ));
    info!("LLM clients initialized (model: {})", llm_client::MODEL);

    // Shared client for speech-to-text, pose detection and the question webhook
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let transcriber: Arc<dyn Transcriber> = match &config.stt_url {
        Some(url) => {
            info!("Speech-to-text: {url} ({})", config.stt_model);
            Arc::new(HttpTranscriber::new(
                http.clone(),
                url.clone(),
                config.stt_api_key.clone(),
                config.stt_model.clone(),
            ))
        }
        None => {
            warn!("STT_URL not set; every answer will be graded as a placeholder");
            Arc::new(DisabledTranscriber)
        }
    };

    let pose_detector: Arc<dyn PoseDetector> = match &config.pose_detector_url {
        Some(url) => {
            info!("Pose detector: {url}");
            Arc::new(HttpPoseDetector::new(http.clone(), url.clone()))
        }
        None => {
            info!("POSE_DETECTOR_URL not set; video frames need client-side landmarks");
            Arc::new(NoopPoseDetector)
        }
    };

    // A missing or broken voice model only disables the live voice feed
    let voice_model = match &config.voice_model_path {
        Some(path) => match VoiceConfidenceModel::load(path) {
            Ok(model) => {
                info!("Voice confidence model loaded from {path}");
                Some(Arc::new(model))
            }
            Err(e) => {
                warn!("Voice confidence model unavailable: {e:#}");
                None
            }
        },
        None => None,
    };

    let notifier = QuestionNotifier::new(http, config.question_webhook_url.clone());
    if notifier.is_enabled() {
        info!("Question webhook enabled");
    }

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        model,
        transcriber,
        pose_detector,
        voice_model,
        notifier,
    };

    // Build routers
    let interview_app = build_interview_router(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let video_app = build_video_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let interview_addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let video_addr: SocketAddr = format!("0.0.0.0:{}", config.video_port).parse()?;

    let interview_listener = tokio::net::TcpListener::bind(interview_addr).await?;
    let video_listener = tokio::net::TcpListener::bind(video_addr).await?;
    info!("Interview server listening on {interview_addr}");
    info!("Video server listening on {video_addr}");

    tokio::try_join!(
        axum::serve(interview_listener, interview_app).into_future(),
        axum::serve(video_listener, video_app).into_future(),
    )?;

    Ok(())
}
