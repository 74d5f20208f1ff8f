pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers::{handle_login, handle_me, handle_signup, handle_update_profile};
use crate::interview::ws::handle_audio_ws;
use crate::reports::handlers::{handle_interview_history, handle_save_interview};
use crate::resume::handlers::handle_parse_pdf;
use crate::state::AppState;
use crate::video::ws::handle_video_ws;

/// Interview server: audio socket, resume upload, accounts and report storage.
pub fn build_interview_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ws/audio", get(handle_audio_ws))
        .route("/parse-pdf", post(handle_parse_pdf))
        .route("/api/auth/signup", post(handle_signup))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/me", get(handle_me))
        .route("/api/auth/update", put(handle_update_profile))
        .route("/api/interviews/save", post(handle_save_interview))
        .route(
            "/api/interviews/history/:user_id",
            get(handle_interview_history),
        )
        .with_state(state)
}

/// Video server: body-language socket.
pub fn build_video_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ws", get(handle_video_ws))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::audio::transcribe::DisabledTranscriber;
    use crate::config::Config;
    use crate::interview::session::test_support::ScriptedModel;
    use crate::interview::webhook::QuestionNotifier;
    use crate::video::detector::NoopPoseDetector;

    /// State with a lazily connected pool: handlers that never reach the
    /// database can be exercised without one.
    pub fn test_state_with(model: Arc<ScriptedModel>) -> AppState {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState {
            db,
            config,
            model,
            transcriber: Arc::new(DisabledTranscriber),
            pose_detector: Arc::new(NoopPoseDetector),
            voice_model: None,
            notifier: QuestionNotifier::disabled(),
        }
    }

    pub fn test_state() -> AppState {
        test_state_with(Arc::new(ScriptedModel::new(&["Rust"])))
    }

    /// Serves `router` on an ephemeral local port for socket tests.
    pub async fn spawn_server(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }
}
