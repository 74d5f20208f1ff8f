//! GET /ws: the live body-language socket.
//!
//! Each text frame is a JPEG (raw base64 or a `data:` URL), a JSON
//! `{"landmarks": ...}` from browser-side detection, or `"STOP"`.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::state::AppState;
use crate::video::landmarks::{FrameMetrics, PoseLandmarks};
use crate::video::tracker::{BodyLanguageScores, BodyLanguageTracker, WireScores};

const STOP: &str = "STOP";
const DATA_URL_MARKER: &str = "base64,";
const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

#[derive(Debug, Deserialize)]
struct LandmarksMessage {
    #[serde(default)]
    landmarks: Option<PoseLandmarks>,
}

#[derive(Debug, PartialEq)]
enum VideoInbound {
    Stop,
    Jpeg(Bytes),
    Landmarks(Option<PoseLandmarks>),
    Invalid,
}

pub async fn handle_video_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_video_session(socket, state))
}

async fn run_video_session(mut socket: WebSocket, state: AppState) {
    info!("Video client connected");
    let mut tracker = BodyLanguageTracker::new(state.config.video_window_frames);

    while let Some(message) = socket.recv().await {
        let inbound = match message {
            Ok(Message::Text(text)) => parse_frame(&text),
            Ok(Message::Binary(data)) => parse_jpeg(data.into()),
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let landmarks = match inbound {
            VideoInbound::Stop => {
                info!(
                    "End of interview, reporting {} updates",
                    tracker.history_len()
                );
                let report = final_report_message(tracker.final_report());
                if send_json(&mut socket, report).await.is_ok() {
                    let _ = socket.send(Message::Close(None)).await;
                }
                break;
            }
            VideoInbound::Invalid => continue,
            VideoInbound::Landmarks(landmarks) => landmarks,
            VideoInbound::Jpeg(jpeg) => match state.pose_detector.detect(jpeg).await {
                Ok(landmarks) => landmarks,
                Err(e) => {
                    warn!("Pose detection failed: {e}");
                    None
                }
            },
        };

        let scores = landmarks.and_then(|l| tracker.push(&FrameMetrics::from_landmarks(&l)));
        if send_json(&mut socket, realtime_message(scores)).await.is_err() {
            break;
        }
    }

    info!("Video client disconnected");
}

fn parse_frame(text: &str) -> VideoInbound {
    let trimmed = text.trim();
    if trimmed == STOP {
        return VideoInbound::Stop;
    }
    if trimmed.starts_with('{') {
        return match serde_json::from_str::<LandmarksMessage>(trimmed) {
            Ok(message) => VideoInbound::Landmarks(message.landmarks),
            Err(e) => {
                debug!("Skipping malformed landmarks message: {e}");
                VideoInbound::Invalid
            }
        };
    }

    let encoded = match trimmed.split_once(DATA_URL_MARKER) {
        Some((_, payload)) => payload,
        None => trimmed,
    };
    match BASE64.decode(encoded) {
        Ok(data) => parse_jpeg(Bytes::from(data)),
        Err(_) => VideoInbound::Invalid,
    }
}

fn parse_jpeg(data: Bytes) -> VideoInbound {
    if data.starts_with(&JPEG_MAGIC) {
        VideoInbound::Jpeg(data)
    } else {
        VideoInbound::Invalid
    }
}

async fn send_json(socket: &mut WebSocket, value: Value) -> Result<(), axum::Error> {
    socket.send(Message::Text(value.to_string())).await
}

/// All zeros until the tracker has enough frames.
fn realtime_message(scores: Option<BodyLanguageScores>) -> Value {
    let WireScores {
        attention,
        stability,
        smoothness,
        confidence,
    } = scores.map(|s| s.to_wire()).unwrap_or_default();
    json!({
        "type": "realtime",
        "attention": attention,
        "stability": stability,
        "smoothness": smoothness,
        "confidence": confidence,
    })
}

fn final_report_message(report: Option<BodyLanguageScores>) -> Value {
    match report {
        Some(scores) => {
            let wire = scores.to_wire();
            json!({
                "type": "final_report",
                "attention": wire.attention,
                "stability": wire.stability,
                "smoothness": wire.smoothness,
                "confidence": wire.confidence,
            })
        }
        None => json!({ "type": "final_report" }),
    }
}
