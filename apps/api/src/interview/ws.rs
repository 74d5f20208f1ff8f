//! GET /ws/audio: the live interview socket.
//!
//! Protocol (all JSON text frames unless noted):
//! - client → `{"resumeText", "jobDescription"}` once, then
//!   `{"bytes": [..] | "<base64>"}` chunks (or binary frames),
//!   `{"text": "STOP_ANSWER"}` and `{"text": "STOP_SESSION"}`.
//! - server → `{"type":"question"}`, `{"type":"realtime_feed"}`,
//!   `{"user_transcription","scores"}` and finally `{"type":"end"}`.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio::buffer::AnswerBuffer;
use crate::audio::voice::VoiceMonitor;
use crate::audio::volume::{decode_chunk, pcm16_to_f32, volume_confidence};
use crate::errors::AppError;
use crate::interview::session::{AnswerFeedback, InterviewSession, InterviewSummary, NextQuestion};
use crate::interview::state_machine::AnswerOutcome;
use crate::resume::load_resume_file;
use crate::state::AppState;

const FEEDBACK_PAUSE: Duration = Duration::from_millis(500);
const CLOSE_GRACE: Duration = Duration::from_secs(1);
pub const END_TEXT: &str = "Interview Complete!";

#[derive(Debug, Error)]
enum SessionError {
    #[error("websocket error: {0}")]
    Socket(#[from] axum::Error),
    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct InitMessage {
    resume_text: String,
    job_description: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    Chunk(Vec<u8>),
    StopAnswer,
    StopSession,
    Ignored,
}

pub async fn handle_audio_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| run_audio_session(socket, state))
}

async fn run_audio_session(mut socket: WebSocket, state: AppState) {
    info!("Audio client connected");
    match drive_session(&mut socket, &state).await {
        Ok(()) => {
            let _ = socket.send(Message::Close(None)).await;
            info!("Audio session closed");
        }
        Err(e) => warn!("Audio session aborted: {e}"),
    }
}

async fn drive_session(socket: &mut WebSocket, state: &AppState) -> Result<(), SessionError> {
    let Some(init) = receive_init(socket).await? else {
        return Ok(());
    };

    let resume_text = resolve_resume_text(state, init.resume_text).await;
    let job_description = match init.job_description.trim() {
        "" => state.config.default_job_description.clone(),
        jd => jd.to_string(),
    };

    let mut session = InterviewSession::start(
        state.model.clone(),
        state.notifier.clone(),
        &resume_text,
        &job_description,
    )
    .await;

    match session.next_question().await {
        NextQuestion::Question(q) => send_json(socket, question_message(&q)).await?,
        NextQuestion::Finished => {
            send_json(socket, end_message(&session.summary())).await?;
            return Ok(());
        }
    }

    let mut buffer = AnswerBuffer::new();
    let mut voice = state.voice_model.clone().map(VoiceMonitor::new);

    while let Some(message) = socket.recv().await {
        let inbound = match message? {
            Message::Text(text) => parse_text_message(&text),
            Message::Binary(data) if !data.is_empty() => Inbound::Chunk(data),
            Message::Close(_) => break,
            _ => continue,
        };

        match inbound {
            Inbound::Chunk(chunk) => {
                buffer.extend(&chunk);
                let Some(audio_confidence) = volume_confidence(&chunk) else {
                    continue;
                };
                let voice_confidence = match voice.take() {
                    Some(monitor) => {
                        let (monitor, score) = score_voice(monitor, pcm16_to_f32(&chunk)).await;
                        voice = monitor;
                        score
                    }
                    None => None,
                };
                send_json(socket, realtime_feed_message(audio_confidence, voice_confidence))
                    .await?;
            }
            Inbound::StopAnswer => {
                let turn = answer_turn(socket, state, &mut session, &mut buffer).await;
                if settle_turn(turn, &mut buffer)? == Some(NextQuestion::Finished) {
                    tokio::time::sleep(CLOSE_GRACE).await;
                    break;
                }
            }
            Inbound::StopSession => {
                info!("Client ended the session (complete: {})", session.is_complete());
                if !buffer.is_empty() {
                    debug!("Discarding {} bytes of unanswered audio", buffer.len());
                }
                send_json(socket, end_message(&session.summary())).await?;
                break;
            }
            Inbound::Ignored => {}
        }
    }

    if let Some(average) = voice.as_ref().and_then(VoiceMonitor::average) {
        info!("Average voice confidence: {average:.1}");
    }
    Ok(())
}

/// Waits for the first text frame. `None` if the client leaves first.
async fn receive_init(socket: &mut WebSocket) -> Result<Option<InitMessage>, SessionError> {
    while let Some(message) = socket.recv().await {
        match message? {
            Message::Text(text) => return Ok(Some(parse_init(&text))),
            Message::Close(_) => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}

/// Reads each field on its own: a missing, null or mistyped field falls back
/// to empty without discarding the others.
fn parse_init(text: &str) -> InitMessage {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Malformed init message, using defaults: {e}");
            return InitMessage::default();
        }
    };
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    InitMessage {
        resume_text: field("resumeText"),
        job_description: field("jobDescription"),
    }
}

async fn resolve_resume_text(state: &AppState, resume_text: String) -> String {
    if !resume_text.trim().is_empty() {
        return resume_text;
    }
    let Some(path) = state.config.fallback_resume_path.as_deref() else {
        return resume_text;
    };
    match load_resume_file(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Fallback resume unavailable: {e}");
            resume_text
        }
    }
}

/// Transcribes and grades the buffered answer, reports the score, then asks
/// the next question or ends the interview.
async fn answer_turn(
    socket: &mut WebSocket,
    state: &AppState,
    session: &mut InterviewSession,
    buffer: &mut AnswerBuffer,
) -> Result<NextQuestion, SessionError> {
    let audio = buffer.take();
    info!("Processing answer ({} bytes of audio)", audio.len());

    let transcript = match state.transcriber.transcribe(audio).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Transcription failed: {e}");
            None
        }
    };

    let feedback = session.submit_answer(transcript.as_deref()).await?;
    let progress = session.state();
    debug!(
        "Graded correct={} placeholder={} difficulty={} topic_score={} ({}/{} correct): {}",
        feedback.grade.is_correct,
        feedback.used_placeholder,
        progress.difficulty(),
        progress.current_topic_score(),
        progress.correct_in_topic(),
        progress.questions_in_topic(),
        feedback.grade.feedback
    );
    if feedback.outcome == AnswerOutcome::SwitchedTopic {
        info!(
            "Topic finished ({}/{} done)",
            progress.skill_scores().len(),
            progress.topics().len()
        );
    }
    send_json(socket, feedback_message(&feedback)).await?;

    tokio::time::sleep(FEEDBACK_PAUSE).await;

    let next = session.next_question().await;
    match &next {
        NextQuestion::Question(q) => send_json(socket, question_message(q)).await?,
        NextQuestion::Finished => {
            info!("Interview finished");
            send_json(socket, end_message(&session.summary())).await?;
        }
    }
    Ok(next)
}

/// Answer-level failures reset the buffer and keep the session alive;
/// socket failures end it. `None` means the turn was abandoned.
fn settle_turn(
    turn: Result<NextQuestion, SessionError>,
    buffer: &mut AnswerBuffer,
) -> Result<Option<NextQuestion>, SessionError> {
    match turn {
        Ok(next) => Ok(Some(next)),
        Err(SessionError::App(e)) => {
            warn!("Answer processing failed, resetting audio buffer: {e}");
            buffer.clear();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Runs the voice model off the async runtime. The monitor is moved into the
/// blocking task and handed back; it is dropped if the task panics.
async fn score_voice(
    mut monitor: VoiceMonitor,
    samples: Vec<f32>,
) -> (Option<VoiceMonitor>, Option<f64>) {
    let task = tokio::task::spawn_blocking(move || {
        let score = monitor.update(&samples);
        (monitor, score)
    });
    match task.await {
        Ok((monitor, score)) => (Some(monitor), score),
        Err(e) => {
            warn!("Voice scoring task failed, disabling voice feed: {e}");
            (None, None)
        }
    }
}

fn parse_text_message(text: &str) -> Inbound {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        debug!("Ignoring malformed message");
        return Inbound::Ignored;
    };
    if let Some(payload) = value.get("bytes") {
        return decode_chunk(payload).map_or(Inbound::Ignored, Inbound::Chunk);
    }
    match value.get("text").and_then(Value::as_str) {
        Some("STOP_ANSWER") => Inbound::StopAnswer,
        Some("STOP_SESSION") => Inbound::StopSession,
        _ => Inbound::Ignored,
    }
}

async fn send_json(socket: &mut WebSocket, value: Value) -> Result<(), axum::Error> {
    socket.send(Message::Text(value.to_string())).await
}

fn question_message(text: &str) -> Value {
    json!({ "type": "question", "text": text, "speak": true })
}

fn realtime_feed_message(audio_confidence: f64, voice_confidence: Option<f64>) -> Value {
    let mut message = json!({ "type": "realtime_feed", "audioConfidence": audio_confidence });
    if let Some(voice) = voice_confidence {
        message["voiceConfidence"] = json!(voice);
    }
    message
}

fn feedback_message(feedback: &AnswerFeedback) -> Value {
    json!({
        "user_transcription": feedback.transcription,
        "scores": { "answer_score": feedback.answer_score },
    })
}

fn end_message(summary: &InterviewSummary) -> Value {
    json!({
        "type": "end",
        "text": END_TEXT,
        "skillScores": summary.skill_scores,
        "finalScore": summary.final_score,
    })
}
