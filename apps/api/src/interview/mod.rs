// Adaptive interview: topic extraction, question generation, grading, and
// the difficulty/scoring state machine, plus the live audio socket that
// drives it. All LLM calls go through llm_client.

pub mod model;
pub mod prompts;
pub mod session;
pub mod state_machine;
pub mod text;
pub mod webhook;
pub mod ws;
