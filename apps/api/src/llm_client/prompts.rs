// Shared prompt constants.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Appended to prompts whose output is spoken aloud to the candidate.
pub const SPOKEN_OUTPUT_INSTRUCTION: &str = "\
    Your reply is read aloud by a speech synthesizer. \
    Use plain sentences only: no markdown, no bullet points, no code blocks.";
