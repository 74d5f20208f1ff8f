use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;

/// Coarse live "volume confidence" for one raw chunk.
///
/// The chunk is read as little-endian 16-bit samples; odd-length chunks
/// cannot be and yield `None`. Confidence is the RMS capped at 100.
pub fn volume_confidence(chunk: &[u8]) -> Option<f64> {
    if chunk.is_empty() || chunk.len() % 2 != 0 {
        return None;
    }

    let samples = pcm16_samples(chunk);
    let mean_square =
        samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum::<f64>() / samples.len() as f64;
    let rms = if mean_square.is_finite() && mean_square >= 0.0 {
        mean_square.sqrt()
    } else {
        0.0
    };

    Some(rms.min(100.0))
}

pub fn pcm16_samples(chunk: &[u8]) -> Vec<i16> {
    chunk
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Samples scaled to [-1.0, 1.0).
pub fn pcm16_to_f32(chunk: &[u8]) -> Vec<f32> {
    pcm16_samples(chunk)
        .into_iter()
        .map(|s| f32::from(s) / 32768.0)
        .collect()
}

/// Decodes the `bytes` payload of an audio message: either a JSON array of
/// byte values or a base64 string. Anything else yields `None`.
pub fn decode_chunk(payload: &Value) -> Option<Vec<u8>> {
    let decoded: Option<Vec<u8>> = match payload {
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect(),
        Value::String(encoded) => BASE64.decode(encoded.trim()).ok(),
        _ => None,
    };
    decoded.filter(|bytes| !bytes.is_empty())
}
