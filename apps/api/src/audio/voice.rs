use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::features::{extract_features, spectral_flatness_penalty, VoiceFeatures, SAMPLE_RATE};

/// Seconds of audio the monitor scores at a time.
const WINDOW_SECS: usize = 3;
/// Chunks quieter than this (mean absolute amplitude) are not scored.
const SILENCE_THRESHOLD: f32 = 0.01;

/// Pretrained logistic classifier over [`VoiceFeatures`].
///
/// Stored as JSON: `{"weights": [8], "bias": f, "means": [8], "scales": [8]}`
/// where `means`/`scales` are an optional standardization step.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfidenceModel {
    weights: [f64; 8],
    bias: f64,
    #[serde(default)]
    means: Option<[f64; 8]>,
    #[serde(default)]
    scales: Option<[f64; 8]>,
}

impl VoiceConfidenceModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read voice model {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid voice model file {}", path.display()))
    }

    /// Probability that the speaker sounds confident.
    pub fn predict(&self, features: &VoiceFeatures) -> f64 {
        let x = features.as_array();
        let z = self.bias
            + (0..x.len())
                .map(|i| {
                    let mean = self.means.map_or(0.0, |m| m[i]);
                    let scale = self
                        .scales
                        .map(|s| s[i])
                        .filter(|s| *s != 0.0)
                        .unwrap_or(1.0);
                    self.weights[i] * (x[i] - mean) / scale
                })
                .sum::<f64>();
        1.0 / (1.0 + (-z).exp())
    }
}

/// Scores the last few seconds of speech as chunks arrive.
pub struct VoiceMonitor {
    model: Arc<VoiceConfidenceModel>,
    window: VecDeque<f32>,
    capacity: usize,
    total: f64,
    updates: usize,
}

impl VoiceMonitor {
    pub fn new(model: Arc<VoiceConfidenceModel>) -> Self {
        let capacity = WINDOW_SECS * SAMPLE_RATE as usize;
        Self {
            model,
            window: VecDeque::with_capacity(capacity),
            capacity,
            total: 0.0,
            updates: 0,
        }
    }

    /// Feeds one chunk of samples and rescores the window. Silent chunks and
    /// windows with non-finite features produce no score.
    pub fn update(&mut self, samples: &[f32]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let mean_abs = samples.iter().map(|s| s.abs()).sum::<f32>() / samples.len() as f32;
        if mean_abs < SILENCE_THRESHOLD {
            return None;
        }

        self.window.extend(samples.iter().copied());
        let excess = self.window.len().saturating_sub(self.capacity);
        self.window.drain(..excess);

        let window = self.window.make_contiguous();
        let features = extract_features(window, SAMPLE_RATE);
        if !features.is_finite() {
            return None;
        }

        let score = self.model.predict(&features) * 100.0 * spectral_flatness_penalty(window);
        self.total += score;
        self.updates += 1;
        Some(score)
    }

    /// Mean of every score produced so far.
    pub fn average(&self) -> Option<f64> {
        (self.updates > 0).then(|| self.total / self.updates as f64)
    }
}
