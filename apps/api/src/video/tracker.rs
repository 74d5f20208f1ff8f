use std::collections::VecDeque;

use super::landmarks::{FrameMetrics, Point2};

pub const DEFAULT_WINDOW_FRAMES: usize = 30;
/// Scores are only reported once the window holds more than this many frames.
const MIN_FRAMES: usize = 5;

const ATTENTION_WEIGHT: f64 = 0.4;
const STABILITY_WEIGHT: f64 = 0.4;
const SMOOTHNESS_WEIGHT: f64 = 0.2;

/// Body-language scores on a 0..100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyLanguageScores {
    pub attention: f64,
    pub stability: f64,
    pub smoothness: f64,
    pub confidence: f64,
}

/// Scores as sent to clients: truncated toward zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WireScores {
    pub attention: i64,
    pub stability: i64,
    pub smoothness: i64,
    pub confidence: i64,
}

impl BodyLanguageScores {
    fn from_components(attention: f64, stability: f64, smoothness: f64) -> Self {
        Self {
            attention,
            stability,
            smoothness,
            confidence: ATTENTION_WEIGHT * attention
                + STABILITY_WEIGHT * stability
                + SMOOTHNESS_WEIGHT * smoothness,
        }
    }

    pub fn to_wire(&self) -> WireScores {
        WireScores {
            attention: self.attention.trunc() as i64,
            stability: self.stability.trunc() as i64,
            smoothness: self.smoothness.trunc() as i64,
            confidence: self.confidence.trunc() as i64,
        }
    }
}

/// Rolling-window body-language scoring for one video session.
#[derive(Debug)]
pub struct BodyLanguageTracker {
    capacity: usize,
    wrist: VecDeque<Point2>,
    head: VecDeque<Point2>,
    attention: VecDeque<f64>,
    history: Vec<BodyLanguageScores>,
}

impl BodyLanguageTracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_FRAMES + 1);
        Self {
            capacity,
            wrist: VecDeque::with_capacity(capacity),
            head: VecDeque::with_capacity(capacity),
            attention: VecDeque::with_capacity(capacity),
            history: Vec::new(),
        }
    }

    /// Adds a frame and returns the updated scores once the window is warm.
    /// Every returned update is also kept for the final report.
    pub fn push(&mut self, metrics: &FrameMetrics) -> Option<BodyLanguageScores> {
        if self.wrist.len() == self.capacity {
            self.wrist.pop_front();
            self.head.pop_front();
            self.attention.pop_front();
        }
        self.wrist.push_back(metrics.wrist);
        self.head.push_back(metrics.stability);
        self.attention.push_back(metrics.attention);

        if self.wrist.len() <= MIN_FRAMES {
            return None;
        }

        let scores = BodyLanguageScores::from_components(
            self.attention_score(),
            self.stability_score(),
            self.smoothness_score(),
        );
        self.history.push(scores);
        Some(scores)
    }

    /// Session averages, or `None` if no update was ever produced.
    pub fn final_report(&self) -> Option<BodyLanguageScores> {
        if self.history.is_empty() {
            return None;
        }
        let n = self.history.len() as f64;
        let attention = self.history.iter().map(|s| s.attention).sum::<f64>() / n;
        let stability = self.history.iter().map(|s| s.stability).sum::<f64>() / n;
        let smoothness = self.history.iter().map(|s| s.smoothness).sum::<f64>() / n;
        Some(BodyLanguageScores::from_components(
            attention, stability, smoothness,
        ))
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn attention_score(&self) -> f64 {
        let mean = self.attention.iter().sum::<f64>() / self.attention.len() as f64;
        (mean * 100.0).min(100.0)
    }

    fn stability_score(&self) -> f64 {
        let xs: Vec<f64> = self.head.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = self.head.iter().map(|p| p.y).collect();
        let spread = (population_std(&xs) + population_std(&ys)) / 2.0;
        (100.0 - spread * 1000.0).clamp(0.0, 100.0)
    }

    fn smoothness_score(&self) -> f64 {
        let points: Vec<Point2> = self.wrist.iter().copied().collect();
        let jerk = third_difference_norms(&points);
        let mean_jerk = if jerk.is_empty() {
            0.0
        } else {
            jerk.iter().sum::<f64>() / jerk.len() as f64
        };
        (100.0 - mean_jerk * 100.0).clamp(0.0, 100.0)
    }
}

fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Norms of the third finite difference (jerk) of a position series.
fn third_difference_norms(points: &[Point2]) -> Vec<f64> {
    let diff = |p: &[Point2]| -> Vec<Point2> {
        p.windows(2)
            .map(|w| Point2::new(w[1].x - w[0].x, w[1].y - w[0].y))
            .collect()
    };
    let jerk = diff(&diff(&diff(points)));
    jerk.iter().map(|j| j.x.hypot(j.y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(nose_x: f64, wrist_x: f64, attention: f64) -> FrameMetrics {
        FrameMetrics {
            wrist: Point2::new(wrist_x, 0.75),
            stability: Point2::new(nose_x, 0.5),
            attention,
        }
    }

    #[test]
    fn test_no_scores_until_window_is_warm() {
        let mut tracker = BodyLanguageTracker::new(DEFAULT_WINDOW_FRAMES);
        for _ in 0..5 {
            assert!(tracker.push(&frame(0.5, 0.5, 1.0)).is_none());
        }
        assert!(tracker.final_report().is_none());
        assert!(tracker.push(&frame(0.5, 0.5, 1.0)).is_some());
    }

    #[test]
    fn test_still_attentive_speaker_scores_full() {
        let mut tracker = BodyLanguageTracker::new(DEFAULT_WINDOW_FRAMES);
        let mut last = None;
        for _ in 0..6 {
            last = tracker.push(&frame(0.5, 0.5, 1.0));
        }
        let scores = last.unwrap();
        assert_eq!(
            scores.to_wire(),
            WireScores {
                attention: 100,
                stability: 100,
                smoothness: 100,
                confidence: 100,
            }
        );
    }

    #[test]
    fn test_still_head_at_inexact_coordinate_stays_near_full() {
        let mut tracker = BodyLanguageTracker::new(DEFAULT_WINDOW_FRAMES);
        let still = FrameMetrics {
            wrist: Point2::new(0.5, 0.8),
            stability: Point2::new(0.5, 0.4),
            attention: 1.0,
        };
        let mut last = None;
        for _ in 0..6 {
            last = tracker.push(&still);
        }
        // the mean of 0.4 is not exact in binary, so compare unrounded
        let scores = last.unwrap();
        assert!((scores.stability - 100.0).abs() < 1e-9);
        assert!((scores.smoothness - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_head_movement_lowers_stability() {
        let mut tracker = BodyLanguageTracker::new(DEFAULT_WINDOW_FRAMES);
        let mut last = None;
        for i in 0..6 {
            let x = if i % 2 == 0 { 0.5 } else { 0.51 };
            last = tracker.push(&frame(x, 0.5, 1.0));
        }
        // std_x 0.005, std_y 0 -> mean 0.0025 -> 100 - 2.5
        let scores = last.unwrap();
        assert!(
            (scores.stability - 97.5).abs() < 1e-6,
            "Stability was {}",
            scores.stability
        );
        assert_eq!(scores.to_wire().stability, 97);
    }

    #[test]
    fn test_jerky_wrists_lower_smoothness() {
        let mut tracker = BodyLanguageTracker::new(DEFAULT_WINDOW_FRAMES);
        let mut last = None;
        for i in 0..6 {
            let x = if i % 2 == 0 { 0.0 } else { 0.1 };
            last = tracker.push(&frame(0.5, x, 1.0));
        }
        // alternating 0.1 steps: every third difference has magnitude 0.4
        let scores = last.unwrap();
        assert!(
            (scores.smoothness - 60.0).abs() < 1e-6,
            "Smoothness was {}",
            scores.smoothness
        );
    }

    #[test]
    fn test_confidence_weights() {
        let scores = BodyLanguageScores::from_components(50.0, 100.0, 0.0);
        assert!((scores.confidence - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_is_bounded() {
        let mut tracker = BodyLanguageTracker::new(10);
        for _ in 0..25 {
            tracker.push(&frame(0.5, 0.5, 0.5));
        }
        assert_eq!(tracker.wrist.len(), 10);
        assert_eq!(tracker.history_len(), 20);
    }

    #[test]
    fn test_final_report_averages_history() {
        let mut tracker = BodyLanguageTracker::new(DEFAULT_WINDOW_FRAMES);
        for _ in 0..6 {
            tracker.push(&frame(0.5, 0.5, 1.0));
        }
        for _ in 0..6 {
            tracker.push(&frame(0.5, 0.5, 0.0));
        }
        let report = tracker.final_report().unwrap();
        assert_eq!(tracker.history_len(), 7);
        // attention updates: 100, then 6 frames of zero attention over a
        // 7..12 frame window: 600/7, 600/8, ... 600/12
        let expected = (100.0
            + 600.0 / 7.0
            + 600.0 / 8.0
            + 600.0 / 9.0
            + 600.0 / 10.0
            + 600.0 / 11.0
            + 600.0 / 12.0)
            / 7.0;
        assert!((report.attention - expected).abs() < 1e-9);
        assert!((report.stability - 100.0).abs() < 1e-9);
    }
}
