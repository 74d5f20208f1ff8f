use serde::{Deserialize, Serialize};

/// A point in normalized image coordinates (0..1 on both axes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The subset of body-pose landmarks the tracker consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    pub nose: Point2,
    pub left_ear: Point2,
    pub right_ear: Point2,
    pub left_wrist: Point2,
    pub right_wrist: Point2,
}

/// Per-frame signals derived from one set of landmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    /// Midpoint of both wrists; drives smoothness.
    pub wrist: Point2,
    /// Head position (nose); drives stability.
    pub stability: Point2,
    /// 1.0 when facing the camera, falling to 0 as the head turns.
    pub attention: f64,
}

impl FrameMetrics {
    pub fn from_landmarks(landmarks: &PoseLandmarks) -> Self {
        let ear_mid = landmarks.left_ear.midpoint(landmarks.right_ear);
        let offset = landmarks.nose.distance(ear_mid);
        Self {
            wrist: landmarks.left_wrist.midpoint(landmarks.right_wrist),
            stability: landmarks.nose,
            attention: (1.0 - offset * 5.0).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_camera() -> PoseLandmarks {
        PoseLandmarks {
            nose: Point2::new(0.5, 0.4),
            left_ear: Point2::new(0.45, 0.4),
            right_ear: Point2::new(0.55, 0.4),
            left_wrist: Point2::new(0.3, 0.8),
            right_wrist: Point2::new(0.7, 0.9),
        }
    }

    #[test]
    fn test_centered_head_has_full_attention() {
        let metrics = FrameMetrics::from_landmarks(&facing_camera());
        assert!((metrics.attention - 1.0).abs() < 1e-12);
        assert_eq!(metrics.stability, Point2::new(0.5, 0.4));
        assert!((metrics.wrist.x - 0.5).abs() < 1e-12);
        assert!((metrics.wrist.y - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_turned_head_loses_attention() {
        let mut landmarks = facing_camera();
        // nose 0.1 off the ear midpoint: 1 - 0.5
        landmarks.nose = Point2::new(0.6, 0.4);
        let metrics = FrameMetrics::from_landmarks(&landmarks);
        assert!((metrics.attention - 0.5).abs() < 1e-9);

        landmarks.nose = Point2::new(0.9, 0.4);
        assert_eq!(FrameMetrics::from_landmarks(&landmarks).attention, 0.0);
    }

    #[test]
    fn test_landmarks_deserialize() {
        let raw = r#"{
            "nose": {"x": 0.5, "y": 0.4},
            "left_ear": {"x": 0.45, "y": 0.4},
            "right_ear": {"x": 0.55, "y": 0.4},
            "left_wrist": {"x": 0.3, "y": 0.8},
            "right_wrist": {"x": 0.7, "y": 0.9}
        }"#;
        let parsed: PoseLandmarks = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, facing_camera());
    }
}
