//! Interfaces to the inference services whose output gets classified.
//!
//! Model loading and execution stay behind these traits; pass in whichever implementation
//! fits (a model runtime, or [`recorded::Recording`] for replayed output).

use crate::classify::{FaceLandmarks, KeyPoint};
use crate::error::Result;
use crate::shapes::NormalizedRect;
use image::RgbImage;
use serde::Deserialize;

pub mod heatmap;
pub mod recorded;

pub use heatmap::{HeatmapModel, HeatmapPose, decode_heatmaps};
pub use recorded::Recording;

/// One detected face.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FaceObservation {
    pub bounds: NormalizedRect,
    #[serde(default)]
    pub landmarks: FaceLandmarks,
}

/// One recognized line of text, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextObservation {
    pub bounds: NormalizedRect,
    pub text: String,
}

pub trait FaceLandmarkDetector {
    fn detect_faces(&self, img: &RgbImage) -> Result<Vec<FaceObservation>>;
}

pub trait TextRecognizer {
    fn recognize_text(&self, img: &RgbImage) -> Result<Vec<TextObservation>>;
}

/// Produces the keypoints of one body. A well-behaved estimator returns 17.
pub trait PoseEstimator {
    fn estimate_pose(&self, img: &RgbImage) -> Result<Vec<KeyPoint>>;
}

pub trait SentimentScorer {
    /// Paragraph score around [-1, 1], or None when the text could not be scored.
    fn score(&self, text: &str) -> Option<f64>;
}
