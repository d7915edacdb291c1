use super::heatmap::{HeatmapModel, decode_heatmaps};
use super::{
    FaceLandmarkDetector, FaceObservation, PoseEstimator, SentimentScorer, TextObservation,
    TextRecognizer,
};
use crate::classify::KeyPoint;
use crate::error::{Error, Result};
use image::RgbImage;
use ndarray::Array3;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// A sentiment score captured for one text. A missing score means the scorer gave up.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoredText {
    /// Matches any text when absent.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Inference output saved as JSON, replayed through the collaborator traits.
///
/// ```json
/// {
///   "faces": [{"bounds": {"x": 0.3, "y": 0.2, "w": 0.4, "h": 0.5},
///              "landmarks": {"outer_lips": [{"x": 0.4, "y": 0.6}]}}],
///   "text": [{"bounds": {"x": 0.1, "y": 0.1, "w": 0.5, "h": 0.05}, "text": "hello"}],
///   "keypoints": [{"id": 0, "x": 0.5, "y": 0.2, "confidence": 0.8}],
///   "sentiment": [{"text": "hello", "score": 0.4}]
/// }
/// ```
///
/// Pose may be recorded as `keypoints` or as raw `heatmaps` (K x H x W nested arrays);
/// keypoints win when both are present. A non-null `error` makes every call fail with it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Recording {
    pub faces: Vec<FaceObservation>,
    pub text: Vec<TextObservation>,
    pub keypoints: Option<Vec<KeyPoint>>,
    pub heatmaps: Option<Vec<Vec<Vec<f32>>>>,
    pub sentiment: Vec<ScoredText>,
    pub error: Option<String>,
}

impl Recording {
    pub fn load(path: impl AsRef<Path>) -> Result<Recording> {
        let path = path.as_ref();
        debug!("Loading recorded inference from {path:?}");
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Recording> {
        Ok(serde_json::from_str(json)?)
    }

    fn check(&self) -> Result<()> {
        match &self.error {
            Some(e) => Err(Error::Inference(e.clone())),
            None => Ok(()),
        }
    }
}

impl FaceLandmarkDetector for Recording {
    fn detect_faces(&self, _img: &RgbImage) -> Result<Vec<FaceObservation>> {
        self.check()?;
        Ok(self.faces.clone())
    }
}

impl TextRecognizer for Recording {
    fn recognize_text(&self, _img: &RgbImage) -> Result<Vec<TextObservation>> {
        self.check()?;
        Ok(self.text.clone())
    }
}

impl HeatmapModel for Recording {
    fn heatmaps(&self, _img: &RgbImage) -> Result<Array3<f32>> {
        self.check()?;
        let maps = self
            .heatmaps
            .as_ref()
            .ok_or_else(|| Error::Inference("No heatmaps recorded".to_string()))?;

        let channels = maps.len();
        let height = maps.first().map_or(0, |c| c.len());
        let width = maps.first().and_then(|c| c.first()).map_or(0, |r| r.len());

        let ragged = maps
            .iter()
            .any(|c| c.len() != height || c.iter().any(|r| r.len() != width));
        if ragged {
            return Err(Error::Heatmap(format!(
                "Rows of {channels} recorded channels differ from {width}x{height}"
            )));
        }

        let values: Vec<f32> = maps.iter().flatten().flatten().copied().collect();
        Ok(Array3::from_shape_vec((channels, height, width), values)?)
    }
}

impl PoseEstimator for Recording {
    fn estimate_pose(&self, img: &RgbImage) -> Result<Vec<KeyPoint>> {
        self.check()?;
        if let Some(keypoints) = &self.keypoints {
            return Ok(keypoints.clone());
        }
        let maps = self.heatmaps(img)?;
        decode_heatmaps(maps.view())
    }
}

impl SentimentScorer for Recording {
    fn score(&self, text: &str) -> Option<f64> {
        if let Some(e) = &self.error {
            warn!("Sentiment scoring failed: {e}");
            return None;
        }

        self.sentiment
            .iter()
            .find(|s| s.text.as_deref().is_none_or(|t| t == text))
            .and_then(|s| s.score)
    }
}
