use crate::classify::{
    Emotion, FaceLandmarks, KeyPoint, PoseAction, SentimentLabel, classify_action,
    classify_emotion, classify_sentiment, mean_confidence,
};
use crate::error::Result;
use crate::inference::{
    FaceLandmarkDetector, PoseEstimator, SentimentScorer, TextObservation, TextRecognizer,
};
use crate::shapes::NormalizedRect;
use image::RgbImage;
use tracing::{Level, debug, info, span, trace};

/// Runs an inference collaborator and classifies what it returns.
pub struct Pipeline<I> {
    inference: I,
}

#[derive(Debug, Clone)]
pub struct FaceAnalysis {
    pub bounds: NormalizedRect,
    pub landmarks: FaceLandmarks,
    pub emotion: Emotion,
}

#[derive(Debug, Clone)]
pub struct PoseAnalysis {
    pub keypoints: Vec<KeyPoint>,
    pub action: PoseAction,
    pub confidence: f32,
}

#[derive(Debug, Clone)]
pub struct TextAnalysis {
    pub observations: Vec<TextObservation>,
    /// Non-empty lines joined with newlines, in observation order.
    pub text: String,
}

impl<I> Pipeline<I> {
    pub fn new(inference: I) -> Pipeline<I> {
        Pipeline { inference }
    }

    pub fn inference(&self) -> &I {
        &self.inference
    }
}

impl<I: FaceLandmarkDetector> Pipeline<I> {
    pub fn faces(&self, img: &RgbImage) -> Result<Vec<FaceAnalysis>> {
        let span = span!(Level::DEBUG, "faces");
        let _guard = span.enter();

        let observations = self.inference.detect_faces(img)?;
        info!("Detected {} faces", observations.len());

        Ok(observations
            .into_iter()
            .map(|face| {
                let emotion = classify_emotion(&face.landmarks);
                trace!("Face at {:?}: {emotion}", face.bounds);
                FaceAnalysis {
                    bounds: face.bounds,
                    landmarks: face.landmarks,
                    emotion,
                }
            })
            .collect())
    }
}

impl<I: PoseEstimator> Pipeline<I> {
    pub fn pose(&self, img: &RgbImage) -> Result<PoseAnalysis> {
        let span = span!(Level::DEBUG, "pose");
        let _guard = span.enter();

        let keypoints = self.inference.estimate_pose(img)?;
        let action = classify_action(&keypoints);
        let confidence = mean_confidence(&keypoints);
        info!("{} keypoints, action {action}", keypoints.len());

        Ok(PoseAnalysis {
            keypoints,
            action,
            confidence,
        })
    }
}

impl<I: TextRecognizer> Pipeline<I> {
    pub fn text(&self, img: &RgbImage) -> Result<TextAnalysis> {
        let span = span!(Level::DEBUG, "text");
        let _guard = span.enter();

        let observations = self.inference.recognize_text(img)?;
        let text = join_lines(&observations);
        info!("Recognized {} lines", observations.len());

        Ok(TextAnalysis { observations, text })
    }
}

impl<I: SentimentScorer> Pipeline<I> {
    pub fn sentiment(&self, text: &str) -> SentimentLabel {
        analyze_sentiment(&self.inference, text)
    }
}

/// Neutral when the scorer cannot score `text`.
pub fn analyze_sentiment(scorer: &impl SentimentScorer, text: &str) -> SentimentLabel {
    match scorer.score(text) {
        Some(score) => classify_sentiment(score),
        None => {
            debug!("No sentiment score, defaulting to Neutral");
            SentimentLabel::Neutral
        }
    }
}

fn join_lines(observations: &[TextObservation]) -> String {
    observations
        .iter()
        .map(|o| o.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
