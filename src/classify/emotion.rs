use crate::error::Result;
use crate::shapes::{Axis, LandmarkGroup, angle};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, trace};

const HAPPY_MIN_MOUTH_ANGLE: f64 = 0.05;
const HAPPY_MAX_MOUTH_ASPECT: f64 = 0.35;
const HAPPY_MIN_MOUTH_WIDTH: f64 = 0.3;

const SAD_MAX_MOUTH_ANGLE: f64 = -0.05;
const SAD_MAX_BROW_HEIGHT: f64 = 0.65;
const SAD_MAX_MOUTH_WIDTH: f64 = 0.35;

const ANGRY_MAX_BROW_HEIGHT: f64 = 0.55;
const ANGRY_MAX_MOUTH_HEIGHT: f64 = 0.15;
const ANGRY_MAX_MOUTH_WIDTH: f64 = 0.3;

const SURPRISED_MIN_BROW_HEIGHT: f64 = 0.65;
const SURPRISED_MIN_MOUTH_HEIGHT: f64 = 0.25;
const SURPRISED_MIN_EYE_HEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Neutral,
    ];

    /// Glyph drawn above the face box.
    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😢",
            Emotion::Angry => "😠",
            Emotion::Surprised => "😲",
            Emotion::Neutral => "😐",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Emotion::Happy => write!(f, "Happy"),
            Emotion::Sad => write!(f, "Sad"),
            Emotion::Angry => write!(f, "Angry"),
            Emotion::Surprised => write!(f, "Surprised"),
            Emotion::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Named facial feature contours a landmark detector may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceFeature {
    FaceContour,
    OuterLips,
    InnerLips,
    LeftEyebrow,
    RightEyebrow,
    LeftEye,
    RightEye,
    LeftPupil,
    RightPupil,
    Nose,
    NoseCrest,
    MedianLine,
}

/// Landmark groups of one face, keyed by feature. Any group may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    groups: HashMap<FaceFeature, LandmarkGroup>,
}

/// The five groups emotion classification reads, all present and non-empty.
#[derive(Debug, Clone, Copy)]
pub struct EmotionFeatures<'a> {
    pub outer_lips: &'a LandmarkGroup,
    pub left_eyebrow: &'a LandmarkGroup,
    pub right_eyebrow: &'a LandmarkGroup,
    pub left_eye: &'a LandmarkGroup,
    pub right_eye: &'a LandmarkGroup,
}

impl FaceLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: FaceFeature, group: impl Into<LandmarkGroup>) -> Self {
        self.insert(feature, group);
        self
    }

    pub fn insert(&mut self, feature: FaceFeature, group: impl Into<LandmarkGroup>) {
        self.groups.insert(feature, group.into());
    }

    pub fn remove(&mut self, feature: FaceFeature) -> Option<LandmarkGroup> {
        self.groups.remove(&feature)
    }

    /// The group for `feature`, if the detector resolved it with at least one point.
    pub fn get(&self, feature: FaceFeature) -> Option<&LandmarkGroup> {
        self.groups.get(&feature).filter(|g| !g.is_empty())
    }

    pub fn contains(&self, feature: FaceFeature) -> bool {
        self.get(feature).is_some()
    }

    pub fn emotion_features(&self) -> Option<EmotionFeatures<'_>> {
        Some(EmotionFeatures {
            outer_lips: self.get(FaceFeature::OuterLips)?,
            left_eyebrow: self.get(FaceFeature::LeftEyebrow)?,
            right_eyebrow: self.get(FaceFeature::RightEyebrow)?,
            left_eye: self.get(FaceFeature::LeftEye)?,
            right_eye: self.get(FaceFeature::RightEye)?,
        })
    }
}

/// Geometry the emotion rules compare against their thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMeasurements {
    pub mouth_height: f64,
    pub mouth_width: f64,
    /// Angle from the first outer lip point to the one halfway along the contour.
    pub mouth_angle: f64,
    /// Mean y of both eyebrows.
    pub brow_height: f64,
    /// Mean vertical spread of both eyes.
    pub eye_height: f64,
}

impl FaceMeasurements {
    pub fn measure(features: &EmotionFeatures) -> Result<FaceMeasurements> {
        let lips = features.outer_lips;
        let mouth_height = lips.spread(Axis::Y)?;
        let mouth_width = lips.spread(Axis::X)?;
        let mouth_angle = angle(&lips.points[0], &lips.points[lips.len() / 2]);

        let brow_height =
            (features.left_eyebrow.mean(Axis::Y)? + features.right_eyebrow.mean(Axis::Y)?) / 2.;
        let eye_height =
            (features.left_eye.spread(Axis::Y)? + features.right_eye.spread(Axis::Y)?) / 2.;

        Ok(FaceMeasurements {
            mouth_height,
            mouth_width,
            mouth_angle,
            brow_height,
            eye_height,
        })
    }

    /// Height over width of the mouth, None for a zero-width contour.
    pub fn mouth_aspect(&self) -> Option<f64> {
        if self.mouth_width == 0. {
            None
        } else {
            Some(self.mouth_height / self.mouth_width)
        }
    }

    /// First matching rule wins: happy, sad, angry, surprised, otherwise neutral.
    pub fn emotion(&self) -> Emotion {
        let Some(mouth_aspect) = self.mouth_aspect() else {
            debug!("Zero-width mouth contour, defaulting to Neutral");
            return Emotion::Neutral;
        };

        let emotion = if self.mouth_angle > HAPPY_MIN_MOUTH_ANGLE
            && mouth_aspect < HAPPY_MAX_MOUTH_ASPECT
            && self.mouth_width > HAPPY_MIN_MOUTH_WIDTH
        {
            Emotion::Happy
        } else if self.mouth_angle < SAD_MAX_MOUTH_ANGLE
            && self.brow_height < SAD_MAX_BROW_HEIGHT
            && self.mouth_width < SAD_MAX_MOUTH_WIDTH
        {
            Emotion::Sad
        } else if self.brow_height < ANGRY_MAX_BROW_HEIGHT
            && self.mouth_height < ANGRY_MAX_MOUTH_HEIGHT
            && self.mouth_width < ANGRY_MAX_MOUTH_WIDTH
        {
            Emotion::Angry
        } else if self.brow_height > SURPRISED_MIN_BROW_HEIGHT
            && self.mouth_height > SURPRISED_MIN_MOUTH_HEIGHT
            && self.eye_height > SURPRISED_MIN_EYE_HEIGHT
        {
            Emotion::Surprised
        } else {
            Emotion::Neutral
        };

        trace!("{self:?} (aspect {mouth_aspect:.3}) -> {emotion}");
        emotion
    }
}

/// Heuristic emotion of one face. Missing or empty required groups yield Neutral.
pub fn classify_emotion(landmarks: &FaceLandmarks) -> Emotion {
    let Some(features) = landmarks.emotion_features() else {
        debug!("Required landmark group missing, defaulting to Neutral");
        return Emotion::Neutral;
    };

    match FaceMeasurements::measure(&features) {
        Ok(m) => m.emotion(),
        Err(e) => {
            debug!("{e}, defaulting to Neutral");
            Emotion::Neutral
        }
    }
}
