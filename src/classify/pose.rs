use crate::shapes::NormalizedPoint;
use serde::Deserialize;
use tracing::{debug, trace};

pub const KEYPOINT_COUNT: usize = 17;

// hip-to-shoulder height, in image heights, below which the torso reads as seated
const SITTING_MAX_TORSO_HEIGHT: f64 = 0.3;

/// Body part indexing used by 17-keypoint pose models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    pub const ALL: [BodyPart; KEYPOINT_COUNT] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<BodyPart> {
        Self::ALL.get(idx).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct KeyPoint {
    pub id: u8,
    #[serde(flatten)]
    pub position: NormalizedPoint,
    pub confidence: f32,
}

impl KeyPoint {
    pub fn new(id: u8, position: NormalizedPoint, confidence: f32) -> KeyPoint {
        KeyPoint {
            id,
            position,
            confidence,
        }
    }

    pub fn part(&self) -> Option<BodyPart> {
        BodyPart::from_index(self.id as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseAction {
    Standing,
    Sitting,
    Raising,
    Unknown,
}

impl std::fmt::Display for PoseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoseAction::Standing => write!(f, "Standing"),
            PoseAction::Sitting => write!(f, "Sitting"),
            PoseAction::Raising => write!(f, "Raising hand"),
            PoseAction::Unknown => write!(f, "Unknown"),
        }
    }
}

// Keypoints are looked up by slice position. A missing entry reads as the origin, which
// can bias the result; it is kept that way so the cascade below stays total.
fn position_at(keypoints: &[KeyPoint], part: BodyPart) -> NormalizedPoint {
    keypoints
        .get(part.index())
        .map(|k| k.position)
        .unwrap_or(NormalizedPoint::ORIGIN)
}

/// Posture from wrist, shoulder and hip heights. Keypoint confidence is not consulted.
pub fn classify_action(keypoints: &[KeyPoint]) -> PoseAction {
    if keypoints.len() < KEYPOINT_COUNT {
        debug!(
            "Only {} of {KEYPOINT_COUNT} keypoints, action Unknown",
            keypoints.len()
        );
        return PoseAction::Unknown;
    }

    let left_shoulder = position_at(keypoints, BodyPart::LeftShoulder);
    let right_shoulder = position_at(keypoints, BodyPart::RightShoulder);
    let left_hip = position_at(keypoints, BodyPart::LeftHip);
    let right_hip = position_at(keypoints, BodyPart::RightHip);
    let left_wrist = position_at(keypoints, BodyPart::LeftWrist);
    let right_wrist = position_at(keypoints, BodyPart::RightWrist);

    // smaller y is higher up
    if left_wrist.y < left_shoulder.y || right_wrist.y < right_shoulder.y {
        trace!("Wrist above shoulder");
        return PoseAction::Raising;
    }

    let hip_y = (left_hip.y + right_hip.y) / 2.;
    let shoulder_y = (left_shoulder.y + right_shoulder.y) / 2.;
    let torso = (hip_y - shoulder_y).abs();
    trace!("Torso height {torso:.3}");

    if torso < SITTING_MAX_TORSO_HEIGHT {
        PoseAction::Sitting
    } else {
        PoseAction::Standing
    }
}

/// Average keypoint confidence, 0 for an empty set.
pub fn mean_confidence(keypoints: &[KeyPoint]) -> f32 {
    if keypoints.is_empty() {
        return 0.;
    }
    keypoints.iter().map(|k| k.confidence).sum::<f32>() / keypoints.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skeleton() -> Vec<KeyPoint> {
        (0..KEYPOINT_COUNT as u8)
            .map(|id| KeyPoint::new(id, NormalizedPoint::ORIGIN, 0.8))
            .collect()
    }

    fn set_y(keypoints: &mut [KeyPoint], part: BodyPart, y: f64) {
        keypoints[part.index()].position.y = y;
    }

    fn seated(hip_y: f64) -> Vec<KeyPoint> {
        let mut kps = skeleton();
        set_y(&mut kps, BodyPart::LeftShoulder, 0.3);
        set_y(&mut kps, BodyPart::RightShoulder, 0.3);
        set_y(&mut kps, BodyPart::LeftHip, hip_y);
        set_y(&mut kps, BodyPart::RightHip, hip_y);
        set_y(&mut kps, BodyPart::LeftWrist, 0.6);
        set_y(&mut kps, BodyPart::RightWrist, 0.6);
        kps
    }

    #[test]
    fn test_too_few_keypoints_is_unknown() {
        assert_eq!(classify_action(&[]), PoseAction::Unknown);

        let mut kps = seated(0.5);
        set_y(&mut kps, BodyPart::LeftWrist, 0.1);
        kps.truncate(KEYPOINT_COUNT - 1);
        assert_eq!(classify_action(&kps), PoseAction::Unknown);
    }

    #[test]
    fn test_raising_has_priority() {
        let mut kps = skeleton();
        set_y(&mut kps, BodyPart::LeftWrist, 0.1);
        set_y(&mut kps, BodyPart::LeftShoulder, 0.3);
        assert_eq!(classify_action(&kps), PoseAction::Raising);

        let mut kps = seated(0.5);
        set_y(&mut kps, BodyPart::RightWrist, 0.2);
        assert_eq!(classify_action(&kps), PoseAction::Raising);
    }

    #[test]
    fn test_sitting() {
        assert_eq!(classify_action(&seated(0.5)), PoseAction::Sitting);
    }

    #[test]
    fn test_standing() {
        assert_eq!(classify_action(&seated(0.7)), PoseAction::Standing);
    }

    #[test]
    fn test_wrist_level_with_shoulder_is_not_raising() {
        let mut kps = seated(0.7);
        set_y(&mut kps, BodyPart::LeftWrist, 0.3);
        set_y(&mut kps, BodyPart::RightWrist, 0.3);
        assert_eq!(classify_action(&kps), PoseAction::Standing);
    }

    #[test]
    fn test_confidence_is_ignored() {
        let mut kps = seated(0.5);
        kps.iter_mut().for_each(|k| k.confidence = 0.);
        assert_eq!(classify_action(&kps), PoseAction::Sitting);
    }

    #[test]
    fn test_extra_keypoints_are_ignored() {
        let mut kps = seated(0.7);
        kps.push(KeyPoint::new(17, NormalizedPoint::new(0.1, 0.0), 1.));
        assert_eq!(classify_action(&kps), PoseAction::Standing);
    }

    #[test]
    fn test_all_origin_is_sitting() {
        assert_eq!(classify_action(&skeleton()), PoseAction::Sitting);
    }

    #[test]
    fn test_position_at_missing_index_is_origin() {
        let kps = seated(0.5);
        assert_eq!(position_at(&kps[..3], BodyPart::LeftHip), NormalizedPoint::ORIGIN);
        assert_eq!(position_at(&kps, BodyPart::LeftHip).y, 0.5);
    }

    #[test]
    fn test_mean_confidence() {
        assert_eq!(mean_confidence(&[]), 0.);
        assert!((mean_confidence(&skeleton()) - 0.8).abs() < 1e-6);

        let kps = [
            KeyPoint::new(0, NormalizedPoint::ORIGIN, 0.2),
            KeyPoint::new(1, NormalizedPoint::ORIGIN, 0.6),
        ];
        assert!((mean_confidence(&kps) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_body_part_index() {
        for (idx, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(part.index(), idx);
            assert_eq!(BodyPart::from_index(idx), Some(*part));
        }
        assert_eq!(BodyPart::from_index(KEYPOINT_COUNT), None);
        assert_eq!(BodyPart::LeftWrist.index(), 9);
        assert_eq!(BodyPart::RightHip.index(), 12);
    }

    #[test]
    fn test_deserialize() -> crate::Result<()> {
        let kp: KeyPoint =
            serde_json::from_str(r#"{"id": 9, "x": 0.35, "y": 0.6, "confidence": 0.9}"#)?;
        assert_eq!(kp.part(), Some(BodyPart::LeftWrist));
        assert_eq!(kp.position, NormalizedPoint::new(0.35, 0.6));
        Ok(())
    }
}
