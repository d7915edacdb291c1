use super::PoseEstimator;
use crate::classify::KeyPoint;
use crate::error::{Error, Result};
use crate::shapes::NormalizedPoint;
use image::RgbImage;
use ndarray::{Array3, ArrayView3};
use tracing::{debug, span, Level};

/// A pose model that emits one heatmap channel per keypoint, shaped (K, H, W).
pub trait HeatmapModel {
    fn heatmaps(&self, img: &RgbImage) -> Result<Array3<f32>>;
}

/// Adapts a [`HeatmapModel`] into a [`PoseEstimator`].
pub struct HeatmapPose<M> {
    model: M,
}

impl<M: HeatmapModel> HeatmapPose<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: HeatmapModel> PoseEstimator for HeatmapPose<M> {
    fn estimate_pose(&self, img: &RgbImage) -> Result<Vec<KeyPoint>> {
        let span = span!(Level::DEBUG, "heatmap_pose");
        let _guard = span.enter();

        let heatmaps = self.model.heatmaps(img)?;
        decode_heatmaps(heatmaps.view())
    }
}

/// Peak of each channel becomes a keypoint. Position is the centre of the peak cell,
/// confidence the peak value clamped to [0, 1]. Ties go to the first cell in row order.
pub fn decode_heatmaps(heatmaps: ArrayView3<f32>) -> Result<Vec<KeyPoint>> {
    let (channels, height, width) = heatmaps.dim();
    if height == 0 || width == 0 {
        return Err(Error::Heatmap(format!(
            "{channels} channels of empty {width}x{height} maps"
        )));
    }
    if channels > u8::MAX as usize {
        return Err(Error::Heatmap(format!("{channels} channels")));
    }

    let mut keypoints = Vec::with_capacity(channels);
    for (id, channel) in heatmaps.outer_iter().enumerate() {
        let mut peak = ((0, 0), f32::NEG_INFINITY);
        for (idx, &v) in channel.indexed_iter() {
            if v > peak.1 {
                peak = (idx, v);
            }
        }

        let ((y, x), v) = peak;
        let position = NormalizedPoint::new(
            (x as f64 + 0.5) / width as f64,
            (y as f64 + 0.5) / height as f64,
        );
        let confidence = if v.is_finite() { v.clamp(0., 1.) } else { 0. };

        keypoints.push(KeyPoint::new(id as u8, position, confidence));
    }

    debug!("Decoded {} keypoints from {width}x{height} heatmaps", keypoints.len());
    Ok(keypoints)
}
