use serde::Deserialize;

/// Position relative to image width (x) and height (y), both in [0, 1], y pointing down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const ORIGIN: NormalizedPoint = NormalizedPoint { x: 0., y: 0. };

    pub fn new(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint { x, y }
    }

    /// Pixel coordinates of this point on an image of the given size.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32) {
        (
            (self.x * width as f64) as f32,
            (self.y * height as f64) as f32,
        )
    }

    pub fn angle_to(&self, other: &NormalizedPoint) -> f64 {
        angle(self, other)
    }
}

/// Signed angle in radians, in (-pi, pi], of the segment from `p1` to `p2`.
pub fn angle(p1: &NormalizedPoint, p2: &NormalizedPoint) -> f64 {
    (p2.y - p1.y).atan2(p2.x - p1.x)
}
