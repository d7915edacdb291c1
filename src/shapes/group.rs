use super::point::NormalizedPoint;
use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(&self, p: &NormalizedPoint) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }
}

/// Contour of one facial feature. Point order is whatever the detector produced and is
/// significant: the mouth classifier indexes into it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct LandmarkGroup {
    pub points: Vec<NormalizedPoint>,
}

impl LandmarkGroup {
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn spread(&self, axis: Axis) -> Result<f64> {
        spread(&self.points, axis)
    }

    pub fn mean(&self, axis: Axis) -> Result<f64> {
        mean(&self.points, axis)
    }
}

impl From<Vec<NormalizedPoint>> for LandmarkGroup {
    fn from(points: Vec<NormalizedPoint>) -> Self {
        Self::new(points)
    }
}

/// max - min of one axis over the points.
pub fn spread(points: &[NormalizedPoint], axis: Axis) -> Result<f64> {
    let first = points.first().ok_or(Error::EmptyInput("spread"))?;
    let first = axis.of(first);

    let (min, max) = points.iter().map(|p| axis.of(p)).fold((first, first), |(min, max), v| {
        (min.min(v), max.max(v))
    });

    Ok(max - min)
}

pub fn mean(points: &[NormalizedPoint], axis: Axis) -> Result<f64> {
    if points.is_empty() {
        return Err(Error::EmptyInput("mean"));
    }

    let sum: f64 = points.iter().map(|p| axis.of(p)).sum();
    Ok(sum / points.len() as f64)
}
