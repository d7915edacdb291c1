pub mod group;
pub mod point;
pub mod rect;

pub use group::{Axis, LandmarkGroup, mean, spread};
pub use point::{NormalizedPoint, angle};
pub use rect::{NormalizedRect, PixelRect};
