//! Labels for on-device perception output.
//!
//! Inference services (face landmarks, text recognition, pose heatmaps, sentiment scoring)
//! sit behind the traits in [`inference`]. Their output is turned into labels by the pure
//! classifiers in [`classify`], wired together by [`pipeline::Pipeline`], and drawn back onto
//! the image by [`overlay::Overlay`].

pub mod classify;
pub mod error;
pub mod inference;
pub mod overlay;
pub mod pipeline;
pub mod shapes;

pub use error::{Error, Result};
