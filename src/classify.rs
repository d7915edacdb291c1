//! Label decisions over inference output.
//!
//! Every classifier here is a pure function of its input: no state, no I/O, safe to call
//! from any number of threads at once.

pub mod emotion;
pub mod pose;
pub mod sentiment;

pub use emotion::{Emotion, FaceFeature, FaceLandmarks, FaceMeasurements, classify_emotion};
pub use pose::{BodyPart, KeyPoint, PoseAction, classify_action, mean_confidence};
pub use sentiment::{SentimentLabel, classify_sentiment};
