//! Visual inspection of production-line frames
//!
//! - `detection`: kicker presence and orientation pipeline, doughball detector
//! - `orientation`: comparison against labelled reference images
//! - `similarity`: template, feature and histogram measures
//! - `imaging`: loading, crops, edges, coverage and blobs
//! - `classifier`: ONNX frame classifier
pub mod classifier;
pub mod config;
pub mod detection;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod orientation;
pub mod similarity;

pub use config::Config;
pub use error::{AppResult, ClassifierError, ConfigError, InspectionError};
