/// Detector trait and common types
///
/// Defines the interface for single-frame inspectors that need nothing but
/// the grayscale frame. The kicker check needs reference images as well and
/// runs through `KickerPipeline` instead.
use std::time::Instant;

use image::GrayImage;

use crate::imaging::Region;

/// Detection result from a detector
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    /// Doughball blob in the central band
    Doughball {
        /// Blob size in pixels
        area: u32,
        /// Blob bounding box in frame coordinates
        bounds: Region,
    },
    /// Nothing found
    NoMatch,
}

impl DetectionResult {
    pub fn is_match(&self) -> bool {
        !matches!(self, DetectionResult::NoMatch)
    }
}

/// Context passed to detectors
#[derive(Debug, Clone)]
pub struct DetectionContext {
    /// Frame converted to grayscale
    pub gray: GrayImage,
    /// Detection timestamp
    pub timestamp: Instant,
}

impl DetectionContext {
    /// Create a new detection context
    pub fn new(gray: GrayImage) -> Self {
        Self {
            gray,
            timestamp: Instant::now(),
        }
    }
}

/// Detector trait
///
/// Implement this trait to add another inspection to a frame.
pub trait Detector: Send + Sync {
    /// Inspect the frame in `context`
    fn detect(&self, context: &DetectionContext) -> DetectionResult;

    /// Get detector name (for logging)
    fn name(&self) -> &'static str;
}
