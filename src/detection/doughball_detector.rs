/// Doughball detector implementation
///
/// Looks for one light blob in a horizontal band across the middle of the
/// frame.
use image::GrayImage;

use super::detector::{DetectionContext, DetectionResult, Detector};
use crate::config::DoughballConfig;
use crate::imaging::{binarize, central_band, largest_blob, Blob, Region};

/// Doughball detector
pub struct DoughballDetector {
    band_height_ratio: f32,
    binarize_threshold: u8,
    min_blob_area: u32,
}

impl DoughballDetector {
    /// Create a new doughball detector
    pub fn new(config: &DoughballConfig) -> Self {
        Self {
            band_height_ratio: config.band_height_ratio,
            binarize_threshold: config.binarize_threshold,
            min_blob_area: config.min_blob_area,
        }
    }

    /// Largest light blob in the band, with bounds in frame coordinates
    pub fn largest_blob(&self, gray: &GrayImage) -> Option<Blob> {
        let band = central_band(gray.width(), gray.height(), self.band_height_ratio);
        let binary = binarize(&band.crop(gray), self.binarize_threshold);

        largest_blob(&binary).map(|blob| Blob {
            area: blob.area,
            bounds: Region::new(
                blob.bounds.x + band.x,
                blob.bounds.y + band.y,
                blob.bounds.width,
                blob.bounds.height,
            ),
        })
    }
}

impl Detector for DoughballDetector {
    fn detect(&self, context: &DetectionContext) -> DetectionResult {
        match self.largest_blob(&context.gray) {
            Some(blob) if blob.area > self.min_blob_area => {
                tracing::debug!("Doughball detected: area {} at {:?}", blob.area, blob.bounds);
                DetectionResult::Doughball {
                    area: blob.area,
                    bounds: blob.bounds,
                }
            }
            Some(blob) => {
                tracing::debug!(
                    "Largest blob too small: {} <= {} pixels",
                    blob.area,
                    self.min_blob_area
                );
                DetectionResult::NoMatch
            }
            None => DetectionResult::NoMatch,
        }
    }

    fn name(&self) -> &'static str {
        "DoughballDetector"
    }
}
