/// Kicker inspection pipeline
///
/// Coordinates loading, presence detection and orientation checking.
use std::path::Path;
use std::time::Instant;

use image::GrayImage;

use super::kicker_detector::{KickerDetector, Presence, PresenceReport};
use crate::config::Config;
use crate::error::InspectionError;
use crate::imaging;
use crate::orientation::{CandidateSource, OrientationClassifier, OrientationReport, ReferencePaths, ReferenceSet};

/// Everything the pipeline found out about one frame
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub presence: PresenceReport,
    /// Only set when a kicker was present
    pub orientation: Option<OrientationReport>,
}

impl PipelineOutcome {
    /// Kicker present and matched to a correctly oriented reference
    pub fn is_valid(&self) -> bool {
        self.orientation.as_ref().map_or(false, OrientationReport::is_valid)
    }
}

/// Kicker pipeline
///
/// Orchestrates the full inspection:
/// 1. Load the frame as grayscale
/// 2. Decide presence from lines and coverage
/// 3. Load the references and classify orientation
pub struct KickerPipeline {
    detector: KickerDetector,
    classifier: OrientationClassifier,
    candidate_source: CandidateSource,
}

impl KickerPipeline {
    /// Create a new pipeline from the full configuration
    pub fn new(config: &Config) -> Self {
        Self {
            detector: KickerDetector::new(&config.kicker),
            classifier: OrientationClassifier::new(&config.orientation, &config.features),
            candidate_source: config.orientation.candidate_source,
        }
    }

    /// Run the pipeline on an image file
    pub fn run(&self, image_path: &Path, references: &ReferencePaths) -> Result<PipelineOutcome, InspectionError> {
        let gray = imaging::load_gray(image_path)?;
        self.inspect(&gray, references)
    }

    /// Run the pipeline on an already loaded frame
    pub fn inspect(&self, gray: &GrayImage, references: &ReferencePaths) -> Result<PipelineOutcome, InspectionError> {
        if gray.width() == 0 || gray.height() == 0 {
            return Err(InspectionError::EmptyImage {
                width: gray.width(),
                height: gray.height(),
            });
        }

        let t = Instant::now();
        let presence = self.detector.assess(gray)?;

        let orientation = match &presence.presence {
            Presence::Absent { reason } => {
                tracing::info!("No kicker detected ({:?})", reason);
                None
            }
            Presence::Present { region, region_edges, .. } => {
                // References are reloaded for every frame
                let reference_set = ReferenceSet::load(references)?;
                let report = match self.candidate_source {
                    CandidateSource::Edges => self.classifier.classify(region_edges, &reference_set)?,
                    CandidateSource::Grayscale => self.classifier.classify(&region.crop(gray), &reference_set)?,
                };
                Some(report)
            }
        };

        let outcome = PipelineOutcome { presence, orientation };
        tracing::info!(
            "Kicker pipeline finished in {:?}: valid = {}",
            t.elapsed(),
            outcome.is_valid()
        );

        Ok(outcome)
    }
}
