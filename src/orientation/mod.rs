//! Labelled reference images and orientation classification
//!
//! A kicker region is compared against four reference regions: a clean and a
//! noisy example of a correctly oriented kicker, and the same pair for an
//! incorrectly oriented one.
pub mod classifier;

use std::fmt;
use std::path::{Path, PathBuf};

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::error::InspectionError;
use crate::imaging;

pub use classifier::{MatchScore, OrientationClassifier, OrientationReport, OrientationVerdict, ReferenceComparison};

/// Which reference an image is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceLabel {
    ValidClean,
    ValidNoisy,
    InvalidClean,
    InvalidNoisy,
}

impl ReferenceLabel {
    /// Comparison order; ties between scores resolve to the earliest label
    pub const ALL: [ReferenceLabel; 4] = [
        ReferenceLabel::ValidClean,
        ReferenceLabel::ValidNoisy,
        ReferenceLabel::InvalidClean,
        ReferenceLabel::InvalidNoisy,
    ];

    pub fn index(self) -> usize {
        match self {
            ReferenceLabel::ValidClean => 0,
            ReferenceLabel::ValidNoisy => 1,
            ReferenceLabel::InvalidClean => 2,
            ReferenceLabel::InvalidNoisy => 3,
        }
    }

    /// True for the two correctly oriented references
    pub fn is_valid(self) -> bool {
        matches!(self, ReferenceLabel::ValidClean | ReferenceLabel::ValidNoisy)
    }

    pub fn description(self) -> &'static str {
        match self {
            ReferenceLabel::ValidClean => "clean valid ROI",
            ReferenceLabel::ValidNoisy => "noisy valid ROI",
            ReferenceLabel::InvalidClean => "clean invalid ROI",
            ReferenceLabel::InvalidNoisy => "noisy invalid ROI",
        }
    }
}

impl fmt::Display for ReferenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// How the candidate is compared with the references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMethod {
    /// Weighted template/feature/histogram score, highest wins above a threshold
    #[default]
    Composite,
    /// Sum of absolute pixel differences, lowest wins
    AbsDiff,
}

/// Which upper-half image is used as the orientation candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Canny edge map
    #[default]
    Edges,
    Grayscale,
}

/// Locations of the four reference images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePaths {
    pub valid_clean: PathBuf,
    pub valid_noisy: PathBuf,
    pub invalid_clean: PathBuf,
    pub invalid_noisy: PathBuf,
}

impl Default for ReferencePaths {
    fn default() -> Self {
        Self::in_dir(Path::new("Reference_Imgs"))
    }
}

impl ReferencePaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            valid_clean: dir.join("valid clean roi.jpg"),
            valid_noisy: dir.join("valid noisy roi.jpg"),
            invalid_clean: dir.join("invalid clean roi.jpg"),
            invalid_noisy: dir.join("invalid noisy roi.jpg"),
        }
    }

    pub fn path(&self, label: ReferenceLabel) -> &Path {
        match label {
            ReferenceLabel::ValidClean => &self.valid_clean,
            ReferenceLabel::ValidNoisy => &self.valid_noisy,
            ReferenceLabel::InvalidClean => &self.invalid_clean,
            ReferenceLabel::InvalidNoisy => &self.invalid_noisy,
        }
    }
}

/// The four reference images, in label order
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    images: [GrayImage; 4],
}

impl ReferenceSet {
    pub fn new(images: [GrayImage; 4]) -> Self {
        Self { images }
    }

    /// Load every reference as grayscale; the first unreadable one fails the set
    pub fn load(paths: &ReferencePaths) -> Result<Self, InspectionError> {
        let [a, b, c, d] = ReferenceLabel::ALL;
        Ok(Self::new([
            load_reference(paths, a)?,
            load_reference(paths, b)?,
            load_reference(paths, c)?,
            load_reference(paths, d)?,
        ]))
    }

    pub fn get(&self, label: ReferenceLabel) -> &GrayImage {
        &self.images[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ReferenceLabel, &GrayImage)> {
        ReferenceLabel::ALL.into_iter().map(move |label| (label, self.get(label)))
    }
}

fn load_reference(paths: &ReferencePaths, label: ReferenceLabel) -> Result<GrayImage, InspectionError> {
    imaging::load_gray(paths.path(label)).map_err(|err| match err {
        InspectionError::ImageLoad { path, source } => InspectionError::ReferenceLoad {
            label: label.description().to_string(),
            path,
            source,
        },
        other => other,
    })
}
