use std::fmt;
use std::time::Instant;

use image::imageops::{self, FilterType};
use image::GrayImage;

use super::{OrientationMethod, ReferenceLabel, ReferenceSet};
use crate::config::{FeatureConfig, OrientationConfig};
use crate::error::InspectionError;
use crate::imaging::extract_central_region;
use crate::similarity::{CompositeScore, SimilarityScorer};

/// Score of the candidate against one reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchScore {
    /// Higher is more similar
    Composite(CompositeScore),
    /// Sum of absolute differences; lower is more similar
    AbsDiff(u64),
}

impl MatchScore {
    pub fn value(&self) -> f64 {
        match self {
            MatchScore::Composite(score) => score.combined,
            MatchScore::AbsDiff(sad) => *sad as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceComparison {
    pub label: ReferenceLabel,
    pub score: MatchScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationVerdict {
    /// Best match is a correctly oriented reference
    Valid(ReferenceLabel),
    /// Best match is an incorrectly oriented reference
    Invalid(ReferenceLabel),
    /// No reference scored above the match threshold
    NoClearMatch,
}

impl OrientationVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, OrientationVerdict::Valid(_))
    }
}

impl fmt::Display for OrientationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationVerdict::Valid(label) => {
                write!(f, "Kicker is in valid orientation (matched with {}).", label)
            }
            OrientationVerdict::Invalid(label) => {
                write!(f, "Kicker is in invalid orientation (matched with {}).", label)
            }
            OrientationVerdict::NoClearMatch => {
                write!(f, "No clear valid match, kicker might be in invalid orientation.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationReport {
    /// One entry per reference, in label order
    pub comparisons: Vec<ReferenceComparison>,
    pub best: ReferenceComparison,
    pub verdict: OrientationVerdict,
}

impl OrientationReport {
    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }
}

/// Picks the reference that best matches a candidate region
pub struct OrientationClassifier {
    method: OrientationMethod,
    band_width_ratio: f32,
    band_height_ratio: f32,
    match_threshold: f64,
    scorer: SimilarityScorer,
}

impl OrientationClassifier {
    pub fn new(config: &OrientationConfig, features: &FeatureConfig) -> Self {
        Self {
            method: config.method,
            band_width_ratio: config.band_width_ratio,
            band_height_ratio: config.band_height_ratio,
            match_threshold: config.match_threshold,
            scorer: SimilarityScorer::new(config.weights, features),
        }
    }

    pub fn method(&self) -> OrientationMethod {
        self.method
    }

    pub fn classify(
        &self,
        candidate: &GrayImage,
        references: &ReferenceSet,
    ) -> Result<OrientationReport, InspectionError> {
        let t = Instant::now();

        let report = match self.method {
            OrientationMethod::Composite => self.classify_composite(candidate, references)?,
            OrientationMethod::AbsDiff => classify_abs_diff(candidate, references),
        };

        tracing::debug!(
            "OrientationClassifier ({:?}): best {} = {:.4}, verdict {:?} in {:?}",
            self.method,
            report.best.label,
            report.best.score.value(),
            report.verdict,
            t.elapsed()
        );

        Ok(report)
    }

    fn central_band(&self, image: &GrayImage) -> GrayImage {
        extract_central_region(
            image.width(),
            image.height(),
            self.band_width_ratio,
            self.band_height_ratio,
        )
        .crop(image)
    }

    fn classify_composite(
        &self,
        candidate: &GrayImage,
        references: &ReferenceSet,
    ) -> opencv::Result<OrientationReport> {
        let candidate_band = self.central_band(candidate);
        let prepared_candidate = self.scorer.prepare(&candidate_band)?;

        let comparisons = references
            .iter()
            .map(|(label, reference)| {
                let reference_band = self.central_band(reference);
                let prepared_reference = self.scorer.prepare(&reference_band)?;
                let score = self.scorer.score_prepared(&prepared_candidate, &prepared_reference)?;
                Ok(ReferenceComparison {
                    label,
                    score: MatchScore::Composite(score),
                })
            })
            .collect::<opencv::Result<Vec<_>>>()?;

        // First maximum wins
        let best = select(&comparisons, |candidate, best| candidate > best);

        let verdict = if best.score.value() > self.match_threshold {
            if best.label.is_valid() {
                OrientationVerdict::Valid(best.label)
            } else {
                OrientationVerdict::Invalid(best.label)
            }
        } else {
            OrientationVerdict::NoClearMatch
        };

        Ok(OrientationReport {
            comparisons,
            best,
            verdict,
        })
    }
}

/// Lowest sum of absolute differences wins; there is no threshold
fn classify_abs_diff(candidate: &GrayImage, references: &ReferenceSet) -> OrientationReport {
    let comparisons: Vec<ReferenceComparison> = references
        .iter()
        .map(|(label, reference)| ReferenceComparison {
            label,
            score: MatchScore::AbsDiff(absolute_difference(candidate, reference)),
        })
        .collect();

    let best = select(&comparisons, |candidate, best| candidate < best);
    let verdict = if best.label.is_valid() {
        OrientationVerdict::Valid(best.label)
    } else {
        OrientationVerdict::Invalid(best.label)
    };

    OrientationReport {
        comparisons,
        best,
        verdict,
    }
}

/// Sum of absolute differences after resizing the candidate to the reference
fn absolute_difference(candidate: &GrayImage, reference: &GrayImage) -> u64 {
    let (width, height) = reference.dimensions();
    if width == 0 || height == 0 || candidate.width() == 0 || candidate.height() == 0 {
        return 0;
    }

    let resized;
    let candidate = if candidate.dimensions() == reference.dimensions() {
        candidate
    } else {
        resized = imageops::resize(candidate, width, height, FilterType::Triangle);
        &resized
    };

    candidate
        .as_raw()
        .iter()
        .zip(reference.as_raw())
        .map(|(&a, &b)| a.abs_diff(b) as u64)
        .sum()
}

/// Scan in label order, replacing the best only on a strict improvement
fn select(comparisons: &[ReferenceComparison], better: impl Fn(f64, f64) -> bool) -> ReferenceComparison {
    let mut best = comparisons[0];
    for comparison in &comparisons[1..] {
        if better(comparison.score.value(), best.score.value()) {
            best = *comparison;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn pattern(seed: u32) -> GrayImage {
        GrayImage::from_fn(120, 100, |x, y| {
            let cell = (x / 10) * 7 + (y / 10) * 13 + seed;
            Luma([if cell % 3 == 0 { 240 } else { 20 }])
        })
    }

    /// 8 px cells hashed to dark or light, rich in ORB corners
    fn texture(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let cell = (x / 8).wrapping_mul(73_856_093) ^ (y / 8).wrapping_mul(19_349_663);
            Luma([if (cell.wrapping_mul(2_654_435_761) >> 16) % 2 == 0 { 230 } else { 25 }])
        })
    }

    fn classifier(config: OrientationConfig) -> OrientationClassifier {
        OrientationClassifier::new(&config, &FeatureConfig::default())
    }

    #[test]
    fn test_identical_references_tie_to_first_label() {
        let candidate = pattern(0);
        let references = ReferenceSet::new([
            candidate.clone(),
            candidate.clone(),
            candidate.clone(),
            candidate.clone(),
        ]);

        let report = classifier(OrientationConfig::default())
            .classify(&candidate, &references)
            .unwrap();

        assert_eq!(report.comparisons.len(), 4);
        let first = report.comparisons[0].score.value();
        assert!(report.comparisons.iter().all(|c| c.score.value() == first));
        assert_eq!(report.best.label, ReferenceLabel::ValidClean);
    }

    #[test]
    fn test_feature_matches_clear_the_default_threshold() {
        // The 180x320 band leaves room for keypoints inside the 31 px border
        let candidate = texture(600, 400);
        let references = ReferenceSet::new([
            candidate.clone(),
            candidate.clone(),
            candidate.clone(),
            candidate.clone(),
        ]);

        let report = classifier(OrientationConfig::default())
            .classify(&candidate, &references)
            .unwrap();

        let scores: Vec<CompositeScore> = report
            .comparisons
            .iter()
            .map(|c| match c.score {
                MatchScore::Composite(score) => score,
                MatchScore::AbsDiff(_) => panic!("expected composite scores"),
            })
            .collect();
        assert!(scores[0].feature.0 > 0.0, "feature = {}", scores[0].feature.0);
        assert!(scores.iter().all(|score| score.combined == scores[0].combined));

        assert!(report.best.score.value() > 10.0, "best = {}", report.best.score.value());
        assert_eq!(report.best.label, ReferenceLabel::ValidClean);
        assert_eq!(report.verdict, OrientationVerdict::Valid(ReferenceLabel::ValidClean));
    }

    #[test]
    fn test_threshold_gates_the_verdict() {
        let candidate = pattern(1);
        let flat = |value| GrayImage::from_pixel(120, 100, Luma([value]));
        let references = ReferenceSet::new([flat(255), flat(0), candidate.clone(), flat(128)]);

        let mut config = OrientationConfig::default();
        config.match_threshold = f64::MAX;
        let report = classifier(config.clone()).classify(&candidate, &references).unwrap();
        assert_eq!(report.verdict, OrientationVerdict::NoClearMatch);
        assert!(!report.is_valid());

        config.match_threshold = f64::MIN;
        let report = classifier(config).classify(&candidate, &references).unwrap();
        assert_eq!(report.best.label, ReferenceLabel::InvalidClean);
        assert_eq!(report.verdict, OrientationVerdict::Invalid(ReferenceLabel::InvalidClean));
    }

    #[test]
    fn test_abs_diff_picks_closest_reference() {
        let candidate = pattern(5);
        let references = ReferenceSet::new([
            GrayImage::from_pixel(120, 100, Luma([255])),
            candidate.clone(),
            GrayImage::from_pixel(120, 100, Luma([0])),
            pattern(6),
        ]);

        let mut config = OrientationConfig::default();
        config.method = OrientationMethod::AbsDiff;
        let report = classifier(config).classify(&candidate, &references).unwrap();

        assert_eq!(report.best.score, MatchScore::AbsDiff(0));
        assert_eq!(report.verdict, OrientationVerdict::Valid(ReferenceLabel::ValidNoisy));
    }

    #[test]
    fn test_abs_diff_resizes_candidate() {
        let small = GrayImage::from_pixel(30, 20, Luma([100]));
        let reference = GrayImage::from_pixel(60, 40, Luma([110]));
        assert_eq!(absolute_difference(&small, &reference), 60 * 40 * 10);
    }

    #[test]
    fn test_verdict_messages() {
        assert_eq!(
            OrientationVerdict::Valid(ReferenceLabel::ValidClean).to_string(),
            "Kicker is in valid orientation (matched with clean valid ROI)."
        );
        assert_eq!(
            OrientationVerdict::NoClearMatch.to_string(),
            "No clear valid match, kicker might be in invalid orientation."
        );
    }
}
