//! Pairwise image similarity
//!
//! Three independent measures are computed between two grayscale images and
//! folded into one weighted composite:
//! - `template`: maximum coefficient-normalized cross-correlation, about [-1, 1]
//! - `features`: cross-checked ORB descriptor matches, an unbounded sum
//! - `histogram`: correlation of 256-bin intensity histograms, in [-1, 1]
//!
//! The three ranges differ, so the composite is only comparable against other
//! composites produced with the same weights.
pub mod features;
pub mod histogram;
pub mod template;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::config::FeatureConfig;

pub use features::{aggregate_match_score, cross_check_match, FeatureMatch, FeatureSet, OrbExtractor};
pub use histogram::histogram_correlation;
pub use template::template_match;

/// Weights applied to the three measures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub template: f64,
    pub feature: f64,
    pub histogram: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            template: 0.4,
            feature: 0.3,
            histogram: 0.3,
        }
    }
}

impl SimilarityWeights {
    pub fn combine(&self, template: TemplateScore, feature: FeatureScore, histogram: HistogramScore) -> f64 {
        self.template * template.0 + self.feature * feature.0 + self.histogram * histogram.0
    }
}

/// Maximum normalized cross-correlation
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TemplateScore(pub f64);

/// Unnormalized aggregate match score
///
/// Sum of `1 - distance / 100` over cross-checked descriptor matches. It grows
/// with the number of matches, so many weak matches can outscore a few strong
/// ones. It is deliberately not squashed into [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FeatureScore(pub f64);

/// Histogram correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct HistogramScore(pub f64);

/// All three measures and their weighted sum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeScore {
    pub template: TemplateScore,
    pub feature: FeatureScore,
    pub histogram: HistogramScore,
    pub combined: f64,
}

/// An image with its descriptors computed once, for repeated comparisons
#[derive(Debug)]
pub struct PreparedImage<'a> {
    pub image: &'a GrayImage,
    pub features: FeatureSet,
}

/// Weighted three-measure scorer
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    weights: SimilarityWeights,
    extractor: OrbExtractor,
}

impl SimilarityScorer {
    pub fn new(weights: SimilarityWeights, features: &FeatureConfig) -> Self {
        Self {
            weights,
            extractor: OrbExtractor::new(features),
        }
    }

    pub fn weights(&self) -> &SimilarityWeights {
        &self.weights
    }

    /// Extract descriptors so the image can be scored against many others
    pub fn prepare<'a>(&self, image: &'a GrayImage) -> opencv::Result<PreparedImage<'a>> {
        let features = self.extractor.detect_and_compute(image)?;
        Ok(PreparedImage { image, features })
    }

    pub fn score(&self, first: &GrayImage, second: &GrayImage) -> opencv::Result<CompositeScore> {
        self.score_prepared(&self.prepare(first)?, &self.prepare(second)?)
    }

    pub fn score_prepared(
        &self,
        first: &PreparedImage<'_>,
        second: &PreparedImage<'_>,
    ) -> opencv::Result<CompositeScore> {
        let template = TemplateScore(template_match(first.image, second.image)?);

        let feature = if first.features.is_empty() || second.features.is_empty() {
            FeatureScore(0.0)
        } else {
            let matches = cross_check_match(&first.features.descriptors, &second.features.descriptors)?;
            FeatureScore(aggregate_match_score(&matches))
        };

        let histogram = HistogramScore(histogram_correlation(first.image, second.image));

        let combined = self.weights.combine(template, feature, histogram);
        tracing::debug!(
            "Similarity: template={:.4} feature={:.4} histogram={:.4} combined={:.4}",
            template.0,
            feature.0,
            histogram.0,
            combined
        );

        Ok(CompositeScore {
            template,
            feature,
            histogram,
            combined,
        })
    }
}
