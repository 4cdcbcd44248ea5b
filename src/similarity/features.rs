//! ORB keypoints and cross-checked brute-force Hamming matching
//!
//! Keypoints are oriented FAST corners on a scale pyramid, ranked by Harris
//! response, each described by a 256-bit rotated BRIEF descriptor. Matching
//! keeps a pair only when each descriptor is the other's nearest neighbour.
use std::fmt;
use std::time::Instant;

use image::GrayImage;
use opencv::core::{DMatch, KeyPoint, Mat, Vector, NORM_HAMMING};
use opencv::features2d::{BFMatcher, ORB_ScoreType, ORB};
use opencv::prelude::*;

use crate::config::FeatureConfig;
use crate::imaging::gray_to_mat;

/// Mutually-nearest descriptor pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMatch {
    pub query: usize,
    pub train: usize,
    /// Hamming distance (0..=256)
    pub distance: f32,
}

/// Keypoints of one image and their descriptors, one row per keypoint
pub struct FeatureSet {
    pub keypoints: Vector<KeyPoint>,
    pub descriptors: Mat,
}

impl FeatureSet {
    pub fn empty() -> Self {
        Self {
            keypoints: Vector::new(),
            descriptors: Mat::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty() || self.descriptors.rows() == 0
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSet")
            .field("keypoints", &self.keypoints.len())
            .field("descriptor_rows", &self.descriptors.rows())
            .finish()
    }
}

/// ORB keypoint detector and descriptor extractor
#[derive(Debug, Clone)]
pub struct OrbExtractor {
    max_features: i32,
    scale_factor: f32,
    levels: i32,
    edge_threshold: i32,
    patch_size: i32,
    fast_threshold: i32,
}

impl OrbExtractor {
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            max_features: config.max_features,
            scale_factor: config.scale_factor,
            levels: config.levels,
            edge_threshold: config.edge_threshold,
            patch_size: config.patch_size,
            fast_threshold: config.fast_threshold,
        }
    }

    /// Detect keypoints and compute their descriptors
    pub fn detect_and_compute(&self, gray: &GrayImage) -> opencv::Result<FeatureSet> {
        if gray.width() == 0 || gray.height() == 0 {
            return Ok(FeatureSet::empty());
        }

        let t = Instant::now();
        let image = gray_to_mat(gray)?;
        let mut orb = ORB::create(
            self.max_features,
            self.scale_factor,
            self.levels,
            self.edge_threshold,
            0,
            2,
            ORB_ScoreType::HARRIS_SCORE,
            self.patch_size,
            self.fast_threshold,
        )?;

        let mut features = FeatureSet::empty();
        orb.detect_and_compute(
            &image,
            &Mat::default(),
            &mut features.keypoints,
            &mut features.descriptors,
            false,
        )?;

        tracing::trace!(
            "OrbExtractor: {} keypoints on {}x{} in {:?}",
            features.len(),
            gray.width(),
            gray.height(),
            t.elapsed()
        );

        Ok(features)
    }
}

/// Brute-force Hamming matching with cross-check
///
/// Takes descriptor matrices with one 32-byte row per keypoint. Matches are
/// returned sorted by distance; either side being empty gives no matches.
pub fn cross_check_match(query: &Mat, train: &Mat) -> opencv::Result<Vec<FeatureMatch>> {
    if query.rows() == 0 || train.rows() == 0 {
        return Ok(Vec::new());
    }

    let matcher = BFMatcher::create(NORM_HAMMING, true)?;
    let mut raw: Vector<DMatch> = Vector::new();
    matcher.train_match(query, train, &mut raw, &Mat::default())?;

    let mut matches: Vec<FeatureMatch> = raw
        .iter()
        .map(|m| FeatureMatch {
            query: m.query_idx as usize,
            train: m.train_idx as usize,
            distance: m.distance,
        })
        .collect();

    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Ok(matches)
}

/// Sum of `1 - distance / 100` over all matches
///
/// Not normalized: it grows with the number of matches, and a distance above
/// 100 contributes a negative amount.
pub fn aggregate_match_score(matches: &[FeatureMatch]) -> f64 {
    matches.iter().map(|m| 1.0 - m.distance as f64 / 100.0).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Deterministic blocky texture with plenty of corners
    fn texture(width: u32, height: u32, seed: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let cell = (x / 8).wrapping_mul(73_856_093) ^ (y / 8).wrapping_mul(19_349_663) ^ seed;
            let mixed = cell.wrapping_mul(2_654_435_761) >> 16;
            Luma([if mixed % 2 == 0 { 230 } else { 25 }])
        })
    }

    /// Descriptor matrix from raw 32-byte rows
    fn descriptors(rows: &[[u8; 32]]) -> Mat {
        let bytes: Vec<u8> = rows.iter().flatten().copied().collect();
        let image = GrayImage::from_raw(32, rows.len() as u32, bytes).unwrap();
        gray_to_mat(&image).unwrap()
    }

    fn extractor() -> OrbExtractor {
        OrbExtractor::new(&FeatureConfig::default())
    }

    #[test]
    fn test_texture_yields_keypoints() {
        let features = extractor().detect_and_compute(&texture(160, 160, 3)).unwrap();

        assert!(!features.is_empty());
        assert_eq!(features.len(), features.descriptors.rows() as usize);
        assert_eq!(features.descriptors.cols(), 32);
        assert!(features.len() <= 500);
    }

    #[test]
    fn test_flat_or_tiny_images_yield_nothing() {
        let flat = GrayImage::from_pixel(120, 120, Luma([90]));
        assert!(extractor().detect_and_compute(&flat).unwrap().is_empty());

        // Smaller than twice the 31 px border
        let tiny = texture(40, 40, 1);
        assert!(extractor().detect_and_compute(&tiny).unwrap().is_empty());

        assert!(extractor().detect_and_compute(&GrayImage::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_self_match_is_perfect() {
        let features = extractor().detect_and_compute(&texture(160, 160, 9)).unwrap();
        let matches = cross_check_match(&features.descriptors, &features.descriptors).unwrap();

        assert!(!matches.is_empty());
        assert!(matches.iter().all(|m| m.distance == 0.0));
        assert_eq!(aggregate_match_score(&matches), matches.len() as f64);
    }

    #[test]
    fn test_cross_check_requires_mutual_nearest() {
        let zero = [0u8; 32];
        let mut one_bit = [0u8; 32];
        one_bit[0] = 1;
        let mut two_bits = [0u8; 32];
        two_bits[0] = 3;

        // Both queries prefer `zero`, but `zero` only points back at the first
        let matches = cross_check_match(&descriptors(&[one_bit, two_bits]), &descriptors(&[zero])).unwrap();
        assert_eq!(
            matches,
            vec![FeatureMatch {
                query: 0,
                train: 0,
                distance: 1.0
            }]
        );
    }

    #[test]
    fn test_matches_are_sorted_by_distance() {
        let zeros = [0u8; 32];
        let ones = [0xffu8; 32];
        let mut three_bits = zeros;
        three_bits[0] = 0b111;
        let mut one_cleared = ones;
        one_cleared[0] = 0xfe;

        let matches = cross_check_match(&descriptors(&[zeros, ones]), &descriptors(&[three_bits, one_cleared])).unwrap();

        let pairs: Vec<_> = matches.iter().map(|m| (m.query, m.train, m.distance)).collect();
        assert_eq!(pairs, vec![(1, 1, 1.0), (0, 0, 3.0)]);
    }

    #[test]
    fn test_aggregate_score_is_unbounded() {
        let matches: Vec<FeatureMatch> = (0..40)
            .map(|i| FeatureMatch {
                query: i,
                train: i,
                distance: 10.0,
            })
            .collect();
        assert!((aggregate_match_score(&matches) - 36.0).abs() < 1e-9);

        let far = [FeatureMatch {
            query: 0,
            train: 0,
            distance: 150.0,
        }];
        assert!((aggregate_match_score(&far) + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        let one = descriptors(&[[0u8; 32]]);
        assert!(cross_check_match(&Mat::default(), &one).unwrap().is_empty());
        assert!(cross_check_match(&one, &Mat::default()).unwrap().is_empty());
        assert_eq!(aggregate_match_score(&[]), 0.0);
    }
}
