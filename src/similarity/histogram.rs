//! Grayscale histogram correlation
use image::GrayImage;
use opencv::core::{self, Mat, Scalar, Vector, CV_32F, NORM_L2};
use opencv::imgproc::{self, HISTCMP_CORREL};
use opencv::prelude::*;

use crate::imaging::gray_to_mat;

const BINS: i32 = 256;

/// 256-bin intensity histogram scaled to unit L2 norm, as a 256x1 float matrix
pub fn normalized_histogram(gray: &GrayImage) -> opencv::Result<Mat> {
    if gray.width() == 0 || gray.height() == 0 {
        return Mat::new_rows_cols_with_default(BINS, 1, CV_32F, Scalar::all(0.0));
    }

    let mut images: Vector<Mat> = Vector::new();
    images.push(gray_to_mat(gray)?);

    let mut histogram = Mat::default();
    imgproc::calc_hist(
        &images,
        &Vector::from_slice(&[0]),
        &Mat::default(),
        &mut histogram,
        &Vector::from_slice(&[BINS]),
        &Vector::from_slice(&[0.0f32, 256.0]),
        false,
    )?;

    let mut normalized = Mat::default();
    core::normalize(&histogram, &mut normalized, 1.0, 0.0, NORM_L2, -1, &Mat::default())?;
    Ok(normalized)
}

/// Pearson correlation between the two images' histograms, in [-1, 1]
///
/// When the correlation is undefined because a histogram has no variance,
/// 1.0 is returned.
pub fn histogram_correlation(first: &GrayImage, second: &GrayImage) -> opencv::Result<f64> {
    let h1 = normalized_histogram(first)?;
    let h2 = normalized_histogram(second)?;
    imgproc::compare_hist(&h1, &h2, HISTCMP_CORREL)
}
