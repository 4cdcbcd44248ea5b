//! Edge map and straight-line detection
//!
//! Pipeline: 5x5 Gaussian blur -> Canny -> upper half -> Hough vote.
//! Only the number of lines is consumed downstream; the edge maps are kept so
//! the orientation check can reuse them.
use std::f64::consts::PI;
use std::time::Instant;

use image::GrayImage;
use opencv::core::{Mat, Size, Vec2f, Vector, BORDER_DEFAULT};
use opencv::imgproc;

use super::mat::{gray_to_mat, mat_to_gray};
use super::region::upper_half;
use crate::config::KickerConfig;

/// Accumulator resolution: 1 pixel and 1 degree
const HOUGH_RHO: f64 = 1.0;
const HOUGH_THETA: f64 = PI / 180.0;

/// Line in normal form: `x cos(theta) + y sin(theta) = rho`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarLine {
    pub rho: f32,
    /// Radians in [0, pi)
    pub theta: f32,
}

/// Result of edge and line detection on one frame
#[derive(Debug, Clone)]
pub struct EdgeLines {
    /// Canny edge map of the whole frame
    pub edges: GrayImage,
    /// Edge map restricted to the upper half (rows 0 .. height / 2)
    pub region_edges: GrayImage,
    pub line_count: usize,
}

/// Blur + Canny + Hough line counter with fixed, hand-tuned thresholds
#[derive(Debug, Clone)]
pub struct EdgeLineDetector {
    blur_kernel_size: i32,
    canny_low: f64,
    canny_high: f64,
    vote_threshold: i32,
}

impl EdgeLineDetector {
    pub fn new(config: &KickerConfig) -> Self {
        Self {
            // GaussianBlur needs an odd kernel
            blur_kernel_size: config.blur_kernel_size | 1,
            canny_low: config.canny_low,
            canny_high: config.canny_high,
            vote_threshold: config.hough_vote_threshold,
        }
    }

    /// Canny edge map of a grayscale frame
    ///
    /// The blur sigma is derived from the kernel size, so a 5x5 kernel
    /// smooths with sigma 1.1. Canny uses a 3x3 Sobel aperture and the L1
    /// gradient norm.
    pub fn edge_map(&self, gray: &GrayImage) -> opencv::Result<GrayImage> {
        if gray.width() == 0 || gray.height() == 0 {
            return Ok(GrayImage::new(gray.width(), gray.height()));
        }

        let frame = gray_to_mat(gray)?;
        let mut blurred = Mat::default();
        imgproc::gaussian_blur(
            &frame,
            &mut blurred,
            Size::new(self.blur_kernel_size, self.blur_kernel_size),
            0.0,
            0.0,
            BORDER_DEFAULT,
        )?;

        let mut edges = Mat::default();
        imgproc::canny(&blurred, &mut edges, self.canny_low, self.canny_high, 3, false)?;
        mat_to_gray(&edges)
    }

    /// Straight lines in an edge map
    pub fn lines(&self, edges: &GrayImage) -> opencv::Result<Vec<PolarLine>> {
        if edges.width() == 0 || edges.height() == 0 {
            return Ok(Vec::new());
        }

        let edges = gray_to_mat(edges)?;
        let mut lines: Vector<Vec2f> = Vector::new();
        imgproc::hough_lines(
            &edges,
            &mut lines,
            HOUGH_RHO,
            HOUGH_THETA,
            self.vote_threshold,
            0.0,
            0.0,
            0.0,
            PI,
        )?;

        Ok(lines
            .iter()
            .map(|line| PolarLine {
                rho: line[0],
                theta: line[1],
            })
            .collect())
    }

    /// Full detection: edges for the whole frame, lines in the upper half only
    pub fn detect_lines(&self, gray: &GrayImage) -> opencv::Result<EdgeLines> {
        let t = Instant::now();

        let edges = self.edge_map(gray)?;
        let region_edges = upper_half(edges.width(), edges.height()).crop(&edges);
        let lines = self.lines(&region_edges)?;

        for line in &lines {
            tracing::trace!("Line: rho={:.1}, theta={:.1}°", line.rho, line.theta.to_degrees());
        }
        tracing::debug!(
            "EdgeLineDetector: {} lines (vote threshold {}) in {:?}",
            lines.len(),
            self.vote_threshold,
            t.elapsed()
        );

        Ok(EdgeLines {
            edges,
            region_edges,
            line_count: lines.len(),
        })
    }
}
