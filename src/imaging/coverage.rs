//! Binary thresholding and white pixel coverage
use image::{GrayImage, Luma};
use rayon::prelude::*;

use super::region::Region;

/// Binarize: pixels strictly above `threshold` become 255, the rest 0
pub fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut binary = GrayImage::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255 } else { 0 };
        binary.put_pixel(x, y, Luma([value]));
    }

    binary
}

/// Percentage (0-100) of pixels inside `region` strictly above `threshold`
///
/// An empty region has no coverage and returns 0.0.
pub fn white_pixel_percentage(gray: &GrayImage, region: Region, threshold: u8) -> f64 {
    let region = Region::new(
        region.x.min(gray.width()),
        region.y.min(gray.height()),
        region.width.min(gray.width().saturating_sub(region.x)),
        region.height.min(gray.height().saturating_sub(region.y)),
    );
    if region.is_empty() {
        return 0.0;
    }

    let white_pixels: u64 = (region.y..region.y + region.height)
        .into_par_iter()
        .map(|y| {
            (region.x..region.x + region.width)
                .filter(|&x| gray.get_pixel(x, y)[0] > threshold)
                .count() as u64
        })
        .sum();

    let percentage = white_pixels as f64 / region.area() as f64 * 100.0;
    tracing::trace!(
        "Coverage: {} of {} pixels above {} ({:.2}%)",
        white_pixels,
        region.area(),
        threshold,
        percentage
    );

    percentage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::region::upper_half;

    #[test]
    fn test_binarize_is_strict() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([[126u8, 127, 128][x as usize]]));
        let binary = binarize(&gray, 127);

        assert_eq!(binary.get_pixel(0, 0)[0], 0);
        assert_eq!(binary.get_pixel(1, 0)[0], 0);
        assert_eq!(binary.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_black_image_has_no_coverage() {
        let gray = GrayImage::new(200, 200);
        assert_eq!(white_pixel_percentage(&gray, upper_half(200, 200), 127), 0.0);
    }

    #[test]
    fn test_coverage_counts_only_region() {
        // Top quarter white, rest black
        let gray = GrayImage::from_fn(100, 100, |_, y| Luma([if y < 25 { 255 } else { 0 }]));

        let upper = white_pixel_percentage(&gray, upper_half(100, 100), 127);
        assert!((upper - 50.0).abs() < 1e-9);

        let whole = white_pixel_percentage(&gray, Region::full(100, 100), 127);
        assert!((whole - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_region_is_zero() {
        let gray = GrayImage::from_pixel(10, 1, Luma([255]));
        // Upper half of a one-row image has no rows
        assert_eq!(white_pixel_percentage(&gray, upper_half(10, 1), 127), 0.0);
    }
}
