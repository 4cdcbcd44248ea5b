//! Image loading and low-level frame analysis
//!
//! The module is split into focused submodules:
//! - `region`: proportional crops (central region, upper half, central band)
//! - `edges`: blur, Canny edges and Hough line counting
//! - `coverage`: binary thresholding and white pixel percentage
//! - `blobs`: connected-component analysis of binary bands
//! - `mat`: copies to and from OpenCV matrices
//!
//! Every stage takes a borrowed `GrayImage` and produces a new buffer or a
//! scalar, so a loaded frame is never mutated.
pub mod blobs;
pub mod coverage;
pub mod edges;
pub mod mat;
pub mod region;

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::InspectionError;

pub use blobs::{largest_blob, Blob};
pub use coverage::{binarize, white_pixel_percentage};
pub use edges::{EdgeLineDetector, EdgeLines, PolarLine};
pub use mat::{gray_to_mat, mat_to_gray};
pub use region::{central_band, extract_central_region, upper_half, Region};

/// Load an image from disk, keeping its color channels
pub fn load_color(path: &Path) -> Result<DynamicImage, InspectionError> {
    let image = image::open(path).map_err(|source| InspectionError::ImageLoad {
        path: path.display().to_string(),
        source,
    })?;

    tracing::debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    Ok(image)
}

/// Load an image from disk as 8-bit grayscale
pub fn load_gray(path: &Path) -> Result<GrayImage, InspectionError> {
    load_color(path).map(|image| to_grayscale(&image))
}

/// Convert any decoded image to 8-bit grayscale
///
/// Uses the standard luma weights 0.299*R + 0.587*G + 0.114*B in fixed point,
/// rounded to nearest. Single-channel sources come back unchanged.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => rgb_to_grayscale(&other.to_rgb8()),
    }
}

fn rgb_to_grayscale(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        // Fixed-point: (77*R + 150*G + 29*B) / 256, rounded
        let value = (77 * pixel[0] as u32 + 150 * pixel[1] as u32 + 29 * pixel[2] as u32 + 128) >> 8;
        gray.put_pixel(x, y, Luma([value as u8]));
    }

    gray
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_rgb_to_grayscale() {
        let mut img = RgbImage::new(5, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0])); // Red
        img.put_pixel(1, 0, Rgb([0, 255, 0])); // Green
        img.put_pixel(2, 0, Rgb([0, 0, 255])); // Blue
        img.put_pixel(3, 0, Rgb([255, 255, 255])); // White
        img.put_pixel(4, 0, Rgb([0, 0, 0])); // Black

        let gray = to_grayscale(&DynamicImage::ImageRgb8(img));

        assert_eq!(gray.get_pixel(0, 0)[0], 77);
        assert_eq!(gray.get_pixel(1, 0)[0], 149);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
        assert_eq!(gray.get_pixel(3, 0)[0], 255);
        assert_eq!(gray.get_pixel(4, 0)[0], 0);
    }

    #[test]
    fn test_conversion_rounds_to_nearest() {
        // 77*128 + 150*128 + 29*127 = 32739 and 32739 / 256 = 127.9
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([128, 128, 127]));
        img.put_pixel(1, 0, Rgb([100, 100, 100]));

        let gray = to_grayscale(&DynamicImage::ImageRgb8(img));
        // Lands above the 127 binarize threshold
        assert_eq!(gray.get_pixel(0, 0)[0], 128);
        assert_eq!(gray.get_pixel(1, 0)[0], 100);
    }

    #[test]
    fn test_gray_source_is_unchanged() {
        let gray = GrayImage::from_fn(4, 4, |x, y| Luma([(x * 60 + y) as u8]));
        let converted = to_grayscale(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_gray(Path::new("definitely/not/here.png"));
        assert!(matches!(result, Err(InspectionError::ImageLoad { .. })));
    }
}
