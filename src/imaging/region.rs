//! Proportional region-of-interest extraction
use image::{imageops, GrayImage};

/// Rectangular sub-area of a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Whole-image region
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Copy the region's pixels out of `image`
    ///
    /// The region is clamped to the image bounds, so a region computed for a
    /// differently sized image never reads out of range.
    pub fn crop(&self, image: &GrayImage) -> GrayImage {
        let x = self.x.min(image.width());
        let y = self.y.min(image.height());
        let width = self.width.min(image.width() - x);
        let height = self.height.min(image.height() - y);

        imageops::crop_imm(image, x, y, width, height).to_image()
    }
}

/// Centered rectangle covering `width_ratio` x `height_ratio` of the source
///
/// Extents are truncated to integers and the origin is
/// `((width - central_width) / 2, (height - central_height) / 2)`.
pub fn extract_central_region(width: u32, height: u32, width_ratio: f32, height_ratio: f32) -> Region {
    let central_width = scaled(width, width_ratio);
    let central_height = scaled(height, height_ratio);

    Region::new(
        (width - central_width) / 2,
        (height - central_height) / 2,
        central_width,
        central_height,
    )
}

/// Rows `0 .. height / 2` across the full width
pub fn upper_half(width: u32, height: u32) -> Region {
    Region::new(0, 0, width, height / 2)
}

/// Full-width horizontal band of `height_ratio` rows, vertically centered
pub fn central_band(width: u32, height: u32, height_ratio: f32) -> Region {
    let band_height = scaled(height, height_ratio);
    Region::new(0, (height - band_height) / 2, width, band_height)
}

fn scaled(extent: u32, ratio: f32) -> u32 {
    let ratio = ratio.clamp(0.0, 1.0) as f64;
    ((extent as f64 * ratio).floor() as u32).min(extent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_central_region_dimensions_and_origin() {
        let region = extract_central_region(200, 100, 0.3, 0.8);
        assert_eq!(region, Region::new(70, 10, 60, 80));

        // floor(101 * 0.3) = 30, floor(57 * 0.8) = 45
        let region = extract_central_region(101, 57, 0.3, 0.8);
        assert_eq!(region.width, 30);
        assert_eq!(region.height, 45);
        assert_eq!(region.x, (101 - 30) / 2);
        assert_eq!(region.y, (57 - 45) / 2);
    }

    #[test]
    fn test_central_region_stays_in_bounds() {
        for (w, h) in [(1, 1), (3, 7), (640, 480), (17, 1000)] {
            let region = extract_central_region(w, h, 0.3, 0.8);
            assert!(region.x + region.width <= w);
            assert!(region.y + region.height <= h);
        }

        let region = extract_central_region(50, 40, 1.0, 1.0);
        assert_eq!(region, Region::full(50, 40));
    }

    #[test]
    fn test_upper_half_and_band() {
        assert_eq!(upper_half(200, 201), Region::new(0, 0, 200, 100));

        // floor(100 * 0.37) = 37 rows, starting at (100 - 37) / 2 = 31
        assert_eq!(central_band(80, 100, 0.37), Region::new(0, 31, 80, 37));
    }

    #[test]
    fn test_crop_copies_pixels() {
        let image = GrayImage::from_fn(10, 10, |x, y| Luma([(y * 10 + x) as u8]));
        let crop = Region::new(2, 3, 4, 5).crop(&image);

        assert_eq!(crop.dimensions(), (4, 5));
        assert_eq!(crop.get_pixel(0, 0)[0], 32);
        assert_eq!(crop.get_pixel(3, 4)[0], 75);
    }

    #[test]
    fn test_crop_clamps_to_image() {
        let image = GrayImage::new(10, 10);
        let crop = Region::new(8, 8, 5, 5).crop(&image);
        assert_eq!(crop.dimensions(), (2, 2));
    }
}
