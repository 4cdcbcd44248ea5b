//! Connected-component (blob) analysis of binary images
use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use super::region::Region;

/// A connected group of foreground pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    /// Pixel count
    pub area: u32,
    /// Bounding box in the analysed image's coordinates
    pub bounds: Region,
}

/// Largest 8-connected foreground component of a binary image
///
/// Background is 0; every non-zero pixel is foreground. Returns `None` when
/// the image has no foreground. Equal areas resolve to the lowest label,
/// i.e. the component found first in raster order.
pub fn largest_blob(binary: &GrayImage) -> Option<Blob> {
    let labels = connected_components(binary, Connectivity::Eight, Luma([0u8]));

    // Per label: area, min_x, min_y, max_x, max_y
    let mut stats: Vec<(u32, u32, u32, u32, u32)> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        if stats.len() < label {
            stats.resize(label, (0, u32::MAX, u32::MAX, 0, 0));
        }

        let entry = &mut stats[label - 1];
        entry.0 += 1;
        entry.1 = entry.1.min(x);
        entry.2 = entry.2.min(y);
        entry.3 = entry.3.max(x);
        entry.4 = entry.4.max(y);
    }

    tracing::trace!("Blob analysis: {} components", stats.iter().filter(|s| s.0 > 0).count());

    let mut best: Option<&(u32, u32, u32, u32, u32)> = None;
    for entry in stats.iter().filter(|s| s.0 > 0) {
        if best.map_or(true, |b| entry.0 > b.0) {
            best = Some(entry);
        }
    }

    best.map(|&(area, min_x, min_y, max_x, max_y)| Blob {
        area,
        bounds: Region::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint(image: &mut GrayImage, region: Region) {
        for y in region.y..region.y + region.height {
            for x in region.x..region.x + region.width {
                image.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn test_no_foreground() {
        assert_eq!(largest_blob(&GrayImage::new(20, 20)), None);
    }

    #[test]
    fn test_largest_of_several() {
        let mut image = GrayImage::new(100, 40);
        paint(&mut image, Region::new(2, 2, 5, 5));
        paint(&mut image, Region::new(30, 10, 20, 15));
        paint(&mut image, Region::new(80, 30, 3, 3));

        let blob = largest_blob(&image).unwrap();
        assert_eq!(blob.area, 300);
        assert_eq!(blob.bounds, Region::new(30, 10, 20, 15));
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        let mut image = GrayImage::new(10, 10);
        for i in 0..6 {
            image.put_pixel(i, i, Luma([255]));
        }

        let blob = largest_blob(&image).unwrap();
        assert_eq!(blob.area, 6);
        assert_eq!(blob.bounds, Region::new(0, 0, 6, 6));
    }
}
