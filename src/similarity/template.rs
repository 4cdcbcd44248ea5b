//! Coefficient-normalized cross-correlation (zero-mean NCC)
//!
//! For every placement of the template inside the image the score is
//!
//! ```text
//! R(x, y) = sum(T'(u, v) * I'(x + u, y + v)) / sqrt(sum(T'^2) * sum(I'^2))
//! ```
//!
//! where `T'` and `I'` are the template and the image window with their
//! means removed. The range is [-1, 1]; 1 means a perfect linear match.
//! This is `TM_CCOEFF_NORMED` in OpenCV, which scores a window without
//! variance as 0.
use image::GrayImage;
use opencv::core::{self, Mat};
use opencv::imgproc::{self, TemplateMatchModes};

use crate::imaging::{gray_to_mat, Region};

/// Maximum coefficient-normalized correlation between two grayscale images
///
/// The smaller image slides over the larger one. When neither image fits
/// inside the other (one is wider, the other taller) both are cropped to
/// their common centered extent and compared at a single placement.
pub fn template_match(first: &GrayImage, second: &GrayImage) -> opencv::Result<f64> {
    let (fw, fh) = first.dimensions();
    let (sw, sh) = second.dimensions();
    if fw == 0 || fh == 0 || sw == 0 || sh == 0 {
        return Ok(0.0);
    }

    if sw <= fw && sh <= fh {
        max_correlation(first, second)
    } else if fw <= sw && fh <= sh {
        max_correlation(second, first)
    } else {
        let width = fw.min(sw);
        let height = fh.min(sh);
        let crop = |image: &GrayImage| {
            Region::new(
                (image.width() - width) / 2,
                (image.height() - height) / 2,
                width,
                height,
            )
            .crop(image)
        };
        tracing::debug!(
            "Template match on mismatched sizes {}x{} vs {}x{}, comparing {}x{} centers",
            fw,
            fh,
            sw,
            sh,
            width,
            height
        );
        max_correlation(&crop(first), &crop(second))
    }
}

/// Slide `template` over `image` (template must fit) and return the best score
fn max_correlation(image: &GrayImage, template: &GrayImage) -> opencv::Result<f64> {
    let image = gray_to_mat(image)?;
    let template = gray_to_mat(template)?;
    let mask = Mat::default();

    let mut result = Mat::default();
    imgproc::match_template(
        &image,
        &template,
        &mut result,
        TemplateMatchModes::TM_CCOEFF_NORMED as i32,
        &mask,
    )?;

    let mut max_val = 0.0;
    core::min_max_loc(&result, None, Some(&mut max_val), None, None, &mask)?;
    Ok(max_val)
}
