//! Conversions between `image` buffers and OpenCV matrices
use image::GrayImage;
use opencv::core::{Mat, Scalar, CV_8UC1};
use opencv::prelude::*;

/// Copy a grayscale image into a new single-channel 8-bit matrix
///
/// An image without pixels becomes an empty matrix.
pub fn gray_to_mat(gray: &GrayImage) -> opencv::Result<Mat> {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Ok(Mat::default());
    }

    let mut mat = Mat::new_rows_cols_with_default(height as i32, width as i32, CV_8UC1, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(gray.as_raw());
    Ok(mat)
}

/// Copy a single-channel 8-bit matrix back into a grayscale image
pub fn mat_to_gray(mat: &Mat) -> opencv::Result<GrayImage> {
    if mat.empty() {
        return Ok(GrayImage::new(0, 0));
    }
    if mat.typ() != CV_8UC1 {
        return Err(opencv::Error::new(
            opencv::core::StsUnsupportedFormat,
            format!("Expected an 8-bit single-channel matrix, got type {}", mat.typ()),
        ));
    }

    // Row views of a larger matrix are not contiguous
    let owned;
    let mat = if mat.is_continuous() {
        mat
    } else {
        owned = mat.try_clone()?;
        &owned
    };

    let (width, height) = (mat.cols() as u32, mat.rows() as u32);
    GrayImage::from_raw(width, height, mat.data_bytes()?.to_vec()).ok_or_else(|| {
        opencv::Error::new(
            opencv::core::StsError,
            format!("Matrix data does not fill a {}x{} image", width, height),
        )
    })
}
