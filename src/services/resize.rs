use crate::error::AppError;
use crate::services::encoder;
use image::imageops::FilterType;
use std::path::Path;
use tracing::debug;

/// Bound `(width, height)` by `max_width`/`max_height` without upscaling.
///
/// A maximum of 0 means that axis is unconstrained. The two bounds are
/// applied in sequence: the width pass rescales height proportionally, and
/// if the result still exceeds `max_height` the height pass recomputes the
/// width from the *original* aspect ratio rather than the intermediate one.
/// E.g. 4000x1000 with maxima 1000x100 goes 4000x1000 -> 1000x250 -> 400x100.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let mut new_width = width;
    let mut new_height = height;

    if max_width > 0 && new_width > max_width {
        new_width = max_width;
        new_height = (height as u64 * max_width as u64 / width as u64) as u32;
    }
    if max_height > 0 && new_height > max_height {
        new_height = max_height;
        new_width = (width as u64 * max_height as u64 / height as u64) as u32;
    }

    (new_width, new_height)
}

/// Decode the image at `input`, scale it to fit within the given maxima and
/// re-encode it in its original format at `output` (which may equal `input`).
///
/// Only formats with a registered encoder (JPEG, PNG) are accepted.
pub async fn resize_to_fit(
    input: &Path,
    output: &Path,
    max_width: u32,
    max_height: u32,
) -> Result<(), AppError> {
    let bytes = tokio::fs::read(input).await?;

    let format = image::guess_format(&bytes)?;
    let encoder = encoder::encoder_for(format)
        .ok_or_else(|| AppError::UnsupportedFormat(format!("{:?}", format)))?;

    let img = image::load_from_memory_with_format(&bytes, format)?;
    let (new_width, new_height) = fit_dimensions(img.width(), img.height(), max_width, max_height);
    debug!(
        "resizing {}x{} -> {}x{} (max {}x{})",
        img.width(),
        img.height(),
        new_width,
        new_height,
        max_width,
        max_height
    );

    let resized = img.resize_exact(new_width, new_height, FilterType::CatmullRom);

    let mut encoded = Vec::new();
    encoder.encode(&resized, &mut encoded)?;
    tokio::fs::write(output, encoded).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_bounds_is_unchanged() {
        assert_eq!(fit_dimensions(800, 600, 1000, 1000), (800, 600));
    }

    #[test]
    fn test_never_upscales() {
        assert_eq!(fit_dimensions(100, 50, 4000, 4000), (100, 50));
    }

    #[test]
    fn test_zero_maxima_are_unconstrained() {
        assert_eq!(fit_dimensions(5000, 3000, 0, 0), (5000, 3000));
        assert_eq!(fit_dimensions(5000, 3000, 1000, 0), (1000, 600));
        assert_eq!(fit_dimensions(5000, 3000, 0, 300), (500, 300));
    }

    #[test]
    fn test_width_constraint_scales_height() {
        assert_eq!(fit_dimensions(4000, 3000, 1000, 2000), (1000, 750));
    }

    #[test]
    fn test_height_recomputed_from_original_ratio() {
        // The width pass gives 1000x250, which still exceeds the height
        // bound; the final width comes from the original 4:1 ratio, not
        // from the intermediate 1000x250.
        assert_eq!(fit_dimensions(4000, 1000, 1000, 100), (400, 100));
    }

    #[test]
    fn test_truncating_division() {
        // 333 * 100 / 1000 = 33.3, truncated
        assert_eq!(fit_dimensions(1000, 333, 100, 500), (100, 33));
    }

    #[tokio::test]
    async fn test_resize_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");

        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            40,
            20,
            image::Rgb([10, 20, 30]),
        ));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        tokio::fs::write(&path, bytes).await.unwrap();

        resize_to_fit(&path, &path, 10, 0).await.unwrap();

        let resized = image::open(&path).unwrap();
        assert_eq!((resized.width(), resized.height()), (10, 5));
    }

    #[tokio::test]
    async fn test_unsupported_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        tokio::fs::write(&path, b"GIF89a\x01\x00\x01\x00\x00\x00\x00")
            .await
            .unwrap();

        let err = resize_to_fit(&path, &path, 100, 100).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }
}
