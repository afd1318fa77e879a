//! Image loading (PNG/JPG -> SourceImage) and decoding back to PNG

use anyhow::{Context, Result};
use ctr_common::{Rgba8, SourceImage};
use image::{ColorType, RgbaImage};
use std::path::Path;

/// Load an image file and normalize it to RGBA8.
///
/// Size is not checked here; the encoders report dimension errors.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let img = image::open(path).with_context(|| format!("Failed to load image: {:?}", path))?;

    if !matches!(img.color(), ColorType::Rgba8 | ColorType::Rgb8) {
        tracing::warn!(
            "{:?} is {:?}, converting to RGBA8 (values are truncated, not dithered)",
            path,
            img.color()
        );
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let image = SourceImage::from_raw(width, height, rgba.as_raw())
        .with_context(|| format!("Decoded buffer size mismatch for {:?}", path))?;

    tracing::debug!("Loaded {:?}: {}x{}", path, width, height);
    Ok(image)
}

/// Save a decoded texture as PNG.
pub fn save_png(image: &SourceImage, path: &Path) -> Result<()> {
    let raw: &[u8] = bytemuck::cast_slice::<Rgba8, u8>(image.pixels());
    let buffer = RgbaImage::from_raw(image.width(), image.height(), raw.to_vec())
        .context("Pixel buffer does not match image size")?;
    buffer
        .save(path)
        .with_context(|| format!("Failed to write PNG: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("px.png");
        let pixels = vec![
            Rgba8::new(1, 2, 3, 4),
            Rgba8::new(5, 6, 7, 8),
            Rgba8::new(9, 10, 11, 12),
            Rgba8::new(13, 14, 15, 16),
        ];
        let image = SourceImage::new(2, 2, pixels).unwrap();

        save_png(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_rgb_is_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        image::RgbImage::from_pixel(3, 1, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.width(), 3);
        assert!(loaded.pixels().iter().all(|&p| p == Rgba8::new(10, 20, 30, 0xFF)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_image(Path::new("/nonexistent/icon.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to load image"));
    }
}
