//! Mask texture loading

use anyhow::{Context, Result};
use mask_common::{MaskImage, WrapMode};
use std::path::Path;

/// Load an image file (PNG/JPG) as an RGBA8 mask.
pub fn load_mask(input: &Path, wrap: WrapMode) -> Result<MaskImage> {
    let img = image::open(input).with_context(|| format!("Failed to load mask: {:?}", input))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mask = MaskImage::from_rgba8(width, height, rgba.into_raw())
        .with_context(|| format!("Invalid mask image: {:?}", input))?
        .with_wrap(wrap);

    tracing::debug!("Loaded mask {:?}: {}x{}", input, width, height);
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use mask_common::TextureSampler;

    #[test]
    fn test_load_png_mask() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        let img = image::RgbaImage::from_fn(2, 2, |x, _| {
            if x == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 0])
            }
        });
        img.save(&path).unwrap();

        let mask = load_mask(&path, WrapMode::Clamp).unwrap();
        assert_eq!((mask.width(), mask.height()), (2, 2));
        assert_eq!(mask.wrap(), WrapMode::Clamp);
        let left = mask.sample_bilinear(Vec2::new(0.25, 0.25)).unwrap();
        assert!((left.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_mask_fails() {
        let err = load_mask(Path::new("nope.png"), WrapMode::Repeat).unwrap_err();
        assert!(err.to_string().contains("Failed to load mask"));
    }
}
