//! Mask texture sampling.
//!
//! The mask pass only needs one operation from a texture: a bilinear RGBA
//! sample at a normalized UV. [`TextureSampler`] is that seam; [`MaskImage`]
//! is the in-memory RGBA8 implementation used by the export tool.
//!
//! UV `(0, 0)` is the top-left corner of the image and texel centers sit at
//! `(i + 0.5) / size`, matching GPU sampling of a glTF texture.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{MaskError, MaskResult};

/// A mask texture that can be sampled with bilinear filtering.
pub trait TextureSampler {
    /// Sample RGBA in `[0, 1]` at a normalized UV.
    ///
    /// Returns `None` if no texel can be addressed for this coordinate.
    fn sample_bilinear(&self, uv: Vec2) -> Option<Vec4>;

    /// Whether the pixel data may be read on the CPU.
    fn is_readable(&self) -> bool {
        true
    }
}

impl<T: TextureSampler + ?Sized> TextureSampler for &T {
    fn sample_bilinear(&self, uv: Vec2) -> Option<Vec4> {
        (**self).sample_bilinear(uv)
    }

    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }
}

/// How texel coordinates outside the image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
    Mirror,
}

impl WrapMode {
    /// Resolve a texel coordinate against an axis of `size` texels.
    pub fn resolve(self, coord: i64, size: u32) -> Option<u32> {
        let size = i64::from(size);
        if size == 0 {
            return None;
        }
        let resolved = match self {
            WrapMode::Repeat => coord.rem_euclid(size),
            WrapMode::Clamp => coord.clamp(0, size - 1),
            WrapMode::Mirror => {
                let period = coord.rem_euclid(size * 2);
                if period >= size {
                    size * 2 - 1 - period
                } else {
                    period
                }
            }
        };
        u32::try_from(resolved).ok()
    }
}

/// RGBA8 mask image, rows stored top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    wrap: WrapMode,
    readable: bool,
}

impl MaskImage {
    /// Wrap raw RGBA8 pixels. Fails on empty images or a size mismatch.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> MaskResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(MaskError::InvalidImage {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            wrap: WrapMode::default(),
            readable: true,
        })
    }

    /// Single-color image, handy for fixtures.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> MaskResult<Self> {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::from_rgba8(width, height, pixels)
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    /// Texel at integer coordinates, normalized to `[0, 1]`.
    pub fn texel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let rgba = self.pixels.get(offset..offset + 4)?;
        Some(Vec4::new(
            f32::from(rgba[0]),
            f32::from(rgba[1]),
            f32::from(rgba[2]),
            f32::from(rgba[3]),
        ) / 255.0)
    }

    fn wrapped_texel(&self, x: i64, y: i64) -> Option<Vec4> {
        let x = self.wrap.resolve(x, self.width)?;
        let y = self.wrap.resolve(y, self.height)?;
        self.texel(x, y)
    }
}

impl TextureSampler for MaskImage {
    fn sample_bilinear(&self, uv: Vec2) -> Option<Vec4> {
        // Shift so integer coordinates land on texel centers
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;

        // Casts saturate for huge coordinates; the next tap must not overflow
        let (x0, y0) = (x0 as i64, y0 as i64);
        let (x1, y1) = (x0.checked_add(1)?, y0.checked_add(1)?);
        let t00 = self.wrapped_texel(x0, y0)?;
        let t10 = self.wrapped_texel(x1, y0)?;
        let t01 = self.wrapped_texel(x0, y1)?;
        let t11 = self.wrapped_texel(x1, y1)?;

        let top = t00.lerp(t10, fx);
        let bottom = t01.lerp(t11, fx);
        Some(top.lerp(bottom, fy))
    }

    fn is_readable(&self) -> bool {
        self.readable
    }
}
