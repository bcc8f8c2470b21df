//! Error types for mask filtering, settings and binary formats.

use thiserror::Error;

/// Failure while filtering one submesh or building a mask image.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaskError {
    #[error("UV channel {channel} does not exist on this mesh")]
    MissingUvChannel { channel: u8 },

    #[error("vertex {index} is out of range for UV channel {channel} ({len} entries)")]
    UvIndexOutOfRange { index: usize, channel: u8, len: usize },

    #[error("mask could not be sampled at ({u}, {v})")]
    SampleFailed { u: f32, v: f32 },

    #[error("invalid mask image {width}x{height} with {len} bytes of RGBA8 data")]
    InvalidImage { width: u32, height: u32, len: usize },
}

impl MaskError {
    /// True for UV lookup and sampling failures, which usually mean the
    /// submesh's UV channel setting points at the wrong coordinates.
    pub fn is_indexing_failure(&self) -> bool {
        !matches!(self, MaskError::InvalidImage { .. })
    }
}

/// Out-of-range mask setting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("threshold {0} must be within [0, 1]")]
    Threshold(f32),

    #[error("UV channel {0} must be within [0, 7]")]
    UvChannel(u8),
}

/// Malformed `.maskmesh` data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("data too small: {len} bytes, expected at least {expected}")]
    Truncated { len: usize, expected: usize },

    #[error("submesh {submesh} references vertex {vertex} but the mesh has {vertex_count}")]
    VertexOutOfRange {
        submesh: usize,
        vertex: u64,
        vertex_count: u32,
    },
}

pub type MaskResult<T> = Result<T, MaskError>;
