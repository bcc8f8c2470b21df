//! Per-submesh mask settings.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::MAX_UV_CHANNELS;
use crate::error::SettingError;

/// Default keep threshold for a mask channel value.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Color component used as the keep/drop decision value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
    #[default]
    Alpha,
}

impl ColorChannel {
    /// Extract this channel from an RGBA sample.
    pub fn extract(self, color: Vec4) -> f32 {
        match self {
            ColorChannel::Red => color.x,
            ColorChannel::Green => color.y,
            ColorChannel::Blue => color.z,
            ColorChannel::Alpha => color.w,
        }
    }
}

/// Mask configuration for one submesh.
///
/// `M` is the mask reference: a path in authored manifests, a loaded
/// sampler once the import runs. A missing mask keeps every face.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSetting<M> {
    pub mask: Option<M>,
    pub color_channel: ColorChannel,
    pub threshold: f32,
    pub invert: bool,
    pub uv_channel: u8,
}

impl<M> Default for MaskSetting<M> {
    fn default() -> Self {
        Self {
            mask: None,
            color_channel: ColorChannel::default(),
            threshold: DEFAULT_THRESHOLD,
            invert: false,
            uv_channel: 0,
        }
    }
}

impl<M> MaskSetting<M> {
    pub fn with_mask(mask: M) -> Self {
        Self {
            mask: Some(mask),
            ..Self::default()
        }
    }

    /// Replace the mask reference, keeping every other field.
    pub fn map_mask<N>(self, f: impl FnOnce(M) -> Option<N>) -> MaskSetting<N> {
        MaskSetting {
            mask: self.mask.and_then(f),
            color_channel: self.color_channel,
            threshold: self.threshold,
            invert: self.invert,
            uv_channel: self.uv_channel,
        }
    }

    /// Borrow the mask reference.
    pub fn as_ref(&self) -> MaskSetting<&M> {
        MaskSetting {
            mask: self.mask.as_ref(),
            color_channel: self.color_channel,
            threshold: self.threshold,
            invert: self.invert,
            uv_channel: self.uv_channel,
        }
    }

    pub fn validate(&self) -> Result<(), SettingError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SettingError::Threshold(self.threshold));
        }
        if usize::from(self.uv_channel) >= MAX_UV_CHANNELS {
            return Err(SettingError::UvChannel(self.uv_channel));
        }
        Ok(())
    }

    /// Keep decision for a sampled channel value. Values equal to the
    /// threshold are not kept unless inverted.
    pub fn keeps(&self, value: f32) -> bool {
        (value > self.threshold) != self.invert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let setting = MaskSetting::<()>::default();
        assert!(setting.mask.is_none());
        assert_eq!(setting.color_channel, ColorChannel::Alpha);
        assert_eq!(setting.threshold, 0.5);
        assert!(!setting.invert);
        assert_eq!(setting.uv_channel, 0);
    }

    #[test]
    fn test_keeps_is_strict() {
        let setting = MaskSetting::<()>::default();
        assert!(!setting.keeps(0.5));
        assert!(setting.keeps(0.500_01));

        let inverted = MaskSetting::<()> {
            invert: true,
            ..Default::default()
        };
        assert!(inverted.keeps(0.5));
        assert!(!inverted.keeps(0.9));
    }

    #[test]
    fn test_extract_channel() {
        let color = Vec4::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(ColorChannel::Red.extract(color), 0.1);
        assert_eq!(ColorChannel::Green.extract(color), 0.2);
        assert_eq!(ColorChannel::Blue.extract(color), 0.3);
        assert_eq!(ColorChannel::Alpha.extract(color), 0.4);
    }

    #[test]
    fn test_validate_ranges() {
        let mut setting = MaskSetting::<()>::default();
        assert!(setting.validate().is_ok());

        setting.threshold = 1.5;
        assert_eq!(setting.validate(), Err(SettingError::Threshold(1.5)));

        setting.threshold = 1.0;
        setting.uv_channel = 8;
        assert_eq!(setting.validate(), Err(SettingError::UvChannel(8)));
    }

    #[test]
    fn test_map_mask_keeps_policy() {
        let setting = MaskSetting {
            mask: Some("mask.png"),
            color_channel: ColorChannel::Green,
            threshold: 0.25,
            invert: true,
            uv_channel: 3,
        };
        let mapped = setting.map_mask(|path| Some(path.len()));
        assert_eq!(mapped.mask, Some(8));
        assert_eq!(mapped.color_channel, ColorChannel::Green);
        assert_eq!(mapped.threshold, 0.25);
        assert!(mapped.invert);
        assert_eq!(mapped.uv_channel, 3);
    }

    #[test]
    fn test_channel_deserialize_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            channel: ColorChannel,
        }
        let parsed: Wrapper = toml::from_str("channel = \"red\"").unwrap();
        assert_eq!(parsed.channel, ColorChannel::Red);
    }
}
