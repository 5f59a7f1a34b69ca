//! Choosing between 3 and 4 channel output when saving.

use crate::Pixel;
use core::str::FromStr;

/// Bit depth an image is saved with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BitDepth {
    /// 32 bits if any pixel is not fully opaque, 24 bits otherwise.
    #[default]
    AutoDetect,
    /// RGBA, 4 channels.
    Rgba32,
    /// RGB, 3 channels. Alpha is dropped, i.e. every pixel is stored fully opaque.
    Rgb24,
}

impl FromStr for BitDepth {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            _ if s.eq_ignore_ascii_case("auto") => Ok(BitDepth::AutoDetect),
            "32" => Ok(BitDepth::Rgba32),
            "24" => Ok(BitDepth::Rgb24),
            _ => Err("invalid bit depth, expected `auto`, `32` or `24`"),
        }
    }
}

/// Whether any pixel is not fully opaque.
pub fn has_alpha(pixels: &[Pixel]) -> bool {
    pixels.iter().any(|p| p.a != 255)
}

impl BitDepth {
    /// Channel count this bit depth resolves to for the given pixels.
    pub fn channels(self, pixels: &[Pixel]) -> u8 {
        match self {
            BitDepth::AutoDetect if has_alpha(pixels) => 4,
            BitDepth::AutoDetect => 3,
            BitDepth::Rgba32 => 4,
            BitDepth::Rgb24 => 3,
        }
    }

    /// Resolves the channel count and makes the pixels match it.
    ///
    /// For 3 channels, all alpha values are set to 255 so the stream never carries alpha changes.
    pub fn prepare(self, pixels: &mut [Pixel]) -> u8 {
        let channels = self.channels(pixels);
        if channels == 3 {
            for pixel in pixels.iter_mut() {
                pixel.a = 255;
            }
        }
        channels
    }
}
