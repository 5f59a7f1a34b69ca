//! Encoder and decoder for the [QOI Image format](https://qoiformat.org/).
//!
//! QOI losslessly compresses RGB and RGBA images into a byte stream made out of a fixed 14-byte
//! header, a sequence of 1 to 5 byte operations ("chunks") and an 8-byte end marker.
//!
//! # Header
//!
//! - 4-byte magic: `qoif`
//! - u32be width (non-zero)
//! - u32be height (non-zero)
//! - u8 channels (3 = RGB, 4 = RGBA)
//! - u8 colorspace (0 = sRGB with linear alpha, 1 = all channels linear)
//!
//! The channels and colorspace fields are informative only. The decoder always reconstructs
//! full RGBA pixels, and the encoder always encodes alpha changes, regardless of `channels`.
//!
//! # Color array
//!
//! Both sides keep a 64-entry array of previously seen pixels, addressed by
//! `(r * 3 + g * 5 + b * 7 + a * 11) % 64`. Collisions simply overwrite the previous entry.
//!
//! # Stream format
//!
//! See [consts] for the different operation types.
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
pub mod encode;

pub mod bit_depth;
pub mod decode;
pub mod utils;

pub use bit_depth::BitDepth;
pub use decode::{DecodeError, DecodeOptions, QoiDecodeContext};
#[cfg(feature = "alloc")]
pub use encode::{EncodeError, QoiEncodeContext};

/// A single RGBA pixel. Images are always handled as RGBA internally, whatever the channel count
/// in the header says.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// The implicit "previous pixel" before the first pixel of an image.
    pub const OPAQUE_BLACK: Pixel = Pixel::new(0, 0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a fully opaque pixel.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Pixel {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<Pixel> for [u8; 4] {
    #[inline]
    fn from(pixel: Pixel) -> Self {
        pixel.to_array()
    }
}

/// The colorspace tag of the header. It is carried through unchanged and never applied to the
/// pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colorspace {
    /// sRGB color channels with linear alpha.
    Srgb,
    /// All channels linear.
    Linear,
    /// Any other tag byte found in a header.
    Other(u8),
}

impl From<u8> for Colorspace {
    fn from(value: u8) -> Self {
        match value {
            0 => Colorspace::Srgb,
            1 => Colorspace::Linear,
            other => Colorspace::Other(other),
        }
    }
}

impl From<Colorspace> for u8 {
    fn from(value: Colorspace) -> Self {
        match value {
            Colorspace::Srgb => 0,
            Colorspace::Linear => 1,
            Colorspace::Other(other) => other,
        }
    }
}

/// Image metadata stored in the QOI header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub width: u32,
    pub height: u32,
    /// 3 (RGB) or 4 (RGBA).
    pub channels: u8,
    pub colorspace: Colorspace,
}

impl Descriptor {
    pub const fn new(width: u32, height: u32, channels: u8, colorspace: Colorspace) -> Self {
        Self {
            width,
            height,
            channels,
            colorspace,
        }
    }

    /// Number of pixels described by the header, saturating at `usize::MAX`.
    #[inline]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }
}

pub mod consts {
    /// Re-emit a pixel from the color array.
    ///
    /// ```plain
    /// .- QOI_OP_INDEX ----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  0  0 |     index       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b00
    /// - 6-bit index into the color array: 0..63
    /// - A valid encoder must not issue 2 or more consecutive QOI_OP_INDEX chunks to the same
    ///   index. QOI_OP_RUN should be used instead.
    pub const QOI_OP_INDEX: u8 = 0b0000_0000;

    /// Calculate a pixel based on a 2-bit difference from the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_DIFF -----------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----+-----+-----|
    /// |  0  1 |  dr |  dg |  db |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b01
    /// - 2-bit red, green and blue channel differences from the previous pixel between -2..1,
    ///   each stored with a bias of 2
    /// - Alpha stays unchanged.
    ///
    /// Differences wrap around, so `1 - 2` is `255` and `255 + 1` is `0`.
    pub const QOI_OP_DIFF: u8 = 0b0100_0000;

    /// Calculate a pixel based on a 6-bit green-channel difference from the previous pixel, and
    /// differences to the green-channel difference for red and blue.
    ///
    ///  ```plain
    /// .- QOI_OP_LUMA -------------------------------------.
    /// |         Byte[0]         |         Byte[1]         |
    /// |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------+-------------+-----------|
    /// |  1  0 |  green diff     |   dr - dg   |  db - dg  |
    /// `---------------------------------------------------`
    /// ```
    ///
    /// - 2-bit tag b10
    /// - 6-bit green channel difference from the previous pixel (`-32..31`), stored with a bias
    ///   of 32
    /// - 4-bit red channel difference minus green channel difference (`-8..7`), stored with a bias
    ///   of 8
    /// - 4-bit blue channel difference minus green channel difference (`-8..7`), stored with a bias
    ///   of 8
    /// - Alpha stays unchanged.
    pub const QOI_OP_LUMA: u8 = 0b1000_0000;

    /// Repeats the previous pixel.
    ///
    /// ```plain
    /// .- QOI_OP_RUN ------------.
    /// |         Byte[0]         |
    /// |  7  6  5  4  3  2  1  0 |
    /// |-------+-----------------|
    /// |  1  1 |       run       |
    /// `-------------------------`
    /// ```
    ///
    /// - 2-bit tag b11
    /// - 6-bit run-length repeating the previous pixel: 1..62
    /// - The run-length is stored with a bias of -1. Note that the run-lengths 63 and 64 (`b111110`
    ///   and `b111111`) are illegal as they are occupied by the QOI_OP_RGB and QOI_OP_RGBA tag.
    pub const QOI_OP_RUN: u8 = 0b1100_0000;

    /// Emits a full pixel, keeping the previous alpha.
    ///
    /// ```plain
    /// .- QOI_OP_RGB ------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  0 |   red   |  green  |  blue   |
    /// `-------------------------------------------------------`
    /// ```
    pub const QOI_OP_RGB: u8 = 0b1111_1110;

    /// Emits a full pixel including alpha.
    ///
    /// ```plain
    /// .- QOI_OP_RGBA ---------------------------------------------------.
    /// |         Byte[0]         | Byte[1] | Byte[2] | Byte[3] | Byte[4] |
    /// |  7  6  5  4  3  2  1  0 | 7 .. 0  | 7 .. 0  | 7 .. 0  | 7 .. 0  |
    /// |-------------------------+---------+---------+---------+---------|
    /// |  1  1  1  1  1  1  1  1 |   red   |  green  |  blue   |  alpha  |
    /// `-----------------------------------------------------------------`
    /// ```
    pub const QOI_OP_RGBA: u8 = 0b1111_1111;

    /// Mask of the 2-bit tags.
    pub const QOI_MASK_2: u8 = 0b1100_0000;

    /// `qoif`, big-endian.
    pub const QOI_MAGIC: u32 = u32::from_be_bytes(*b"qoif");

    pub const QOI_HEADER_SIZE: usize = 14;

    /// End-of-stream marker. Can't be mistaken for a chunk sequence, since seven `QOI_OP_INDEX`
    /// chunks to the same index are illegal.
    pub const QOI_PADDING: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

    /// Upper bound on `width * height` accepted from a header.
    pub const QOI_PIXELS_MAX: u32 = 400_000_000;

    /// Longest run a single QOI_OP_RUN chunk can express.
    pub const QOI_RUN_MAX: usize = 62;
}
