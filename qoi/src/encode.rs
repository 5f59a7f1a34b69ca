use crate::{
    consts::*,
    utils::{diff, hash, write_header},
    Descriptor, Pixel,
};
use alloc::vec::Vec;
use core::convert::Infallible;
use itertools::Itertools;
use snafu::{ensure, Snafu};

#[cfg(feature = "std")]
mod std_api;
#[cfg(feature = "std")]
pub use std_api::*;

#[derive(Debug, Clone, Copy)]
pub struct QoiEncodeContext {
    pub prev: Pixel,
    pub arr: [Pixel; 64],
}

impl QoiEncodeContext {
    pub const fn new() -> Self {
        Self {
            prev: Pixel::OPAQUE_BLACK,
            arr: [Pixel::new(0, 0, 0, 0); 64],
        }
    }
}

impl Default for QoiEncodeContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum EncodeError {
    #[snafu(display("Image dimensions {width}x{height} don't match {pixel_count} pixels"))]
    InvalidDimensions {
        width: u32,
        height: u32,
        pixel_count: usize,
    },
    #[snafu(display("Image dimensions {width}x{height} must both be non-zero"))]
    EmptyImage { width: u32, height: u32 },
    #[snafu(display("Invalid channel count {channels}, expected 3 or 4"))]
    InvalidChannels { channels: u8 },
    #[snafu(display("Image of {width}x{height} exceeds the limit of {QOI_PIXELS_MAX} pixels"))]
    TooManyPixels { width: u32, height: u32 },
}

/// Destination of encoded chunks.
pub(crate) trait EncodeSink {
    type Error;

    fn put(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl EncodeSink for Vec<u8> {
    type Error = Infallible;

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Upper bound for the encoded size of an image: every pixel as `QOI_OP_RGBA`.
pub fn max_encoded_len(desc: &Descriptor) -> usize {
    desc.pixel_count()
        .saturating_mul(5)
        .saturating_add(QOI_HEADER_SIZE + QOI_PADDING.len())
}

/// Checks that a descriptor can be written and describes exactly `pixels`.
pub fn check_input(desc: &Descriptor, pixels: &[Pixel]) -> Result<(), EncodeError> {
    let Descriptor {
        width,
        height,
        channels,
        ..
    } = *desc;

    ensure!(
        width != 0 && height != 0,
        encode_error::EmptyImageSnafu { width, height }
    );
    ensure!(
        matches!(channels, 3 | 4),
        encode_error::InvalidChannelsSnafu { channels }
    );
    ensure!(
        height < QOI_PIXELS_MAX / width,
        encode_error::TooManyPixelsSnafu { width, height }
    );
    ensure!(
        desc.pixel_count() == pixels.len(),
        encode_error::InvalidDimensionsSnafu {
            width,
            height,
            pixel_count: pixels.len()
        }
    );

    Ok(())
}

impl QoiEncodeContext {
    pub fn encode_to_vec(desc: &Descriptor, pixels: &[Pixel]) -> Result<Vec<u8>, EncodeError> {
        let mut w = Vec::with_capacity(QOI_HEADER_SIZE + pixels.len() + QOI_PADDING.len());
        let mut state = QoiEncodeContext::new();
        state.encode_to_vec_with_state(desc, pixels, &mut w)?;
        Ok(w)
    }

    /// Appends the encoded image to `w`. Nothing is appended if the input is invalid.
    ///
    /// The context is reset first, every image starts from the initial state.
    pub fn encode_to_vec_with_state(
        &mut self,
        desc: &Descriptor,
        pixels: &[Pixel],
        w: &mut Vec<u8>,
    ) -> Result<(), EncodeError> {
        check_input(desc, pixels)?;
        *self = Self::new();

        w.extend_from_slice(&write_header(desc));
        match self.encode_chunks(pixels, w) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        w.extend_from_slice(&QOI_PADDING);

        Ok(())
    }

    pub(crate) fn encode_chunks<S: EncodeSink>(
        &mut self,
        pixels: &[Pixel],
        w: &mut S,
    ) -> Result<(), S::Error> {
        for (count, &pixel) in pixels.iter().dedup_with_count() {
            let mut repeats = count;

            if pixel != self.prev {
                self.encode_pixel(pixel, w)?;
                repeats -= 1;
            }

            // the rest of the group repeats the pixel just written
            while repeats > 0 {
                let run = repeats.min(QOI_RUN_MAX);
                w.put(&[QOI_OP_RUN | (run - 1) as u8])?;
                repeats -= run;
            }
        }

        Ok(())
    }

    /// Writes the cheapest chunk for a pixel that differs from the previous one.
    fn encode_pixel<S: EncodeSink>(&mut self, pixel: Pixel, w: &mut S) -> Result<(), S::Error> {
        let prev = self.prev;
        self.prev = pixel;

        let hash = hash(pixel);
        let index = usize::from(hash);

        if self.arr[index] == pixel {
            return w.put(&[QOI_OP_INDEX | hash]);
        }
        self.arr[index] = pixel;

        if pixel.a != prev.a {
            return w.put(&[QOI_OP_RGBA, pixel.r, pixel.g, pixel.b, pixel.a]);
        }

        let (r_diff, g_diff, b_diff) = (
            diff(pixel.r, prev.r),
            diff(pixel.g, prev.g),
            diff(pixel.b, prev.b),
        );

        if matches!((r_diff, g_diff, b_diff), (-2..=1, -2..=1, -2..=1)) {
            let mut b = QOI_OP_DIFF;
            b |= ((r_diff + 2) << 4) as u8;
            b |= ((g_diff + 2) << 2) as u8;
            b |= (b_diff + 2) as u8;

            return w.put(&[b]);
        }

        let rg_diff = r_diff.wrapping_sub(g_diff);
        let bg_diff = b_diff.wrapping_sub(g_diff);

        if matches!((rg_diff, g_diff, bg_diff), (-8..=7, -32..=31, -8..=7)) {
            let bytes = [
                (QOI_OP_LUMA | ((g_diff + 32) as u8)),
                (((rg_diff + 8) as u8) << 4 | (bg_diff + 8) as u8),
            ];

            w.put(&bytes)
        } else {
            w.put(&[QOI_OP_RGB, pixel.r, pixel.g, pixel.b])
        }
    }
}
