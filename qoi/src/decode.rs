use crate::{
    consts::*,
    utils::hash,
    Colorspace, Descriptor, Pixel,
};
use byteorder::{BigEndian, ByteOrder};
use log::{trace, warn};
use snafu::{ensure, Snafu};

mod ops;

#[cfg(feature = "alloc")]
mod alloc_api;
#[cfg(feature = "alloc")]
pub use alloc_api::*;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct QoiDecodeContext {
    pub px: Pixel,
    pub arr: [Pixel; 64],
    pub run: u8,
}

impl QoiDecodeContext {
    pub const fn new() -> Self {
        Self {
            px: Pixel::OPAQUE_BLACK,
            arr: [Pixel::new(0, 0, 0, 0); 64],
            run: 0,
        }
    }
}

impl Default for QoiDecodeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Reasons for an input not being a decodable QOI image.
#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum DecodeError {
    #[snafu(display("Input is too short to hold a QOI header and end marker"))]
    UnexpectedEof,
    #[snafu(display("Wrong magic bytes, expected `qoif`"))]
    InvalidMagic,
    #[snafu(display("Invalid image dimensions {width}x{height}"))]
    InvalidDimensions { width: u32, height: u32 },
    #[snafu(display("Invalid channel count {channels}, expected 3 or 4"))]
    InvalidChannels { channels: u8 },
    #[snafu(display("Image of {width}x{height} exceeds the limit of {max} pixels"))]
    TooManyPixels { width: u32, height: u32, max: u32 },
    #[snafu(display("Output buffer can't hold the decoded image"))]
    OutputTooSmall,
    #[snafu(display("Chunk stream ends before all pixels were decoded"))]
    TruncatedStream,
    #[snafu(display("Stream doesn't end with the QOI end marker"))]
    InvalidPadding,
}

impl DecodeError {
    /// Whether the error is caused by the input data, as opposed to the output buffer.
    pub const fn is_malformed(&self) -> bool {
        !matches!(self, DecodeError::OutputTooSmall)
    }
}

/// Limits and strictness of the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    strict: bool,
    max_pixels: u32,
}

impl DecodeOptions {
    pub const fn new() -> Self {
        Self {
            strict: false,
            max_pixels: QOI_PIXELS_MAX,
        }
    }

    /// In strict mode a chunk running into the end marker, a chunk stream that ends before the
    /// last pixel, and a wrong end marker are errors. Otherwise missing bytes read as zero and
    /// missing chunks repeat the last pixel.
    #[must_use]
    pub const fn set_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Headers with `height >= max_pixels / width` are rejected.
    #[must_use]
    pub const fn set_max_pixels(mut self, max_pixels: u32) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub const fn strict(&self) -> bool {
        self.strict
    }

    pub const fn max_pixels(&self) -> u32 {
        self.max_pixels
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses and validates the 14-byte header, using the default limits.
pub fn decode_header(data: &[u8]) -> Result<Descriptor, DecodeError> {
    decode_header_with_options(data, &DecodeOptions::default())
}

pub fn decode_header_with_options(
    data: &[u8],
    options: &DecodeOptions,
) -> Result<Descriptor, DecodeError> {
    // Header size plus the end marker
    ensure!(
        data.len() >= QOI_HEADER_SIZE + QOI_PADDING.len(),
        decode_error::UnexpectedEofSnafu
    );

    let header = &data[..QOI_HEADER_SIZE];
    ensure!(
        BigEndian::read_u32(&header[0..4]) == QOI_MAGIC,
        decode_error::InvalidMagicSnafu
    );

    let width = BigEndian::read_u32(&header[4..8]);
    let height = BigEndian::read_u32(&header[8..12]);
    let channels = header[12];
    let colorspace = Colorspace::from(header[13]);

    ensure!(
        width != 0 && height != 0,
        decode_error::InvalidDimensionsSnafu { width, height }
    );
    ensure!(
        matches!(channels, 3 | 4),
        decode_error::InvalidChannelsSnafu { channels }
    );
    // written as a division so the product can't overflow
    let max = options.max_pixels();
    ensure!(
        height < max / width,
        decode_error::TooManyPixelsSnafu { width, height, max }
    );

    trace!("Image width: {width}");
    trace!("Image height: {height}");
    trace!("Image channels: {channels}, colorspace: {colorspace:?}");

    Ok(Descriptor::new(width, height, channels, colorspace))
}

/// Cursor over the chunk bytes of an image. Reading past the end of the input yields zeros.
struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl ChunkReader<'_> {
    #[inline]
    fn next(&mut self) -> u8 {
        let byte = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut bytes = [0; N];
        for byte in &mut bytes {
            *byte = self.next();
        }
        bytes
    }
}

/// Total length of the chunk starting with `byte`.
#[inline]
const fn chunk_len(byte: u8) -> usize {
    match byte {
        QOI_OP_RGB => 4,
        QOI_OP_RGBA => 5,
        _ if byte & QOI_MASK_2 == QOI_OP_LUMA => 2,
        _ => 1,
    }
}

impl QoiDecodeContext {
    pub fn decode(data: &[u8], output: impl DecodeOutput) -> Result<Descriptor, DecodeError> {
        let mut state = QoiDecodeContext::new();
        state.decode_with_state(data, output, &DecodeOptions::default())
    }

    pub fn decode_with_options(
        data: &[u8],
        output: impl DecodeOutput,
        options: &DecodeOptions,
    ) -> Result<Descriptor, DecodeError> {
        let mut state = QoiDecodeContext::new();
        state.decode_with_state(data, output, options)
    }

    /// Decodes a QOI image into `output`. The context is reset before the first chunk.
    ///
    /// Exactly `width * height` pixels are written. Nothing is written if the header is invalid
    /// or the output is too small to hold the image.
    pub fn decode_with_state(
        &mut self,
        data: &[u8],
        mut output: impl DecodeOutput,
        options: &DecodeOptions,
    ) -> Result<Descriptor, DecodeError> {
        let desc = decode_header_with_options(data, options)?;
        let pixel_count = desc.pixel_count();
        *self = Self::new();

        ensure!(
            output
                .max_len()
                .map(|max_len| max_len >= pixel_count)
                .unwrap_or(true),
            decode_error::OutputTooSmallSnafu
        );

        // the end marker is never interpreted as chunks
        let chunks_len = data.len() - QOI_PADDING.len();
        let mut reader = ChunkReader {
            data,
            pos: QOI_HEADER_SIZE,
        };

        for _ in 0..pixel_count {
            if self.run > 0 {
                self.run -= 1;
            } else if reader.pos < chunks_len {
                let byte = reader.next();

                if reader.pos - 1 + chunk_len(byte) > chunks_len {
                    ensure!(!options.strict(), decode_error::TruncatedStreamSnafu);
                    warn!("Chunk at offset {} runs into the end marker", reader.pos - 1);
                }

                self.px = match byte {
                    QOI_OP_RGB => ops::rgb(self.px, reader.take()),
                    QOI_OP_RGBA => Pixel::from(reader.take::<4>()),
                    _ => match byte & QOI_MASK_2 {
                        QOI_OP_INDEX => self.arr[usize::from(byte & 0b0011_1111)],
                        QOI_OP_DIFF => ops::small_diff(self.px, byte),
                        QOI_OP_LUMA => ops::luma_diff(self.px, byte, reader.next()),
                        _ => {
                            self.run = byte & 0b0011_1111;
                            self.px
                        }
                    },
                };
            } else {
                ensure!(!options.strict(), decode_error::TruncatedStreamSnafu);
            }

            self.arr[usize::from(hash(self.px))] = self.px;
            output.write_pixel(self.px);
        }

        let padding = &data[chunks_len..];
        if padding != QOI_PADDING {
            ensure!(!options.strict(), decode_error::InvalidPaddingSnafu);
            warn!("Last bytes do not match the QOI end marker");
        }

        trace!("Finished decoding image");

        Ok(desc)
    }
}

pub trait DecodeOutput {
    fn write_pixel(&mut self, pixel: Pixel);

    /// Returns the maximum number of pixels that can be written to the output buffer.
    ///
    /// `None` if the output buffer is unbounded.
    fn max_len(&self) -> Option<usize>;
    fn current_output_position(&self) -> usize;
}

impl<O: DecodeOutput + ?Sized> DecodeOutput for &mut O {
    #[inline]
    fn write_pixel(&mut self, pixel: Pixel) {
        (**self).write_pixel(pixel)
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        (**self).max_len()
    }

    #[inline]
    fn current_output_position(&self) -> usize {
        (**self).current_output_position()
    }
}

/// Decodes into a caller-provided pixel slice.
pub struct SliceDecodeOutput<'a> {
    output: &'a mut [Pixel],
    output_idx: usize,
}

impl<'a> SliceDecodeOutput<'a> {
    #[inline]
    pub fn new(slice: &'a mut [Pixel]) -> Self {
        Self {
            output: slice,
            output_idx: 0,
        }
    }
}

impl DecodeOutput for SliceDecodeOutput<'_> {
    #[inline]
    fn write_pixel(&mut self, pixel: Pixel) {
        self.output[self.output_idx] = pixel;
        self.output_idx += 1;
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        Some(self.output.len())
    }

    #[inline]
    fn current_output_position(&self) -> usize {
        self.output_idx
    }
}
