use crate::{
    consts::{QOI_HEADER_SIZE, QOI_PADDING, QOI_RUN_MAX},
    decode::{decode_header_with_options, DecodeError, DecodeOptions, DecodeOutput},
    Descriptor, Pixel, QoiDecodeContext,
};
use alloc::vec::Vec;

/// Appends decoded pixels to a vector.
pub struct VecDecodeOutput<'a> {
    output: &'a mut Vec<Pixel>,
    start: usize,
}

impl<'a> VecDecodeOutput<'a> {
    #[inline]
    pub fn new(output: &'a mut Vec<Pixel>) -> Self {
        let start = output.len();
        Self { output, start }
    }
}

impl DecodeOutput for VecDecodeOutput<'_> {
    #[inline]
    fn write_pixel(&mut self, pixel: Pixel) {
        self.output.push(pixel);
    }

    #[inline]
    fn max_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn current_output_position(&self) -> usize {
        self.output.len() - self.start
    }
}

impl QoiDecodeContext {
    /// Decodes a QOI image into a newly allocated pixel buffer.
    ///
    /// The buffer is only allocated once the header has been validated.
    pub fn decode_to_vec(data: &[u8]) -> Result<(Descriptor, Vec<Pixel>), DecodeError> {
        Self::decode_to_vec_with_options(data, &DecodeOptions::default())
    }

    pub fn decode_to_vec_with_options(
        data: &[u8],
        options: &DecodeOptions,
    ) -> Result<(Descriptor, Vec<Pixel>), DecodeError> {
        let desc = decode_header_with_options(data, options)?;

        // a chunk byte yields at most QOI_RUN_MAX pixels, the vec grows past that if needed
        let chunk_bytes = data.len() - QOI_HEADER_SIZE - QOI_PADDING.len();
        let capacity = desc
            .pixel_count()
            .min(chunk_bytes.saturating_mul(QOI_RUN_MAX));
        let mut pixels = Vec::with_capacity(capacity);
        let mut state = QoiDecodeContext::new();
        state.decode_with_state(data, VecDecodeOutput::new(&mut pixels), options)?;

        Ok((desc, pixels))
    }
}
