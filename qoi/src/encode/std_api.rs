use crate::{
    consts::*,
    encode::{check_input, EncodeError, EncodeSink, QoiEncodeContext},
    Descriptor, Pixel,
};
use byteorder::{BigEndian, WriteBytesExt};
use log::trace;
use snafu::{ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
pub enum EncodeWriteError {
    #[snafu(display("Cannot encode image: {source}"))]
    InvalidInput { source: EncodeError },
    #[snafu(display("Failed to write encoded image: {source}"))]
    WriteIo { source: std::io::Error },
}

struct IoSink<W>(W);

impl<W: Write> EncodeSink for IoSink<W> {
    type Error = std::io::Error;

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(bytes)
    }
}

impl QoiEncodeContext {
    pub fn encode<W: Write>(
        desc: &Descriptor,
        pixels: &[Pixel],
        w: W,
    ) -> Result<(), EncodeWriteError> {
        let mut ctx = QoiEncodeContext::new();
        ctx.encode_with_state(desc, pixels, w)
    }

    pub fn encode_header<W: Write>(desc: &Descriptor, mut w: W) -> Result<(), EncodeWriteError> {
        w.write_u32::<BigEndian>(QOI_MAGIC).context(WriteIoSnafu)?;
        w.write_u32::<BigEndian>(desc.width).context(WriteIoSnafu)?;
        w.write_u32::<BigEndian>(desc.height).context(WriteIoSnafu)?;
        w.write_u8(desc.channels).context(WriteIoSnafu)?;
        w.write_u8(desc.colorspace.into()).context(WriteIoSnafu)
    }

    /// Writes header, chunks and end marker. The input is validated before anything is written.
    ///
    /// The context is reset first, every image starts from the initial state.
    pub fn encode_with_state<W: Write>(
        &mut self,
        desc: &Descriptor,
        pixels: &[Pixel],
        mut w: W,
    ) -> Result<(), EncodeWriteError> {
        check_input(desc, pixels).context(InvalidInputSnafu)?;
        *self = Self::new();

        Self::encode_header(desc, &mut w)?;
        self.encode_pixels(pixels, &mut w)?;
        w.write_all(&QOI_PADDING).context(WriteIoSnafu)?;

        trace!("Encoded {} pixels", pixels.len());

        Ok(())
    }

    /// Writes only the chunks for `pixels`, continuing from the current state.
    pub fn encode_pixels<W: Write>(
        &mut self,
        pixels: &[Pixel],
        w: W,
    ) -> Result<(), EncodeWriteError> {
        self.encode_chunks(pixels, &mut IoSink(w))
            .context(WriteIoSnafu)
    }
}
