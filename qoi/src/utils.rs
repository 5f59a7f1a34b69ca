use crate::{
    consts::{QOI_HEADER_SIZE, QOI_MAGIC},
    Descriptor, Pixel,
};
use byteorder::{BigEndian, ByteOrder};

/// Index of a pixel in the color array.
#[inline]
pub const fn hash(pixel: Pixel) -> u8 {
    // 64 divides 256, so wrapping in u8 keeps the low 6 bits of the full sum intact.
    pixel
        .r
        .wrapping_mul(3)
        .wrapping_add(pixel.g.wrapping_mul(5))
        .wrapping_add(pixel.b.wrapping_mul(7))
        .wrapping_add(pixel.a.wrapping_mul(11))
        & 0b111111 // % 64
}

/// Computes the signed difference between two channel values, wrapping around.
#[inline]
pub const fn diff(a: u8, b: u8) -> i8 {
    a.wrapping_sub(b) as i8
}

/// Applies a signed difference to a channel value, wrapping around.
#[inline]
pub const fn sum(a: u8, d: i8) -> u8 {
    a.wrapping_add(d as u8)
}

/// Serializes a descriptor into the 14-byte header.
///
/// The descriptor is written as is; validating it is up to the caller.
pub fn write_header(desc: &Descriptor) -> [u8; QOI_HEADER_SIZE] {
    let mut header = [0; QOI_HEADER_SIZE];
    BigEndian::write_u32(&mut header[0..4], QOI_MAGIC);
    BigEndian::write_u32(&mut header[4..8], desc.width);
    BigEndian::write_u32(&mut header[8..12], desc.height);
    header[12] = desc.channels;
    header[13] = desc.colorspace.into();
    header
}

/// Flattens pixels into interleaved bytes, with or without alpha.
#[cfg(feature = "alloc")]
pub fn pixels_to_bytes(pixels: &[Pixel], channels: u8) -> alloc::vec::Vec<u8> {
    let channels = if channels == 3 { 3 } else { 4 };
    let mut out = alloc::vec::Vec::with_capacity(pixels.len() * channels);
    for pixel in pixels {
        out.extend_from_slice(&pixel.to_array()[..channels]);
    }
    out
}
