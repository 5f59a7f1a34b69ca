use qoi::{
    consts::{QOI_HEADER_SIZE, QOI_PADDING},
    encode::{max_encoded_len, EncodeWriteError},
    utils::hash,
    Colorspace, Descriptor, EncodeError, Pixel, QoiDecodeContext, QoiEncodeContext,
};

fn encode(width: u32, height: u32, pixels: &[Pixel]) -> Vec<u8> {
    let desc = Descriptor::new(width, height, 4, Colorspace::Srgb);
    QoiEncodeContext::encode_to_vec(&desc, pixels).unwrap()
}

/// Strips header and end marker, leaving only the chunks.
fn chunks(encoded: &[u8]) -> &[u8] {
    assert_eq!(&encoded[encoded.len() - 8..], &QOI_PADDING);
    &encoded[QOI_HEADER_SIZE..encoded.len() - 8]
}

#[test]
fn single_pixel_rgb_literal() {
    let desc = Descriptor::new(1, 1, 3, Colorspace::Srgb);
    let encoded = QoiEncodeContext::encode_to_vec(&desc, &[Pixel::rgb(10, 20, 30)]).unwrap();

    assert_eq!(
        encoded,
        [
            0x71, 0x6F, 0x69, 0x66, 0, 0, 0, 1, 0, 0, 0, 1, 3, 0, // header
            0xFE, 10, 20, 30, // QOI_OP_RGB
            0, 0, 0, 0, 0, 0, 0, 1, // end marker
        ]
    );
    assert_eq!(encoded.len(), 26);
}

#[test]
fn two_identical_pixels() {
    let desc = Descriptor::new(2, 1, 3, Colorspace::Srgb);
    let red = Pixel::rgb(255, 0, 0);
    let encoded = QoiEncodeContext::encode_to_vec(&desc, &[red, red]).unwrap();

    assert_eq!(&encoded[..14], &[0x71, 0x6F, 0x69, 0x66, 0, 0, 0, 2, 0, 0, 0, 1, 3, 0]);
    // red differs from the implicit opaque black by -1 (wrapping), then one repeat
    assert_eq!(chunks(&encoded), &[0x5A, 0xC0]);
    assert_eq!(encoded.len(), 24);
}

#[test]
fn uniform_image_is_only_runs() {
    let pixels = vec![Pixel::OPAQUE_BLACK; 130];
    let encoded = encode(13, 10, &pixels);

    // ceil(130 / 62) runs: 62 + 62 + 6
    assert_eq!(chunks(&encoded), &[0xFD, 0xFD, 0xC5]);
}

#[test]
fn run_flushes_at_62() {
    let next = Pixel::rgb(0, 0, 1);

    let mut pixels = vec![Pixel::OPAQUE_BLACK; 62];
    pixels.push(next);
    assert_eq!(chunks(&encode(63, 1, &pixels)), &[0xFD, 0x6B]);

    let mut pixels = vec![Pixel::OPAQUE_BLACK; 63];
    pixels.push(next);
    assert_eq!(chunks(&encode(64, 1, &pixels)), &[0xFD, 0xC0, 0x6B]);
}

#[test]
fn run_after_encoded_pixel() {
    let px = Pixel::rgb(100, 100, 100);
    let mut pixels = vec![px; 64];
    pixels.push(Pixel::OPAQUE_BLACK);

    assert_eq!(
        chunks(&encode(65, 1, &pixels)),
        &[0xFE, 100, 100, 100, 0xFD, 0xC0, 0xFE, 0, 0, 0]
    );
}

#[test]
fn index_requires_full_pixel_match() {
    let a = Pixel::rgb(10, 0, 0);
    let b = Pixel::rgb(74, 0, 0);
    assert_ne!(a, b);
    assert_eq!(hash(a), hash(b));

    // `b` evicted `a` from their shared slot
    assert_eq!(
        chunks(&encode(3, 1, &[a, b, a])),
        &[0xFE, 10, 0, 0, 0xFE, 74, 0, 0, 0xFE, 10, 0, 0]
    );
}

#[test]
fn index_hit() {
    let a = Pixel::rgb(10, 0, 0);
    let c = Pixel::rgb(10, 50, 0);
    assert_ne!(hash(a), hash(c));
    assert_eq!(hash(a), 19);

    assert_eq!(
        chunks(&encode(3, 1, &[a, c, a])),
        &[0xFE, 10, 0, 0, 0xFE, 10, 50, 0, 19]
    );
}

#[test]
fn transparent_black_hits_zeroed_array() {
    assert_eq!(chunks(&encode(1, 1, &[Pixel::new(0, 0, 0, 0)])), &[0x00]);
}

#[test]
fn luma() {
    assert_eq!(
        chunks(&encode(1, 1, &[Pixel::rgb(20, 25, 30)])),
        &[0xB9, 0x3D]
    );
}

#[test]
fn diff_wraps_around() {
    assert_eq!(
        chunks(&encode(1, 1, &[Pixel::rgb(255, 255, 255)])),
        &[0x55]
    );
}

#[test]
fn alpha_change_needs_rgba() {
    let half = Pixel::new(0, 0, 0, 128);
    let pixels = [half, half, Pixel::new(1, 0, 0, 128), Pixel::new(1, 0, 0, 0)];

    assert_eq!(
        chunks(&encode(4, 1, &pixels)),
        &[0xFF, 0, 0, 0, 128, 0xC0, 0x7A, 0xFF, 1, 0, 0, 0]
    );
}

#[test]
fn rgb_channels_still_encode_alpha() {
    let desc = Descriptor::new(1, 1, 3, Colorspace::Srgb);
    let encoded = QoiEncodeContext::encode_to_vec(&desc, &[Pixel::new(1, 2, 3, 4)]).unwrap();

    assert_eq!(chunks(&encoded), &[0xFF, 1, 2, 3, 4]);
}

#[test]
fn header_fields() {
    let desc = Descriptor::new(0x0102_0304, 1, 4, Colorspace::Linear);
    let mut header = Vec::new();
    QoiEncodeContext::encode_header(&desc, &mut header).unwrap();

    assert_eq!(
        header,
        [0x71, 0x6F, 0x69, 0x66, 1, 2, 3, 4, 0, 0, 0, 1, 4, 1]
    );
    assert_eq!(header, qoi::utils::write_header(&desc));
}

#[test]
fn invalid_input() {
    let pixels = [Pixel::OPAQUE_BLACK; 4];

    let desc = Descriptor::new(3, 1, 4, Colorspace::Srgb);
    assert!(matches!(
        QoiEncodeContext::encode_to_vec(&desc, &pixels),
        Err(EncodeError::InvalidDimensions {
            width: 3,
            height: 1,
            pixel_count: 4
        })
    ));

    let desc = Descriptor::new(2, 2, 5, Colorspace::Srgb);
    assert!(matches!(
        QoiEncodeContext::encode_to_vec(&desc, &pixels),
        Err(EncodeError::InvalidChannels { channels: 5 })
    ));

    let desc = Descriptor::new(0, 2, 4, Colorspace::Srgb);
    assert!(matches!(
        QoiEncodeContext::encode_to_vec(&desc, &[]),
        Err(EncodeError::EmptyImage { .. })
    ));

    let desc = Descriptor::new(20_000, 20_000, 4, Colorspace::Srgb);
    assert!(matches!(
        QoiEncodeContext::encode_to_vec(&desc, &pixels),
        Err(EncodeError::TooManyPixels { .. })
    ));
}

#[test]
fn invalid_input_writes_nothing() {
    let desc = Descriptor::new(3, 1, 4, Colorspace::Srgb);
    let mut out = Vec::new();

    let result = QoiEncodeContext::encode(&desc, &[Pixel::OPAQUE_BLACK], &mut out);
    assert!(matches!(result, Err(EncodeWriteError::InvalidInput { .. })));
    assert!(out.is_empty());

    let mut ctx = QoiEncodeContext::new();
    assert!(ctx
        .encode_to_vec_with_state(&desc, &[Pixel::OPAQUE_BLACK], &mut out)
        .is_err());
    assert!(out.is_empty());
}

#[test]
fn deterministic_and_writer_matches_vec() {
    let pixels = (0..=255u8)
        .map(|i| Pixel::new(i, i.wrapping_mul(7), i / 3, 255 - (i / 64) * 10))
        .collect::<Vec<_>>();
    let desc = Descriptor::new(16, 16, 4, Colorspace::Srgb);

    let first = QoiEncodeContext::encode_to_vec(&desc, &pixels).unwrap();
    let second = QoiEncodeContext::encode_to_vec(&desc, &pixels).unwrap();
    assert_eq!(first, second);

    let mut written = Vec::new();
    QoiEncodeContext::encode(&desc, &pixels, &mut written).unwrap();
    assert_eq!(first, written);

    assert!(first.len() <= max_encoded_len(&desc));
}

#[test]
fn reused_context_starts_fresh() {
    let desc = Descriptor::new(1, 1, 4, Colorspace::Srgb);
    let pixels = [Pixel::rgb(10, 20, 30)];
    let mut ctx = QoiEncodeContext::new();

    let mut first = Vec::new();
    ctx.encode_to_vec_with_state(&desc, &pixels, &mut first).unwrap();
    let mut second = Vec::new();
    ctx.encode_to_vec_with_state(&desc, &pixels, &mut second).unwrap();
    assert_eq!(chunks(&second), [0xFE, 10, 20, 30]);
    assert_eq!(first, second);

    let mut written = Vec::new();
    ctx.encode_with_state(&desc, &pixels, &mut written).unwrap();
    assert_eq!(first, written);

    let (_, decoded) = QoiDecodeContext::decode_to_vec(&second).unwrap();
    assert_eq!(decoded, pixels);
}
