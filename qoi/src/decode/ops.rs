use crate::{utils::sum, Pixel};

// OP: 0x01
#[inline(always)]
pub(crate) const fn small_diff(prev: Pixel, byte: u8) -> Pixel {
    let (r_diff, g_diff, b_diff) = (
        ((byte >> 4) & 0b11) as i8 - 2,
        ((byte >> 2) & 0b11) as i8 - 2,
        (byte & 0b11) as i8 - 2,
    );

    apply_diff(prev, r_diff, g_diff, b_diff)
}

// OP: 0x10
#[inline(always)]
pub(crate) const fn luma_diff(prev: Pixel, byte: u8, rg_bg_diffs: u8) -> Pixel {
    let g_diff = (byte & 0b0011_1111) as i8 - 32;
    let (rg_diff, bg_diff) = (
        (rg_bg_diffs >> 4) as i8 - 8,
        (rg_bg_diffs & 0b1111) as i8 - 8,
    );
    let (r_diff, b_diff) = (rg_diff + g_diff, bg_diff + g_diff);

    apply_diff(prev, r_diff, g_diff, b_diff)
}

// OP: 0xFE
#[inline(always)]
pub(crate) const fn rgb(prev: Pixel, [r, g, b]: [u8; 3]) -> Pixel {
    Pixel::new(r, g, b, prev.a)
}

#[inline]
pub(crate) const fn apply_diff(prev: Pixel, r_diff: i8, g_diff: i8, b_diff: i8) -> Pixel {
    Pixel::new(
        sum(prev.r, r_diff),
        sum(prev.g, g_diff),
        sum(prev.b, b_diff),
        prev.a,
    )
}
