//! Bit-width arithmetic for range-compressed values.

/// Rounds `n` up to the next multiple of 8.
#[inline]
pub const fn next_multiple_of_8(n: usize) -> usize {
    (n + 7) & !7
}

/// Rounds `n` down to the previous multiple of 8.
#[inline]
pub const fn previous_multiple_of_8(n: usize) -> usize {
    n & !7
}

/// Gets the number of 64-bit words needed to hold `bits` bits.
#[inline]
pub const fn words_for_bits(bits: usize) -> usize {
    bits.div_ceil(u64::BITS as usize)
}

/// Gets the number of bits in `len` bytes.
///
/// Saturates at `usize::MAX`, which no buffer can hold, so an
/// oversized request still fails its bounds check.
#[inline]
pub const fn bits_for_bytes(len: usize) -> usize {
    len.saturating_mul(u8::BITS as usize)
}

/// Gets the number of bits needed to store every value in `0..=span`.
///
/// A span of zero still occupies a single bit on the wire.
#[inline]
pub const fn bits_for_span(span: u64) -> u32 {
    match span {
        0 => 1,
        s => s.ilog2() + 1,
    }
}

/// Gets the number of bits required to encode any value of the
/// unsigned range `[min, max]` as an offset from `min`.
///
/// `min` must not be greater than `max`.
#[inline]
pub const fn bits_required(min: u64, max: u64) -> u32 {
    debug_assert!(min <= max);
    bits_for_span(max.wrapping_sub(min))
}

/// Gets the number of bits required to encode any value of the
/// signed range `[min, max]` as an offset from `min`.
///
/// `min` must not be greater than `max`.
#[inline]
pub const fn bits_required_signed(min: i64, max: i64) -> u32 {
    debug_assert!(min <= max);
    // The distance between two i64 always fits into u64.
    bits_for_span((max as u64).wrapping_sub(min as u64))
}

/// Gets the number of bits needed for a float in `[min, max]` that is
/// quantized into steps of `precision`.
///
/// The step count is rounded half up before sizing, so a range that is
/// not an exact multiple of `precision` still gets room for its
/// topmost bucket.
#[inline]
pub fn quantized_bits(min: f32, max: f32, precision: f32) -> u32 {
    let steps = (max - min) * (1.0 / precision);
    bits_for_span((steps + 0.5) as u32 as u64)
}

/// Gets the largest value representable in `bits` bits.
#[inline]
pub const fn max_for_bits(bits: u32) -> u64 {
    debug_assert!(bits >= 1 && bits <= u64::BITS);
    u64::MAX >> (u64::BITS - bits)
}

/// Maps `value` from `[min, max]` onto the integer grid `0..=2^bits - 1`.
///
/// This does not preserve `0.0` exactly when `min == -max`.
#[inline]
pub fn normalize_f32(value: f32, min: f32, max: f32, bits: u32) -> u32 {
    let steps = max_for_bits(bits) as f32;
    let unit = (value - min) / (max - min);
    (unit * steps + 0.5) as u32
}

/// Maps a value produced by [`normalize_f32`] back onto `[min, max]`.
#[inline]
pub fn denormalize_f32(value: u32, min: f32, max: f32, bits: u32) -> f32 {
    let steps = max_for_bits(bits) as f32;
    let unit = value as f32 / steps;
    min + unit * (max - min)
}
