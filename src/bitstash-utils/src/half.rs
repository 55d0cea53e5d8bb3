//! Conversion between [`f32`] and IEEE-754 binary16 bit patterns.
//!
//! Half floats carry 1 sign bit, 5 exponent bits (bias 15) and 10
//! mantissa bits. Compression rounds to nearest, ties to even, and
//! saturates to infinity past `65504`. Subnormals are produced and
//! consumed in both directions; NaN stays NaN and infinities stay
//! infinite.

const F32_BIAS: i32 = 127;
const F16_BIAS: i32 = 15;
const REBIAS: i32 = F32_BIAS - F16_BIAS;

const F16_EXP_MASK: u32 = 0x7C00;
const F16_MANTISSA_MASK: u32 = 0x03FF;
const F16_HIDDEN_BIT: u32 = 0x0400;

/// Compresses an [`f32`] into the bit pattern of the nearest half float.
pub fn compress(value: f32) -> u16 {
    let bits = value.to_bits() as i32;

    let sign = (bits >> 16) & 0x8000;
    let mut exponent = ((bits >> 23) & 0xFF) - REBIAS;
    let mut mantissa = bits & 0x007F_FFFF;

    if exponent <= 0 {
        // Too small even for a subnormal half, flush to signed zero.
        if exponent < -10 {
            return sign as u16;
        }

        // Make the hidden bit explicit and shift it into subnormal range,
        // rounding to nearest even on the way.
        mantissa |= 0x0080_0000;

        let shift = 14 - exponent;
        let half_way = (1 << (shift - 1)) - 1;
        let odd = (mantissa >> shift) & 1;

        mantissa = (mantissa + half_way + odd) >> shift;
        return (sign | mantissa) as u16;
    }

    if exponent == 0xFF - REBIAS {
        if mantissa == 0 {
            return (sign | F16_EXP_MASK as i32) as u16;
        }

        // Keep NaN a NaN even when its payload lives in the low bits only.
        mantissa >>= 13;
        return (sign | F16_EXP_MASK as i32 | mantissa | (mantissa == 0) as i32) as u16;
    }

    mantissa = mantissa + 0x0FFF + ((mantissa >> 13) & 1);

    // Rounding carried into the exponent.
    if mantissa & 0x0080_0000 != 0 {
        mantissa = 0;
        exponent += 1;
    }

    if exponent > 30 {
        return (sign | F16_EXP_MASK as i32) as u16;
    }

    (sign | (exponent << 10) | (mantissa >> 13)) as u16
}

/// Decompresses the bit pattern of a half float into an [`f32`].
///
/// Every half float is exactly representable, so this never rounds.
pub fn decompress(value: u16) -> f32 {
    let value = value as u32;

    let sign = (value & 0x8000) << 16;
    let mut mantissa = value & F16_MANTISSA_MASK;

    let bits = match value & F16_EXP_MASK {
        0 if mantissa == 0 => sign,

        0 => {
            // Normalize the subnormal by shifting until the hidden bit shows up.
            let mut exponent = 1 - F16_BIAS;
            while mantissa & F16_HIDDEN_BIT == 0 {
                exponent -= 1;
                mantissa <<= 1;
            }
            mantissa &= F16_MANTISSA_MASK;

            sign | (((exponent + F32_BIAS) as u32) << 23) | (mantissa << 13)
        }

        F16_EXP_MASK => sign | 0x7F80_0000 | (mantissa << 13),

        exp => sign | (((exp >> 10) + REBIAS as u32) << 23) | (mantissa << 13),
    };

    f32::from_bits(bits)
}
