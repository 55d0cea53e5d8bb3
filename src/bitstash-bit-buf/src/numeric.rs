use bitstash_utils::{
    half,
    math::{bits_required, bits_required_signed, denormalize_f32, normalize_f32, quantized_bits},
    zigzag::{zag32, zag64, zig32, zig64},
};

use crate::{BitStream, Capacity, Error};

/// An integer type that can be range-compressed.
///
/// A value in `[min, max]` is stored as its distance from `min`,
/// using only as many bits as the widest distance needs.
pub trait RangedInt: Copy + PartialOrd {
    /// Gets the distance of `self` from `min`.
    fn offset_from(self, min: Self) -> u64;

    /// Recovers a value from its distance to `min`.
    fn from_offset(offset: u64, min: Self) -> Self;

    /// Gets the number of bits needed for any value in `[min, max]`.
    fn bits_between(min: Self, max: Self) -> u32;
}

macro_rules! ranged_unsigned_impl {
    ($($ty:ty),* $(,)*) => {
        $(
            impl RangedInt for $ty {
                #[inline]
                fn offset_from(self, min: Self) -> u64 {
                    (self as u64).wrapping_sub(min as u64)
                }

                #[inline]
                fn from_offset(offset: u64, min: Self) -> Self {
                    (min as u64).wrapping_add(offset) as Self
                }

                #[inline]
                fn bits_between(min: Self, max: Self) -> u32 {
                    bits_required(min as u64, max as u64)
                }
            }
        )*
    };
}

macro_rules! ranged_signed_impl {
    ($($ty:ty),* $(,)*) => {
        $(
            impl RangedInt for $ty {
                #[inline]
                fn offset_from(self, min: Self) -> u64 {
                    (self as i64).wrapping_sub(min as i64) as u64
                }

                #[inline]
                fn from_offset(offset: u64, min: Self) -> Self {
                    (min as i64).wrapping_add(offset as i64) as Self
                }

                #[inline]
                fn bits_between(min: Self, max: Self) -> u32 {
                    bits_required_signed(min as i64, max as i64)
                }
            }
        )*
    };
}

ranged_unsigned_impl!(u8, u16, u32, u64);
ranged_signed_impl!(i8, i16, i32, i64);

#[inline]
fn check_width(nbits: u32, max: u32) -> Result<(), Error> {
    if (1..=max).contains(&nbits) {
        Ok(())
    } else {
        Err(Error::InvalidBitCount(nbits))
    }
}

#[inline]
fn check_range<T: PartialOrd>(min: T, max: T) -> Result<(), Error> {
    // Written this way round so that NaN bounds are rejected too.
    if min <= max {
        Ok(())
    } else {
        Err(Error::InvalidRange)
    }
}

fn check_quantization(min: f32, max: f32, precision: f32) -> Result<(), Error> {
    if !min.is_finite() || !max.is_finite() {
        return Err(Error::InvalidRange);
    }
    check_range(min, max)?;

    if precision > 0.0 && precision.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidPrecision)
    }
}

macro_rules! unsigned_impl {
    ($($ty:ty => $write:ident, $write_bits:ident, $read:ident, $read_bits:ident, $peek:ident, $peek_bits:ident;)*) => {
        $(
            #[doc = concat!("Writes a full-width [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $write(&mut self, value: $ty) -> Result<(), Error> {
                self.write_bits(value as u64, <$ty>::BITS)
            }

            #[doc = concat!("Writes the low `nbits` bits of a [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $write_bits(&mut self, value: $ty, nbits: u32) -> Result<(), Error> {
                check_width(nbits, <$ty>::BITS)?;
                self.write_bits(value as u64, nbits)
            }

            #[doc = concat!("Reads a full-width [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $read(&mut self) -> Result<$ty, Error> {
                self.read_bits(<$ty>::BITS).map(|v| v as $ty)
            }

            #[doc = concat!("Reads a [`", stringify!($ty), "`] stored in `nbits` bits.")]
            #[inline]
            pub fn $read_bits(&mut self, nbits: u32) -> Result<$ty, Error> {
                check_width(nbits, <$ty>::BITS)?;
                self.read_bits(nbits).map(|v| v as $ty)
            }

            #[doc = concat!("Peeks a full-width [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $peek(&mut self) -> Result<$ty, Error> {
                self.peek_bits(<$ty>::BITS).map(|v| v as $ty)
            }

            #[doc = concat!("Peeks a [`", stringify!($ty), "`] stored in `nbits` bits.")]
            #[inline]
            pub fn $peek_bits(&mut self, nbits: u32) -> Result<$ty, Error> {
                check_width(nbits, <$ty>::BITS)?;
                self.peek_bits(nbits).map(|v| v as $ty)
            }
        )*
    };
}

// Signed values are zigzag-mapped so that small magnitudes of
// either sign only need a few bits. Narrow types share the
// 32-bit mapping.
macro_rules! signed_impl {
    ($($ty:ty as $wide:ty, $uwide:ty, $zig:ident, $zag:ident => $write:ident, $write_bits:ident, $read:ident, $read_bits:ident, $peek:ident, $peek_bits:ident;)*) => {
        $(
            #[doc = concat!("Writes a full-width, zigzag-mapped [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $write(&mut self, value: $ty) -> Result<(), Error> {
                self.write_bits($zig(value as $wide) as u64, <$ty>::BITS)
            }

            #[doc = concat!("Writes a zigzag-mapped [`", stringify!($ty), "`] in `nbits` bits.")]
            ///
            /// The mapped value must fit; excess high bits are dropped.
            #[inline]
            pub fn $write_bits(&mut self, value: $ty, nbits: u32) -> Result<(), Error> {
                check_width(nbits, <$ty>::BITS)?;
                self.write_bits($zig(value as $wide) as u64, nbits)
            }

            #[doc = concat!("Reads a full-width, zigzag-mapped [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $read(&mut self) -> Result<$ty, Error> {
                self.read_bits(<$ty>::BITS).map(|v| $zag(v as $uwide) as $ty)
            }

            #[doc = concat!("Reads a zigzag-mapped [`", stringify!($ty), "`] stored in `nbits` bits.")]
            #[inline]
            pub fn $read_bits(&mut self, nbits: u32) -> Result<$ty, Error> {
                check_width(nbits, <$ty>::BITS)?;
                self.read_bits(nbits).map(|v| $zag(v as $uwide) as $ty)
            }

            #[doc = concat!("Peeks a full-width, zigzag-mapped [`", stringify!($ty), "`].")]
            #[inline]
            pub fn $peek(&mut self) -> Result<$ty, Error> {
                self.peek_bits(<$ty>::BITS).map(|v| $zag(v as $uwide) as $ty)
            }

            #[doc = concat!("Peeks a zigzag-mapped [`", stringify!($ty), "`] stored in `nbits` bits.")]
            #[inline]
            pub fn $peek_bits(&mut self, nbits: u32) -> Result<$ty, Error> {
                check_width(nbits, <$ty>::BITS)?;
                self.peek_bits(nbits).map(|v| $zag(v as $uwide) as $ty)
            }
        )*
    };
}

impl<C: Capacity> BitStream<'_, C> {
    unsigned_impl! {
        u8 => write_u8, write_u8_bits, read_u8, read_u8_bits, peek_u8, peek_u8_bits;
        u16 => write_u16, write_u16_bits, read_u16, read_u16_bits, peek_u16, peek_u16_bits;
        u32 => write_u32, write_u32_bits, read_u32, read_u32_bits, peek_u32, peek_u32_bits;
        u64 => write_u64, write_u64_bits, read_u64, read_u64_bits, peek_u64, peek_u64_bits;
    }

    signed_impl! {
        i8 as i32, u32, zig32, zag32 => write_i8, write_i8_bits, read_i8, read_i8_bits, peek_i8, peek_i8_bits;
        i16 as i32, u32, zig32, zag32 => write_i16, write_i16_bits, read_i16, read_i16_bits, peek_i16, peek_i16_bits;
        i32 as i32, u32, zig32, zag32 => write_i32, write_i32_bits, read_i32, read_i32_bits, peek_i32, peek_i32_bits;
        i64 as i64, u64, zig64, zag64 => write_i64, write_i64_bits, read_i64, read_i64_bits, peek_i64, peek_i64_bits;
    }

    /// Writes a [`bool`] as a single bit.
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_bits(value as u64, 1)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        self.read_bits(1).map(|v| v != 0)
    }

    #[inline]
    pub fn peek_bool(&mut self) -> Result<bool, Error> {
        self.peek_bits(1).map(|v| v != 0)
    }

    /// Writes the bit pattern of an [`f32`].
    #[inline]
    pub fn write_f32(&mut self, value: f32) -> Result<(), Error> {
        self.write_bits(value.to_bits() as u64, u32::BITS)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_bits(u32::BITS).map(|v| f32::from_bits(v as u32))
    }

    #[inline]
    pub fn peek_f32(&mut self) -> Result<f32, Error> {
        self.peek_bits(u32::BITS).map(|v| f32::from_bits(v as u32))
    }

    /// Writes the bit pattern of an [`f64`].
    #[inline]
    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        self.write_bits(value.to_bits(), u64::BITS)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_bits(u64::BITS).map(f64::from_bits)
    }

    #[inline]
    pub fn peek_f64(&mut self) -> Result<f64, Error> {
        self.peek_bits(u64::BITS).map(f64::from_bits)
    }

    /// Writes an [`f32`] as a 16-bit IEEE-754 half float.
    ///
    /// Values are rounded to the nearest half float; magnitudes
    /// past `65504` become infinite.
    #[inline]
    pub fn write_half(&mut self, value: f32) -> Result<(), Error> {
        self.write_bits(half::compress(value) as u64, u16::BITS)
    }

    /// Reads a half float written by [`Self::write_half`].
    #[inline]
    pub fn read_half(&mut self) -> Result<f32, Error> {
        self.read_bits(u16::BITS).map(|v| half::decompress(v as u16))
    }

    #[inline]
    pub fn peek_half(&mut self) -> Result<f32, Error> {
        self.peek_bits(u16::BITS).map(|v| half::decompress(v as u16))
    }

    /// Writes `value` as its distance from `min`, in as few bits as
    /// the range `[min, max]` allows.
    ///
    /// A range holding a single value still occupies one bit.
    pub fn write_ranged<T: RangedInt>(&mut self, value: T, min: T, max: T) -> Result<(), Error> {
        check_range(min, max)?;
        if value < min || value > max {
            return Err(Error::ValueOutOfRange);
        }

        self.write_bits(value.offset_from(min), T::bits_between(min, max))
    }

    /// Reads a value written by [`Self::write_ranged`] with the
    /// same bounds.
    pub fn read_ranged<T: RangedInt>(&mut self, min: T, max: T) -> Result<T, Error> {
        check_range(min, max)?;
        self.read_bits(T::bits_between(min, max))
            .map(|v| T::from_offset(v, min))
    }

    pub fn peek_ranged<T: RangedInt>(&mut self, min: T, max: T) -> Result<T, Error> {
        check_range(min, max)?;
        self.peek_bits(T::bits_between(min, max))
            .map(|v| T::from_offset(v, min))
    }

    /// Writes `value` quantized to steps of `precision` within
    /// `[min, max]`.
    ///
    /// The step index is rounded half up.
    pub fn write_quantized_f32(
        &mut self,
        value: f32,
        min: f32,
        max: f32,
        precision: f32,
    ) -> Result<(), Error> {
        check_quantization(min, max, precision)?;
        if !(min..=max).contains(&value) {
            return Err(Error::ValueOutOfRange);
        }

        let step = (value - min) * (1.0 / precision);
        self.write_bits(
            (step + 0.5) as u32 as u64,
            quantized_bits(min, max, precision),
        )
    }

    /// Reads a value written by [`Self::write_quantized_f32`] with
    /// the same parameters.
    pub fn read_quantized_f32(&mut self, min: f32, max: f32, precision: f32) -> Result<f32, Error> {
        check_quantization(min, max, precision)?;
        self.read_bits(quantized_bits(min, max, precision))
            .map(|v| v as f32 * precision + min)
    }

    pub fn peek_quantized_f32(&mut self, min: f32, max: f32, precision: f32) -> Result<f32, Error> {
        check_quantization(min, max, precision)?;
        self.peek_bits(quantized_bits(min, max, precision))
            .map(|v| v as f32 * precision + min)
    }

    /// Writes `value` mapped from `[min, max]` onto an evenly spaced
    /// grid of `nbits` bits.
    pub fn write_normalized_f32(
        &mut self,
        value: f32,
        min: f32,
        max: f32,
        nbits: u32,
    ) -> Result<(), Error> {
        check_width(nbits, u32::BITS)?;
        check_range(min, max)?;
        if !(min..=max).contains(&value) {
            return Err(Error::ValueOutOfRange);
        }

        self.write_bits(normalize_f32(value, min, max, nbits) as u64, nbits)
    }

    pub fn read_normalized_f32(&mut self, min: f32, max: f32, nbits: u32) -> Result<f32, Error> {
        check_width(nbits, u32::BITS)?;
        check_range(min, max)?;
        self.read_bits(nbits)
            .map(|v| denormalize_f32(v as u32, min, max, nbits))
    }

    pub fn peek_normalized_f32(&mut self, min: f32, max: f32, nbits: u32) -> Result<f32, Error> {
        check_width(nbits, u32::BITS)?;
        check_range(min, max)?;
        self.peek_bits(nbits)
            .map(|v| denormalize_f32(v as u32, min, max, nbits))
    }
}
