use bytemuck::Pod;

use crate::{BitEncoding, BitStream, Capacity, Error, Mode, RangedInt};

/// A value that can be written to or read from a [`BitStream`]
/// through the same call, depending on the stream's [`Mode`].
///
/// This lets a single routine describe a message layout for both
/// directions:
///
/// ```
/// # use bitstash_bit_buf::{BitStream, Error};
/// fn message(stream: &mut BitStream<'_>, id: &mut u32, name: &mut String) -> Result<(), Error> {
///     stream.serialize(id)?.serialize(name)?;
///     Ok(())
/// }
/// ```
pub trait BitSerialize {
    /// Writes `self` when the stream is writing, or replaces `self`
    /// with the next value when it is reading.
    fn bit_serialize<C: Capacity>(&mut self, stream: &mut BitStream<'_, C>) -> Result<(), Error>;
}

macro_rules! serialize_impl {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl BitSerialize for $ty {
                fn bit_serialize<C: Capacity>(
                    &mut self,
                    stream: &mut BitStream<'_, C>,
                ) -> Result<(), Error> {
                    match stream.mode() {
                        Mode::Writing => stream.$write(*self),
                        Mode::Reading => {
                            *self = stream.$read()?;
                            Ok(())
                        }
                        Mode::None => Err(Error::NoBuffer),
                    }
                }
            }
        )*
    };
}

serialize_impl! {
    bool => write_bool, read_bool;
    u8 => write_u8, read_u8;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    i8 => write_i8, read_i8;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

/// Strings go through the default [`BitEncoding`].
impl BitSerialize for String {
    fn bit_serialize<C: Capacity>(&mut self, stream: &mut BitStream<'_, C>) -> Result<(), Error> {
        match stream.mode() {
            Mode::Writing => stream.write_string(self, BitEncoding::default()),
            Mode::Reading => {
                *self = stream.read_string(BitEncoding::default())?;
                Ok(())
            }
            Mode::None => Err(Error::NoBuffer),
        }
    }
}

impl<C: Capacity> BitStream<'_, C> {
    /// Writes or reads `value` depending on the current [`Mode`].
    ///
    /// Returns the stream again so that calls can be chained.
    pub fn serialize<T>(&mut self, value: &mut T) -> Result<&mut Self, Error>
    where
        T: BitSerialize + ?Sized,
    {
        value.bit_serialize(self)?;
        Ok(self)
    }

    /// Writes or reads a range-compressed `value` depending on the
    /// current [`Mode`].
    pub fn serialize_ranged<T: RangedInt>(
        &mut self,
        value: &mut T,
        min: T,
        max: T,
    ) -> Result<&mut Self, Error> {
        match self.mode() {
            Mode::Writing => self.write_ranged(*value, min, max)?,
            Mode::Reading => *value = self.read_ranged(min, max)?,
            Mode::None => return Err(Error::NoBuffer),
        }

        Ok(self)
    }

    /// Writes or reads a quantized `value` depending on the current
    /// [`Mode`].
    ///
    /// See [`Self::write_quantized_f32`] for the meaning of the
    /// bounds and `precision`.
    pub fn serialize_quantized_f32(
        &mut self,
        value: &mut f32,
        min: f32,
        max: f32,
        precision: f32,
    ) -> Result<&mut Self, Error> {
        match self.mode() {
            Mode::Writing => self.write_quantized_f32(*value, min, max, precision)?,
            Mode::Reading => *value = self.read_quantized_f32(min, max, precision)?,
            Mode::None => return Err(Error::NoBuffer),
        }

        Ok(self)
    }

    /// Writes or reads `value` as a 16-bit half-precision float
    /// depending on the current [`Mode`].
    pub fn serialize_half(&mut self, value: &mut f32) -> Result<&mut Self, Error> {
        match self.mode() {
            Mode::Writing => self.write_half(*value)?,
            Mode::Reading => *value = self.read_half()?,
            Mode::None => return Err(Error::NoBuffer),
        }

        Ok(self)
    }

    /// Writes or reads the memory representation of `value`
    /// depending on the current [`Mode`].
    pub fn serialize_pod<T: Pod>(&mut self, value: &mut T) -> Result<&mut Self, Error> {
        match self.mode() {
            Mode::Writing => self.write_pod(value)?,
            Mode::Reading => *value = self.read_pod()?,
            Mode::None => return Err(Error::NoBuffer),
        }

        Ok(self)
    }
}
