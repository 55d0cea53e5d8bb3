use std::marker::PhantomData;

use bitstash_utils::math::max_for_bits;
use byteorder::{ByteOrder, LittleEndian};

use crate::{BitBuffer, Capacity, Error, Fixed, Growable, StreamOptions};

const WORD_BITS: usize = u64::BITS as usize;

/// The direction a [`BitStream`] currently operates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// The stream was never reset or has been disposed.
    #[default]
    None,
    /// Values are packed into the buffer.
    Writing,
    /// Values are unpacked from the buffer.
    Reading,
}

/// A [`BitStream`] whose owned buffers grow on demand.
pub type GrowableBitStream<'a> = BitStream<'a, Growable>;

/// A [`BitStream`] whose owned buffers never grow.
pub type FixedBitStream<'a> = BitStream<'a, Fixed>;

/// A cursor that packs values into a [`BitBuffer`] at arbitrary
/// bit offsets and unpacks them again in the same order.
///
/// Bits are stored least significant first within 64-bit words
/// and words are laid out in little-endian byte order. A value
/// that straddles a word boundary keeps its low bits in the lower
/// word and continues in the low bits of the next one.
///
/// A stream is used in passes: a `reset_write*` call starts a
/// writing pass, a `reset_read*` call starts a reading pass over
/// the same or another buffer. Operations that do not match the
/// current [`Mode`] fail with [`Error::WrongMode`].
///
/// Running out of space is a capacity violation. Depending on
/// [`StreamOptions::throw_on_overflow`], it is either returned as
/// an error or recorded by clearing [`BitStream::is_valid`] while
/// the operation yields a zero value.
#[derive(Debug)]
pub struct BitStream<'a, C: Capacity = Growable> {
    buffer: BitBuffer<'a>,

    // The position of the cursor, in bits.
    offset: usize,

    mode: Mode,

    // Cleared on the first capacity violation of a pass.
    valid: bool,

    options: StreamOptions,

    _capacity: PhantomData<C>,
}

impl<C: Capacity> Default for BitStream<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, C: Capacity> BitStream<'a, C> {
    /// Creates an empty stream with default [`StreamOptions`].
    pub fn new() -> Self {
        Self::with_options(StreamOptions::default())
    }

    /// Creates an empty stream with the given options.
    pub fn with_options(options: StreamOptions) -> Self {
        Self {
            buffer: BitBuffer::new(),
            offset: 0,
            mode: Mode::None,
            valid: false,
            options,
            _capacity: PhantomData,
        }
    }

    /// Gets the current [`Mode`] of the stream.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn is_reading(&self) -> bool {
        self.mode == Mode::Reading
    }

    #[inline]
    pub fn is_writing(&self) -> bool {
        self.mode == Mode::Writing
    }

    /// Whether no capacity violation happened since the last reset.
    ///
    /// A stream that was never reset is not valid.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the stream allocated the buffer it operates on.
    #[inline]
    pub fn owns_buffer(&self) -> bool {
        self.buffer.owns_storage()
    }

    #[inline]
    pub fn throws_on_overflow(&self) -> bool {
        self.options.throw_on_overflow
    }

    /// Switches between returning capacity violations as errors and
    /// silently invalidating the stream.
    #[inline]
    pub fn set_throw_on_overflow(&mut self, throw: bool) {
        self.options.throw_on_overflow = throw;
    }

    #[inline]
    pub fn options(&self) -> StreamOptions {
        self.options
    }

    /// Gets the buffer the stream operates on.
    #[inline]
    pub fn buffer(&self) -> &BitBuffer<'a> {
        &self.buffer
    }

    /// Gets the position of the cursor in bits.
    #[inline]
    pub fn bit_offset(&self) -> usize {
        self.offset
    }

    /// Gets the position of the cursor in bytes, including the
    /// fraction of a partially consumed byte.
    #[inline]
    pub fn byte_offset(&self) -> f64 {
        self.offset as f64 / 8.0
    }

    /// Gets the number of bytes touched so far, counting a partially
    /// consumed byte as a whole one.
    #[inline]
    pub fn bytes_used(&self) -> usize {
        self.offset.div_ceil(8)
    }

    /// Gets the usable length of the buffer in bits.
    ///
    /// While writing this is the write limit of the buffer; otherwise
    /// it is the total length.
    #[inline]
    pub fn bit_length(&self) -> usize {
        match self.mode {
            Mode::Reading => self.buffer.total_bits(),
            _ => self.buffer.write_limit(),
        }
    }

    /// Gets the usable length of the buffer in whole bytes.
    #[inline]
    pub fn byte_length(&self) -> usize {
        self.bit_length() / 8
    }

    /// Starts a writing pass.
    ///
    /// The bound buffer is zeroed and reused if it can be written to.
    /// Otherwise a new one of [`StreamOptions::default_capacity`]
    /// bytes is allocated.
    pub fn reset_write(&mut self) -> Result<(), Error> {
        if self.buffer.is_writable() {
            self.buffer.clear()?;
            self.begin(Mode::Writing);
            Ok(())
        } else {
            self.reset_write_with_capacity(self.options.default_capacity)
        }
    }

    /// Starts a writing pass into an owned buffer of at least
    /// `nbytes` bytes.
    ///
    /// Owned storage that is already large enough is reused.
    pub fn reset_write_with_capacity(&mut self, nbytes: usize) -> Result<(), Error> {
        if nbytes == 0 {
            return Err(Error::InvalidCapacity(nbytes));
        }

        self.buffer.bind_owned(nbytes)?;
        self.begin(Mode::Writing);

        Ok(())
    }

    /// Starts a writing pass directly into `data`.
    ///
    /// The slice is zeroed. Writes stop at the last whole 64-bit
    /// word of the slice and the buffer never grows.
    pub fn reset_write_borrowed(&mut self, data: &'a mut [u8]) -> Result<(), Error> {
        self.buffer.bind_borrowed_mut(data)?;
        self.buffer.clear()?;
        self.begin(Mode::Writing);

        Ok(())
    }

    /// Starts a writing pass that appends to a copy of `data`.
    pub fn reset_write_copy(&mut self, data: &[u8]) -> Result<(), Error> {
        self.buffer.bind_copy_of(data)?;
        self.begin(Mode::Writing);
        self.offset = data.len() * 8;

        Ok(())
    }

    /// Starts a reading pass over the buffer that is currently bound,
    /// usually to read back what was just written.
    pub fn reset_read(&mut self) -> Result<(), Error> {
        if !self.buffer.is_bound() {
            return Err(Error::NoBuffer);
        }

        self.begin(Mode::Reading);
        Ok(())
    }

    /// Starts a reading pass directly over `data` without copying.
    pub fn reset_read_borrowed(&mut self, data: &'a [u8]) {
        self.buffer.bind_borrowed(data);
        self.begin(Mode::Reading);
    }

    /// Starts a reading pass over an owned copy of `data`.
    pub fn reset_read_copy(&mut self, data: &[u8]) -> Result<(), Error> {
        self.buffer.bind_copy_of(data)?;
        self.begin(Mode::Reading);

        Ok(())
    }

    /// Starts a reading pass over an owned copy of `length` bytes
    /// of `data`, starting at `offset`.
    pub fn reset_read_slice(
        &mut self,
        data: &[u8],
        offset: usize,
        length: usize,
    ) -> Result<(), Error> {
        let slice = offset
            .checked_add(length)
            .and_then(|end| data.get(offset..end))
            .ok_or(Error::InvalidRange)?;

        self.reset_read_copy(slice)
    }

    /// Releases the buffer and returns the stream to its empty state.
    ///
    /// A borrowed buffer is only forgotten, never freed.
    pub fn dispose(&mut self) {
        self.buffer.release();
        self.offset = 0;
        self.mode = Mode::None;
        self.valid = false;
    }

    /// Writes the low `nbits` bits of `value`.
    ///
    /// `nbits` must be in `1..=64`; higher bits of `value` are ignored.
    pub fn write_bits(&mut self, value: u64, nbits: u32) -> Result<(), Error> {
        check_bit_count(nbits)?;
        if self.ensure_write(nbits as usize)? {
            self.write_bits_unchecked(value, nbits);
        }

        Ok(())
    }

    /// Reads `nbits` bits and advances the cursor past them.
    pub fn read_bits(&mut self, nbits: u32) -> Result<u64, Error> {
        check_bit_count(nbits)?;
        Ok(if self.ensure_read(nbits as usize)? {
            self.read_bits_unchecked(nbits)
        } else {
            0
        })
    }

    /// Reads `nbits` bits without advancing the cursor.
    pub fn peek_bits(&mut self, nbits: u32) -> Result<u64, Error> {
        check_bit_count(nbits)?;
        Ok(if self.ensure_read(nbits as usize)? {
            self.peek_bits_unchecked(nbits)
        } else {
            0
        })
    }

    /// Moves the cursor `nbits` bits forward.
    ///
    /// While writing, the skipped bits are left zero.
    pub fn skip(&mut self, nbits: usize) -> Result<(), Error> {
        let ready = match self.mode {
            Mode::Writing => self.ensure_write(nbits)?,
            Mode::Reading => self.ensure_read(nbits)?,
            Mode::None => return Err(Error::NoBuffer),
        };

        // Bits past the cursor of a writing pass are still zero.
        if ready {
            self.advance(nbits);
        }

        Ok(())
    }

    /// Leaves room for a 32-bit size prefix, to be filled in by
    /// [`Self::prefix_size`] when the message is complete.
    pub fn reserve_size_prefix(&mut self) -> Result<(), Error> {
        self.expect_mode(Mode::Writing)?;
        self.skip(u32::BITS as usize)
    }

    /// Stamps the number of bytes used so far as a little-endian
    /// `u32` into the first four bytes of the buffer.
    ///
    /// The cursor does not move. Returns the stamped byte count.
    pub fn prefix_size(&mut self) -> Result<usize, Error> {
        self.expect_mode(Mode::Writing)?;

        let used = self.bytes_used();
        if self.buffer.as_bytes().len() < 4 {
            self.capacity_violation(Error::WriteOverflow {
                offset: 0,
                requested: u32::BITS as usize,
                limit: self.buffer.write_limit(),
            })?;
            return Ok(used);
        }

        if let Some(bytes) = self.buffer.as_bytes_mut() {
            LittleEndian::write_u32(&mut bytes[..4], used as u32);
        }

        Ok(used)
    }

    fn begin(&mut self, mode: Mode) {
        log::trace!("Stream reset for {mode:?}");

        self.offset = 0;
        self.mode = mode;
        self.valid = true;
    }

    #[inline]
    pub(crate) fn expect_mode(&self, expected: Mode) -> Result<(), Error> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(wrong_mode(expected, self.mode))
        }
    }

    // Applies the overflow policy to a capacity violation. Returns
    // `Ok(false)` when the violation was swallowed.
    #[cold]
    #[inline(never)]
    fn capacity_violation(&mut self, error: Error) -> Result<bool, Error> {
        debug_assert!(error.is_capacity());

        if self.options.throw_on_overflow {
            self.valid = false;
            return Err(error);
        }

        if self.valid {
            log::warn!("Invalidating stream: {error}");
        }
        self.valid = false;

        Ok(false)
    }

    // Makes room for writing `nbits` bits at the cursor, growing an
    // owned buffer if the capacity strategy allows it. `Ok(false)`
    // means the write must be dropped.
    pub(crate) fn ensure_write(&mut self, nbits: usize) -> Result<bool, Error> {
        self.expect_mode(Mode::Writing)?;

        // An end past `usize::MAX` is an overflow like any other.
        let needed = self.offset.checked_add(nbits);
        if needed.is_some_and(|n| n <= self.buffer.write_limit()) {
            return Ok(true);
        }

        if let Some(needed) = needed.filter(|_| C::GROWABLE && self.buffer.owns_storage()) {
            return match self.buffer.grow(needed) {
                Ok(()) => Ok(true),
                Err(e) => self.capacity_violation(e),
            };
        }

        self.capacity_violation(Error::WriteOverflow {
            offset: self.offset,
            requested: nbits,
            limit: self.buffer.write_limit(),
        })
    }

    // Checks that `nbits` bits can be read at the cursor. `Ok(false)`
    // means the read must yield a zero value.
    pub(crate) fn ensure_read(&mut self, nbits: usize) -> Result<bool, Error> {
        self.expect_mode(Mode::Reading)?;

        let needed = self.offset.checked_add(nbits);
        if needed.is_some_and(|n| n <= self.buffer.total_bits()) {
            Ok(true)
        } else {
            self.capacity_violation(Error::ReadOverflow {
                offset: self.offset,
                requested: nbits,
                limit: self.buffer.total_bits(),
            })
        }
    }

    // Only called after a successful `ensure_*` check covering
    // `nbits`, so the sum stays within the buffer.
    #[inline]
    pub(crate) fn advance(&mut self, nbits: usize) {
        debug_assert!(self.offset.checked_add(nbits).is_some());
        self.offset += nbits;
    }

    #[inline]
    pub(crate) fn write_bits_unchecked(&mut self, value: u64, nbits: u32) {
        debug_assert!((1..=u64::BITS).contains(&nbits));
        debug_assert!(self.offset + nbits as usize <= self.buffer.write_limit());

        let idx = self.offset / WORD_BITS;
        let shift = (self.offset % WORD_BITS) as u32;
        let value = value & max_for_bits(nbits);

        self.buffer.or_word(idx, value << shift);
        if shift + nbits > u64::BITS {
            self.buffer.or_word(idx + 1, value >> (u64::BITS - shift));
        }

        self.offset += nbits as usize;
    }

    #[inline]
    pub(crate) fn peek_bits_unchecked(&self, nbits: u32) -> u64 {
        debug_assert!((1..=u64::BITS).contains(&nbits));
        debug_assert!(self.offset + nbits as usize <= self.buffer.total_bits());

        let idx = self.offset / WORD_BITS;
        let shift = (self.offset % WORD_BITS) as u32;

        let mut value = self.buffer.load_word(idx) >> shift;
        if shift + nbits > u64::BITS {
            value |= self.buffer.load_word(idx + 1) << (u64::BITS - shift);
        }

        value & max_for_bits(nbits)
    }

    #[inline]
    pub(crate) fn read_bits_unchecked(&mut self, nbits: u32) -> u64 {
        let value = self.peek_bits_unchecked(nbits);
        self.offset += nbits as usize;
        value
    }
}

#[cold]
fn wrong_mode(expected: Mode, actual: Mode) -> Error {
    Error::WrongMode { expected, actual }
}

#[inline]
pub(crate) fn check_bit_count(nbits: u32) -> Result<(), Error> {
    if (1..=u64::BITS).contains(&nbits) {
        Ok(())
    } else {
        Err(Error::InvalidBitCount(nbits))
    }
}
