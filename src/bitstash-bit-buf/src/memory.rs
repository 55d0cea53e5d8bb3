use bitstash_utils::math::bits_for_bytes;
use bytemuck::Pod;
use byteorder::{ByteOrder, LittleEndian};

use crate::{BitStream, Capacity, Error};

impl<C: Capacity> BitStream<'_, C> {
    /// Gets a view of the whole underlying buffer as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer().as_bytes()
    }

    /// Gets a view of the bytes touched by the cursor so far.
    pub fn written_bytes(&self) -> &[u8] {
        let bytes = self.as_bytes();
        &bytes[..self.bytes_used().min(bytes.len())]
    }

    /// Copies the bytes touched by the cursor into `dest`.
    ///
    /// Returns how many bytes were copied, which is less than
    /// [`Self::bytes_used`] when `dest` is too short.
    pub fn copy_to(&self, dest: &mut [u8]) -> usize {
        let src = self.written_bytes();
        let len = src.len().min(dest.len());
        dest[..len].copy_from_slice(&src[..len]);
        len
    }

    /// Writes `data` at the cursor, which need not be byte-aligned.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }

        if self.ensure_write(bits_for_bytes(data.len()))? {
            self.write_bytes_unchecked(data);
        }

        Ok(())
    }

    /// Writes `data` preceded by its length as a `u16`.
    pub fn write_bytes_prefixed(&mut self, data: &[u8]) -> Result<(), Error> {
        let len = prefix_len(data.len())?;
        if self.ensure_write(u16::BITS as usize + bits_for_bytes(data.len()))? {
            self.write_bits_unchecked(len as u64, u16::BITS);
            self.write_bytes_unchecked(data);
        }

        Ok(())
    }

    /// Fills `dest` with bytes read at the cursor.
    ///
    /// When the stream swallows an overflow, `dest` is zeroed.
    pub fn read_bytes_into(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        if dest.is_empty() {
            return Ok(());
        }

        if self.ensure_read(bits_for_bytes(dest.len()))? {
            self.read_bytes_unchecked(dest);
        } else {
            dest.fill(0);
        }

        Ok(())
    }

    /// Reads `len` bytes at the cursor.
    ///
    /// When the stream swallows an overflow, nothing is returned.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
        if len == 0 || !self.ensure_read(bits_for_bytes(len))? {
            return Ok(Vec::new());
        }

        let mut out = vec![0; len];
        self.read_bytes_unchecked(&mut out);

        Ok(out)
    }

    /// Reads bytes written by [`Self::write_bytes_prefixed`].
    pub fn read_bytes_prefixed(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_u16()?;
        self.read_bytes(len as usize)
    }

    /// Writes the memory representation of `value` at the cursor.
    ///
    /// The bytes are taken as `T` lays them out in memory, so the
    /// fields of a multi-byte type appear in host byte order.
    pub fn write_pod<T: Pod>(&mut self, value: &T) -> Result<(), Error> {
        self.write_bytes(bytemuck::bytes_of(value))
    }

    /// Reads a value written by [`Self::write_pod`].
    ///
    /// When the stream swallows an overflow, a zeroed `T` is returned.
    pub fn read_pod<T: Pod>(&mut self) -> Result<T, Error> {
        let mut value: T = bytemuck::Zeroable::zeroed();
        self.read_bytes_into(bytemuck::bytes_of_mut(&mut value))?;
        Ok(value)
    }

    // Whole words go through a single 64-bit store each, the tail
    // byte by byte.
    pub(crate) fn write_bytes_unchecked(&mut self, data: &[u8]) {
        let mut chunks = data.chunks_exact(8);
        for chunk in &mut chunks {
            self.write_bits_unchecked(LittleEndian::read_u64(chunk), u64::BITS);
        }
        for &b in chunks.remainder() {
            self.write_bits_unchecked(b as u64, u8::BITS);
        }
    }

    pub(crate) fn read_bytes_unchecked(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_exact_mut(8);
        for chunk in &mut chunks {
            LittleEndian::write_u64(chunk, self.read_bits_unchecked(u64::BITS));
        }
        for b in chunks.into_remainder() {
            *b = self.read_bits_unchecked(u8::BITS) as u8;
        }
    }
}

// Validates a length against the 16-bit prefix in front of byte
// runs and strings.
pub(crate) fn prefix_len(len: usize) -> Result<u16, Error> {
    u16::try_from(len).map_err(|_| Error::TooLong(len))
}
