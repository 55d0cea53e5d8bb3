use crate::{
    encoding::SUBSTITUTE, memory::prefix_len, BitStream, Capacity, Error, TextEncoding,
};

// Encoded strings up to this many bytes are staged on the stack.
const STACK_SCRATCH: usize = 256;

/// The built-in string encodings.
///
/// Every string starts with a 16-bit length prefix. For the ASCII
/// variants it counts characters, for UTF-16 it counts bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BitEncoding {
    /// One byte per character. Non-ASCII characters become `?`.
    #[default]
    Ascii,
    /// Seven bits per character. Non-ASCII characters become `?`.
    AsciiCompressed,
    /// UTF-16 code units, two bytes each.
    Utf16,
}

impl BitEncoding {
    // The width of a single character of an ASCII variant.
    const fn char_bits(self) -> u32 {
        match self {
            Self::AsciiCompressed => 7,
            Self::Ascii | Self::Utf16 => 8,
        }
    }
}

#[inline]
fn ascii_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        SUBSTITUTE
    }
}

#[inline]
fn ascii_char(b: u8) -> char {
    if b.is_ascii() {
        b as char
    } else {
        SUBSTITUTE as char
    }
}

// Staging area for encoding a string in one go. Short strings stay
// on the stack; the heap variant is freed when it goes out of scope.
enum Scratch {
    Stack([u8; STACK_SCRATCH], usize),
    Heap(Vec<u8>),
}

impl Scratch {
    fn new(len: usize) -> Self {
        if len <= STACK_SCRATCH {
            Self::Stack([0; STACK_SCRATCH], len)
        } else {
            Self::Heap(vec![0; len])
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Self::Stack(buf, len) => &mut buf[..*len],
            Self::Heap(buf) => buf.as_mut_slice(),
        }
    }

    fn as_slice(&self) -> &[u8] {
        match self {
            Self::Stack(buf, len) => &buf[..*len],
            Self::Heap(buf) => buf.as_slice(),
        }
    }
}

impl<C: Capacity> BitStream<'_, C> {
    /// Writes `value` with a 16-bit length prefix in the given
    /// encoding.
    ///
    /// Fails with [`Error::TooLong`] if the prefix would overflow.
    pub fn write_string(&mut self, value: &str, encoding: BitEncoding) -> Result<(), Error> {
        match encoding {
            BitEncoding::Ascii | BitEncoding::AsciiCompressed => {
                let count = prefix_len(value.chars().count())?;
                let char_bits = encoding.char_bits();

                if self.ensure_write(u16::BITS as usize + count as usize * char_bits as usize)? {
                    self.write_bits_unchecked(count as u64, u16::BITS);
                    for c in value.chars() {
                        self.write_bits_unchecked(ascii_byte(c) as u64, char_bits);
                    }
                }

                Ok(())
            }

            BitEncoding::Utf16 => {
                let units = value.encode_utf16().count();
                let bytes = prefix_len(units * 2)?;

                if self.ensure_write(u16::BITS as usize + bytes as usize * 8)? {
                    self.write_bits_unchecked(bytes as u64, u16::BITS);
                    for unit in value.encode_utf16() {
                        self.write_bits_unchecked(unit as u64, u16::BITS);
                    }
                }

                Ok(())
            }
        }
    }

    /// Writes raw UTF-16 code units in the [`BitEncoding::Utf16`]
    /// layout, without validating them.
    pub fn write_utf16(&mut self, units: &[u16]) -> Result<(), Error> {
        let bytes = prefix_len(units.len() * 2)?;

        if self.ensure_write(u16::BITS as usize + bytes as usize * 8)? {
            self.write_bits_unchecked(bytes as u64, u16::BITS);
            for &unit in units {
                self.write_bits_unchecked(unit as u64, u16::BITS);
            }
        }

        Ok(())
    }

    /// Reads a string written by [`Self::write_string`] with the same
    /// encoding.
    ///
    /// Unpaired surrogates in UTF-16 data decode as U+FFFD.
    pub fn read_string(&mut self, encoding: BitEncoding) -> Result<String, Error> {
        let prefix = self.read_u16()? as usize;
        if prefix == 0 {
            return Ok(String::new());
        }

        match encoding {
            BitEncoding::Ascii | BitEncoding::AsciiCompressed => {
                let char_bits = encoding.char_bits();
                if !self.ensure_read(prefix * char_bits as usize)? {
                    return Ok(String::new());
                }

                Ok((0..prefix)
                    .map(|_| ascii_char(self.read_bits_unchecked(char_bits) as u8))
                    .collect())
            }

            BitEncoding::Utf16 => {
                if !self.ensure_read(prefix * 8)? {
                    return Ok(String::new());
                }

                let units: Vec<u16> = (0..prefix / 2)
                    .map(|_| self.read_bits_unchecked(u16::BITS) as u16)
                    .collect();
                // An odd byte count leaves half a unit behind.
                self.advance((prefix % 2) * 8);

                Ok(String::from_utf16_lossy(&units))
            }
        }
    }

    /// Reads a string written by [`Self::write_string`] into `dest`
    /// as UTF-16 code units.
    ///
    /// At most `dest.len()` units are decoded, but the whole encoded
    /// string is consumed so that the cursor lands right after it.
    /// Returns the number of units written to `dest`.
    pub fn read_string_into(&mut self, dest: &mut [u16], encoding: BitEncoding) -> Result<usize, Error> {
        let prefix = self.read_u16()? as usize;
        if prefix == 0 {
            return Ok(0);
        }

        // The number of encoded units, their width and the size of
        // the whole body.
        let (encoded, unit_bits, body_bits) = match encoding {
            BitEncoding::Ascii | BitEncoding::AsciiCompressed => {
                let char_bits = encoding.char_bits();
                (prefix, char_bits, prefix * char_bits as usize)
            }
            BitEncoding::Utf16 => (prefix / 2, u16::BITS, prefix * 8),
        };

        if !self.ensure_read(body_bits)? {
            return Ok(0);
        }

        let count = encoded.min(dest.len());
        for unit in &mut dest[..count] {
            let raw = self.read_bits_unchecked(unit_bits);
            *unit = match encoding {
                BitEncoding::Utf16 => raw as u16,
                _ => ascii_char(raw as u8) as u16,
            };
        }

        // Skip whatever did not fit.
        self.advance(body_bits - count * unit_bits as usize);

        Ok(count)
    }

    /// Writes `value` with a 16-bit byte count prefix in a caller
    /// chosen [`TextEncoding`].
    pub fn write_string_with<E>(&mut self, value: &str, encoding: &E) -> Result<(), Error>
    where
        E: TextEncoding + ?Sized,
    {
        let len = encoding.byte_count(value);
        let prefix = prefix_len(len)?;

        if self.ensure_write(u16::BITS as usize + len * 8)? {
            let mut scratch = Scratch::new(len);
            encoding.encode_into(value, scratch.as_mut_slice());

            self.write_bits_unchecked(prefix as u64, u16::BITS);
            self.write_bytes_unchecked(scratch.as_slice());
        }

        Ok(())
    }

    /// Reads a string written by [`Self::write_string_with`] with the
    /// same encoding.
    pub fn read_string_with<E>(&mut self, encoding: &E) -> Result<String, Error>
    where
        E: TextEncoding + ?Sized,
    {
        let mut out = String::new();
        self.read_text_with(encoding, &mut out)?;
        Ok(out)
    }

    /// Reads a string written by [`Self::write_string_with`] into
    /// `dest`.
    ///
    /// At most `dest.len()` characters are stored, but the whole
    /// encoded string is consumed. Returns the number of characters
    /// written to `dest`.
    pub fn read_string_with_into<E>(&mut self, dest: &mut [char], encoding: &E) -> Result<usize, Error>
    where
        E: TextEncoding + ?Sized,
    {
        let mut text = String::new();
        self.read_text_with(encoding, &mut text)?;

        let mut count = 0;
        for (slot, c) in dest.iter_mut().zip(text.chars()) {
            *slot = c;
            count += 1;
        }

        Ok(count)
    }

    fn read_text_with<E>(&mut self, encoding: &E, out: &mut String) -> Result<(), Error>
    where
        E: TextEncoding + ?Sized,
    {
        let len = self.read_u16()? as usize;
        if len == 0 || !self.ensure_read(len * 8)? {
            return Ok(());
        }

        let mut scratch = Scratch::new(len);
        self.read_bytes_unchecked(scratch.as_mut_slice());
        encoding.decode(scratch.as_slice(), out);

        Ok(())
    }
}
