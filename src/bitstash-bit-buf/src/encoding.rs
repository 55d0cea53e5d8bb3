use std::char::REPLACEMENT_CHARACTER;

use byteorder::{ByteOrder, LittleEndian};

// Stand-in for characters a narrow encoding cannot represent.
pub(crate) const SUBSTITUTE: u8 = b'?';

/// A byte-oriented text encoding for
/// [`BitStream::write_string_with`](crate::BitStream::write_string_with)
/// and friends.
///
/// Encodings are lenient: characters that cannot be represented are
/// substituted rather than rejected, and so are malformed bytes on
/// decode.
pub trait TextEncoding {
    /// Gets the exact number of bytes `value` encodes to.
    fn byte_count(&self, value: &str) -> usize;

    /// Encodes `value` into `out`, which is exactly
    /// [`Self::byte_count`] bytes long.
    fn encode_into(&self, value: &str, out: &mut [u8]);

    /// Decodes `bytes` and appends the text to `out`.
    fn decode(&self, bytes: &[u8], out: &mut String);
}

/// UTF-8, with malformed sequences decoded as U+FFFD.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf8;

impl TextEncoding for Utf8 {
    fn byte_count(&self, value: &str) -> usize {
        value.len()
    }

    fn encode_into(&self, value: &str, out: &mut [u8]) {
        out.copy_from_slice(value.as_bytes());
    }

    fn decode(&self, bytes: &[u8], out: &mut String) {
        out.push_str(&String::from_utf8_lossy(bytes));
    }
}

/// ISO-8859-1, one byte per character. Characters past U+00FF are
/// encoded as `?`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Latin1;

impl TextEncoding for Latin1 {
    fn byte_count(&self, value: &str) -> usize {
        value.chars().count()
    }

    fn encode_into(&self, value: &str, out: &mut [u8]) {
        for (b, c) in out.iter_mut().zip(value.chars()) {
            *b = u8::try_from(c).unwrap_or(SUBSTITUTE);
        }
    }

    fn decode(&self, bytes: &[u8], out: &mut String) {
        out.extend(bytes.iter().map(|&b| b as char));
    }
}

/// UTF-16 in little-endian byte order. Unpaired surrogates decode
/// as U+FFFD.
#[derive(Clone, Copy, Debug, Default)]
pub struct Utf16Le;

impl TextEncoding for Utf16Le {
    fn byte_count(&self, value: &str) -> usize {
        value.encode_utf16().count() * 2
    }

    fn encode_into(&self, value: &str, out: &mut [u8]) {
        for (chunk, unit) in out.chunks_exact_mut(2).zip(value.encode_utf16()) {
            LittleEndian::write_u16(chunk, unit);
        }
    }

    fn decode(&self, bytes: &[u8], out: &mut String) {
        let units = bytes.chunks_exact(2).map(LittleEndian::read_u16);
        out.extend(char::decode_utf16(units).map(|c| c.unwrap_or(REPLACEMENT_CHARACTER)));
    }
}
