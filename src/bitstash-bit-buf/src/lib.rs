//! Bit-granular serialization of primitive values.
//!
//! Bandwidth-sensitive formats, game networking in particular,
//! rarely need whole bytes for every field. This crate packs
//! booleans, integers of arbitrary width, range-compressed and
//! quantized floats, half floats and length-prefixed text into a
//! buffer at arbitrary bit offsets, and unpacks them again in the
//! same order.
//!
//! # Usage
//!
//! ```
//! use bitstash_bit_buf::{BitEncoding, BitStream};
//!
//! # fn main() -> Result<(), bitstash_bit_buf::Error> {
//! let mut stream: BitStream<'_> = BitStream::new();
//!
//! stream.reset_write()?;
//! stream.write_ranged(-1532i32, -2000, 0)?;
//! stream.write_bool(true)?;
//! stream.write_string("MyString", BitEncoding::Ascii)?;
//!
//! stream.reset_read()?;
//! assert_eq!(stream.read_ranged(-2000i32, 0)?, -1532);
//! assert!(stream.read_bool()?);
//! assert_eq!(stream.read_string(BitEncoding::Ascii)?, "MyString");
//! # Ok(())
//! # }
//! ```
//!
//! # Implementation
//!
//! The buffer is modelled as a sequence of 64-bit words. Every
//! value is written by OR-ing it into at most two adjacent words
//! of a zeroed buffer, and read back with the mirrored shift and
//! mask. Whether an owned buffer grows when it runs out of space
//! is chosen through the [`Capacity`] type parameter of
//! [`BitStream`].

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod buffer;
pub use buffer::BitBuffer;

mod encoding;
pub use encoding::{Latin1, TextEncoding, Utf16Le, Utf8};

mod error;
pub use error::Error;

mod memory;

mod numeric;
pub use numeric::RangedInt;

mod policy;
pub use policy::{Capacity, Fixed, Growable, StreamOptions, DEFAULT_CAPACITY};

mod serialize;
pub use serialize::BitSerialize;

mod stream;
pub use stream::{BitStream, FixedBitStream, GrowableBitStream, Mode};

mod strings;
pub use strings::BitEncoding;
