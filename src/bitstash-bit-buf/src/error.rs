use std::collections::TryReserveError;

use thiserror::Error;

use crate::Mode;

/// Errors that may occur while reading from or writing to a bit stream.
///
/// Errors fall into two classes. Capacity violations are caused by the
/// data or the environment and are subject to the stream's overflow
/// policy; see [`Error::is_capacity`]. Everything else is a contract
/// violation by the caller and is always reported.
#[derive(Debug, Error)]
pub enum Error {
    /// A read would move past the end of the buffer.
    #[error("attempted to read {requested} bits at offset {offset} past buffer end {limit}")]
    ReadOverflow {
        offset: usize,
        requested: usize,
        limit: usize,
    },

    /// A write would move past the end of a buffer that cannot grow.
    #[error("attempted to write {requested} bits at offset {offset} past buffer end {limit}")]
    WriteOverflow {
        offset: usize,
        requested: usize,
        limit: usize,
    },

    /// The allocator refused to grow an owned buffer.
    #[error("failed to grow buffer: {0}")]
    Grow(#[from] TryReserveError),

    /// The stream is not in the mode required for the operation.
    #[error("stream is in {actual:?} mode, expected {expected:?}")]
    WrongMode { expected: Mode, actual: Mode },

    /// The operation needs a buffer, but none is bound.
    #[error("stream has no buffer bound")]
    NoBuffer,

    /// The bound buffer is a shared borrow and cannot be written to.
    #[error("bound buffer is borrowed read-only")]
    ReadOnlyBuffer,

    /// A borrowed write buffer leaves less than one whole word of space.
    #[error("borrowed write buffer must span at least 8 bytes, got {0}")]
    BufferTooSmall(usize),

    /// An owned buffer of zero bytes was requested.
    #[error("buffer capacity must be greater than zero, got {0}")]
    InvalidCapacity(usize),

    /// A bit count outside of what the operation supports.
    #[error("invalid bit count {0}")]
    InvalidBitCount(u32),

    /// The lower bound of a range exceeds its upper bound, or an
    /// offset/length pair does not fit into its slice.
    #[error("range bounds are inverted or out of bounds")]
    InvalidRange,

    /// A value handed to a range-compressed codec lies outside of
    /// the declared range.
    #[error("value lies outside of its declared range")]
    ValueOutOfRange,

    /// A quantization step that is zero, negative or not finite.
    #[error("quantization precision must be positive and finite")]
    InvalidPrecision,

    /// A string or byte run whose length does not fit the 16-bit
    /// length prefix.
    #[error("sequence of {0} elements is too long for a 16-bit length prefix")]
    TooLong(usize),
}

impl Error {
    /// Whether this error is a capacity violation, which the stream
    /// may swallow depending on its overflow policy.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::ReadOverflow { .. } | Self::WriteOverflow { .. } | Self::Grow(_)
        )
    }
}
