/// The number of bytes a stream allocates when it is reset for
/// writing without a buffer of its own.
pub const DEFAULT_CAPACITY: usize = 1200;

/// Decides how a [`BitStream`](crate::BitStream) reacts when a write
/// runs out of space in an owned buffer.
pub trait Capacity {
    /// Whether owned buffers are grown on demand.
    const GROWABLE: bool;
}

/// Owned buffers grow to fit whatever is written to them.
#[derive(Debug)]
pub enum Growable {}

impl Capacity for Growable {
    const GROWABLE: bool = true;
}

/// Owned buffers keep the capacity they were bound with; writing past
/// it is a capacity violation.
#[derive(Debug)]
pub enum Fixed {}

impl Capacity for Fixed {
    const GROWABLE: bool = false;
}

/// Configuration for a [`BitStream`](crate::BitStream).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamOptions {
    /// Whether capacity violations are returned as errors.
    ///
    /// When disabled, a violation marks the stream invalid and the
    /// offending operation yields a zero value instead. Callers then
    /// check [`BitStream::is_valid`](crate::BitStream::is_valid) once
    /// after a batch of operations.
    pub throw_on_overflow: bool,

    /// The size in bytes of the buffer allocated by
    /// [`BitStream::reset_write`](crate::BitStream::reset_write) when
    /// no buffer is bound yet.
    pub default_capacity: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            throw_on_overflow: true,
            default_capacity: DEFAULT_CAPACITY,
        }
    }
}
