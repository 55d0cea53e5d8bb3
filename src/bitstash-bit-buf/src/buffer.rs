use std::mem;

use bitstash_utils::math::{next_multiple_of_8, previous_multiple_of_8};
use byteorder::{ByteOrder, LittleEndian};

use crate::Error;

const WORD_BYTES: usize = mem::size_of::<u64>();
const WORD_BITS: usize = u64::BITS as usize;

// Where the words of a buffer live.
#[derive(Debug, Default)]
enum Storage<'a> {
    #[default]
    Empty,

    // Words allocated by the buffer itself, kept in little-endian
    // representation so that the byte view matches the wire layout
    // on every host.
    Owned(Vec<u64>),

    // A caller's buffer that may only be read from.
    Shared(&'a [u8]),

    // A caller's buffer that may be written to but never grown.
    Exclusive(&'a mut [u8]),
}

/// A word-addressable memory region backing a bit stream.
///
/// The buffer either owns its storage, in which case it may grow
/// it on demand, or it borrows a caller-provided byte slice for
/// the lifetime `'a`. The two states are mutually exclusive:
/// binding one always releases the other.
///
/// Two lengths are tracked. The total length covers every bit
/// of the storage and bounds reads. The write limit is the total
/// length rounded down to a whole 64-bit word, so that word-sized
/// stores never touch bytes past the end of a borrowed slice.
#[derive(Debug, Default)]
pub struct BitBuffer<'a> {
    storage: Storage<'a>,

    // The total size of the storage, in bits.
    total_bits: usize,

    // The bit offset up to which writes are permitted.
    write_bits: usize,
}

impl<'a> BitBuffer<'a> {
    /// Creates a new [`BitBuffer`] with no storage bound.
    pub const fn new() -> Self {
        Self {
            storage: Storage::Empty,
            total_bits: 0,
            write_bits: 0,
        }
    }

    /// Whether any storage is bound to the buffer.
    #[inline]
    pub fn is_bound(&self) -> bool {
        !matches!(self.storage, Storage::Empty)
    }

    /// Whether the buffer allocated its storage itself.
    #[inline]
    pub fn owns_storage(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Whether the bound storage may be written to.
    #[inline]
    pub fn is_writable(&self) -> bool {
        matches!(self.storage, Storage::Owned(_) | Storage::Exclusive(_))
    }

    /// Gets the total length of the storage in bits.
    #[inline]
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Gets the bit offset up to which writes may go.
    #[inline]
    pub fn write_limit(&self) -> usize {
        self.write_bits
    }

    /// Binds an owned, zeroed region of at least `nbytes` bytes.
    ///
    /// The length is rounded up to a whole word. Existing owned
    /// storage is reused when it is large enough.
    pub fn bind_owned(&mut self, nbytes: usize) -> Result<(), Error> {
        let words = next_multiple_of_8(nbytes) / WORD_BYTES;

        let mut vec = self.take_owned();
        vec.fill(0);
        let res = resize_zeroed(&mut vec, words);

        log::debug!("Bound owned buffer of {} bytes", vec.len() * WORD_BYTES);
        self.install_owned(vec);
        res
    }

    /// Binds a copy of `data` in owned storage.
    ///
    /// Bytes of the storage past `data.len()` are zeroed.
    pub fn bind_copy_of(&mut self, data: &[u8]) -> Result<(), Error> {
        let words = next_multiple_of_8(data.len()) / WORD_BYTES;

        let mut vec = self.take_owned();
        let res = resize_zeroed(&mut vec, words);
        if res.is_ok() {
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(vec.as_mut_slice());
            let (head, tail) = bytes.split_at_mut(data.len());
            head.copy_from_slice(data);
            tail.fill(0);
        }

        log::debug!("Bound owned copy of {} bytes", data.len());
        self.install_owned(vec);
        res
    }

    /// Binds a caller-provided slice for reading.
    ///
    /// Any owned storage is released first.
    pub fn bind_borrowed(&mut self, data: &'a [u8]) {
        self.release();

        log::debug!("Borrowed {} bytes for reading", data.len());
        self.total_bits = data.len() * 8;
        self.write_bits = previous_multiple_of_8(data.len()) * 8;
        self.storage = Storage::Shared(data);
    }

    /// Binds a caller-provided slice for writing.
    ///
    /// The slice must leave at least one whole word of write space.
    /// Any owned storage is released first. The contents of the
    /// slice are left untouched; see [`Self::clear`].
    pub fn bind_borrowed_mut(&mut self, data: &'a mut [u8]) -> Result<(), Error> {
        let writable = previous_multiple_of_8(data.len());
        if writable < WORD_BYTES {
            return Err(Error::BufferTooSmall(data.len()));
        }

        self.release();

        log::debug!("Borrowed {} bytes for writing", data.len());
        self.total_bits = data.len() * 8;
        self.write_bits = writable * 8;
        self.storage = Storage::Exclusive(data);

        Ok(())
    }

    /// Grows owned storage so that at least `nbits` bits fit.
    ///
    /// The new size is twice the current one or `nbits`, whichever
    /// is larger, rounded up to a whole word. Existing data is kept
    /// and the added tail is zeroed. Borrowed storage never grows.
    pub fn grow(&mut self, nbits: usize) -> Result<(), Error> {
        let Storage::Owned(vec) = &mut self.storage else {
            return Err(Error::WriteOverflow {
                offset: self.write_bits,
                requested: nbits.saturating_sub(self.write_bits),
                limit: self.write_bits,
            });
        };

        let target = (self.total_bits * 2).max(nbits).max(WORD_BITS);
        let words = target.div_ceil(WORD_BITS);

        log::debug!(
            "Growing owned buffer from {} to {} bytes",
            vec.len() * WORD_BYTES,
            words * WORD_BYTES
        );
        resize_zeroed(vec, words)?;
        self.sync_owned_lengths();

        Ok(())
    }

    /// Zeroes every writable byte of the bound storage.
    pub fn clear(&mut self) -> Result<(), Error> {
        match &mut self.storage {
            Storage::Empty => Err(Error::NoBuffer),
            Storage::Shared(_) => Err(Error::ReadOnlyBuffer),
            Storage::Owned(vec) => {
                vec.fill(0);
                Ok(())
            }
            Storage::Exclusive(data) => {
                data.fill(0);
                Ok(())
            }
        }
    }

    /// Releases owned storage and forgets any borrow.
    pub fn release(&mut self) {
        if let Storage::Owned(vec) = mem::take(&mut self.storage) {
            log::debug!("Releasing owned buffer of {} bytes", vec.len() * WORD_BYTES);
        }

        self.total_bits = 0;
        self.write_bits = 0;
    }

    /// Gets a view of the whole storage as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Empty => &[],
            Storage::Owned(vec) => bytemuck::cast_slice(vec.as_slice()),
            Storage::Shared(data) => *data,
            Storage::Exclusive(data) => &**data,
        }
    }

    pub(crate) fn as_bytes_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.storage {
            Storage::Owned(vec) => Some(bytemuck::cast_slice_mut(vec.as_mut_slice())),
            Storage::Exclusive(data) => Some(&mut **data),
            Storage::Empty | Storage::Shared(_) => None,
        }
    }

    // Loads the word at index `idx`. A partial trailing word of a
    // borrowed slice reads as zero-padded.
    #[inline]
    pub(crate) fn load_word(&self, idx: usize) -> u64 {
        match &self.storage {
            Storage::Owned(vec) => vec.get(idx).map_or(0, |&w| u64::from_le(w)),
            Storage::Shared(data) => load_le(data, idx),
            Storage::Exclusive(data) => load_le(data, idx),
            Storage::Empty => 0,
        }
    }

    // ORs `value` into the word at index `idx`. The caller has
    // already checked the index against the write limit.
    #[inline]
    pub(crate) fn or_word(&mut self, idx: usize, value: u64) {
        match &mut self.storage {
            Storage::Owned(vec) => vec[idx] |= value.to_le(),
            Storage::Exclusive(data) => {
                let start = idx * WORD_BYTES;
                let chunk = &mut data[start..start + WORD_BYTES];
                let word = LittleEndian::read_u64(chunk);
                LittleEndian::write_u64(chunk, word | value);
            }
            Storage::Shared(_) | Storage::Empty => {
                debug_assert!(false, "write to a buffer that is not writable");
            }
        }
    }

    fn take_owned(&mut self) -> Vec<u64> {
        match mem::take(&mut self.storage) {
            Storage::Owned(vec) => vec,
            _ => Vec::new(),
        }
    }

    fn install_owned(&mut self, vec: Vec<u64>) {
        self.storage = Storage::Owned(vec);
        self.sync_owned_lengths();
    }

    fn sync_owned_lengths(&mut self) {
        if let Storage::Owned(vec) = &self.storage {
            self.total_bits = vec.len() * WORD_BITS;
            self.write_bits = self.total_bits;
        }
    }
}

fn resize_zeroed(vec: &mut Vec<u64>, words: usize) -> Result<(), Error> {
    if words > vec.len() {
        vec.try_reserve_exact(words - vec.len())?;
        vec.resize(words, 0);
    }

    Ok(())
}

fn load_le(data: &[u8], idx: usize) -> u64 {
    let start = idx * WORD_BYTES;
    match data.get(start..start + WORD_BYTES) {
        Some(chunk) => LittleEndian::read_u64(chunk),
        None => {
            let tail = data.get(start..).unwrap_or(&[]);
            let mut word = [0; WORD_BYTES];
            word[..tail.len()].copy_from_slice(tail);
            LittleEndian::read_u64(&word)
        }
    }
}
