//! Fixed-capacity byte region with a read cursor, a valid-data limit and an
//! optional anchor.
//!
//! Both stream kinds stage their data in a [ByteBuffer]:
//! - input streams keep unread bytes in `start..limit` and refill behind `limit`,
//! - output streams keep not-yet-drained bytes in `start..limit` and append
//!   behind `limit`.
//!
//! The buffer enforces `anchor <= start <= limit <= capacity` at all times.
//! Space is reclaimed with [ByteBuffer::shift_to_front], an overlapping block
//! copy shared by the refill and the drain-compaction paths.

use crate::stream::stream_error::StreamError;

// =#========================================================================#=
// BYTE BUFFER
// =#========================================================================#=
/// A mutable byte region owned by exactly one stream.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    /// Backing storage, its length is the capacity
    storage: Vec<u8>,
    /// First byte not yet consumed (input) or drained (output)
    start: usize,
    /// One past the last valid byte
    limit: usize,
    /// Index whose bytes must survive refills, if set
    anchor: Option<usize>,
}

impl ByteBuffer {
    /// Creates an empty buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity],
            start: 0,
            limit: 0,
            anchor: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Number of valid bytes behind the cursor, `limit - start`.
    #[inline]
    pub fn available(&self) -> usize {
        self.limit - self.start
    }

    /// Number of bytes that can still be appended, `capacity - limit`.
    #[inline]
    pub fn free(&self) -> usize {
        self.storage.len() - self.limit
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.limit
    }

    /// The valid bytes from the cursor up to the limit.
    #[inline]
    pub fn unread(&self) -> &[u8] {
        &self.storage[self.start..self.limit]
    }

    /// The bytes from the anchor up to the cursor, if anchored.
    pub fn anchored(&self) -> Option<&[u8]> {
        self.anchor.map(|a| &self.storage[a..self.start])
    }

    /// Checks `anchor <= start <= limit <= capacity`.
    pub fn invariants_hold(&self) -> bool {
        self.anchor.is_none_or(|a| a <= self.start)
            && self.start <= self.limit
            && self.limit <= self.storage.len()
    }

    /// The free region behind the limit, to be filled by a source.
    #[inline]
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.limit..]
    }

    /// Marks `n` bytes behind the limit as valid.
    #[inline]
    pub(crate) fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.free());
        self.limit += n;
    }

    /// Copies `data` behind the limit. The caller guarantees it fits.
    pub(crate) fn append(&mut self, data: &[u8]) {
        let end = self.limit + data.len();
        self.storage[self.limit..end].copy_from_slice(data);
        self.limit = end;
    }

    /// Advances the cursor by `n` valid bytes.
    #[inline]
    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        self.start += n;
    }

    /// Places the anchor at the cursor, replacing any previous anchor.
    pub(crate) fn set_anchor(&mut self) {
        self.anchor = Some(self.start);
    }

    /// Removes the anchor and returns where it was.
    pub(crate) fn clear_anchor(&mut self) -> Option<usize> {
        self.anchor.take()
    }

    /// Moves the bytes `from..limit` to the front of the storage and rebases
    /// the cursor, limit and anchor accordingly.
    ///
    /// `from` must not be past the cursor nor past the anchor, so no
    /// unconsumed or anchored byte is lost. Source and destination may
    /// overlap.
    ///
    /// # Returns
    /// The number of positions everything moved down by (`from`).
    pub(crate) fn shift_to_front(&mut self, from: usize) -> usize {
        debug_assert!(from <= self.start);
        debug_assert!(self.anchor.is_none_or(|a| from <= a));
        if from == 0 {
            return 0;
        }

        self.storage.copy_within(from..self.limit, 0);
        self.start -= from;
        self.limit -= from;
        if let Some(a) = self.anchor.as_mut() {
            *a -= from;
        }
        from
    }

    /// Enlarges the storage to `capacity` bytes, keeping all content and indices.
    ///
    /// # Errors
    /// [StreamError::CapacityExceeded] if the allocation fails; the buffer
    /// is left unchanged.
    pub(crate) fn grow(&mut self, capacity: usize) -> Result<(), StreamError> {
        debug_assert!(capacity >= self.storage.len());
        let additional = capacity - self.storage.len();
        if self.storage.try_reserve_exact(additional).is_err() {
            return Err(StreamError::CapacityExceeded {
                required: capacity,
                max: self.storage.len(),
            });
        }
        self.storage.resize(capacity, 0);
        Ok(())
    }

    /// Drops all content and the anchor.
    pub(crate) fn clear(&mut self) {
        self.start = 0;
        self.limit = 0;
        self.anchor = None;
    }
}
