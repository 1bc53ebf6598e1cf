use std::fmt;

use crate::DEFAULT_BUFFER_CAPACITY;

/// Growable byte store with a write cursor.
///
/// The backing storage only ever grows. [`reset`](Self::reset) rewinds the cursor to zero and
/// keeps both the capacity and the old contents, so a buffer reused across many frames stops
/// allocating once it has seen its largest frame.
///
/// Writes are split in two: [`grow_to_fit`](Self::grow_to_fit) / [`grow_by`](Self::grow_by)
/// make room, [`reserve`](Self::reserve) / [`push`](Self::push) hand out space without
/// growing. Writing past the capacity without growing first panics.
pub struct FrameBuffer {
    // always fully initialized; `buf.len()` is the capacity
    buf: Vec<u8>,
    len: usize,
}

impl FrameBuffer {
    #[must_use]
    pub fn new() -> Self { Self::with_capacity(DEFAULT_BUFFER_CAPACITY) }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            len: 0,
        }
    }

    /// Number of bytes written since the last reset.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    #[must_use]
    pub fn capacity(&self) -> usize { self.buf.len() }

    /// Bytes that can still be written without growing.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize { self.capacity() - self.len }

    /// Ensures the capacity is at least `size`, preserving written bytes.
    pub fn grow_to_fit(&mut self, size: usize) {
        if self.buf.len() < size {
            tracing::trace!(from = self.buf.len(), to = size, "buffer grow");
            self.buf.resize(size, 0);
        }
    }

    /// Ensures `extra` more bytes fit after the cursor.
    pub fn grow_by(&mut self, extra: usize) { self.grow_to_fit(self.len + extra); }

    /// Returns a writable window of exactly `n` bytes at the cursor and advances past it.
    ///
    /// The window is not cleared; it may hold bytes from before the last reset. Panics if
    /// fewer than `n` bytes of capacity remain.
    pub fn reserve(&mut self, n: usize) -> &mut [u8] {
        let start = self.len;
        let end = start + n;
        let window = &mut self.buf[start..end];
        self.len = end;
        window
    }

    /// Writes one byte at the cursor. Panics if the buffer is full.
    pub fn push(&mut self, byte: u8) { self.reserve(1)[0] = byte; }

    /// Copies `bytes` in at the cursor, growing as needed.
    pub fn append(&mut self, bytes: &[u8]) {
        self.grow_by(bytes.len());
        self.reserve(bytes.len()).copy_from_slice(bytes);
    }

    /// Writable window over the whole unused capacity, `[len, capacity)`.
    ///
    /// Bytes written here only count once [`commit`](Self::commit)ted.
    pub fn spare_mut(&mut self) -> &mut [u8] { &mut self.buf[self.len..] }

    /// Advances the cursor over `n` bytes already written through [`spare_mut`](Self::spare_mut).
    pub fn commit(&mut self, n: usize) {
        assert!(n <= self.remaining_capacity(), "commit past buffer capacity");
        self.len += n;
    }

    /// Logically empties the buffer. Capacity and contents are left alone.
    pub fn reset(&mut self) { self.len = 0; }

    /// Drops the first `consumed` written bytes, moving the rest to the front.
    pub(crate) fn compact(&mut self, consumed: usize) {
        let consumed = consumed.min(self.len);
        self.buf.copy_within(consumed..self.len, 0);
        self.len -= consumed;
    }

    /// Read-only view of everything written since the last reset.
    #[must_use]
    pub fn view(&self) -> &[u8] { &self.buf[..self.len] }
}

impl Default for FrameBuffer {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Append-only handle to a [`FrameBuffer`] owned by a parser.
///
/// Bytes can be added but nothing already buffered can be rewound or dropped, so the
/// parser's read position always stays inside the buffer.
pub struct FrameBufferWriter<'a> {
    buf: &'a mut FrameBuffer,
}

impl<'a> FrameBufferWriter<'a> {
    pub(crate) fn new(buf: &'a mut FrameBuffer) -> Self { Self { buf } }

    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    #[must_use]
    pub fn remaining_capacity(&self) -> usize { self.buf.remaining_capacity() }

    /// See [`FrameBuffer::grow_by`].
    pub fn grow_by(&mut self, extra: usize) { self.buf.grow_by(extra); }

    /// See [`FrameBuffer::append`].
    pub fn append(&mut self, bytes: &[u8]) { self.buf.append(bytes); }

    /// See [`FrameBuffer::spare_mut`].
    pub fn spare_mut(&mut self) -> &mut [u8] { self.buf.spare_mut() }

    /// See [`FrameBuffer::commit`].
    pub fn commit(&mut self, n: usize) { self.buf.commit(n); }
}

impl fmt::Debug for FrameBufferWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrameBufferWriter").field(&self.buf).finish()
    }
}
