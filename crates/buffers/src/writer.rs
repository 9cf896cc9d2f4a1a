//! Text output buffer with auto-growing capacity.

/// An output byte buffer that grows geometrically as needed.
///
/// The buffer is allocated up front and written through an explicit cursor,
/// so repeated encodes on one `Writer` reuse the same allocation. Capacity
/// grows by doubling until the requested size fits; it never shrinks while
/// a document is being written.
///
/// # Example
///
/// ```
/// use anyjson_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.ascii("[1,");
/// writer.u8(b'2');
/// writer.u8(b']');
/// let data = writer.flush();
/// assert_eq!(data, b"[1,2]");
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Start of the document currently being written.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    /// Initial allocation size.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with the default allocation size (32KB).
    pub fn new() -> Self {
        Self::with_alloc_size(32 * 1024)
    }

    /// Creates a new writer with a custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        let alloc_size = alloc_size.max(1);
        Self {
            uint8: vec![0u8; alloc_size],
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Ensures at least `capacity` bytes remain between the cursor and the
    /// end of the buffer, growing if necessary.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let live = self.x - self.x0;
            let required = live + capacity;
            let mut new_size = self.uint8.len() * 2;
            while new_size < required {
                new_size *= 2;
            }
            self.grow(new_size);
        }
    }

    fn grow(&mut self, new_size: usize) {
        let x0 = self.x0;
        let x = self.x;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..x - x0].copy_from_slice(&self.uint8[x0..x]);
        self.uint8 = new_buf;
        self.x = x - x0;
        self.x0 = 0;
    }

    /// Marks the start of a new document at the current cursor.
    pub fn reset(&mut self) {
        self.x0 = self.x;
    }

    /// Number of bytes written to the current document so far.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    /// True when nothing has been written since the last reset or flush.
    pub fn is_empty(&self) -> bool {
        self.x == self.x0
    }

    /// Returns a view of the current document without consuming it.
    pub fn written(&self) -> &[u8] {
        &self.uint8[self.x0..self.x]
    }

    /// Returns the current document as an owned vector and marks the cursor
    /// as the start of the next one.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Discards the current document, moving the cursor back to its start.
    pub fn rewind(&mut self) {
        self.x = self.x0;
    }

    /// Writes a single byte.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes four bytes packed big-endian into a `u32`, so four-character
    /// ASCII literals can be appended in one call.
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.ensure_capacity(4);
        let bytes = val.to_be_bytes();
        self.uint8[self.x..self.x + 4].copy_from_slice(&bytes);
        self.x += 4;
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }

    /// Writes `count` copies of `val`.
    pub fn fill(&mut self, val: u8, count: usize) {
        self.ensure_capacity(count);
        self.uint8[self.x..self.x + count].fill(val);
        self.x += count;
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        let bytes = s.as_bytes();
        self.buf(bytes);
        bytes.len()
    }

    /// Writes an ASCII string.
    pub fn ascii(&mut self, s: &str) {
        self.utf8(s); // ASCII is a subset of UTF-8
    }
}
