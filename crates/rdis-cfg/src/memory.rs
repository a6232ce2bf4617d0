//! Memory images the decoders read instructions from.

use rdis_graph::Map;

/// Byte-addressable memory made of buffers at base addresses.
pub trait MemoryImage {
    /// The buffer whose base is the greatest one at or below `address`,
    /// together with that base.
    ///
    /// The buffer may end before `address`; callers bounds-check the offset.
    fn floor_lookup(&self, address: u64) -> Option<(u64, &[u8])>;

    /// Exactly `len` bytes starting at `address`, or `None` if any of them
    /// falls outside the buffer found by [`floor_lookup`](Self::floor_lookup).
    fn read(&self, address: u64, len: usize) -> Option<&[u8]> {
        let bytes = self.available(address)?;
        bytes.get(..len)
    }

    /// Every byte from `address` to the end of its buffer.
    fn available(&self, address: u64) -> Option<&[u8]> {
        let (base, bytes) = self.floor_lookup(address)?;
        let offset = usize::try_from(address.checked_sub(base)?).ok()?;
        bytes.get(offset..)
    }
}

/// Owned bytes with access permissions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buffer {
    bytes: Vec<u8>,
    permissions: u32,
}

impl Buffer {
    pub const EXECUTE: u32 = 1 << 0;
    pub const WRITE: u32 = 1 << 1;
    pub const READ: u32 = 1 << 2;

    /// Buffer over `bytes`, with no permissions set.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            permissions: 0,
        }
    }

    /// Zero-filled buffer of `size` bytes.
    #[must_use]
    pub fn zeroed(size: usize) -> Self {
        Self::new(vec![0; size])
    }

    #[must_use]
    pub const fn with_permissions(mut self, permissions: u32) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.permissions
    }

    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.permissions & Self::EXECUTE != 0
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `offset`, or `None` past the end.
    #[must_use]
    pub fn safe_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }
}

/// Buffers keyed by base address.
///
/// Overlapping buffers are not merged: inserting at a base that is already
/// present replaces that buffer.
#[derive(Clone, Debug, Default)]
pub struct MemoryMap {
    buffers: Map<u64, Buffer>,
}

impl MemoryMap {
    #[must_use]
    pub const fn new() -> Self {
        Self { buffers: Map::new() }
    }

    /// Map `buffer` at `base`, returning the buffer it replaced.
    pub fn insert(&mut self, base: u64, buffer: Buffer) -> Option<Buffer> {
        self.buffers.insert(base, buffer)
    }

    pub fn remove(&mut self, base: u64) -> Option<Buffer> {
        self.buffers.remove(&base)
    }

    #[must_use]
    pub fn fetch(&self, base: u64) -> Option<&Buffer> {
        self.buffers.fetch(&base)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Buffers in ascending base order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Buffer)> + '_ {
        self.buffers.iter().map(|(&base, buffer)| (base, buffer))
    }
}

impl MemoryImage for MemoryMap {
    fn floor_lookup(&self, address: u64) -> Option<(u64, &[u8])> {
        self.buffers
            .fetch_max(&address)
            .map(|(&base, buffer)| (base, buffer.bytes()))
    }
}

impl<M: MemoryImage + ?Sized> MemoryImage for &M {
    fn floor_lookup(&self, address: u64) -> Option<(u64, &[u8])> {
        (**self).floor_lookup(address)
    }
}

/// Restricts a memory image to the window `[start, end)`.
///
/// Lookups outside the window find nothing and buffers are clipped to it, so
/// a worklist over a `Bounded` image cannot wander outside the window.
#[derive(Clone, Debug)]
pub struct Bounded<M> {
    inner: M,
    start: u64,
    end: u64,
}

impl<M: MemoryImage> Bounded<M> {
    #[must_use]
    pub const fn new(inner: M, start: u64, end: u64) -> Self {
        Self { inner, start, end }
    }

    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    #[must_use]
    pub fn into_inner(self) -> M {
        self.inner
    }

    #[must_use]
    pub const fn contains(&self, address: u64) -> bool {
        address >= self.start && address < self.end
    }
}

impl<M: MemoryImage> MemoryImage for Bounded<M> {
    fn floor_lookup(&self, address: u64) -> Option<(u64, &[u8])> {
        if !self.contains(address) {
            return None;
        }
        let (base, bytes) = self.inner.floor_lookup(address)?;
        let visible = base.max(self.start);
        let bytes = bytes.get(usize::try_from(visible - base).ok()?..)?;
        let keep = usize::try_from(self.end - visible).unwrap_or(usize::MAX);
        Some((visible, &bytes[..bytes.len().min(keep)]))
    }
}
