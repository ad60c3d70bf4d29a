//! Padded, registered heap buffers.
//!
//! [`GuardedBuffer`] plays the caller's part of the protocol: it reserves a
//! padded block from the system allocator, registers it with the live range
//! in the middle, and releases and frees it when done.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

use crate::api::error::SegmentError;
use crate::api::registry::SegmentRegistry;
use crate::core::segment::Origin;
use crate::util::padding::{live_address, padded_layout};

/// Alignment of the live range.
const LIVE_ALIGN: usize = 16;

/// A zero-initialized buffer whose padding is watched by a registry.
///
/// # Example
///
/// ```rust
/// use segcheck::{GuardedBuffer, Origin, SegmentRegistry};
///
/// let registry = SegmentRegistry::with_defaults();
/// let mut buf = GuardedBuffer::new(&registry, 32, Origin::caller()).unwrap();
/// buf.as_mut_slice()[31] = 1;
/// assert!(registry.check_access(buf.as_ptr() as usize, 32).is_ok());
/// buf.free().unwrap();
/// ```
pub struct GuardedBuffer<'r> {
    registry: &'r SegmentRegistry,
    base: NonNull<u8>,
    layout: Layout,
    len: usize,
    released: bool,
}

// SAFETY: the buffer exclusively owns its allocation and the registry is Sync
unsafe impl Send for GuardedBuffer<'_> {}

impl<'r> GuardedBuffer<'r> {
    /// Allocate and register a buffer with `len` live bytes.
    pub fn new(registry: &'r SegmentRegistry, len: usize, origin: Origin) -> Result<Self, SegmentError> {
        let Some(layout) = padded_layout(len, LIVE_ALIGN) else {
            return Err(SegmentError::InvalidLayout {
                alloc_address: 0,
                alloc_size: usize::MAX,
                live_address: 0,
                live_size: len,
            });
        };

        // SAFETY: padded layouts are never zero-sized
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(base) = NonNull::new(raw) else {
            handle_alloc_error(layout);
        };

        let alloc = base.as_ptr() as usize;
        // SAFETY: the whole block was just allocated and outlives the segment
        let registered =
            unsafe { registry.register(alloc, layout.size(), live_address(alloc), len, origin) };
        if let Err(err) = registered {
            // SAFETY: allocated above with this layout
            unsafe { dealloc(base.as_ptr(), layout) };
            return Err(err);
        }

        Ok(Self {
            registry,
            base,
            layout,
            len,
            released: false,
        })
    }

    /// Start of the reserved block (the address the segment is released by).
    pub fn alloc_address(&self) -> usize {
        self.base.as_ptr() as usize
    }

    /// Pointer to the first live byte.
    pub fn as_ptr(&self) -> *const u8 {
        live_address(self.alloc_address()) as *const u8
    }

    /// Mutable pointer to the first live byte.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        live_address(self.alloc_address()) as *mut u8
    }

    /// Number of live bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the live range is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The live bytes.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: live range is inside the zeroed allocation
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    /// The live bytes, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: live range is inside the zeroed allocation
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Release the segment and free the memory, reporting padding corruption.
    #[track_caller]
    pub fn free(mut self) -> Result<(), SegmentError> {
        self.release(Origin::caller())
    }

    fn release(&mut self, origin: Origin) -> Result<(), SegmentError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        // SAFETY: the block is still allocated; it is freed in Drop
        unsafe { self.registry.release(self.alloc_address(), origin) }
    }
}

impl Drop for GuardedBuffer<'_> {
    fn drop(&mut self) {
        let result = self.release(Origin::new(module_path!(), file!(), line!()));
        // SAFETY: allocated in new() with this layout
        unsafe { dealloc(self.base.as_ptr(), self.layout) };
        if let Err(err) = result {
            if !std::thread::panicking() {
                panic!("{}", err);
            }
        }
    }
}

impl std::fmt::Debug for GuardedBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedBuffer")
            .field("alloc_address", &format_args!("{:#x}", self.alloc_address()))
            .field("len", &self.len)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::canary::pattern_byte;
    use crate::diagnostics::suppress_diagnostics;
    use crate::util::padding::PADDING;

    #[test]
    fn test_padding_installed_around_live_range() {
        let registry = SegmentRegistry::with_defaults();
        let buf = GuardedBuffer::new(&registry, 8, Origin::caller()).unwrap();

        let alloc = buf.alloc_address();
        let before = unsafe { *((alloc + PADDING - 1) as *const u8) };
        let after = unsafe { *((alloc + PADDING + 8) as *const u8) };
        assert_eq!(before, pattern_byte(alloc + PADDING - 1));
        assert_eq!(after, pattern_byte(alloc + PADDING + 8));
        assert!(buf.as_slice().iter().all(|&b| b == 0));
        assert_eq!(buf.as_ptr() as usize % LIVE_ALIGN, 0);

        buf.free().unwrap();
        assert!(registry.live_segments().is_empty());
        assert_eq!(registry.tombstones().len(), 1);
    }

    #[test]
    fn test_free_reports_overrun() {
        suppress_diagnostics(true);
        let registry = SegmentRegistry::with_defaults();
        let mut buf = GuardedBuffer::new(&registry, 16, Origin::caller()).unwrap();

        unsafe { buf.as_mut_ptr().add(16).write(0) };
        let err = buf.free().unwrap_err();
        assert!(matches!(err, SegmentError::Corruption { .. }));
    }

    #[test]
    fn test_drop_releases() {
        let registry = SegmentRegistry::with_defaults();
        {
            let mut buf = GuardedBuffer::new(&registry, 4, Origin::caller()).unwrap();
            buf.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);
            assert_eq!(registry.stats().live_segments, 1);
        }
        let stats = registry.stats();
        assert_eq!(stats.live_segments, 0);
        assert_eq!(stats.releases, 1);
    }

    #[test]
    #[should_panic(expected = "Diagnostic padding")]
    fn test_drop_panics_on_corruption() {
        suppress_diagnostics(true);
        let registry = SegmentRegistry::with_defaults();
        let mut buf = GuardedBuffer::new(&registry, 4, Origin::caller()).unwrap();
        unsafe { buf.as_mut_ptr().sub(1).write(0) };
        drop(buf);
    }

    #[test]
    fn test_zero_length_buffer() {
        let registry = SegmentRegistry::with_defaults();
        let buf = GuardedBuffer::new(&registry, 0, Origin::caller()).unwrap();
        assert!(buf.is_empty());
        assert!(registry.check_access(buf.as_ptr() as usize, 0).is_ok());
        assert!(registry.check_access(buf.as_ptr() as usize, 1).is_err());
        buf.free().unwrap();
    }
}
