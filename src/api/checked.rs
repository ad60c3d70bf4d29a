//! Check-then-store wrappers for raw pointer writes.
//!
//! These are the call targets for instrumented code: every raw store of a
//! primitive goes through `store_*`, which asks the global registry whether
//! the destination lies in a live segment before writing.
//!
//! With the `check` feature disabled every wrapper is a plain write and the
//! registration functions do nothing, so uninstrumented builds pay nothing.
//! With it enabled a violation panics with the registry's diagnostic.

use crate::api::error::SegmentError;
use crate::core::segment::Origin;

#[cfg(feature = "check")]
use crate::core::global::global;

/// Check `[ptr, ptr + size)` against the global registry.
///
/// # Panics
///
/// Panics if the range is not inside a live segment.
#[cfg(feature = "check")]
#[inline]
#[track_caller]
pub fn check_address<T: ?Sized>(ptr: *const T, size: usize) {
    if let Err(err) = global().check_access(ptr as *const u8 as usize, size) {
        panic!("{}", err);
    }
}

/// No-op: the `check` feature is disabled.
#[cfg(not(feature = "check"))]
#[inline(always)]
pub fn check_address<T: ?Sized>(_ptr: *const T, _size: usize) {}

/// Check the destination, then write `value` to it.
///
/// # Safety
///
/// `ptr` must be valid for writes and properly aligned for `T`.
///
/// # Panics
///
/// With `check` enabled, panics if the destination is outside every live
/// segment. Nothing is written in that case.
#[inline]
#[track_caller]
pub unsafe fn store<T: Copy>(ptr: *mut T, value: T) {
    check_address(ptr as *const T, std::mem::size_of::<T>());
    // SAFETY: caller guarantees ptr is valid and aligned
    unsafe { ptr.write(value) };
}

/// Like [`store`], but returns the violation instead of panicking.
///
/// # Safety
///
/// `ptr` must be valid for writes and properly aligned for `T`.
#[inline]
pub unsafe fn try_store<T: Copy>(ptr: *mut T, value: T) -> Result<(), SegmentError> {
    #[cfg(feature = "check")]
    global().check_access(ptr as usize, std::mem::size_of::<T>())?;
    // SAFETY: caller guarantees ptr is valid and aligned
    unsafe { ptr.write(value) };
    Ok(())
}

macro_rules! checked_stores {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Checked store of a `", stringify!($ty), "`.")]
            ///
            /// # Safety
            ///
            /// `ptr` must be valid for writes and properly aligned.
            #[inline]
            #[track_caller]
            pub unsafe fn $name(ptr: *mut $ty, value: $ty) {
                unsafe { store(ptr, value) }
            }
        )*
    };
}

checked_stores! {
    store_u8: u8,
    store_i8: i8,
    store_u16: u16,
    store_i16: i16,
    store_u32: u32,
    store_i32: i32,
    store_u64: u64,
    store_i64: i64,
    store_usize: usize,
    store_isize: isize,
    store_f32: f32,
    store_f64: f64,
}

/// Checked store of a pointer-sized value.
///
/// # Safety
///
/// `ptr` must be valid for writes and properly aligned.
#[inline]
#[track_caller]
pub unsafe fn store_ptr<T>(ptr: *mut *mut T, value: *mut T) {
    unsafe { store(ptr, value) }
}

/// Register a segment with the global registry.
///
/// Prefer the [`register!`](crate::register) macro, which fills in `origin`.
///
/// # Safety
///
/// See [`SegmentRegistry::register`](crate::SegmentRegistry::register).
///
/// # Panics
///
/// With `check` enabled, panics if the registry rejects the segment.
#[track_caller]
#[allow(unused_variables)]
pub unsafe fn register_segment(
    alloc_address: usize,
    alloc_size: usize,
    live_address: usize,
    live_size: usize,
    origin: Origin,
) {
    #[cfg(feature = "check")]
    {
        let result = unsafe {
            global().register(alloc_address, alloc_size, live_address, live_size, origin)
        };
        if let Err(err) = result {
            panic!("{}", err);
        }
    }
}

/// Release a segment from the global registry.
///
/// Prefer the [`release!`](crate::release) macro, which fills in `origin`.
///
/// # Safety
///
/// See [`SegmentRegistry::release`](crate::SegmentRegistry::release).
///
/// # Panics
///
/// With `check` enabled, panics if the release fails.
#[track_caller]
#[allow(unused_variables)]
pub unsafe fn release_segment(address: usize, origin: Origin) {
    #[cfg(feature = "check")]
    {
        if let Err(err) = unsafe { global().release(address, origin) } {
            panic!("{}", err);
        }
    }
}

/// Register memory with the global registry, recording the call site.
///
/// ```rust,ignore
/// unsafe {
///     segcheck::register!(ptr, len);
///     segcheck::register!(alloc, alloc_len, live, live_len);
/// }
/// ```
#[macro_export]
macro_rules! register {
    ($ptr:expr, $size:expr $(,)?) => {{
        let address = $ptr as usize;
        let size = $size;
        $crate::checked::register_segment(address, size, address, size, $crate::origin!())
    }};
    ($alloc:expr, $alloc_size:expr, $live:expr, $live_size:expr $(,)?) => {
        $crate::checked::register_segment(
            $alloc as usize,
            $alloc_size,
            $live as usize,
            $live_size,
            $crate::origin!(),
        )
    };
}

/// Release memory from the global registry, recording the call site.
#[macro_export]
macro_rules! release {
    ($ptr:expr $(,)?) => {
        $crate::checked::release_segment($ptr as usize, $crate::origin!())
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Releases a global registration even if the test body panics.
    #[cfg(feature = "check")]
    struct Registered(usize);

    #[cfg(feature = "check")]
    impl Registered {
        unsafe fn new<T>(ptr: *mut T, size: usize) -> Self {
            unsafe { crate::register!(ptr, size) };
            Self(ptr as usize)
        }
    }

    #[cfg(feature = "check")]
    impl Drop for Registered {
        fn drop(&mut self) {
            let _ = unsafe { global().release(self.0, Origin::unknown()) };
        }
    }

    #[cfg(not(feature = "check"))]
    #[test]
    fn test_unchecked_stores_write_through() {
        let mut value = 0u32;
        let mut ptr_slot: *mut u32 = std::ptr::null_mut();
        unsafe {
            store_u32(&mut value, 7);
            store_ptr(&mut ptr_slot, &mut value as *mut u32);
            try_store(&mut value, 9).unwrap();
        }
        assert_eq!(value, 9);
        assert!(!ptr_slot.is_null());
    }

    #[cfg(feature = "check")]
    #[test]
    fn test_checked_store_inside_segment() {
        let mut words = [0u64; 4];
        let base = words.as_mut_ptr();
        {
            let _guard = unsafe { Registered::new(base, std::mem::size_of_val(&words)) };
            unsafe { store_u64(base.add(3), 42) };
            assert!(global().is_live(base as usize));
        }
        assert!(!global().is_live(base as usize));
        assert_eq!(words[3], 42);
    }

    #[cfg(feature = "check")]
    #[test]
    fn test_try_store_outside_segment() {
        crate::diagnostics::suppress_diagnostics(true);
        let mut words = [0u32; 4];
        let base = words.as_mut_ptr();
        {
            let _guard = unsafe { Registered::new(base, 8) };
            assert!(unsafe { try_store(base.add(1), 1) }.is_ok());
            let err = unsafe { try_store(base.add(2), 2) }.unwrap_err();
            assert!(err.as_access_violation().is_some());
        }
        assert!(!global().is_live(base as usize));
        assert_eq!(words, [0, 1, 0, 0]);
    }

    #[cfg(feature = "check")]
    #[test]
    fn test_registration_released_when_test_body_panics() {
        crate::diagnostics::suppress_diagnostics(true);
        let mut words = [0u16; 4];
        let base = words.as_mut_ptr();
        let address = base as usize;

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = unsafe { Registered::new(base, 8) };
            unsafe { store_u16(base.add(4), 1) };
        }));
        assert!(unwound.is_err());
        assert!(!global().is_live(address));

        let _guard = unsafe { Registered::new(base, 8) };
        assert!(global().is_live(address));
    }

    #[cfg(feature = "check")]
    #[test]
    #[should_panic(expected = "is not in a safe segment")]
    fn test_checked_store_outside_segment_panics() {
        crate::diagnostics::suppress_diagnostics(true);
        let mut byte = 0u8;
        unsafe { store_u8(&mut byte, 1) };
    }
}
