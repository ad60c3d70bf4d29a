//! Padding arithmetic for callers that allocate their own memory.
//!
//! A caller reserves [`alloc_size_for`] bytes, hands the start of that block
//! to the registry as the allocation, and uses the range starting at
//! [`live_address`] as its live memory.

use std::alloc::Layout;

/// Bytes of canary padding on each side of a live range.
pub const PADDING: usize = 64;

/// Bytes to reserve for a live range of `live_size` bytes.
#[inline]
pub const fn alloc_size_for(live_size: usize) -> usize {
    live_size + 2 * PADDING
}

/// Live bytes available in a reservation of `alloc_size` bytes.
#[inline]
pub const fn live_size_for(alloc_size: usize) -> usize {
    alloc_size.saturating_sub(2 * PADDING)
}

/// Offset of the live range from the start of the reservation.
#[inline]
pub const fn live_offset() -> usize {
    PADDING
}

/// Live address for a reservation starting at `alloc_address`.
#[inline]
pub const fn live_address(alloc_address: usize) -> usize {
    alloc_address + PADDING
}

/// Layout of a padded reservation whose live range is aligned to `align`.
///
/// Returns `None` for alignments above [`PADDING`] (the live range would not
/// stay aligned) or when the size overflows.
pub fn padded_layout(live_size: usize, align: usize) -> Option<Layout> {
    if align > PADDING {
        return None;
    }
    let size = live_size.checked_add(2 * PADDING)?;
    Layout::from_size_align(size, align.max(1)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_sizes() {
        assert_eq!(alloc_size_for(32), 160);
        assert_eq!(live_size_for(160), 32);
        assert_eq!(live_size_for(10), 0);
    }

    #[test]
    fn test_live_address() {
        assert_eq!(live_offset(), 64);
        assert_eq!(live_address(0x1000), 0x1040);
    }

    #[test]
    fn test_padded_layout() {
        let layout = padded_layout(32, 8).unwrap();
        assert_eq!(layout.size(), 160);
        assert_eq!(layout.align(), 8);
        assert!(padded_layout(32, 128).is_none());
        assert!(padded_layout(usize::MAX, 8).is_none());
    }
}
