//! Canary padding.
//!
//! The bytes between a segment's reserved range and its live range are
//! filled with a fixed 4-byte pattern at registration and checked again at
//! release. The pattern is indexed by absolute address, so every segment
//! tiles the same global sequence.

use super::segment::Segment;

/// The repeating padding pattern.
pub const PADDING_PATTERN: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// Expected padding byte at `address`.
#[inline]
pub const fn pattern_byte(address: usize) -> u8 {
    PADDING_PATTERN[address % PADDING_PATTERN.len()]
}

/// A padding byte that no longer holds the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanaryMismatch {
    /// Address of the first corrupted byte.
    pub address: usize,
    /// Pattern byte expected at that address.
    pub expected: u8,
    /// Byte actually found.
    pub found: u8,
}

/// Fill both padding ranges of `segment` with the pattern.
///
/// # Safety
///
/// Both padding ranges must be valid for writes.
pub unsafe fn install(segment: &Segment) {
    for (start, end) in padding_ranges(segment) {
        for address in start..end {
            // SAFETY: caller guarantees the padding is writable
            unsafe { (address as *mut u8).write_volatile(pattern_byte(address)) };
        }
    }
}

/// Check both padding ranges of `segment`, returning the first mismatch.
///
/// # Safety
///
/// Both padding ranges must be valid for reads.
pub unsafe fn validate(segment: &Segment) -> Result<(), CanaryMismatch> {
    for (start, end) in padding_ranges(segment) {
        for address in start..end {
            // SAFETY: caller guarantees the padding is readable
            let found = unsafe { (address as *const u8).read_volatile() };
            let expected = pattern_byte(address);
            if found != expected {
                return Err(CanaryMismatch {
                    address,
                    expected,
                    found,
                });
            }
        }
    }
    Ok(())
}

/// The leading and trailing padding ranges, as half-open address pairs.
fn padding_ranges(segment: &Segment) -> [(usize, usize); 2] {
    [
        (segment.alloc_address, segment.live_address),
        (segment.live_end(), segment.alloc_end()),
    ]
}
