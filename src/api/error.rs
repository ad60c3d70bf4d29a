//! Registry errors.

use std::fmt;

use crate::core::segment::Segment;
use crate::diagnostics::{Diagnostic, SC001, SC002, SC003, SC004, SC005, SC006};

/// An access that fell outside every live range.
///
/// Carries the nearest live segment and the nearest tombstone at or below the
/// address, so "never registered" can be told apart from "used after release".
#[derive(Debug, Clone)]
pub struct AccessViolation {
    /// Start of the rejected access.
    pub address: usize,
    /// Size of the rejected access in bytes.
    pub size: usize,
    /// Nearest live segment at or below `address`.
    pub nearest_live: Option<Segment>,
    /// Nearest tombstone at or below `address`.
    pub nearest_tombstone: Option<Segment>,
}

impl AccessViolation {
    /// Whether the nearest tombstone's live range covers the access start.
    pub fn is_use_after_release(&self) -> bool {
        self.nearest_tombstone
            .as_ref()
            .map_or(false, |t| t.live_address <= self.address && self.address < t.live_end())
    }
}

impl fmt::Display for AccessViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block {:x}-{:x} is not in a safe segment. Closest live segment: ",
            self.address,
            self.address.wrapping_add(self.size)
        )?;
        match &self.nearest_live {
            Some(s) => write!(f, "{}", s)?,
            None => write!(f, "none")?,
        }
        write!(f, ". Closest tombstone segment: ")?;
        match &self.nearest_tombstone {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "none"),
        }
    }
}

/// Errors returned by the segment registry.
#[derive(Debug, Clone)]
pub enum SegmentError {
    /// Empty allocation, or a live range outside it.
    InvalidLayout {
        /// Requested allocation start.
        alloc_address: usize,
        /// Requested allocation size.
        alloc_size: usize,
        /// Requested live start.
        live_address: usize,
        /// Requested live size.
        live_size: usize,
    },
    /// A new segment intersects a live one.
    Overlap {
        /// The rejected segment.
        segment: Segment,
        /// The live segment it intersects.
        existing: Segment,
    },
    /// Release of an address below every live segment.
    NotFound {
        /// The released address.
        address: usize,
    },
    /// Release of an address that is not the start of its nearest segment.
    Integrity {
        /// The released address.
        address: usize,
        /// Nearest live segment below it.
        nearest: Segment,
    },
    /// Padding no longer holds the canary pattern.
    Corruption {
        /// The released segment, already moved to the tombstones.
        segment: Segment,
        /// First corrupted byte.
        address: usize,
        /// Pattern byte expected there.
        expected: u8,
        /// Byte found there.
        found: u8,
    },
    /// Access outside every live range.
    AccessViolation(AccessViolation),
}

impl SegmentError {
    /// The predefined diagnostic for this error.
    pub fn diagnostic(&self) -> &'static Diagnostic {
        match self {
            SegmentError::InvalidLayout { .. } => &SC001,
            SegmentError::Overlap { .. } => &SC002,
            SegmentError::NotFound { .. } => &SC003,
            SegmentError::Integrity { .. } => &SC004,
            SegmentError::Corruption { .. } => &SC005,
            SegmentError::AccessViolation(_) => &SC006,
        }
    }

    /// The access violation, if this is one.
    pub fn as_access_violation(&self) -> Option<&AccessViolation> {
        match self {
            SegmentError::AccessViolation(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::InvalidLayout {
                alloc_address,
                alloc_size,
                live_address,
                live_size,
            } => write!(
                f,
                "Invalid segment: allocation {:x}+{} does not contain live range {:x}+{}",
                alloc_address, alloc_size, live_address, live_size
            ),
            SegmentError::Overlap { segment, existing } => {
                write!(f, "New segment {} overlaps with live segment {}", segment, existing)
            }
            SegmentError::NotFound { address } => {
                write!(f, "Could not find the segment at {:x}", address)
            }
            SegmentError::Integrity { address, nearest } => write!(
                f,
                "Matched segment alloc address invalid: released {:x}, nearest segment {}",
                address, nearest
            ),
            SegmentError::Corruption {
                segment,
                address,
                expected,
                found,
            } => write!(
                f,
                "Diagnostic padding of block {} was changed at {:x} (expected 0x{:02x}, found 0x{:02x})",
                segment, address, expected, found
            ),
            SegmentError::AccessViolation(v) => write!(f, "{}", v),
        }
    }
}

impl std::error::Error for SegmentError {}

impl From<AccessViolation> for SegmentError {
    fn from(v: AccessViolation) -> Self {
        SegmentError::AccessViolation(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::Origin;

    #[test]
    fn test_access_violation_message() {
        let live = Segment::whole(0x1000, 0x10, Origin::new("m", "a.rs", 1));
        let v = AccessViolation {
            address: 0x1010,
            size: 4,
            nearest_live: Some(live),
            nearest_tombstone: None,
        };
        assert_eq!(
            v.to_string(),
            "Block 1010-1014 is not in a safe segment. Closest live segment: 1000-1010[m;a.rs:1]. \
             Closest tombstone segment: none"
        );
        assert!(!v.is_use_after_release());
    }

    #[test]
    fn test_use_after_release_detection() {
        let tomb = Segment::new(0x1000, 160, 0x1040, 32, Origin::unknown())
            .into_tombstone(Origin::unknown(), 1);
        let mut v = AccessViolation {
            address: 0x1044,
            size: 4,
            nearest_live: None,
            nearest_tombstone: Some(tomb),
        };
        assert!(v.is_use_after_release());
        v.address = 0x1070;
        assert!(!v.is_use_after_release());
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = SegmentError::NotFound { address: 0x10 };
        assert_eq!(err.diagnostic().code, "SC003");
        assert!(err.as_access_violation().is_none());
        assert_eq!(err.to_string(), "Could not find the segment at 10");
    }
}
