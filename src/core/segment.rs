//! Segment and origin records.
//!
//! A [`Segment`] is the registry's description of one caller-owned memory
//! region: the full reserved range, the narrower live range the caller may
//! touch, and where it was registered (and released).

use std::fmt;
use std::sync::Arc;

/// Source location of a registration or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin {
    /// Enclosing module path, when captured by the registration macros.
    pub member: Option<&'static str>,
    /// Source file.
    pub file: &'static str,
    /// Source line.
    pub line: u32,
}

impl Origin {
    /// Create an origin from explicit parts.
    pub const fn new(member: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            member: Some(member),
            file,
            line,
        }
    }

    /// Capture the caller's file and line.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            member: None,
            file: location.file(),
            line: location.line(),
        }
    }

    /// An origin for segments that have no meaningful source location.
    pub const fn unknown() -> Self {
        Self {
            member: None,
            file: "<unknown>",
            line: 0,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{};{}:{}]",
            self.member.unwrap_or(""),
            self.file,
            self.line
        )
    }
}

/// Capture an [`Origin`] for the current module, file and line.
#[macro_export]
macro_rules! origin {
    () => {
        $crate::Origin::new(module_path!(), file!(), line!())
    };
}

/// A registered memory region.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Start of the reserved range, including padding.
    pub alloc_address: usize,
    /// Size of the reserved range, including padding.
    pub alloc_size: usize,
    /// Start of the range the caller may access.
    pub live_address: usize,
    /// Size of the range the caller may access.
    pub live_size: usize,
    /// Where the segment was registered.
    pub origin: Origin,
    /// Where the segment was released, once it has been.
    pub release_origin: Option<Origin>,
    /// Whether the segment has been released.
    pub released: bool,
    /// Release order among tombstones (0 while live).
    pub release_seq: u64,
    /// Backtrace captured at registration (`debug` feature).
    pub backtrace: Option<Arc<str>>,
}

impl Segment {
    /// Create a live segment with an explicit live sub-range.
    pub fn new(
        alloc_address: usize,
        alloc_size: usize,
        live_address: usize,
        live_size: usize,
        origin: Origin,
    ) -> Self {
        Self {
            alloc_address,
            alloc_size,
            live_address,
            live_size,
            origin,
            release_origin: None,
            released: false,
            release_seq: 0,
            backtrace: None,
        }
    }

    /// Create a live segment whose live range is the whole allocation.
    pub fn whole(address: usize, size: usize, origin: Origin) -> Self {
        Self::new(address, size, address, size, origin)
    }

    /// One past the last reserved byte.
    #[inline]
    pub fn alloc_end(&self) -> usize {
        self.alloc_address.wrapping_add(self.alloc_size)
    }

    /// One past the last live byte.
    #[inline]
    pub fn live_end(&self) -> usize {
        self.live_address.wrapping_add(self.live_size)
    }

    /// Whether the live range is narrower than the allocation.
    pub fn is_padded(&self) -> bool {
        self.alloc_address != self.live_address || self.alloc_size != self.live_size
    }

    /// Check that `alloc_size > 0` and the live range lies inside the
    /// allocation without wrapping the address space.
    pub fn is_well_formed(&self) -> bool {
        let Some(alloc_end) = self.alloc_address.checked_add(self.alloc_size) else {
            return false;
        };
        let Some(live_end) = self.live_address.checked_add(self.live_size) else {
            return false;
        };
        self.alloc_size > 0 && self.alloc_address <= self.live_address && live_end <= alloc_end
    }

    /// Whether the reserved ranges of two segments share at least one byte.
    #[inline]
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.alloc_address < other.alloc_end() && other.alloc_address < self.alloc_end()
    }

    /// Whether `[address, address + size)` lies entirely in the live range.
    ///
    /// A zero-sized range is contained when it starts anywhere from the first
    /// live byte up to one past the last.
    pub fn contains_live(&self, address: usize, size: usize) -> bool {
        match address.checked_add(size) {
            Some(end) => self.live_address <= address && end <= self.live_end(),
            None => false,
        }
    }

    /// Turn a live segment into a tombstone.
    pub(crate) fn into_tombstone(mut self, release_origin: Origin, release_seq: u64) -> Self {
        self.released = true;
        self.release_origin = Some(release_origin);
        self.release_seq = release_seq;
        self
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_padded() {
            write!(
                f,
                "({:x}){:x}-{:x}({:x})",
                self.alloc_address,
                self.live_address,
                self.live_end(),
                self.alloc_end()
            )?;
        } else {
            write!(f, "{:x}-{:x}", self.live_address, self.live_end())?;
        }
        write!(f, "{}", self.origin)?;
        if let Some(release) = &self.release_origin {
            write!(f, "->{}", release)?;
        }
        Ok(())
    }
}
