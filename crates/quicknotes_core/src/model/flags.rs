//! Note flag bitmask.
//!
//! # Responsibility
//! - Name the individual note state bits carried in the compact `flags` field.
//! - Provide set/clear/test primitives over the packed integer.
//!
//! # Invariants
//! - Bit positions are part of the wire format and never change.
//! - `set` is idempotent; there is intentionally no toggle primitive.

use std::fmt::{Display, Formatter};

/// One named bit inside [`NoteFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoteFlag {
    Starred,
    Deleted,
    Public,
    /// Server omitted the full content; it must be fetched lazily.
    Partial,
}

impl NoteFlag {
    /// All flags in bit order.
    pub const ALL: [NoteFlag; 4] = [
        NoteFlag::Starred,
        NoteFlag::Deleted,
        NoteFlag::Public,
        NoteFlag::Partial,
    ];

    /// Bit index inside the packed integer.
    pub fn bit(self) -> u32 {
        match self {
            Self::Starred => 0,
            Self::Deleted => 1,
            Self::Public => 2,
            Self::Partial => 3,
        }
    }

    fn mask(self) -> u32 {
        1 << self.bit()
    }

    /// Stable lowercase name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starred => "starred",
            Self::Deleted => "deleted",
            Self::Public => "public",
            Self::Partial => "partial",
        }
    }
}

/// Packed note state bits as transmitted by the server.
///
/// Unknown high bits are preserved so that re-encoding a record never loses
/// server-side state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoteFlags(u32);

impl NoteFlags {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn is_set(self, flag: NoteFlag) -> bool {
        self.0 & flag.mask() != 0
    }

    /// Sets `flag` with bitwise OR. Setting an already-set bit is a no-op.
    pub fn set(&mut self, flag: NoteFlag) {
        self.0 |= flag.mask();
    }

    /// Clears `flag` with bitwise AND-NOT.
    pub fn clear(&mut self, flag: NoteFlag) {
        self.0 &= !flag.mask();
    }

    /// Sets `flag` when `on` is true, clears it otherwise.
    pub fn set_state(&mut self, flag: NoteFlag, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

impl From<u32> for NoteFlags {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Display for NoteFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06b}", self.0)
    }
}
