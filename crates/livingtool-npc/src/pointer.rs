//! Pointer table entries.

use std::fmt;

/// A validated absolute offset into an NPC file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PointerEntry {
    /// Slot the pointer was read from.
    pub index: usize,
    /// Absolute file offset, always inside the file.
    pub offset: usize,
}

impl fmt::Display for PointerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] => {:#07X}", self.index, self.offset)
    }
}
