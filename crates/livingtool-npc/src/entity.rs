//! Entity records of the NPC entity section.

use std::fmt;

use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Size of one entity record in bytes.
pub(crate) const ENTITY_RECORD_SIZE: usize = 16;

/// On-disk entity record layout.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub(crate) struct RawEntityRecord {
    /// Main script, relative to the entity section.
    pub script_a_offset: i32,
    /// Type id (low half) and two signed parameters.
    pub packed_value: u32,
    /// Secondary script, relative to the entity section.
    pub script_c_offset: i32,
    pub flags: u32,
}

/// One in-game object: its script hooks, type and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EntityRecord {
    /// Position in the record array.
    pub index: usize,
    pub script_a_offset: i32,
    pub packed_value: u32,
    pub script_c_offset: i32,
    pub flags: u32,
    /// Section offset of the entity's name, once text recovery found one.
    pub name_pointer_offset: Option<usize>,
    pub name: Option<String>,
}

impl EntityRecord {
    pub(crate) fn from_raw(index: usize, raw: RawEntityRecord) -> Self {
        Self {
            index,
            script_a_offset: i32::from_le(raw.script_a_offset),
            packed_value: u32::from_le(raw.packed_value),
            script_c_offset: i32::from_le(raw.script_c_offset),
            flags: u32::from_le(raw.flags),
            name_pointer_offset: None,
            name: None,
        }
    }

    /// Entity type, the low 16 bits of the packed value.
    #[inline]
    pub fn type_id(&self) -> u16 {
        (self.packed_value & 0xFFFF) as u16
    }

    /// First signed parameter, bits 16..24 of the packed value.
    #[inline]
    pub fn parameter_a(&self) -> i8 {
        ((self.packed_value >> 16) & 0xFF) as u8 as i8
    }

    /// Second signed parameter, bits 24..32 of the packed value.
    #[inline]
    pub fn parameter_b(&self) -> i8 {
        (self.packed_value >> 24) as u8 as i8
    }
}

impl fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] A={:#06X} C={:#06X} Type={:#06X} Flags={:#06X}",
            self.index,
            self.script_a_offset,
            self.script_c_offset,
            self.type_id(),
            self.flags
        )?;
        if let Some(name) = &self.name {
            write!(f, " Name={name}")?;
        }
        Ok(())
    }
}
