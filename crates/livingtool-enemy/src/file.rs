//! Enemy file decoding.

use std::fmt;
use std::path::Path;

use livingtool_common::BinaryReader;
use tracing::debug;
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::{Error, Result};

/// Size of the pointer header in bytes.
pub const ENEMY_HEADER_SIZE: usize = 32;

/// Longest name read for the enemy or a move, terminator excluded.
pub const MAX_NAME_LEN: usize = 32;

/// Pointer header at the start of an enemy file.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct RawEnemyHeader {
    pointers: [u32; 8],
}

impl RawEnemyHeader {
    fn pointer(&self, index: usize) -> u32 {
        let pointers = self.pointers;
        u32::from_le(pointers[index])
    }
}

/// One entry of an enemy's move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEntry {
    pub prefix: u16,
    pub name: String,
}

/// A decoded enemy file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnemyFile {
    pub name: String,
    pub moves: Vec<MoveEntry>,
}

impl EnemyFile {
    /// Read and decode an enemy file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Decode an enemy file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ENEMY_HEADER_SIZE {
            return Err(Error::TooShort {
                len: data.len(),
                needed: ENEMY_HEADER_SIZE,
            });
        }

        let mut reader = BinaryReader::new(data);
        let header: RawEnemyHeader = reader.read_struct()?;

        let metadata = u64::from(header.pointer(6));
        let name_offset = metadata + 2;
        if name_offset >= data.len() as u64 {
            return Err(Error::NameOutOfRange {
                offset: name_offset,
                len: data.len(),
            });
        }

        let block_end = match header.pointer(7) as usize {
            0 => data.len(),
            end => end.min(data.len()),
        };

        reader.seek(name_offset as usize);
        let name = reader.read_cstring_bounded(MAX_NAME_LEN)?;
        reader.skip_run(0);

        let mut moves = Vec::new();
        while reader.position() + 2 < block_end {
            let prefix = reader.read_u16()?;
            let Ok(move_name) = reader.read_cstring_bounded(MAX_NAME_LEN) else {
                debug!(position = reader.position(), "unterminated move name");
                break;
            };
            if move_name.trim().is_empty() {
                break;
            }
            moves.push(MoveEntry {
                prefix,
                name: move_name,
            });
        }

        Ok(Self { name, moves })
    }
}

impl fmt::Display for EnemyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Moves: {}", self.moves.len())?;
        for m in &self.moves {
            writeln!(f, "  [{:#06X}] {}", m.prefix, m.name)?;
        }
        Ok(())
    }
}
