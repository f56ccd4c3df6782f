//! NPC file structure walk.

use std::path::Path;

use livingtool_common::BinaryReader;
use tracing::debug;

use crate::entity::{EntityRecord, RawEntityRecord, ENTITY_RECORD_SIZE};
use crate::pointer::PointerEntry;
use crate::text::{recover_text, TextEntry, TextPolicy};
use crate::Result;

/// Leading word of a TMD model.
pub const TMD_MAGIC: u32 = 0x41;

/// Leading word of a TIM image.
pub const TIM_MAGIC: u32 = 0x10;

/// A decoded NPC file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpcFile {
    header_size: i32,
    entries_a: Vec<PointerEntry>,
    entries_b: Vec<PointerEntry>,
    group_a_count: u16,
    group_b_count: u16,
    entity_section_offset: usize,
    entity_section_length: usize,
    entity_record_count: i32,
    entity_records: Vec<EntityRecord>,
    tmd_offsets: Vec<usize>,
    tim_offsets: Vec<usize>,
    names: Vec<TextEntry>,
    dialogues: Vec<TextEntry>,
}

impl NpcFile {
    /// Read and decode an NPC file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::parse(&data))
    }

    /// Decode an NPC file with the default text policy.
    pub fn parse(data: &[u8]) -> Self {
        Self::parse_with_policy(data, &TextPolicy::default())
    }

    /// Decode an NPC file.
    ///
    /// Never fails. Missing structure leaves the corresponding fields empty.
    pub fn parse_with_policy(data: &[u8], policy: &TextPolicy) -> Self {
        let reader = BinaryReader::new(data);
        let mut npc = Self::default();

        if !npc.parse_top_level_pointers(&reader) {
            return npc;
        }
        npc.parse_entry0(&reader);
        npc.parse_model_signatures(&reader);
        npc.parse_entity_section(&reader, policy);
        npc
    }

    fn parse_top_level_pointers(&mut self, reader: &BinaryReader<'_>) -> bool {
        let Some(header_size) = reader.i32_at(0) else {
            return false;
        };
        if header_size <= 0 {
            debug!(header_size, "non-positive header size");
            return false;
        }
        self.header_size = header_size;

        let count = (header_size / 4) as usize;
        for index in 0..count {
            let Some(offset) = reader.i32_at(index as i64 * 4) else {
                break;
            };
            match usize::try_from(offset) {
                Ok(offset) if offset < reader.len() => {
                    self.entries_a.push(PointerEntry { index, offset });
                }
                _ => debug!(index, offset, "top-level pointer out of range"),
            }
        }
        true
    }

    fn parse_entry0(&mut self, reader: &BinaryReader<'_>) {
        let Some(entry0) = self.entries_a.first().map(|e| e.offset) else {
            return;
        };
        let base = entry0 as i64;

        if let (Some(a), Some(b)) = (reader.u16_at(base), reader.u16_at(base + 2)) {
            self.group_a_count = a;
            self.group_b_count = b;
        }

        let mut slot = base + 4;
        while let Some(relative) = reader.i32_at(slot) {
            if relative == 0 {
                break;
            }
            let absolute = base + i64::from(relative);
            if absolute >= 0 && (absolute as u64) < reader.len() as u64 {
                self.entries_b.push(PointerEntry {
                    index: self.entries_b.len(),
                    offset: absolute as usize,
                });
            } else {
                debug!(relative, "entry 0 pointer out of range");
            }
            slot += 4;
        }
    }

    fn parse_model_signatures(&mut self, reader: &BinaryReader<'_>) {
        for entry in &self.entries_a {
            match reader.u32_at(entry.offset as i64) {
                Some(TMD_MAGIC) => self.tmd_offsets.push(entry.offset),
                Some(TIM_MAGIC) => self.tim_offsets.push(entry.offset),
                _ => {}
            }
        }
    }

    fn parse_entity_section(&mut self, reader: &BinaryReader<'_>, policy: &TextPolicy) {
        if self.entries_a.len() < 2 {
            return;
        }
        let start = self.entries_a[1].offset;
        let end = self
            .entries_a
            .get(2)
            .map_or(reader.len(), |e| e.offset);
        if end <= start {
            debug!(start, end, "empty entity section");
            return;
        }
        let Some(stored_count) = reader.i32_at(start as i64) else {
            return;
        };

        let section = &reader.data()[start..end];
        self.entity_section_offset = start;
        self.entity_section_length = section.len();
        self.entity_record_count = stored_count;

        let max_count = section.len().saturating_sub(4) / ENTITY_RECORD_SIZE;
        let count = usize::try_from(stored_count).unwrap_or(0).min(max_count);
        if count as i64 != i64::from(stored_count) {
            debug!(stored_count, count, "clamped entity record count");
        }

        let section_reader = BinaryReader::new(section);
        self.entity_records = (0..count)
            .map_while(|i| {
                let offset = 4 + (i * ENTITY_RECORD_SIZE) as i64;
                section_reader
                    .struct_at::<RawEntityRecord>(offset)
                    .map(|raw| EntityRecord::from_raw(i, raw))
            })
            .collect();

        let text = recover_text(section, &mut self.entity_records, policy);
        self.names = text.names;
        self.dialogues = text.dialogues;
    }

    /// Size of the top-level pointer table in bytes.
    pub fn header_size(&self) -> i32 {
        self.header_size
    }

    /// In-range top-level pointers, in table order.
    pub fn entries_a(&self) -> &[PointerEntry] {
        &self.entries_a
    }

    /// In-range pointers of the entry 0 table, made absolute.
    pub fn entries_b(&self) -> &[PointerEntry] {
        &self.entries_b
    }

    pub fn group_a_count(&self) -> u16 {
        self.group_a_count
    }

    pub fn group_b_count(&self) -> u16 {
        self.group_b_count
    }

    /// Absolute offset of the entity section.
    pub fn entity_section_offset(&self) -> usize {
        self.entity_section_offset
    }

    pub fn entity_section_length(&self) -> usize {
        self.entity_section_length
    }

    /// Record count as stored in the file, before clamping.
    pub fn entity_record_count(&self) -> i32 {
        self.entity_record_count
    }

    pub fn entity_records(&self) -> &[EntityRecord] {
        &self.entity_records
    }

    /// Top-level entries that start with a TMD header.
    pub fn tmd_offsets(&self) -> &[usize] {
        &self.tmd_offsets
    }

    /// Top-level entries that start with a TIM header.
    pub fn tim_offsets(&self) -> &[usize] {
        &self.tim_offsets
    }

    /// Recovered names, sorted by section offset.
    pub fn names(&self) -> &[TextEntry] {
        &self.names
    }

    /// Recovered dialogue, sorted by section offset.
    pub fn dialogues(&self) -> &[TextEntry] {
        &self.dialogues
    }

    /// Whether no structure was found at all.
    pub fn is_empty(&self) -> bool {
        self.entries_a.is_empty()
    }
}
