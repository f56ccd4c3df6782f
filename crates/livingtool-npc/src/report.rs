//! Summary report of a decoded NPC file.

use std::fmt;

use crate::file::NpcFile;

/// Flat view of an [`NpcFile`] for JSON output and text listings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NpcReport {
    pub file_path: String,
    pub header_size: i32,
    pub top_level_entry_count: usize,
    pub group_a_count: u16,
    pub group_b_count: u16,
    /// Record count as stored in the file.
    pub entity_record_count: i32,
    pub name_count: usize,
    pub dialogue_count: usize,
    pub name_offsets: Vec<usize>,
    pub dialogue_offsets: Vec<usize>,
    pub names: Vec<String>,
    pub dialogues: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    detail: Detail,
}

/// Listing-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Detail {
    entries_a: Vec<String>,
    entries_b: Vec<String>,
    records: Vec<String>,
    tmd_offsets: Vec<usize>,
    tim_offsets: Vec<usize>,
}

impl NpcReport {
    pub fn new(file_path: impl Into<String>, npc: &NpcFile) -> Self {
        Self {
            file_path: file_path.into(),
            header_size: npc.header_size(),
            top_level_entry_count: npc.entries_a().len(),
            group_a_count: npc.group_a_count(),
            group_b_count: npc.group_b_count(),
            entity_record_count: npc.entity_record_count(),
            name_count: npc.names().len(),
            dialogue_count: npc.dialogues().len(),
            name_offsets: npc.names().iter().map(|e| e.offset).collect(),
            dialogue_offsets: npc.dialogues().iter().map(|e| e.offset).collect(),
            names: npc.names().iter().map(|e| e.text.clone()).collect(),
            dialogues: npc.dialogues().iter().map(|e| e.text.clone()).collect(),
            detail: Detail {
                entries_a: npc.entries_a().iter().map(ToString::to_string).collect(),
                entries_b: npc.entries_b().iter().map(ToString::to_string).collect(),
                records: npc.entity_records().iter().map(ToString::to_string).collect(),
                tmd_offsets: npc.tmd_offsets().to_vec(),
                tim_offsets: npc.tim_offsets().to_vec(),
            },
        }
    }
}

fn write_offsets(f: &mut fmt::Formatter<'_>, label: &str, offsets: &[usize]) -> fmt::Result {
    if offsets.is_empty() {
        return Ok(());
    }
    let joined: Vec<String> = offsets.iter().map(|o| format!("{o:#07X}")).collect();
    writeln!(f, "{label}: {}", joined.join(", "))
}

impl fmt::Display for NpcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file_path)?;
        writeln!(f, "Header size: {:#X}", self.header_size)?;
        writeln!(f, "Top-level entries: {}", self.top_level_entry_count)?;
        for entry in &self.detail.entries_a {
            writeln!(f, "  {entry}")?;
        }
        writeln!(
            f,
            "Groups: A={} B={}",
            self.group_a_count, self.group_b_count
        )?;
        writeln!(f, "Entry 0 pointers: {}", self.detail.entries_b.len())?;
        for entry in &self.detail.entries_b {
            writeln!(f, "  {entry}")?;
        }
        write_offsets(f, "TMD", &self.detail.tmd_offsets)?;
        write_offsets(f, "TIM", &self.detail.tim_offsets)?;

        writeln!(f, "Entity records: {}", self.entity_record_count)?;
        for record in &self.detail.records {
            writeln!(f, "  {record}")?;
        }

        writeln!(f, "Names: {}", self.name_count)?;
        for (offset, name) in self.name_offsets.iter().zip(&self.names) {
            writeln!(f, "  {offset:#06X}: {name}")?;
        }

        writeln!(f, "Dialogues: {}", self.dialogue_count)?;
        for (offset, text) in self.dialogue_offsets.iter().zip(&self.dialogues) {
            writeln!(f, "  {offset:#06X}: {}", text.replace('\n', "\\n"))?;
        }
        Ok(())
    }
}
