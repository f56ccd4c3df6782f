//! Text recovery for the entity section.
//!
//! The game stores names and dialogue as plain strings interleaved with
//! script bytecode. There is no string table, so strings are found two ways:
//!
//! 1. By following the operands of the name and dialogue opcodes inside each
//!    entity's script window.
//! 2. By a sweep over the whole section for null-terminated strings, which
//!    picks up the contiguous name table the scripts do not reference.
//!
//! Every accepted string claims its offset in a single ordered map. Name
//! claims replace dialogue claims; dialogue claims never replace anything.
//! All offsets are relative to the start of the section.

pub mod decode;
mod policy;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use livingtool_common::memchr::memchr_iter;
use livingtool_common::BinaryReader;
use tracing::debug;

use crate::entity::EntityRecord;
use decode::{decode_at, is_boundary_aligned, Terminator};
pub use policy::TextPolicy;

/// A recovered string and its section offset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextEntry {
    pub offset: usize,
    pub text: String,
}

impl fmt::Display for TextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X}: {}", self.offset, self.text.replace('\n', "\\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimKind {
    Name,
    Dialogue,
}

#[derive(Debug)]
struct Claim {
    kind: ClaimKind,
    text: String,
}

/// Offset claims for one decode.
#[derive(Debug, Default)]
struct Claims {
    map: BTreeMap<usize, Claim>,
}

impl Claims {
    fn claim_name(&mut self, offset: usize, text: String) {
        self.map.insert(
            offset,
            Claim {
                kind: ClaimKind::Name,
                text,
            },
        );
    }

    fn claim_dialogue(&mut self, offset: usize, text: String) {
        if let Entry::Vacant(slot) = self.map.entry(offset) {
            slot.insert(Claim {
                kind: ClaimKind::Dialogue,
                text,
            });
        }
    }

    fn is_name(&self, offset: usize) -> bool {
        matches!(self.map.get(&offset), Some(c) if c.kind == ClaimKind::Name)
    }

    fn first_of(&self, kind: ClaimKind) -> Option<usize> {
        self.map
            .iter()
            .find(|(_, c)| c.kind == kind)
            .map(|(&offset, _)| offset)
    }

    fn split(self) -> RecoveredText {
        let mut recovered = RecoveredText::default();
        for (offset, claim) in self.map {
            let entry = TextEntry {
                offset,
                text: claim.text,
            };
            match claim.kind {
                ClaimKind::Name => recovered.names.push(entry),
                ClaimKind::Dialogue => recovered.dialogues.push(entry),
            }
        }
        recovered
    }
}

/// Names and dialogue recovered from one entity section.
///
/// Both lists are sorted by offset and never share an offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveredText {
    pub names: Vec<TextEntry>,
    pub dialogues: Vec<TextEntry>,
}

/// Recover names and dialogue from `section`.
///
/// Records whose script yields a name are annotated with it.
pub fn recover_text(
    section: &[u8],
    records: &mut [EntityRecord],
    policy: &TextPolicy,
) -> RecoveredText {
    let mut claims = Claims::default();

    let mut script_starts: Vec<usize> = records
        .iter()
        .filter_map(|r| script_start(r, section.len()))
        .collect();
    script_starts.sort_unstable();
    script_starts.dedup();

    for record in records.iter_mut() {
        let Some(start) = script_start(record, section.len()) else {
            debug!(
                record = record.index,
                offset = record.script_a_offset,
                "script offset outside entity section"
            );
            continue;
        };
        let end = next_script_start(&script_starts, start, section.len());

        if let Some((offset, name)) = find_name(section, start, end, policy) {
            record.name_pointer_offset = Some(offset);
            record.name = Some(name.clone());
            claims.claim_name(offset, name);
        }

        for (offset, text) in find_dialogues(section, start, end, policy) {
            if !claims.is_name(offset) {
                claims.claim_dialogue(offset, text);
            }
        }
    }

    sweep(section, &mut claims, policy);

    let recovered = claims.split();
    debug!(
        policy = policy.version,
        names = recovered.names.len(),
        dialogues = recovered.dialogues.len(),
        "recovered text"
    );
    recovered
}

fn script_start(record: &EntityRecord, section_len: usize) -> Option<usize> {
    usize::try_from(record.script_a_offset)
        .ok()
        .filter(|&offset| offset < section_len)
}

/// Smallest script start strictly after `current`, or `default_end`.
fn next_script_start(sorted_starts: &[usize], current: usize, default_end: usize) -> usize {
    let index = sorted_starts.partition_point(|&s| s <= current);
    sorted_starts.get(index).copied().unwrap_or(default_end)
}

/// Operands of every `opcode` in `[start, end)` that still fit in the window.
fn opcode_operands<'a>(
    section: &'a [u8],
    opcode: u8,
    start: usize,
    end: usize,
) -> impl Iterator<Item = usize> + 'a {
    let reader = BinaryReader::new(section);
    memchr_iter(opcode, &section[start..end])
        .map(move |pos| start + pos)
        .take_while(move |&pos| pos + 2 < end)
        .filter_map(move |pos| reader.u16_at(pos as i64 + 1))
        .map(usize::from)
}

fn find_name(
    section: &[u8],
    start: usize,
    end: usize,
    policy: &TextPolicy,
) -> Option<(usize, String)> {
    opcode_operands(section, policy.name_opcode, start, end).find_map(|offset| {
        policy
            .accept_name(section, offset)
            .map(|name| (offset, name))
    })
}

fn find_dialogues<'a>(
    section: &'a [u8],
    start: usize,
    end: usize,
    policy: &'a TextPolicy,
) -> impl Iterator<Item = (usize, String)> + 'a {
    opcode_operands(section, policy.dialogue_opcode, start, end).filter_map(move |offset| {
        policy
            .accept_dialogue(section, offset)
            .map(|text| (offset, text))
    })
}

/// Boundary-aligned, null-terminated strings the policy considers text.
fn sweep_hits(section: &[u8], policy: &TextPolicy) -> Vec<TextEntry> {
    std::iter::once(0)
        .chain(memchr_iter(0, section).map(|pos| pos + 1))
        .filter(|&offset| offset < section.len() && section[offset] != 0)
        .filter(|&offset| is_boundary_aligned(section, offset))
        .filter_map(|offset| {
            let decoded = decode_at(section, offset)?;
            (decoded.terminator == Terminator::Null && policy.is_sweep_candidate(&decoded.text))
                .then(|| TextEntry {
                    offset,
                    text: decoded.text,
                })
        })
        .collect()
}

fn sweep(section: &[u8], claims: &mut Claims, policy: &TextPolicy) {
    let hits = sweep_hits(section, policy);

    let Some(text_start) = claims
        .first_of(ClaimKind::Name)
        .or_else(|| claims.first_of(ClaimKind::Dialogue))
        .or_else(|| hits.first().map(|h| h.offset))
    else {
        return;
    };

    let hits: Vec<TextEntry> = hits
        .into_iter()
        .filter(|h| h.offset >= text_start)
        .collect();

    if let Some(first) = hits.iter().position(|h| policy.is_name_like(&h.text)) {
        let run = hits[first..]
            .iter()
            .take_while(|h| policy.is_name_like(&h.text))
            .count();
        debug!(
            start = hits[first].offset,
            count = run,
            "absorbing name table from sweep"
        );
        for hit in &hits[first..first + run] {
            claims.claim_name(hit.offset, hit.text.clone());
        }
    }

    for hit in hits {
        if hit.text.len() >= policy.min_dialogue_len && !claims.is_name(hit.offset) {
            claims.claim_dialogue(hit.offset, hit.text);
        }
    }
}
