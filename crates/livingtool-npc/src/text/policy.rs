//! Classification rules for recovered strings.
//!
//! These rules were tuned against the shipped NPC files and have no formal
//! grammar behind them. They are kept apart from the structural walk so they
//! can be revised, and versioned, without touching it.

use super::decode::{decode_at, is_boundary_aligned, Terminator};

/// Tunable text recovery rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPolicy {
    /// Revision of the rule set.
    pub version: u32,
    /// Script opcode whose `u16` operand points at the entity name.
    pub name_opcode: u8,
    /// Script opcode whose `u16` operand points at a line of dialogue.
    pub dialogue_opcode: u8,
    pub min_name_len: usize,
    pub max_name_len: usize,
    pub min_dialogue_len: usize,
    /// Minimum length of a string picked up by the fallback sweep.
    pub min_sweep_len: usize,
}

impl TextPolicy {
    /// First rule set.
    pub const V1: Self = Self {
        version: 1,
        name_opcode: 0x1F,
        dialogue_opcode: 0x01,
        min_name_len: 2,
        max_name_len: 24,
        min_dialogue_len: 4,
        min_sweep_len: 3,
    };

    /// Whether `text` looks like a character name.
    ///
    /// Names are short, carry no digits, line breaks or punctuation, and are
    /// either all `?` (an unrevealed name) or contain a letter.
    pub fn is_name_like(&self, text: &str) -> bool {
        let len = text.len();
        if len < self.min_name_len || len > self.max_name_len {
            return false;
        }

        let forbidden = |c: char| {
            c.is_ascii_digit() || matches!(c, '\n' | '$' | '~' | '.' | '!' | ',' | ':')
        };
        if text.chars().any(forbidden) {
            return false;
        }

        text.chars().all(|c| c == '?') || text.chars().any(|c| c.is_ascii_alphabetic())
    }

    /// Whether a null-terminated string found by the sweep is worth keeping.
    pub fn is_sweep_candidate(&self, text: &str) -> bool {
        text.len() >= self.min_sweep_len && text.chars().any(|c| c.is_ascii_alphabetic() || c == '?')
    }

    /// Accept the string at `offset` as a name.
    ///
    /// The string must be boundary-aligned, end in a null or an opcode, and
    /// be name-like.
    pub fn accept_name(&self, data: &[u8], offset: usize) -> Option<String> {
        if !is_boundary_aligned(data, offset) {
            return None;
        }
        let decoded = decode_at(data, offset)?;
        if decoded.terminator == Terminator::EndOfBuffer || !self.is_name_like(&decoded.text) {
            return None;
        }
        Some(decoded.text)
    }

    /// Accept the string at `offset` as dialogue.
    pub fn accept_dialogue(&self, data: &[u8], offset: usize) -> Option<String> {
        if !is_boundary_aligned(data, offset) {
            return None;
        }
        let decoded = decode_at(data, offset)?;
        (decoded.text.len() >= self.min_dialogue_len).then_some(decoded.text)
    }
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self::V1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_like() {
        let policy = TextPolicy::V1;

        assert!(policy.is_name_like("Algo"));
        assert!(policy.is_name_like("Old Man"));
        assert!(policy.is_name_like("???"));
        assert!(policy.is_name_like("Lady-in-Red"));

        assert!(!policy.is_name_like("A"));
        assert!(!policy.is_name_like("Guard 2"));
        assert!(!policy.is_name_like("Hello."));
        assert!(!policy.is_name_like("Wait!"));
        assert!(!policy.is_name_like("Yes, sir"));
        assert!(!policy.is_name_like("Note:"));
        assert!(!policy.is_name_like("$50"));
        assert!(!policy.is_name_like("~~"));
        assert!(!policy.is_name_like("Two\nLines"));
        assert!(!policy.is_name_like("--"));
        assert!(!policy.is_name_like("A very long name indeed!!"));
        assert!(!policy.is_name_like("Abcdefghijklmnopqrstuvwxy"));
    }

    #[test]
    fn test_sweep_candidate() {
        let policy = TextPolicy::V1;
        assert!(policy.is_sweep_candidate("Inn"));
        assert!(policy.is_sweep_candidate("?!?"));
        assert!(!policy.is_sweep_candidate("Hi"));
        assert!(!policy.is_sweep_candidate("1234"));
    }

    #[test]
    fn test_accept_name_requires_alignment_and_terminator() {
        let policy = TextPolicy::V1;
        let data = b"\0Algo\0xAlgo\0Algo";

        assert_eq!(policy.accept_name(data, 1).as_deref(), Some("Algo"));
        assert_eq!(policy.accept_name(data, 7), None);
        assert_eq!(policy.accept_name(data, 12), None);
        assert_eq!(policy.accept_name(data, 0), None);
    }

    #[test]
    fn test_accept_dialogue_length() {
        let policy = TextPolicy::V1;
        let data = b"\0Hey\0Hello there.\0";

        assert_eq!(policy.accept_dialogue(data, 1), None);
        assert_eq!(policy.accept_dialogue(data, 5).as_deref(), Some("Hello there."));
    }
}
