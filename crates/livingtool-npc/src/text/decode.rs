//! In-game string decoding.
//!
//! Strings are runs of printable ASCII ending in `0x00`. Bytes `0x06` and
//! `0x07` are line-break control codes; a run of them becomes one newline.
//! Any other byte ends the string.

/// Why a decoded string stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// A `0x00` byte.
    Null,
    /// A byte outside the text alphabet, usually a script opcode.
    Opcode(u8),
    /// The buffer ended first.
    EndOfBuffer,
}

/// A decoded, trimmed, non-empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedString {
    pub text: String,
    pub terminator: Terminator,
}

/// Whether `offset` starts a string: at the buffer start or after a `0x00`.
#[inline]
pub fn is_boundary_aligned(data: &[u8], offset: usize) -> bool {
    offset == 0 || data.get(offset - 1) == Some(&0)
}

/// Decode the string at `offset`.
///
/// Returns `None` if `offset` is outside `data` or the trimmed text is empty.
pub fn decode_at(data: &[u8], offset: usize) -> Option<DecodedString> {
    let bytes = data.get(offset..)?;

    let mut text = String::new();
    let mut terminator = Terminator::EndOfBuffer;

    for &b in bytes {
        match b {
            0x00 => {
                terminator = Terminator::Null;
                break;
            }
            0x06 | 0x07 => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            0x20..=0x7E => text.push(b as char),
            _ => {
                terminator = Terminator::Opcode(b);
                break;
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(DecodedString {
        text: trimmed.to_string(),
        terminator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string() {
        let decoded = decode_at(b"\0Algo\0rest", 1).unwrap();
        assert_eq!(decoded.text, "Algo");
        assert_eq!(decoded.terminator, Terminator::Null);
    }

    #[test]
    fn test_line_breaks_collapse() {
        let decoded = decode_at(b"Hello,\x06\x07\x06friend.\x07\0", 0).unwrap();
        assert_eq!(decoded.text, "Hello,\nfriend.");
    }

    #[test]
    fn test_opcode_ends_string() {
        let decoded = decode_at(b"  Zed \x1F\x10\0", 0).unwrap();
        assert_eq!(decoded.text, "Zed");
        assert_eq!(decoded.terminator, Terminator::Opcode(0x1F));
    }

    #[test]
    fn test_end_of_buffer() {
        let decoded = decode_at(b"tail", 0).unwrap();
        assert_eq!(decoded.terminator, Terminator::EndOfBuffer);
    }

    #[test]
    fn test_failures() {
        assert!(decode_at(b"abc", 3).is_none());
        assert!(decode_at(b"abc", 9).is_none());
        assert!(decode_at(b"\0abc", 0).is_none());
        assert!(decode_at(b" \x06 \0", 0).is_none());
        assert!(decode_at(b"\x80abc", 0).is_none());
    }

    #[test]
    fn test_boundary_alignment() {
        let data = b"ab\0cd";
        assert!(is_boundary_aligned(data, 0));
        assert!(!is_boundary_aligned(data, 1));
        assert!(is_boundary_aligned(data, 3));
        assert!(!is_boundary_aligned(data, 4));
    }
}
