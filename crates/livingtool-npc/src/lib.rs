//! NPC data file decoder for Guardian's Crusade.
//!
//! Every file of the `NPC` category bundles the entities of one map together
//! with their scripts, models and text. The layout is a tree of pointer
//! tables:
//!
//! - A leading table of absolute offsets ("top-level entries"). Its first
//!   word is also its size in bytes.
//! - Entry 0 is a sub-header: two `u16` group counts followed by a
//!   zero-terminated table of pointers relative to entry 0.
//! - Entry 1 is the entity section: a record count, then 16-byte records.
//!   Script offsets in the records, and the text pointers inside the
//!   scripts, are relative to the start of this section.
//!
//! Decoding never fails: out-of-range pointers and undecodable strings are
//! skipped, and a file without the expected structure decodes to an empty
//! [`NpcFile`].
//!
//! # Example
//!
//! ```no_run
//! use livingtool_npc::NpcFile;
//!
//! let npc = NpcFile::open("output/NPC/NPC07.BIN")?;
//! for name in npc.names() {
//!     println!("{:#06x}: {}", name.offset, name.text);
//! }
//! # Ok::<(), livingtool_npc::Error>(())
//! ```

mod entity;
mod error;
mod file;
mod pointer;
mod report;
pub mod text;

pub use entity::EntityRecord;
pub use error::{Error, Result};
pub use file::{NpcFile, TIM_MAGIC, TMD_MAGIC};
pub use pointer::PointerEntry;
pub use report::NpcReport;
pub use text::{TextEntry, TextPolicy};
