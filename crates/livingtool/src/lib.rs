//! LivingTool - Guardian's Crusade disc extraction and game data decoding.
//!
//! This crate provides a unified interface to the LivingTool crates.
//!
//! # Crates
//!
//! - [`livingtool_common`] - Bounds-checked binary reading
//! - [`livingtool_disc`] - Raw sector disc image extraction
//! - [`livingtool_npc`] - NPC data file decoding (entities, names, dialogue)
//! - [`livingtool_enemy`] - Enemy data file decoding
//!
//! # Example
//!
//! ```no_run
//! use livingtool::prelude::*;
//!
//! let image = DiscImage::open("gc.bin")?;
//! let table = CategoryTable::builtin();
//! let index = IndexReader::open("locsectors.bin")?;
//!
//! let summary = Unpacker::new(image.as_bytes(), &table, "output").unpack(index, |_, _| {})?;
//! println!("Wrote {} files", summary.written);
//!
//! let npc = NpcFile::open("output/NPC/NPC01.BIN")?;
//! println!("{}", NpcReport::new("NPC01.BIN", &npc));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use livingtool_common as common;
pub use livingtool_disc as disc;
pub use livingtool_enemy as enemy;
pub use livingtool_npc as npc;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use livingtool_common::BinaryReader;
    pub use livingtool_disc::{
        extract_content, extract_section, CategoryTable, DiscImage, DiscIndexEntry, IndexReader,
        Msf, UnpackSummary, Unpacker,
    };
    pub use livingtool_enemy::{EnemyFile, MoveEntry};
    pub use livingtool_npc::{EntityRecord, NpcFile, NpcReport, TextEntry, TextPolicy};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
