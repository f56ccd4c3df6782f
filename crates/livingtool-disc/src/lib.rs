//! Disc image extraction for Guardian's Crusade.
//!
//! The game ships as a raw Mode 2 disc image with a fixed 2352-byte sector
//! stride. Its files are not reachable through the ISO 9660 tree; instead the
//! executable carries an index of `(timecode, length)` records. This crate
//! turns that index and the image into individual asset files:
//!
//! - [`IndexReader`] - Decodes the 8-byte BCD index records
//! - [`extract_content`] - Strips per-sector framing and concatenates payloads
//! - [`CategoryTable`] - Maps sector addresses to asset categories
//! - [`Unpacker`] - Writes every unique entry to its category directory
//! - [`find_gaps`] - Reports sector ranges the index never references
//!
//! # Sector framing
//!
//! Two framings share the same 2352-byte stride:
//!
//! | framing  | header | payload | footer |
//! |----------|--------|---------|--------|
//! | standard | 24     | 2048    | 280    |
//! | stream   | 16     | 2336    | 0      |
//!
//! Everything from the `M` category onward (movies) uses stream framing.
//!
//! # Example
//!
//! ```no_run
//! use livingtool_disc::{CategoryTable, DiscImage, IndexReader, Unpacker};
//!
//! let image = DiscImage::open("gc.bin")?;
//! let index = std::fs::File::open("locsectors.bin")?;
//! let table = CategoryTable::builtin();
//!
//! let unpacker = Unpacker::new(image.as_bytes(), &table, "output");
//! let summary = unpacker.unpack(IndexReader::new(index), |_, _| {})?;
//! println!("{} files written", summary.written);
//! # Ok::<(), livingtool_disc::Error>(())
//! ```

mod category;
mod error;
mod gaps;
mod geometry;
mod image;
mod index;
mod unpack;

pub use category::{Category, CategoryTable, FileNameTemplate, STREAM_CATEGORY};
pub use error::{Error, Result};
pub use gaps::{find_gaps, report_gaps, SectorGap};
pub use geometry::{Msf, SectorFraming, FRAMES_PER_SECOND, PREGAP_SECTORS, SECTOR_SIZE};
pub use image::{extract_content, DiscImage};
pub use index::{extract_section, DiscIndexEntry, IndexReader, INDEX_RECORD_SIZE};
pub use unpack::{rename_category_files, ExtractedAsset, UnpackPlan, UnpackSummary, Unpacker};
