//! Raw disc image access and per-entry payload extraction.

use std::fs::File;
use std::path::Path;

use livingtool_common::can_read;
use memmap2::Mmap;

use crate::category::CategoryTable;
use crate::geometry::SECTOR_SIZE;
use crate::index::DiscIndexEntry;
use crate::{Error, Result};

/// A read-only, memory-mapped disc image.
pub struct DiscImage {
    mmap: Mmap,
}

impl DiscImage {
    /// Map a disc image from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the image is opened read-only and never written by this process.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self { mmap })
    }

    /// The raw image bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// Number of whole raw sectors in the image.
    #[inline]
    pub fn sector_count(&self) -> usize {
        self.mmap.len() / SECTOR_SIZE
    }
}

/// Byte offset of the first sector and the sector count of an entry.
pub(crate) fn entry_span(entry: &DiscIndexEntry) -> Result<(usize, usize)> {
    if entry.sector_number < 0 || entry.size_in_sectors < 0 {
        return Err(Error::InvalidEntry {
            sector: entry.sector_number,
            size: entry.size_in_sectors,
        });
    }
    Ok((
        entry.sector_number as usize * SECTOR_SIZE,
        entry.size_in_sectors as usize,
    ))
}

/// Check that every sector payload of `entry` lies inside an image of
/// `image_len` bytes, without copying anything.
pub(crate) fn ensure_extractable(
    image_len: usize,
    entry: &DiscIndexEntry,
    table: &CategoryTable,
) -> Result<()> {
    let (start, count) = entry_span(entry)?;
    if count == 0 {
        return Ok(());
    }

    let framing = table.framing_for(entry.sector_number);
    let last_payload = start + (count - 1) * SECTOR_SIZE + framing.header_size();
    if last_payload + framing.payload_size() <= image_len {
        return Ok(());
    }

    // Locate the first sector whose payload is cut short.
    let head = framing.header_size() + framing.payload_size();
    let available = image_len.saturating_sub(start);
    let short = if available < head {
        0
    } else {
        (available - head) / SECTOR_SIZE + 1
    };
    let actual = available
        .saturating_sub(short * SECTOR_SIZE + framing.header_size())
        .min(framing.payload_size());

    Err(Error::TruncatedSector {
        sector: entry.sector_number as i64 + short as i64,
        expected: framing.payload_size(),
        actual,
    })
}

/// Copy the payload of every sector of `entry` into one buffer.
///
/// The framing is chosen once per entry by [`CategoryTable::framing_for`].
/// The result is exactly `size_in_sectors * payload_size` bytes long; a
/// payload cut short by the end of the image fails the whole extraction.
pub fn extract_content(
    image: &[u8],
    entry: &DiscIndexEntry,
    table: &CategoryTable,
) -> Result<Vec<u8>> {
    let (start, count) = entry_span(entry)?;
    ensure_extractable(image.len(), entry, table)?;
    let framing = table.framing_for(entry.sector_number);
    let payload_size = framing.payload_size();

    let mut contents = Vec::with_capacity(count * payload_size);
    let mut position = start;

    for i in 0..count {
        position += framing.header_size();

        if !can_read(image, position as i64, payload_size) {
            return Err(Error::TruncatedSector {
                sector: entry.sector_number as i64 + i as i64,
                expected: payload_size,
                actual: image.len().saturating_sub(position).min(payload_size),
            });
        }
        contents.extend_from_slice(&image[position..position + payload_size]);

        position += payload_size + framing.footer_size();
    }

    Ok(contents)
}
