//! The disc index: 8-byte `(timecode, length)` records.
//!
//! Each record is laid out as:
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 3    | BCD minute, second, frame     |
//! | 3      | 1    | unused                        |
//! | 4      | 4    | length in sectors (LE, i32)   |

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::geometry::Msf;
use crate::{Error, Result};

/// Size of one index record in bytes.
pub const INDEX_RECORD_SIZE: usize = 8;

/// One logical file on the disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscIndexEntry {
    /// Linear address of the first sector.
    pub sector_number: i32,
    /// Number of sectors the file spans.
    pub size_in_sectors: i32,
}

impl DiscIndexEntry {
    pub const fn new(sector_number: i32, size_in_sectors: i32) -> Self {
        Self {
            sector_number,
            size_in_sectors,
        }
    }

    /// Decode one raw index record.
    pub fn from_record(record: &[u8; INDEX_RECORD_SIZE]) -> Self {
        let msf = Msf::from_bcd([record[0], record[1], record[2]]);
        Self {
            sector_number: msf.to_sector(),
            size_in_sectors: LittleEndian::read_i32(&record[4..8]),
        }
    }

    /// Last sector covered by this entry (inclusive).
    #[inline]
    pub fn last_sector(&self) -> i64 {
        self.sector_number as i64 + self.size_in_sectors as i64 - 1
    }
}

/// Lazily decodes index records from any reader.
///
/// Iteration stops silently at end of input or at a trailing partial record.
/// Any other I/O failure is yielded once as an error and ends the sequence.
#[derive(Debug)]
pub struct IndexReader<R> {
    reader: R,
    done: bool,
}

impl<R: Read> IndexReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }

    /// Fill `record` completely, returning `false` on a short read.
    fn fill(&mut self, record: &mut [u8; INDEX_RECORD_SIZE]) -> io::Result<bool> {
        let mut filled = 0;
        while filled < record.len() {
            match self.reader.read(&mut record[filled..]) {
                Ok(0) => return Ok(false),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(true)
    }
}

impl IndexReader<BufReader<File>> {
    /// Open an index file on disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> Iterator for IndexReader<R> {
    type Item = Result<DiscIndexEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut record = [0u8; INDEX_RECORD_SIZE];
        match self.fill(&mut record) {
            Ok(true) => Some(Ok(DiscIndexEntry::from_record(&record))),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(Error::Io(e)))
            }
        }
    }
}

/// Read the byte range `[start, end)` of a file.
///
/// Used to cut the index table out of the game executable.
pub fn extract_section<P: AsRef<Path>>(path: P, start: u64, end: u64) -> Result<Vec<u8>> {
    if end < start {
        return Err(Error::InvalidSection {
            start,
            end,
            reason: "end precedes start".to_string(),
        });
    }

    let file_ends_early = || Error::InvalidSection {
        start,
        end,
        reason: "file ends before section".to_string(),
    };

    let mut file = File::open(path)?;
    if file.metadata()?.len() < end {
        return Err(file_ends_early());
    }
    file.seek(SeekFrom::Start(start))?;

    let mut buffer = Vec::new();
    file.take(end - start).read_to_end(&mut buffer)?;
    if (buffer.len() as u64) < end - start {
        return Err(file_ends_early());
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn record(msf: [u8; 3], size: i32) -> Vec<u8> {
        let mut bytes = msf.to_vec();
        bytes.push(0);
        bytes.extend_from_slice(&size.to_le_bytes());
        bytes
    }

    #[test]
    fn test_decode_records() {
        let mut data = record([0x00, 0x04, 0x29], 12);
        data.extend(record([0x19, 0x00, 0x11], 3));

        let entries: Vec<_> = IndexReader::new(&data[..])
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            entries,
            vec![
                DiscIndexEntry::new(179, 12),
                DiscIndexEntry::new(19 * 60 * 75 + 11 - 150, 3),
            ]
        );
    }

    #[test]
    fn test_short_trailing_record_ends_silently() {
        let mut data = record([0x00, 0x02, 0x10], 1);
        data.extend_from_slice(&[0x00, 0x03, 0x00, 0x00, 0x05]);

        let entries: Vec<_> = IndexReader::new(&data[..]).collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].as_ref().unwrap(), &DiscIndexEntry::new(10, 1));
    }

    #[test]
    fn test_empty_index() {
        assert_eq!(IndexReader::new(&[0u8; 0][..]).count(), 0);
    }

    #[test]
    fn test_open() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&record([0x00, 0x02, 0x10], 4)).unwrap();

        let entries: Vec<_> = IndexReader::open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(entries, vec![DiscIndexEntry::new(10, 4)]);
        assert!(IndexReader::open(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn test_last_sector() {
        assert_eq!(DiscIndexEntry::new(10, 10).last_sector(), 19);
        assert_eq!(DiscIndexEntry::new(25, 1).last_sector(), 25);
    }

    #[test]
    fn test_extract_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();

        let section = extract_section(file.path(), 2, 6).unwrap();
        assert_eq!(section, b"2345");

        assert!(matches!(
            extract_section(file.path(), 8, 12),
            Err(Error::InvalidSection { .. })
        ));
        assert!(matches!(
            extract_section(file.path(), 0, 1 << 42),
            Err(Error::InvalidSection { .. })
        ));
        assert!(matches!(
            extract_section(file.path(), 6, 2),
            Err(Error::InvalidSection { .. })
        ));
    }
}
