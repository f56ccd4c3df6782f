//! CD-ROM geometry: sector framing and minute:second:frame timecodes.

use std::fmt;

/// Raw sector size of the image (sync + header + subheader + data + EDC/ECC).
pub const SECTOR_SIZE: usize = 0x930;

/// Sectors (frames) per second of CD time.
pub const FRAMES_PER_SECOND: u32 = 75;

/// Two-second lead-in before logical sector 0.
pub const PREGAP_SECTORS: i32 = 150;

/// How the payload is laid out inside one raw sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorFraming {
    /// Mode 2 Form 1: 24-byte header, 2048-byte payload, 280-byte footer.
    Standard,
    /// Movie (STR) sectors: 16-byte header, 2336-byte payload, no footer.
    Stream,
}

impl SectorFraming {
    /// Bytes skipped before the payload.
    #[inline]
    pub const fn header_size(self) -> usize {
        match self {
            Self::Standard => 0x18,
            Self::Stream => 0x10,
        }
    }

    /// Payload bytes kept from each sector.
    #[inline]
    pub const fn payload_size(self) -> usize {
        match self {
            Self::Standard => 0x800,
            Self::Stream => 0x920,
        }
    }

    /// Bytes skipped after the payload.
    #[inline]
    pub const fn footer_size(self) -> usize {
        match self {
            Self::Standard => 0x118,
            Self::Stream => 0,
        }
    }
}

/// A CD timecode in minutes, seconds and frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Msf {
    pub minute: u8,
    pub second: u8,
    pub frame: u8,
}

impl Msf {
    /// Decode three binary-coded-decimal bytes.
    pub fn from_bcd(bytes: [u8; 3]) -> Self {
        Self {
            minute: decode_bcd(bytes[0]),
            second: decode_bcd(bytes[1]),
            frame: decode_bcd(bytes[2]),
        }
    }

    /// Encode as three binary-coded-decimal bytes.
    pub fn to_bcd(self) -> [u8; 3] {
        [
            encode_bcd(self.minute),
            encode_bcd(self.second),
            encode_bcd(self.frame),
        ]
    }

    /// Linear sector address, with the 150-sector pregap removed.
    pub fn to_sector(self) -> i32 {
        (self.minute as i32 * 60 + self.second as i32) * FRAMES_PER_SECOND as i32
            + self.frame as i32
            - PREGAP_SECTORS
    }

    /// Timecode of a linear sector address.
    ///
    /// Returns `None` for addresses inside the pregap or past 99:59:74.
    pub fn from_sector(sector: i32) -> Option<Self> {
        let total = sector.checked_add(PREGAP_SECTORS)?;
        if total < 0 {
            return None;
        }
        let total = total as u32;
        let seconds = total / FRAMES_PER_SECOND;
        let minute = seconds / 60;
        if minute > 99 {
            return None;
        }
        Some(Self {
            minute: minute as u8,
            second: (seconds % 60) as u8,
            frame: (total % FRAMES_PER_SECOND) as u8,
        })
    }
}

impl fmt::Display for Msf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.minute, self.second, self.frame)
    }
}

#[inline]
fn decode_bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

#[inline]
fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
