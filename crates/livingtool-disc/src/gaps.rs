//! Diagnostics for sector ranges that no index entry references.

use std::fmt;

use tracing::info;

use crate::geometry::Msf;
use crate::index::DiscIndexEntry;

/// An unreferenced, inclusive run of sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorGap {
    pub start: i64,
    pub end: i64,
}

impl SectorGap {
    /// Number of sectors in the gap.
    #[inline]
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    pub fn start_msf(&self) -> Option<Msf> {
        i32::try_from(self.start).ok().and_then(Msf::from_sector)
    }

    pub fn end_msf(&self) -> Option<Msf> {
        i32::try_from(self.end).ok().and_then(Msf::from_sector)
    }
}

impl fmt::Display for SectorGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msf = |m: Option<Msf>| m.map_or_else(|| "--:--:--".to_string(), |m| m.to_string());
        write!(
            f,
            "sectors {}-{} ({} to {}), length {} sectors",
            self.start,
            self.end,
            msf(self.start_msf()),
            msf(self.end_msf()),
            self.len()
        )
    }
}

/// Find every gap between consecutive entries, ordered by sector.
pub fn find_gaps(entries: &[DiscIndexEntry]) -> Vec<SectorGap> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|e| e.sector_number);

    sorted
        .windows(2)
        .filter_map(|pair| {
            let previous_end = pair[0].last_sector();
            let current_start = pair[1].sector_number as i64;
            (current_start - previous_end > 1).then(|| SectorGap {
                start: previous_end + 1,
                end: current_start - 1,
            })
        })
        .collect()
}

/// Find gaps and log each one. The result is informational only.
pub fn report_gaps(entries: &[DiscIndexEntry]) -> Vec<SectorGap> {
    let gaps = find_gaps(entries);
    for gap in &gaps {
        info!("Gap between {gap}");
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_between_entries() {
        let entries = [DiscIndexEntry::new(25, 5), DiscIndexEntry::new(10, 10)];
        let gaps = find_gaps(&entries);

        assert_eq!(gaps, vec![SectorGap { start: 20, end: 24 }]);
        assert_eq!(gaps[0].len(), 5);
    }

    #[test]
    fn test_adjacent_and_overlapping_entries_have_no_gap() {
        let entries = [
            DiscIndexEntry::new(0, 10),
            DiscIndexEntry::new(10, 5),
            DiscIndexEntry::new(12, 2),
        ];
        assert!(find_gaps(&entries).is_empty());
        assert!(find_gaps(&[]).is_empty());
        assert!(find_gaps(&[DiscIndexEntry::new(3, 1)]).is_empty());
    }

    #[test]
    fn test_single_sector_gap() {
        let entries = [DiscIndexEntry::new(0, 1), DiscIndexEntry::new(2, 1)];
        assert_eq!(find_gaps(&entries), vec![SectorGap { start: 1, end: 1 }]);
    }

    #[test]
    fn test_gap_display() {
        let gap = SectorGap { start: 20, end: 24 };
        assert_eq!(
            gap.to_string(),
            "sectors 20-24 (00:02:20 to 00:02:24), length 5 sectors"
        );
    }
}
