//! Whole-disc extraction: index → files on disk.
//!
//! Extraction runs in two phases. Planning drops duplicate entries and checks
//! that every remaining entry fits inside the image, so a truncated image
//! fails before anything is written. Writing then stores each entry as
//! `output/<category>/<NNN>` using one running counter shared by all
//! categories, and a final rename pass gives every file its category name.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::category::CategoryTable;
use crate::gaps::{report_gaps, SectorGap};
use crate::image::{ensure_extractable, extract_content};
use crate::index::DiscIndexEntry;
use crate::Result;

/// One extracted file, handed to the progress callback after it is written.
#[derive(Debug, Clone)]
pub struct ExtractedAsset {
    /// The index entry the data came from.
    pub entry: DiscIndexEntry,
    /// Category the entry was classified into.
    pub category: String,
    /// 1-based position of the file within its category.
    pub sequence: usize,
    /// Payload bytes with sector framing removed.
    pub data: Vec<u8>,
}

/// Unique, validated entries in index order.
#[derive(Debug, Clone, Default)]
pub struct UnpackPlan {
    pub entries: Vec<DiscIndexEntry>,
    pub duplicates: usize,
}

/// Outcome of a full extraction.
#[derive(Debug, Clone, Default)]
pub struct UnpackSummary {
    /// Files written before the rename pass.
    pub written: usize,
    /// Index entries skipped as repeats of an earlier `(sector, size)` pair.
    pub duplicates: usize,
    /// Unique entries, in index order.
    pub entries: Vec<DiscIndexEntry>,
    /// Unreferenced sector ranges.
    pub gaps: Vec<SectorGap>,
}

/// Extracts a disc image into per-category directories.
pub struct Unpacker<'a> {
    image: &'a [u8],
    table: &'a CategoryTable,
    output: PathBuf,
}

impl<'a> Unpacker<'a> {
    pub fn new(image: &'a [u8], table: &'a CategoryTable, output: impl Into<PathBuf>) -> Self {
        Self {
            image,
            table,
            output: output.into(),
        }
    }

    /// Create one directory per category, whether or not it receives files.
    pub fn create_category_dirs(&self) -> Result<()> {
        for category in self.table.categories() {
            fs::create_dir_all(self.output.join(&category.name))?;
        }
        Ok(())
    }

    /// Drop duplicate entries and check the rest against the image bounds.
    pub fn plan<I>(&self, index: I) -> Result<UnpackPlan>
    where
        I: IntoIterator<Item = Result<DiscIndexEntry>>,
    {
        let mut seen = HashSet::new();
        let mut plan = UnpackPlan::default();

        for entry in index {
            let entry = entry?;
            if !seen.insert(entry) {
                debug!("Skipping already seen entry at sector {}", entry.sector_number);
                plan.duplicates += 1;
                continue;
            }
            ensure_extractable(self.image.len(), &entry, self.table)?;
            plan.entries.push(entry);
        }

        Ok(plan)
    }

    /// Write every planned entry, then rename and report gaps.
    pub fn execute<F>(&self, plan: UnpackPlan, mut on_asset: F) -> Result<UnpackSummary>
    where
        F: FnMut(&ExtractedAsset, &Path),
    {
        self.create_category_dirs()?;

        let mut per_category: HashMap<&str, usize> = HashMap::new();
        let mut running_index = 1usize;

        for entry in &plan.entries {
            let data = extract_content(self.image, entry, self.table)?;
            let category = self.table.classify(entry.sector_number);

            let path = self
                .output
                .join(&category.name)
                .join(format!("{:03}", running_index));
            debug!(
                "Writing sector {} ({} sectors) to {}",
                entry.sector_number,
                entry.size_in_sectors,
                path.display()
            );
            write_file(&path, &data)?;

            let sequence = per_category.entry(category.name.as_str()).or_insert(0);
            *sequence += 1;

            let asset = ExtractedAsset {
                entry: *entry,
                category: category.name.clone(),
                sequence: *sequence,
                data,
            };
            on_asset(&asset, &path);

            running_index += 1;
        }

        rename_category_files(&self.output, self.table)?;
        let gaps = report_gaps(&plan.entries);

        info!(
            "Extracted {} files ({} duplicate entries skipped)",
            plan.entries.len(),
            plan.duplicates
        );

        Ok(UnpackSummary {
            written: plan.entries.len(),
            duplicates: plan.duplicates,
            entries: plan.entries,
            gaps,
        })
    }

    /// Plan and execute in one go.
    pub fn unpack<I, F>(&self, index: I, on_asset: F) -> Result<UnpackSummary>
    where
        I: IntoIterator<Item = Result<DiscIndexEntry>>,
        F: FnMut(&ExtractedAsset, &Path),
    {
        let plan = self.plan(index)?;
        self.execute(plan, on_asset)
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    Ok(())
}

/// Renumber the files of every category directory from 1.
///
/// Files are ordered by the number in their name and renamed with the
/// category template. A template without a numeric slot maps every file to
/// the same name, so only the last one survives. Files whose name is not a
/// number are left alone.
pub fn rename_category_files(output: &Path, table: &CategoryTable) -> Result<usize> {
    let mut renamed = 0;

    for category in table.categories() {
        let dir = output.join(&category.name);
        if !dir.is_dir() {
            continue;
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                Some(number) => files.push((number, path)),
                None => warn!("Not renaming {}: name is not a number", path.display()),
            }
        }
        files.sort_by_key(|(number, _)| *number);

        if !category.template.has_slot() && files.len() > 1 {
            warn!(
                "{} files in {} collapse onto {}",
                files.len(),
                category.name,
                category.template
            );
        }

        for (i, (_, old_path)) in files.iter().enumerate() {
            let new_path = dir.join(category.template.render(i + 1));
            fs::rename(old_path, &new_path)?;
            renamed += 1;
        }
    }

    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SECTOR_SIZE;
    use crate::image::tests::{small_table, synthetic_image};
    use crate::Error;

    fn index(entries: &[(i32, i32)]) -> Vec<Result<DiscIndexEntry>> {
        entries
            .iter()
            .map(|&(s, n)| Ok(DiscIndexEntry::new(s, n)))
            .collect()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_full_unpack() {
        let table = small_table();
        let image = synthetic_image(12, &table);
        let out = tempfile::tempdir().unwrap();

        let mut assets = Vec::new();
        let summary = Unpacker::new(&image, &table, out.path())
            .unpack(
                index(&[(8, 2), (0, 2), (4, 1), (0, 2), (2, 1), (5, 1)]),
                |asset, path| {
                    assets.push((
                        asset.category.clone(),
                        asset.sequence,
                        path.file_name().unwrap().to_string_lossy().into_owned(),
                    ))
                },
            )
            .unwrap();

        assert_eq!(summary.written, 5);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(
            assets,
            vec![
                ("M".to_string(), 1, "001".to_string()),
                ("A".to_string(), 1, "002".to_string()),
                ("B".to_string(), 1, "003".to_string()),
                ("A".to_string(), 2, "004".to_string()),
                ("B".to_string(), 2, "005".to_string()),
            ]
        );

        let a = out.path().join("A");
        assert_eq!(file_names(&a), vec!["A01.BIN", "A02.BIN"]);
        let first = fs::read(a.join("A01.BIN")).unwrap();
        assert_eq!(first.len(), 2 * 2048);
        assert!(first[..2048].iter().all(|&b| b == 0));
        assert!(first[2048..].iter().all(|&b| b == 1));
        assert!(fs::read(a.join("A02.BIN")).unwrap().iter().all(|&b| b == 2));

        let m = fs::read(out.path().join("M").join("V01.STR")).unwrap();
        assert_eq!(m.len(), 2 * 2336);

        assert_eq!(
            summary.gaps,
            vec![SectorGap { start: 3, end: 3 }, SectorGap { start: 6, end: 7 }]
        );
    }

    #[test]
    fn test_template_without_slot_collapses_files() {
        // Known quirk: both B files are renamed to B.BIN and the later one wins.
        let table = small_table();
        let image = synthetic_image(12, &table);
        let out = tempfile::tempdir().unwrap();

        Unpacker::new(&image, &table, out.path())
            .unpack(index(&[(4, 1), (5, 1)]), |_, _| {})
            .unwrap();

        let b = out.path().join("B");
        assert_eq!(file_names(&b), vec!["B.BIN"]);
        assert!(fs::read(b.join("B.BIN")).unwrap().iter().all(|&b| b == 5));
    }

    #[test]
    fn test_duplicate_entry_yields_one_file() {
        let table = small_table();
        let image = synthetic_image(12, &table);
        let out = tempfile::tempdir().unwrap();

        let summary = Unpacker::new(&image, &table, out.path())
            .unpack(index(&[(1, 1), (1, 1)]), |_, _| {})
            .unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(file_names(&out.path().join("A")), vec!["A01.BIN"]);
    }

    #[test]
    fn test_same_sector_different_size_is_not_a_duplicate() {
        let table = small_table();
        let image = synthetic_image(12, &table);
        let out = tempfile::tempdir().unwrap();

        let summary = Unpacker::new(&image, &table, out.path())
            .unpack(index(&[(1, 1), (1, 2)]), |_, _| {})
            .unwrap();

        assert_eq!(summary.written, 2);
        assert_eq!(file_names(&out.path().join("A")), vec!["A01.BIN", "A02.BIN"]);
    }

    #[test]
    fn test_directories_exist_for_empty_categories() {
        let table = small_table();
        let image = synthetic_image(12, &table);
        let out = tempfile::tempdir().unwrap();

        Unpacker::new(&image, &table, out.path())
            .unpack(index(&[]), |_, _| {})
            .unwrap();

        for name in ["A", "B", "M"] {
            assert!(out.path().join(name).is_dir());
        }
    }

    #[test]
    fn test_truncated_image_writes_nothing() {
        let table = small_table();
        let mut image = synthetic_image(4, &table);
        image.truncate(3 * SECTOR_SIZE + 10);
        let out = tempfile::tempdir().unwrap();

        let err = Unpacker::new(&image, &table, out.path())
            .unpack(index(&[(0, 1), (2, 2)]), |_, _| {})
            .unwrap_err();

        assert!(matches!(err, Error::TruncatedSector { sector: 3, .. }));
        assert!(file_names(out.path()).is_empty());
    }

    #[test]
    fn test_rename_skips_non_numeric_names() {
        let table = small_table();
        let out = tempfile::tempdir().unwrap();
        let a = out.path().join("A");
        fs::create_dir_all(&a).unwrap();
        fs::write(a.join("010"), b"x").unwrap();
        fs::write(a.join("9"), b"y").unwrap();
        fs::write(a.join("notes.txt"), b"z").unwrap();

        let renamed = rename_category_files(out.path(), &table).unwrap();

        assert_eq!(renamed, 2);
        assert_eq!(file_names(&a), vec!["A01.BIN", "A02.BIN", "notes.txt"]);
        assert_eq!(fs::read(a.join("A01.BIN")).unwrap(), b"y");
    }
}
