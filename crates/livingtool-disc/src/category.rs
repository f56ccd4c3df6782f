//! Asset categories keyed by sector address.
//!
//! The disc lays out each asset class in one contiguous run of sectors, so a
//! file's category follows from where it starts. A [`CategoryTable`] holds the
//! first sector of each category; the last category absorbs every address up
//! to the end of the image.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::SectorFraming;
use crate::{Error, Result};

/// Category whose sectors (and everything after) use stream framing.
pub const STREAM_CATEGORY: &str = "M";

/// File name pattern applied by the rename pass.
///
/// Written as `PREFIX{00}SUFFIX`, where the number of zeros in braces is the
/// zero-padded width of the 1-based file number. A template without braces
/// names every file in its category the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileNameTemplate {
    prefix: String,
    width: Option<usize>,
    suffix: String,
}

impl FileNameTemplate {
    /// Template with a zero-padded numeric slot.
    pub fn numbered(prefix: &str, width: usize, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            width: Some(width),
            suffix: suffix.to_string(),
        }
    }

    /// Template that always yields the same name.
    pub fn fixed(name: &str) -> Self {
        Self {
            prefix: name.to_string(),
            width: None,
            suffix: String::new(),
        }
    }

    /// Whether the template carries a numeric slot.
    #[inline]
    pub fn has_slot(&self) -> bool {
        self.width.is_some()
    }

    /// Render the file name for the `number`-th file of the category.
    pub fn render(&self, number: usize) -> String {
        match self.width {
            Some(width) => format!("{}{:0width$}{}", self.prefix, number, self.suffix),
            None => self.prefix.clone(),
        }
    }
}

impl FromStr for FileNameTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(open) = s.find('{') else {
            if s.contains('}') {
                return Err(Error::InvalidTemplate(s.to_string()));
            }
            return Ok(Self::fixed(s));
        };

        let close = s[open..]
            .find('}')
            .map(|i| open + i)
            .ok_or_else(|| Error::InvalidTemplate(s.to_string()))?;

        let slot = &s[open + 1..close];
        let suffix = &s[close + 1..];
        if slot.is_empty() || slot.bytes().any(|b| b != b'0') || suffix.contains(['{', '}']) {
            return Err(Error::InvalidTemplate(s.to_string()));
        }

        Ok(Self::numbered(&s[..open], slot.len(), suffix))
    }
}

impl TryFrom<String> for FileNameTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FileNameTemplate> for String {
    fn from(template: FileNameTemplate) -> Self {
        template.to_string()
    }
}

impl fmt::Display for FileNameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            Some(width) => write!(f, "{}{{{}}}{}", self.prefix, "0".repeat(width), self.suffix),
            None => f.write_str(&self.prefix),
        }
    }
}

/// One named run of sectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Directory name, e.g. `NPC`.
    pub name: String,
    /// First sector belonging to the category.
    pub start_sector: i32,
    /// Final file name pattern.
    pub template: FileNameTemplate,
}

impl Category {
    pub fn new(name: &str, start_sector: i32, template: FileNameTemplate) -> Self {
        Self {
            name: name.to_string(),
            start_sector,
            template,
        }
    }
}

/// Categories sorted by start sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Category>", into = "Vec<Category>")]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Build a table, sorting categories by start sector.
    ///
    /// Fails if the table is empty, a start sector is negative, or two
    /// categories share a name or a start.
    pub fn new(mut categories: Vec<Category>) -> Result<Self> {
        if categories.is_empty() {
            return Err(Error::InvalidCategoryTable("no categories".to_string()));
        }

        if let Some(c) = categories.iter().find(|c| c.start_sector < 0) {
            return Err(Error::InvalidCategoryTable(format!(
                "{} starts at negative sector {}",
                c.name, c.start_sector
            )));
        }

        categories.sort_by_key(|c| c.start_sector);

        for pair in categories.windows(2) {
            if pair[0].start_sector == pair[1].start_sector {
                return Err(Error::InvalidCategoryTable(format!(
                    "{} and {} both start at sector {}",
                    pair[0].name, pair[1].name, pair[0].start_sector
                )));
            }
        }
        for (i, category) in categories.iter().enumerate() {
            if categories[..i].iter().any(|c| c.name == category.name) {
                return Err(Error::InvalidCategoryTable(format!(
                    "duplicate category {}",
                    category.name
                )));
            }
        }

        Ok(Self { categories })
    }

    /// The Guardian's Crusade (NTSC-U) layout.
    pub fn builtin() -> Self {
        use FileNameTemplate as T;

        let categories = vec![
            Category::new("ROOT", 0, T::numbered("ROOT", 2, ".BIN")),
            Category::new("LT", 179, T::numbered("TOY", 2, ".BIN")),
            Category::new("BF", 1849, T::numbered("BF", 2, ".BIN")),
            Category::new("KN", 4261, T::numbered("KNIGHT", 2, ".BIN")),
            Category::new("PB", 4641, T::numbered("PB", 2, ".BIN")),
            Category::new("ENE", 5650, T::numbered("ENEMY", 3, ".BIN")),
            Category::new("SYS", 14784, T::numbered("SYS", 2, ".BIN")),
            Category::new("B", 15729, T::numbered("OVLY", 2, ".BIN")),
            Category::new("FE", 16030, T::numbered("FE", 2, ".BIN")),
            Category::new("BGM", 16952, T::numbered("BGM", 2, ".BIN")),
            Category::new("F", 20010, T::fixed("F.BIN")),
            Category::new("NPC", 85511, T::numbered("NPC", 2, ".BIN")),
            Category::new(STREAM_CATEGORY, 88391, T::numbered("VIDEOS", 2, ".STR")),
            Category::new("M2", 164074, T::fixed("ATTRACT.STR")),
        ];

        Self { categories }
    }

    /// Parse a table from JSON: an array of
    /// `{ "name", "start_sector", "template" }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a table from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Categories in ascending sector order.
    #[inline]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// The category containing `sector`.
    ///
    /// Addresses at or past the last boundary, and addresses before the
    /// first one, fall into the last category.
    pub fn classify(&self, sector: i32) -> &Category {
        let idx = self.categories.partition_point(|c| c.start_sector <= sector);
        match idx {
            0 => self.last(),
            i => &self.categories[i - 1],
        }
    }

    /// Framing used by sectors of an entry starting at `sector`.
    pub fn framing_for(&self, sector: i32) -> SectorFraming {
        match self.get(STREAM_CATEGORY) {
            Some(stream) if sector >= stream.start_sector => SectorFraming::Stream,
            _ => SectorFraming::Standard,
        }
    }

    fn last(&self) -> &Category {
        // `new` rejects empty tables
        &self.categories[self.categories.len() - 1]
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TryFrom<Vec<Category>> for CategoryTable {
    type Error = Error;

    fn try_from(categories: Vec<Category>) -> Result<Self> {
        Self::new(categories)
    }
}

impl From<CategoryTable> for Vec<Category> {
    fn from(table: CategoryTable) -> Self {
        table.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_sorted_and_complete() {
        let table = CategoryTable::builtin();
        assert_eq!(table.categories().len(), 14);
        assert_eq!(table.categories()[0].start_sector, 0);
        assert!(table
            .categories()
            .windows(2)
            .all(|w| w[0].start_sector < w[1].start_sector));
        assert_eq!(CategoryTable::new(table.categories().to_vec()).unwrap(), table);
    }

    #[test]
    fn test_classify_boundaries() {
        let table = CategoryTable::builtin();

        assert_eq!(table.classify(0).name, "ROOT");
        assert_eq!(table.classify(178).name, "ROOT");
        assert_eq!(table.classify(179).name, "LT");
        assert_eq!(table.classify(85510).name, "F");
        assert_eq!(table.classify(85511).name, "NPC");
        assert_eq!(table.classify(164073).name, "M");
        assert_eq!(table.classify(164074).name, "M2");
        assert_eq!(table.classify(i32::MAX).name, "M2");
        assert_eq!(table.classify(-5).name, "M2");
    }

    #[test]
    fn test_classify_is_total_and_consistent() {
        let table = CategoryTable::builtin();
        let categories = table.categories();
        let last = categories.last().unwrap().start_sector;

        for sector in (0..last).step_by(97) {
            let category = table.classify(sector);
            let matching: Vec<_> = categories
                .windows(2)
                .filter(|w| w[0].start_sector <= sector && sector < w[1].start_sector)
                .collect();
            assert_eq!(matching.len(), 1);
            assert_eq!(matching[0][0].name, category.name);
        }
    }

    #[test]
    fn test_framing_switches_at_movies() {
        let table = CategoryTable::builtin();
        assert_eq!(table.framing_for(88390), SectorFraming::Standard);
        assert_eq!(table.framing_for(88391), SectorFraming::Stream);
        assert_eq!(table.framing_for(170000), SectorFraming::Stream);
    }

    #[test]
    fn test_template_render() {
        assert_eq!(FileNameTemplate::numbered("TOY", 2, ".BIN").render(3), "TOY03.BIN");
        assert_eq!(FileNameTemplate::numbered("ENEMY", 3, ".BIN").render(42), "ENEMY042.BIN");
        assert_eq!(FileNameTemplate::numbered("NPC", 2, ".BIN").render(123), "NPC123.BIN");
        assert_eq!(FileNameTemplate::fixed("F.BIN").render(7), "F.BIN");
    }

    #[test]
    fn test_template_parse() {
        let template: FileNameTemplate = "VIDEOS{00}.STR".parse().unwrap();
        assert_eq!(template, FileNameTemplate::numbered("VIDEOS", 2, ".STR"));
        assert_eq!(template.to_string(), "VIDEOS{00}.STR");

        let template: FileNameTemplate = "ATTRACT.STR".parse().unwrap();
        assert!(!template.has_slot());

        assert!("BAD{0".parse::<FileNameTemplate>().is_err());
        assert!("BAD{}".parse::<FileNameTemplate>().is_err());
        assert!("BAD{x}".parse::<FileNameTemplate>().is_err());
        assert!("A{0}B{0}".parse::<FileNameTemplate>().is_err());
        assert!("A}".parse::<FileNameTemplate>().is_err());
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"[
            { "name": "B", "start_sector": 100, "template": "B{000}.BIN" },
            { "name": "A", "start_sector": 0, "template": "A.BIN" }
        ]"#;
        let table = CategoryTable::from_json(json).unwrap();

        assert_eq!(table.categories()[0].name, "A");
        assert_eq!(table.classify(150).template.render(1), "B001.BIN");
        assert_eq!(table.framing_for(150), SectorFraming::Standard);
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let t = FileNameTemplate::fixed("X");
        assert!(CategoryTable::new(vec![]).is_err());
        assert!(CategoryTable::new(vec![
            Category::new("A", 0, t.clone()),
            Category::new("B", 0, t.clone()),
        ])
        .is_err());
        assert!(CategoryTable::new(vec![
            Category::new("A", 0, t.clone()),
            Category::new("A", 5, t),
        ])
        .is_err());
    }

    #[test]
    fn test_table_rejects_negative_start() {
        let t = FileNameTemplate::fixed("X");
        assert!(matches!(
            CategoryTable::new(vec![
                Category::new("A", -10, t.clone()),
                Category::new("B", 5, t),
            ]),
            Err(Error::InvalidCategoryTable(_))
        ));
        assert!(CategoryTable::from_json(
            r#"[{"name": "A", "start_sector": -1, "template": "A{00}.BIN"}]"#
        )
        .is_err());
    }
}
