//! Two-level code → description lookup table.
//!
//! The plain section is indexed by the HID keyboard usage carried in byte 2
//! of a report; the `"Special Keys"` section by the consumer code carried in
//! byte 1 of a special report. Entries are either one name or a list of
//! alternative names, the first of which is used for display.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::error::TableError;
use crate::scancode;

/// Name of the nested table holding special (consumer) keys.
pub const SPECIAL_SECTION: &str = "Special Keys";

/// A table entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Single(String),
    Alternatives(Vec<String>),
}

impl Description {
    /// Display name: the entry itself, or the first alternative.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Description::Single(name) => Some(name),
            Description::Alternatives(names) => names.first().map(String::as_str),
        }
    }
}

impl From<&str> for Description {
    fn from(name: &str) -> Self {
        Description::Single(name.to_string())
    }
}

/// Which part of the table a raw code is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Plain,
    Special,
}

#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    plain: HashMap<u8, Description>,
    special: HashMap<u8, Description>,
}

/// On-disk layout: plain codes at top level, special codes in a sub-table.
#[derive(Deserialize)]
struct TableFile {
    #[serde(rename = "Special Keys", default)]
    special: BTreeMap<String, Description>,
    #[serde(flatten)]
    plain: BTreeMap<String, Description>,
}

impl CodeTable {
    /// An empty table; every lookup falls back to `"code {n}"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// HID keyboard usages plus common consumer keys.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (code, names) in scancode::keyboard() {
            table.insert(Section::Plain, code, names);
        }
        for (code, names) in scancode::consumer() {
            table.insert(Section::Special, code, names);
        }
        table
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TableError> {
        let file: TableFile = toml::from_str(content)?;
        let mut table = Self::new();
        for (key, desc) in file.plain {
            table.insert(Section::Plain, parse_code(&key)?, desc);
        }
        for (key, desc) in file.special {
            table.insert(Section::Special, parse_code(&key)?, desc);
        }
        Ok(table)
    }

    pub fn insert(
        &mut self,
        section: Section,
        code: u8,
        desc: impl Into<Description>,
    ) -> Option<Description> {
        self.section_mut(section).insert(code, desc.into())
    }

    pub fn get(&self, section: Section, code: u8) -> Option<&Description> {
        self.section(section).get(&code)
    }

    /// Display name for a raw code, or `"code {n}"` when unknown.
    pub fn describe(&self, section: Section, code: u8) -> String {
        self.get(section, code)
            .and_then(Description::primary)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("code {code}"))
    }

    pub fn len(&self) -> usize {
        self.plain.len() + self.special.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn section(&self, section: Section) -> &HashMap<u8, Description> {
        match section {
            Section::Plain => &self.plain,
            Section::Special => &self.special,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut HashMap<u8, Description> {
        match section {
            Section::Plain => &mut self.plain,
            Section::Special => &mut self.special,
        }
    }
}

impl From<Vec<String>> for Description {
    fn from(names: Vec<String>) -> Self {
        Description::Alternatives(names)
    }
}

impl From<&[&str]> for Description {
    fn from(names: &[&str]) -> Self {
        match names {
            [single] => Description::Single(single.to_string()),
            _ => Description::Alternatives(names.iter().map(|n| n.to_string()).collect()),
        }
    }
}

/// Parse a table key: decimal or `0x`-prefixed hex byte.
fn parse_code(key: &str) -> Result<u8, TableError> {
    let trimmed = key.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|_| TableError::InvalidCode(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_single_and_list() {
        let mut table = CodeTable::new();
        table.insert(Section::Plain, 0x16, "A");
        table.insert(
            Section::Plain,
            0x28,
            vec!["Enter".to_string(), "Return".to_string()],
        );
        assert_eq!(table.describe(Section::Plain, 0x16), "A");
        assert_eq!(table.describe(Section::Plain, 0x28), "Enter");
        assert_eq!(table.describe(Section::Special, 0x16), "code 22");
    }

    #[test]
    fn test_empty_alternatives_fall_back() {
        let mut table = CodeTable::new();
        table.insert(Section::Plain, 7, Vec::<String>::new());
        assert_eq!(table.describe(Section::Plain, 7), "code 7");
    }

    #[test]
    fn test_from_toml() {
        let table = CodeTable::from_toml_str(
            r#"
            0x16 = "S"
            40 = ["Enter", "Return"]

            ["Special Keys"]
            0xe9 = "Volume Up"
            "#,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.describe(Section::Plain, 0x16), "S");
        assert_eq!(table.describe(Section::Plain, 40), "Enter");
        assert_eq!(table.describe(Section::Special, 0xE9), "Volume Up");
        assert_eq!(table.describe(Section::Plain, 0xE9), "code 233");
    }

    #[test]
    fn test_invalid_key() {
        let err = CodeTable::from_toml_str("0x1ff = \"Nope\"").unwrap_err();
        assert!(matches!(err, TableError::InvalidCode(k) if k == "0x1ff"));
    }

    #[test]
    fn test_missing_file() {
        let err = CodeTable::load(Path::new("/nonexistent/scancodes.toml")).unwrap_err();
        assert!(matches!(err, TableError::Io { .. }));
    }

    #[test]
    fn test_builtin() {
        let table = CodeTable::builtin();
        assert_eq!(table.describe(Section::Plain, 0x04), "A");
        assert_eq!(table.describe(Section::Plain, 0x1E), "1");
        assert_eq!(table.describe(Section::Plain, 0x28), "Enter");
        assert_eq!(table.describe(Section::Plain, 0x45), "F12");
        assert_eq!(table.describe(Section::Special, 0xE9), "Volume Up");
    }
}
