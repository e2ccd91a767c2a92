//! Section store model
//!
//! A [`ConfigDocument`] is an ordered list of [`Section`]s, each an ordered
//! map of key → string value. Nodes loaded from text remember where they came
//! from (their raw lines and surrounding comments) so the writer can reproduce
//! untouched parts byte for byte. Nodes created by edits have no origin and
//! are rendered in the default style.

use indexmap::IndexMap;

/// Read-only snapshot: section name → key → value
pub type SectionMap = IndexMap<String, IndexMap<String, String>>;

/// Parsed representation of one configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub(crate) sections: Vec<Section>,
    /// Comments and blank lines after the last section that belong to the file
    pub(crate) trailing: Vec<String>,
    /// Line terminator used for freshly rendered lines
    pub(crate) newline: &'static str,
    /// File started with a UTF-8 byte order mark
    pub(crate) bom: bool,
}

/// A named, flat group of entries (one backend, one instance, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub(crate) name: String,
    pub(crate) entries: IndexMap<String, Entry>,
    pub(crate) origin: Option<SectionOrigin>,
}

/// A single `key = value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) value: String,
    pub(crate) origin: Option<EntryOrigin>,
}

/// Source text of a section that was loaded from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionOrigin {
    /// Comments and blank lines directly above the header
    pub leading: Vec<String>,
    /// Header text up to the name, e.g. `[` or `  [ `
    pub header_prefix: String,
    /// Name as written in the header
    pub header_name: String,
    /// Header text after the name, including `]`, comment and terminator
    pub header_suffix: String,
    /// Comments directly after the last entry, before any blank line
    pub trailing: Vec<String>,
}

impl SectionOrigin {
    pub fn header_line(&self, name: &str) -> String {
        format!("{}{}{}", self.header_prefix, name, self.header_suffix)
    }
}

/// Source text of an entry that was loaded from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryOrigin {
    /// Comments and blank lines directly above the entry
    pub leading: Vec<String>,
    /// The whole line, terminator included
    pub raw: String,
    /// Indentation, key and `=` with its spacing, e.g. `host = `
    pub prefix: String,
    /// Value as loaded, used to detect changes
    pub value: String,
    pub quoted: bool,
    /// `\n`, `\r\n` or empty for a last line without one
    pub terminator: String,
}

impl ConfigDocument {
    /// Create an empty document (zero sections)
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            trailing: Vec::new(),
            newline: "\n",
            bom: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Sections in file order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Snapshot of every section's entries, for listing and display
    pub fn to_map(&self) -> SectionMap {
        self.sections
            .iter()
            .map(|s| (s.name.clone(), s.to_map()))
            .collect()
    }

    /// Newline style detected on load (`\n` for new documents)
    pub fn newline(&self) -> &'static str {
        self.newline
    }
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Section {
    /// Create a section with no source text
    pub fn new<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), Entry::new(v)))
                .collect(),
            origin: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    /// Entries in order as `(key, value)`
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> IndexMap<String, String> {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }

    /// Whether the section was loaded from a file
    pub fn is_loaded(&self) -> bool {
        self.origin.is_some()
    }
}

impl Entry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// False only while the value still matches what was loaded
    pub fn is_modified(&self) -> bool {
        self.origin
            .as_ref()
            .map(|o| o.value != self.value)
            .unwrap_or(true)
    }
}
