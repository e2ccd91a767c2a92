//! Edit intents and how they change a document
//!
//! An edit touches exactly one section. It is validated in full before the
//! document is mutated, so a rejected edit leaves the document as it was.

use crate::document::{ConfigDocument, Entry, Section};
use crate::error::EditError;
use indexmap::IndexMap;
use tracing::debug;

/// A create/update/remove request against one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIntent {
    /// Add a new section at the end of the document
    Create {
        name: String,
        entries: IndexMap<String, String>,
    },
    /// Replace a section's entries, optionally renaming it in place.
    ///
    /// `entries` is the complete new entry set: keys missing from it are removed.
    Update {
        name: String,
        new_name: String,
        entries: IndexMap<String, String>,
    },
    /// Drop a section and everything attached to it
    Remove { name: String },
}

impl EditIntent {
    pub fn create<I, K, V>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EditIntent::Create {
            name: name.into(),
            entries: collect_entries(entries),
        }
    }

    pub fn update<I, K, V>(name: impl Into<String>, new_name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EditIntent::Update {
            name: name.into(),
            new_name: new_name.into(),
            entries: collect_entries(entries),
        }
    }

    pub fn remove(name: impl Into<String>) -> Self {
        EditIntent::Remove { name: name.into() }
    }

    /// The section the intent targets (its current name)
    pub fn target(&self) -> &str {
        match self {
            EditIntent::Create { name, .. }
            | EditIntent::Update { name, .. }
            | EditIntent::Remove { name } => name,
        }
    }

    /// The name the section carries once the intent is applied
    pub fn resulting_name(&self) -> &str {
        match self {
            EditIntent::Update { new_name, .. } => new_name,
            _ => self.target(),
        }
    }
}

fn collect_entries<I, K, V>(entries: I) -> IndexMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl ConfigDocument {
    /// Apply an edit to this document
    ///
    /// On error the document is unchanged.
    pub fn apply(&mut self, intent: EditIntent) -> Result<(), EditError> {
        match intent {
            EditIntent::Create { name, entries } => {
                validate_name(&name)?;
                if self.contains(&name) {
                    return Err(EditError::DuplicateName(name));
                }
                debug!("Creating section [{}] with {} entries", name, entries.len());
                self.sections.push(Section::new(name, entries));
            }
            EditIntent::Update {
                name,
                new_name,
                entries,
            } => {
                validate_name(&new_name)?;
                let idx = self
                    .position(&name)
                    .ok_or_else(|| EditError::NotFound(name.clone()))?;
                if new_name != name && self.contains(&new_name) {
                    return Err(EditError::DuplicateName(new_name));
                }

                let section = &mut self.sections[idx];
                if new_name != name {
                    debug!("Renaming section [{}] to [{}]", name, new_name);
                    section.name = new_name;
                }
                section.entries = replace_entries(std::mem::take(&mut section.entries), entries);
            }
            EditIntent::Remove { name } => {
                let idx = self
                    .position(&name)
                    .ok_or_else(|| EditError::NotFound(name.clone()))?;
                debug!("Removing section [{}]", name);
                self.sections.remove(idx);
            }
        }
        Ok(())
    }
}

/// Apply an edit to an owned document
pub fn apply(mut document: ConfigDocument, intent: EditIntent) -> Result<ConfigDocument, EditError> {
    document.apply(intent)?;
    Ok(document)
}

/// Build the new entry set: kept keys stay in their loaded order with their
/// source text, new keys follow in the order given.
fn replace_entries(
    mut current: IndexMap<String, Entry>,
    mut wanted: IndexMap<String, String>,
) -> IndexMap<String, Entry> {
    let mut result = IndexMap::with_capacity(wanted.len());
    for (key, mut entry) in current.drain(..) {
        if let Some(value) = wanted.shift_remove(&key) {
            entry.value = value;
            result.insert(key, entry);
        }
    }
    for (key, value) in wanted {
        result.insert(key, Entry::new(value));
    }
    result
}

/// Section names are used verbatim between brackets
fn validate_name(name: &str) -> Result<(), EditError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.trim() != name {
        Some("name has leading or trailing whitespace")
    } else if name.contains(['[', ']']) {
        Some("name contains a section delimiter")
    } else if name.contains(['\r', '\n']) {
        Some("name contains a line break")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EditError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
