//! Operator-facing output: listings, notifications and failed-save previews

use crate::entity::EntityKind;
use indexmap::IndexMap;
use monconf_ini::{LoadError, PersistFailure, SectionMap};
use std::fmt::Write;
use std::path::Path;

/// Render one entity kind's listing, or the reason it cannot be listed
pub fn listing(kind: EntityKind, path: &Path, result: &Result<SectionMap, LoadError>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({}):", capitalize(kind.plural()), path.display());
    match result {
        Ok(map) if map.is_empty() => {
            let _ = writeln!(out, "  (none configured)");
        }
        Ok(map) => {
            for (name, entries) in map {
                out.push_str(&entity(name, entries, "  "));
            }
        }
        Err(e) => {
            let _ = writeln!(out, "  Cannot list {}: {}", kind.plural(), e);
        }
    }
    out
}

/// One named section with its entries
pub fn entity(name: &str, entries: &IndexMap<String, String>, indent: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}{}", indent, name);
    for (key, value) in entries {
        let _ = writeln!(out, "{}  {} = {}", indent, key, value);
    }
    out
}

/// Explain a failed save and show what should have been written
pub fn failure(failure: &PersistFailure) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Could not save configuration: {}", failure.reason);
    let _ = writeln!(out, "Target file: {}", failure.target_path.display());

    if !failure.rendered_text.is_empty() {
        let heading = if failure.has_preview() {
            "Apply the following configuration manually:"
        } else {
            "The file currently contains:"
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", heading);
        let _ = writeln!(out, "----");
        out.push_str(&failure.rendered_text);
        if !failure.rendered_text.ends_with('\n') {
            out.push('\n');
        }
        let _ = writeln!(out, "----");
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monconf_ini::{persist_with, EditIntent, FileSink, WriteError};

    struct ReadOnly;

    impl FileSink for ReadOnly {
        fn write_atomically(&self, path: &Path, _text: &str) -> Result<(), WriteError> {
            Err(WriteError::from_io(
                path,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ))
        }
    }

    #[test]
    fn test_listing_empty_and_filled() {
        let path = Path::new("/etc/monitoring/backends.ini");
        let empty = listing(EntityKind::Backend, path, &Ok(SectionMap::new()));
        assert_eq!(empty, "Backends (/etc/monitoring/backends.ini):\n  (none configured)\n");

        let mut map = SectionMap::new();
        map.insert(
            "ido".to_string(),
            IndexMap::from([("type".to_string(), "ido".to_string())]),
        );
        let filled = listing(EntityKind::Backend, path, &Ok(map));
        assert_eq!(
            filled,
            "Backends (/etc/monitoring/backends.ini):\n  ido\n    type = ido\n"
        );
    }

    #[test]
    fn test_failure_shows_preview() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("backends.ini");
        let failure = persist_with(
            &ReadOnly,
            &path,
            EditIntent::create("ido", [("type", "ido")]),
        )
        .unwrap_err();

        let text = super::failure(&failure);
        assert!(text.starts_with("Could not save configuration: permission denied"));
        assert!(text.contains(
            "Apply the following configuration manually:\n----\n[ido]\ntype = ido\n----\n"
        ));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("instances"), "Instances");
        assert_eq!(capitalize(""), "");
    }
}
