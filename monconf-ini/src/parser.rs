//! INI parsing and file loading
//!
//! Every input line ends up somewhere in the document: as a section header,
//! an entry, or trivia (comments and blank lines) attached to a neighbour.
//! That is what lets [`crate::writer::render`] reproduce an unmodified file
//! exactly.
//!
//! Trivia attachment:
//! - trivia above an entry belongs to that entry
//! - between the last entry of a section and the next header, lines up to
//!   the first blank line trail the previous section, the rest lead the next
//!   header (with no blank line, all of it leads the header)
//! - at end of file, lines up to the first blank line trail the last section
//!   and the rest trail the document

use crate::document::{ConfigDocument, Entry, EntryOrigin, Section, SectionOrigin};
use crate::error::{LoadError, SyntaxError, SyntaxErrorKind};
use std::path::Path;
use tracing::debug;

/// UTF-8 byte order mark some editors put at the start of a file
pub(crate) const BOM: char = '\u{feff}';

/// Load a document from a file
///
/// A missing file is an empty document, not an error.
pub fn load(path: &Path) -> Result<ConfigDocument, LoadError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist, using an empty document", path.display());
            return Ok(ConfigDocument::new());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let document = parse(&content).map_err(|source| LoadError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "Loaded {} sections from {}",
        document.len(),
        path.display()
    );
    Ok(document)
}

/// Parse a document from INI text
pub fn parse(text: &str) -> Result<ConfigDocument, SyntaxError> {
    let (bom, text) = match text.strip_prefix(BOM) {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let mut parser = Parser::new();
    for (idx, raw) in text.split_inclusive('\n').enumerate() {
        parser
            .line(raw)
            .map_err(|kind| SyntaxError { line: idx + 1, kind })?;
    }
    let mut document = parser.finish();
    document.bom = bom;
    Ok(document)
}

impl ConfigDocument {
    /// Parse a document from INI text
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        parse(text)
    }

    /// Load from a file, or an empty document if it does not exist
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        load(path)
    }
}

struct Parser {
    sections: Vec<Section>,
    pending: Vec<String>,
    newline: Option<&'static str>,
}

impl Parser {
    fn new() -> Self {
        Self {
            sections: Vec::new(),
            pending: Vec::new(),
            newline: None,
        }
    }

    fn line(&mut self, raw: &str) -> Result<(), SyntaxErrorKind> {
        let (content, terminator) = split_terminator(raw);
        if self.newline.is_none() && !terminator.is_empty() {
            self.newline = Some(if terminator == "\r\n" { "\r\n" } else { "\n" });
        }

        let trimmed = content.trim();
        if is_trivia(trimmed) {
            self.pending.push(raw.to_string());
        } else if trimmed.starts_with('[') {
            self.header(raw, content)?;
        } else if content.contains('=') {
            self.entry(raw, content, terminator)?;
        } else {
            return Err(SyntaxErrorKind::Unrecognized);
        }
        Ok(())
    }

    fn header(&mut self, raw: &str, content: &str) -> Result<(), SyntaxErrorKind> {
        let open = content.find('[').ok_or(SyntaxErrorKind::Unrecognized)?;
        let close = content.find(']').ok_or(SyntaxErrorKind::UnterminatedHeader)?;
        let inner = &content[open + 1..close];
        let name = inner.trim();
        if name.is_empty() {
            return Err(SyntaxErrorKind::EmptySectionName);
        }
        if !is_trivia(content[close + 1..].trim()) {
            return Err(SyntaxErrorKind::TrailingHeaderText);
        }
        if self.sections.iter().any(|s| s.name == name) {
            return Err(SyntaxErrorKind::DuplicateSection(name.to_string()));
        }

        let name_start = open + 1 + (inner.len() - inner.trim_start().len());
        let name_end = name_start + name.len();

        let pending = std::mem::take(&mut self.pending);
        let leading = match self.sections.last_mut() {
            Some(previous) => {
                let (trailing, leading) = split_at_first_blank(pending, false);
                if let Some(origin) = previous.origin.as_mut() {
                    origin.trailing = trailing;
                }
                leading
            }
            None => pending,
        };

        self.sections.push(Section {
            name: name.to_string(),
            entries: Default::default(),
            origin: Some(SectionOrigin {
                leading,
                header_prefix: raw[..name_start].to_string(),
                header_name: name.to_string(),
                header_suffix: raw[name_end..].to_string(),
                trailing: Vec::new(),
            }),
        });
        Ok(())
    }

    fn entry(&mut self, raw: &str, content: &str, terminator: &str) -> Result<(), SyntaxErrorKind> {
        let section = self
            .sections
            .last_mut()
            .ok_or(SyntaxErrorKind::EntryOutsideSection)?;

        let eq = content.find('=').ok_or(SyntaxErrorKind::Unrecognized)?;
        let key = content[..eq].trim();
        if key.is_empty() {
            return Err(SyntaxErrorKind::EmptyKey);
        }
        if section.entries.contains_key(key) {
            return Err(SyntaxErrorKind::DuplicateKey(key.to_string()));
        }

        let after = &content[eq + 1..];
        let value_start = eq + 1 + (after.len() - after.trim_start().len());
        let (value, quoted) = parse_value(&content[value_start..])?;

        let origin = EntryOrigin {
            leading: std::mem::take(&mut self.pending),
            raw: raw.to_string(),
            prefix: content[..value_start].to_string(),
            value: value.clone(),
            quoted,
            terminator: terminator.to_string(),
        };
        section.entries.insert(
            key.to_string(),
            Entry {
                value,
                origin: Some(origin),
            },
        );
        Ok(())
    }

    fn finish(mut self) -> ConfigDocument {
        let pending = std::mem::take(&mut self.pending);
        let trailing = match self.sections.last_mut() {
            Some(last) => {
                let (section_trailing, document_trailing) = split_at_first_blank(pending, true);
                if let Some(origin) = last.origin.as_mut() {
                    origin.trailing = section_trailing;
                }
                document_trailing
            }
            None => pending,
        };

        ConfigDocument {
            sections: self.sections,
            trailing,
            newline: self.newline.unwrap_or("\n"),
            bom: false,
        }
    }
}

/// Split trivia into the part before the first blank line and the rest.
///
/// Without a blank line everything goes to the first half when
/// `keep_if_unbroken` is set, to the second half otherwise.
fn split_at_first_blank(lines: Vec<String>, keep_if_unbroken: bool) -> (Vec<String>, Vec<String>) {
    match lines.iter().position(|l| l.trim().is_empty()) {
        Some(idx) => {
            let mut before = lines;
            let after = before.split_off(idx);
            (before, after)
        }
        None if keep_if_unbroken => (lines, Vec::new()),
        None => (Vec::new(), lines),
    }
}

fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, "\n")
    } else {
        (raw, "")
    }
}

/// Blank or comment (`#`, `;`), given trimmed text
fn is_trivia(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';')
}

/// Parse the value part of an entry, starting at its first non-blank char
fn parse_value(rest: &str) -> Result<(String, bool), SyntaxErrorKind> {
    if let Some(quoted) = rest.strip_prefix('"') {
        let close = quoted.find('"').ok_or(SyntaxErrorKind::UnterminatedQuote)?;
        if !is_trivia(quoted[close + 1..].trim()) {
            return Err(SyntaxErrorKind::TrailingValueText);
        }
        return Ok((quoted[..close].to_string(), true));
    }

    let end = inline_comment_start(rest).unwrap_or(rest.len());
    Ok((rest[..end].trim_end().to_string(), false))
}

/// Byte offset of an inline comment: `#` or `;` at the start or after whitespace
fn inline_comment_start(value: &str) -> Option<usize> {
    let mut prev_is_space = true;
    for (idx, c) in value.char_indices() {
        if (c == '#' || c == ';') && prev_is_space {
            return Some(idx);
        }
        prev_is_space = c.is_whitespace();
    }
    None
}
