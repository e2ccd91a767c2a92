//! Preserving renderer
//!
//! Turns a [`ConfigDocument`] back into INI text. Anything that still matches
//! what was loaded is copied verbatim: comments, blank lines, header and
//! entry lines. Only changed values, renamed headers and newly created
//! entries/sections are rendered, and a changed entry keeps its original
//! indentation and spacing around `=` (its inline comment is dropped).
//!
//! New sections go after the last loaded section and the file's trailing
//! comments, separated by one blank line, in the default style:
//!
//! ```ini
//! [name]
//! key = value
//! ```

use crate::document::{ConfigDocument, Entry, Section};
use crate::error::{RenderError, UnrenderableReason};
use crate::parser::BOM;
use tracing::debug;

/// Render a document to INI text
///
/// Fails when a key or value cannot be expressed in INI syntax.
pub fn render(document: &ConfigDocument) -> Result<String, RenderError> {
    let rendered = Renderer::new(document.newline).document(document);
    match rendered.error {
        Some(err) => Err(err),
        None => Ok(rendered.text),
    }
}

/// Render a document, writing unrenderable keys and values as they are
///
/// Used to show an operator what an edit would have produced even when the
/// text could not be saved.
pub fn render_preview(document: &ConfigDocument) -> String {
    Renderer::new(document.newline).document(document).text
}

impl ConfigDocument {
    /// Render this document to INI text
    pub fn render(&self) -> Result<String, RenderError> {
        render(self)
    }
}

struct Rendered {
    text: String,
    error: Option<RenderError>,
}

struct Renderer {
    buf: String,
    newline: &'static str,
    error: Option<RenderError>,
}

impl Renderer {
    fn new(newline: &'static str) -> Self {
        Self {
            buf: String::new(),
            newline,
            error: None,
        }
    }

    fn document(mut self, document: &ConfigDocument) -> Rendered {
        if document.bom {
            self.buf.push(BOM);
        }
        let mut trailing_done = false;
        for section in &document.sections {
            if section.origin.is_none() && !trailing_done {
                self.raw_lines(&document.trailing);
                trailing_done = true;
            }
            self.section(section);
        }
        if !trailing_done {
            self.raw_lines(&document.trailing);
        }

        debug!(
            "Rendered {} sections into {} bytes",
            document.sections.len(),
            self.buf.len()
        );
        Rendered {
            text: self.buf,
            error: self.error,
        }
    }

    fn section(&mut self, section: &Section) {
        match &section.origin {
            Some(origin) => {
                self.raw_lines(&origin.leading);
                self.raw(&origin.header_line(&section.name));
                for (key, entry) in &section.entries {
                    self.entry(&section.name, key, entry);
                }
                self.raw_lines(&origin.trailing);
            }
            None => {
                self.blank_line();
                self.line(&format!("[{}]", section.name));
                for (key, entry) in &section.entries {
                    self.entry(&section.name, key, entry);
                }
            }
        }
    }

    fn entry(&mut self, section: &str, key: &str, entry: &Entry) {
        match &entry.origin {
            Some(origin) if origin.value == entry.value => {
                self.raw_lines(&origin.leading);
                self.raw(&origin.raw);
            }
            Some(origin) => {
                self.raw_lines(&origin.leading);
                let value = self.value(section, key, &entry.value, origin.quoted);
                let line = format!("{}{}{}", origin.prefix, value, origin.terminator);
                self.raw(&line);
            }
            None => {
                if !is_valid_key(key) {
                    self.fail(section, key, UnrenderableReason::InvalidKey);
                }
                let value = self.value(section, key, &entry.value, false);
                self.line(&format!("{} = {}", key, value));
            }
        }
    }

    fn value(&mut self, section: &str, key: &str, value: &str, prefer_quoted: bool) -> String {
        match format_value(value, prefer_quoted) {
            Ok(formatted) => formatted,
            Err(reason) => {
                self.fail(section, key, reason);
                value.to_string()
            }
        }
    }

    /// Keep the first failure, carry on rendering
    fn fail(&mut self, section: &str, key: &str, reason: UnrenderableReason) {
        if self.error.is_none() {
            self.error = Some(RenderError {
                section: section.to_string(),
                key: key.to_string(),
                reason,
            });
        }
    }

    fn raw_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.raw(line);
        }
    }

    /// Append source text that carries its own terminator (or none at EOF)
    fn raw(&mut self, text: &str) {
        self.break_line();
        self.buf.push_str(text);
    }

    /// Append a freshly rendered line
    fn line(&mut self, text: &str) {
        self.break_line();
        self.buf.push_str(text);
        self.buf.push_str(self.newline);
    }

    /// Terminate an unterminated last line before appending more
    fn break_line(&mut self) {
        if !self.at_start() && !self.buf.ends_with('\n') {
            self.buf.push_str(self.newline);
        }
    }

    /// Nothing written yet apart from a byte order mark
    fn at_start(&self) -> bool {
        self.buf.trim_start_matches(BOM).is_empty()
    }

    /// End the output with exactly one blank line, unless nothing was written
    ///
    /// Extra blank lines already at the end are dropped.
    fn blank_line(&mut self) {
        if self.at_start() {
            return;
        }
        self.break_line();
        let floor = if self.buf.starts_with(BOM) {
            BOM.len_utf8()
        } else {
            0
        };
        loop {
            let body = &self.buf[..self.buf.len() - 1];
            let start = body.rfind('\n').map_or(floor, |i| i + 1).max(floor);
            if !self.buf[start..].trim().is_empty() {
                break;
            }
            self.buf.truncate(start);
            if self.at_start() {
                return;
            }
        }
        self.buf.push_str(self.newline);
    }
}

/// Format a value for the right-hand side of `=`
fn format_value(value: &str, prefer_quoted: bool) -> Result<String, UnrenderableReason> {
    if value.contains(['\r', '\n']) {
        return Err(UnrenderableReason::LineBreak);
    }

    let needs_quotes = value.is_empty()
        || value.trim() != value
        || value.starts_with('"')
        || value.contains(['#', ';']);

    if value.contains('"') {
        return if needs_quotes {
            Err(UnrenderableReason::QuoteInQuotedValue)
        } else {
            Ok(value.to_string())
        };
    }

    if needs_quotes || prefer_quoted {
        Ok(format!("\"{}\"", value))
    } else {
        Ok(value.to_string())
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.contains(['=', '\r', '\n'])
        && !key.starts_with(['[', '#', ';'])
}
