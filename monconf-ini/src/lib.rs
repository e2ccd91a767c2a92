//! Monconf INI persistence
//!
//! Format-preserving storage for flat, sectioned configuration files such as
//! `backends.ini` and `instances.ini`:
//! - Loading a file into named sections of ordered key/value entries
//! - Applying create/update/remove edits to a single section
//! - Rendering the result while keeping comments, blank lines and ordering
//!   of everything the edit did not touch
//! - Replacing the file atomically, never leaving it half written
//!
//! # Architecture
//!
//! - [`document`] - Section store model ([`ConfigDocument`], [`Section`])
//! - [`parser`] - Text and file loading
//! - [`merge`] - Edit intents and how they change a document
//! - [`writer`] - Preserving renderer
//! - [`atomic`] - Temp file + rename writes
//! - [`transaction`] - Load → apply → render → write in one call
//!
//! The crate holds no ambient state: every operation takes the target path
//! or document explicitly.

pub mod atomic;
pub mod document;
pub mod error;
pub mod merge;
pub mod parser;
pub mod transaction;
pub mod writer;

// Re-export commonly used types
pub use atomic::{AtomicFile, FileSink};
pub use document::{ConfigDocument, Entry, Section, SectionMap};
pub use error::{
    EditError, EditErrorKind, LoadError, RenderError, SyntaxError, SyntaxErrorKind,
    UnrenderableReason, WriteError,
};
pub use merge::EditIntent;
pub use parser::{load, parse};
pub use transaction::{
    list_entities, persist, persist_with, FailureReason, PersistFailure, WriteOutcome,
};
pub use writer::{render, render_preview};
