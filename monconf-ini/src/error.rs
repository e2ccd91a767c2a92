//! Error types for monconf-ini

use std::path::PathBuf;
use thiserror::Error;

/// Why a line could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("entry outside of any section")]
    EntryOutsideSection,

    #[error("unterminated section header")]
    UnterminatedHeader,

    #[error("empty section name")]
    EmptySectionName,

    #[error("unexpected text after section header")]
    TrailingHeaderText,

    #[error("duplicate section [{0}]")]
    DuplicateSection(String),

    #[error("empty key")]
    EmptyKey,

    #[error("duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("unterminated quoted value")]
    UnterminatedQuote,

    #[error("unexpected text after quoted value")]
    TrailingValueText,

    #[error("line is neither a section, an entry nor a comment")]
    Unrecognized,
}

/// A syntax error at a 1-based line number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct SyntaxError {
    pub line: usize,
    pub kind: SyntaxErrorKind,
}

/// The file exists but cannot be turned into a document
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },
}

impl LoadError {
    /// Path of the file that could not be loaded
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Syntax { path, .. } => path,
        }
    }
}

/// Discriminant of an [`EditError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditErrorKind {
    DuplicateName,
    NotFound,
    InvalidName,
}

/// An edit intent rejected against the current document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("section \"{0}\" already exists")]
    DuplicateName(String),

    #[error("section \"{0}\" not found")]
    NotFound(String),

    #[error("invalid section name \"{name}\": {reason}")]
    InvalidName { name: String, reason: &'static str },
}

impl EditError {
    pub fn kind(&self) -> EditErrorKind {
        match self {
            EditError::DuplicateName(_) => EditErrorKind::DuplicateName,
            EditError::NotFound(_) => EditErrorKind::NotFound,
            EditError::InvalidName { .. } => EditErrorKind::InvalidName,
        }
    }

    /// The section name the error refers to
    pub fn name(&self) -> &str {
        match self {
            EditError::DuplicateName(name) | EditError::NotFound(name) => name,
            EditError::InvalidName { name, .. } => name,
        }
    }
}

/// Why a key or value cannot be written in INI syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnrenderableReason {
    #[error("contains a line break")]
    LineBreak,

    #[error("needs quoting but contains a double quote")]
    QuoteInQuotedValue,

    #[error("is not a valid key")]
    InvalidKey,
}

/// A document that cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot render '{key}' in section [{section}]: {reason}")]
pub struct RenderError {
    pub section: String,
    pub key: String,
    pub reason: UnrenderableReason,
}

/// Errors that can occur while replacing a file atomically
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("permission denied writing {path}: {source}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no space left writing {path}: {source}")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    PathUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Classify an I/O error raised while writing `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if is_disk_full(&source) {
            return WriteError::DiskFull { path, source };
        }
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => WriteError::PermissionDenied { path, source },
            _ => WriteError::PathUnwritable { path, source },
        }
    }
}

#[cfg(unix)]
fn is_disk_full(err: &std::io::Error) -> bool {
    matches!(err.raw_os_error(), Some(code) if code == libc::ENOSPC || code == libc::EDQUOT)
}

#[cfg(not(unix))]
fn is_disk_full(_err: &std::io::Error) -> bool {
    false
}
