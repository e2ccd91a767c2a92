//! Load → apply → render → write, as one call
//!
//! Every failure is returned as a value carrying the target path and the
//! text that was (or would have been) written, so the caller can show an
//! operator exactly what did not land on disk and let them apply it by hand.
//!
//! There is no locking between concurrent callers: two edits racing on the
//! same file end with the last writer's version. The atomic rename only
//! guarantees that nobody ever reads a half-written file.

use crate::atomic::{AtomicFile, FileSink};
use crate::document::SectionMap;
use crate::error::{EditError, LoadError, RenderError, WriteError};
use crate::merge::EditIntent;
use crate::parser::load;
use crate::writer::{render, render_preview};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Why a persist attempt failed
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error(transparent)]
    NotReadable(#[from] LoadError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Unrenderable(#[from] RenderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// A failed persist attempt
///
/// `rendered_text` is the full document that was meant to be written. It is
/// empty when the file could not be loaded, and the unchanged document when
/// the edit itself was rejected.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct PersistFailure {
    pub reason: FailureReason,
    pub rendered_text: String,
    pub target_path: PathBuf,
}

/// Result of [`persist`]
pub type WriteOutcome = Result<(), PersistFailure>;

/// Snapshot of all sections in a file, for listing
///
/// A missing file lists as empty.
pub fn list_entities(path: &Path) -> Result<SectionMap, LoadError> {
    Ok(load(path)?.to_map())
}

/// Apply `intent` to the file at `path` and replace it atomically
pub fn persist(path: &Path, intent: EditIntent) -> WriteOutcome {
    persist_with(&AtomicFile, path, intent)
}

/// [`persist`] through a custom sink
pub fn persist_with<S: FileSink + ?Sized>(
    sink: &S,
    path: &Path,
    intent: EditIntent,
) -> WriteOutcome {
    let failure = |reason: FailureReason, rendered_text: String| {
        warn!("Failed to persist {}: {}", path.display(), reason);
        PersistFailure {
            reason,
            rendered_text,
            target_path: path.to_path_buf(),
        }
    };

    let mut document = load(path).map_err(|e| failure(e.into(), String::new()))?;

    let target = intent.resulting_name().to_string();
    if let Err(e) = document.apply(intent) {
        return Err(failure(e.into(), render_preview(&document)));
    }

    let text = match render(&document) {
        Ok(text) => text,
        Err(e) => return Err(failure(e.into(), render_preview(&document))),
    };

    sink.write_atomically(path, &text)
        .map_err(|e| failure(e.into(), text.clone()))?;

    info!("Saved section [{}] to {}", target, path.display());
    Ok(())
}

impl PersistFailure {
    /// Whether the rendered text shows the intended new content
    pub fn has_preview(&self) -> bool {
        matches!(
            self.reason,
            FailureReason::Unrenderable(_) | FailureReason::Write(_)
        )
    }
}
