//! Atomic file replacement
//!
//! Text is written to a temp file in the target's directory, flushed to disk
//! and renamed over the target. Readers see either the old or the new file,
//! never a truncated one, and a failed write leaves the target untouched.

use crate::error::WriteError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tracing::{debug, warn};

/// Destination for rendered configuration text
pub trait FileSink {
    /// Replace the file at `path` with `text`, all or nothing
    fn write_atomically(&self, path: &Path, text: &str) -> Result<(), WriteError>;
}

/// Writes through a same-directory temp file and rename
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFile;

impl FileSink for AtomicFile {
    fn write_atomically(&self, path: &Path, text: &str) -> Result<(), WriteError> {
        write_atomically(path, text)
    }
}

/// Replace the file at `path` with `text`
///
/// A symlinked target is followed: the file it points to is replaced and the
/// link stays in place. A new file gets the same mode a plain create would
/// give it under the current umask.
pub fn write_atomically(path: &Path, text: &str) -> Result<(), WriteError> {
    let fail = |source: std::io::Error| WriteError::from_io(path, source);

    let target = resolve_target(path).map_err(fail)?;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Dropping the temp file on any early return removes it
    let mut tmp = temp_builder().tempfile_in(dir).map_err(fail)?;
    tmp.write_all(text.as_bytes()).map_err(fail)?;
    tmp.flush().map_err(fail)?;
    tmp.as_file().sync_all().map_err(fail)?;

    #[cfg(unix)]
    if let Ok(metadata) = std::fs::metadata(&target) {
        std::fs::set_permissions(tmp.path(), metadata.permissions()).map_err(fail)?;
    }

    tmp.persist(&target).map_err(|e| fail(e.error))?;

    #[cfg(unix)]
    if let Ok(parent) = std::fs::File::open(dir) {
        if let Err(e) = parent.sync_all() {
            warn!("Failed to sync directory {}: {}", dir.display(), e);
        }
    }

    debug!("Wrote {} bytes to {}", text.len(), target.display());
    Ok(())
}

/// The file a write to `path` should land in
///
/// Symlinks are resolved so the rename replaces the linked file instead of
/// the link. A dangling link cannot be resolved and fails.
fn resolve_target(path: &Path) -> std::io::Result<PathBuf> {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            let target = std::fs::canonicalize(path)?;
            debug!("{} is a link to {}", path.display(), target.display());
            Ok(target)
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Temp files are opened with mode 0666 so the umask decides, as it would
/// for a file created directly
fn temp_builder() -> Builder<'static, 'static> {
    #[allow(unused_mut)]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder
}
