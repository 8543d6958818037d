//! Pre-mutation backup copies.
//!
//! Every file the normalizer is about to rewrite gets a timestamped copy in
//! a quarantine directory first. The directory is append-only from this
//! crate's point of view: nothing here ever deletes or prunes old copies,
//! so a bad normalization run is always recoverable by hand.

use crate::error::Docx2AdocError;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

/// Copy `path` into `backup_dir` under a timestamped name and return the
/// backup's path.
///
/// The copy is named `<stem>_<YYYYMMDD_HHMMSS>.<ext>` (extension omitted
/// when the source has none). Permissions come along via `fs::copy`;
/// timestamps are carried over best-effort afterwards. Two backups of the
/// same file within one second collide on the name and the later copy wins.
///
/// Any failure to produce the copy is fatal for the file: callers must not
/// touch the original when this returns `Err`.
pub fn backup_file(path: &Path, backup_dir: &Path) -> Result<PathBuf, Docx2AdocError> {
    std::fs::create_dir_all(backup_dir).map_err(|e| Docx2AdocError::BackupFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    let name = match path.extension() {
        Some(ext) => format!("{stem}_{timestamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{timestamp}"),
    };
    let backup_path = backup_dir.join(name);

    std::fs::copy(path, &backup_path).map_err(|e| Docx2AdocError::BackupFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    copy_timestamps(path, &backup_path);

    info!("Backed up {} → {}", path.display(), backup_path.display());
    Ok(backup_path)
}

/// Carry the source's access and modification times onto the copy.
/// Best-effort: the backup's bytes are already safe, so a timestamp failure
/// on an exotic filesystem is not worth aborting for.
fn copy_timestamps(src: &Path, dest: &Path) {
    let Ok(metadata) = std::fs::metadata(src) else {
        return;
    };
    let (Ok(accessed), Ok(modified)) = (metadata.accessed(), metadata.modified()) else {
        return;
    };
    let times = std::fs::FileTimes::new()
        .set_accessed(accessed)
        .set_modified(modified);
    if let Ok(file) = std::fs::File::options().write(true).open(dest) {
        let _ = file.set_times(times);
    }
}
