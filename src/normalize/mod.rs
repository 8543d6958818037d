//! Normalization of generated AsciiDoc files.
//!
//! Three steps, always in this order:
//!
//! 1. [`backup`]    — timestamped safety copy into the quarantine directory;
//!    failure aborts the file before anything is mutated
//! 2. [`reconcile`] — rewrite `image::` directives against the files that
//!    actually exist in the images directory
//! 3. [`cleanup`]   — deterministic whitespace passes
//!
//! The original file is rewritten once, at the end, with the fully
//! transformed text, via a temp-file-and-rename so a crash mid-write leaves
//! either the untouched original or the finished result, never a
//! half-written file.

pub mod backup;
pub mod cleanup;
pub mod reconcile;

pub use backup::backup_file;
pub use cleanup::cleanup;
pub use reconcile::{reconcile_references, ReconcileReport, FUZZY_CUTOFF};

use crate::config::ConversionConfig;
use crate::error::Docx2AdocError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of normalizing one markup file.
#[derive(Debug)]
pub struct NormalizeOutcome {
    /// The file that was normalized.
    pub path: PathBuf,
    /// Where the pre-mutation copy went.
    pub backup_path: PathBuf,
    /// Reference reconciliation statistics.
    pub report: ReconcileReport,
    /// Whether the rewrite changed the file at all.
    pub changed: bool,
}

/// Normalize a single AsciiDoc file in place.
///
/// The images directory and the backup quarantine are resolved relative to
/// the file's own directory, so normalization works on any output tree that
/// keeps the batch layout, not only the configured one.
pub fn normalize_file(
    path: &Path,
    config: &ConversionConfig,
) -> Result<NormalizeOutcome, Docx2AdocError> {
    if !path.exists() {
        return Err(Docx2AdocError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let images_dir = parent.join(&config.images_dir_name);
    let backup_dir = parent.join(&config.backup_dir_name);

    // Backup before any mutation; failure here must stop everything.
    let backup_path = backup_file(path, &backup_dir)?;

    let original = std::fs::read_to_string(path).map_err(|e| Docx2AdocError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let (reconciled, report) = reconcile_references(&original, &images_dir);
    let cleaned = cleanup(&reconciled);

    let changed = cleaned != original;
    if changed {
        // Atomic rewrite: temp file + rename.
        let tmp_path = path.with_extension("adoc.tmp");
        std::fs::write(&tmp_path, &cleaned).map_err(|e| Docx2AdocError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, path).map_err(|e| Docx2AdocError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    info!(
        "Normalized {}: {} exact, {} corrected, {} unresolved{}",
        path.display(),
        report.exact,
        report.corrections.len(),
        report.unresolved.len(),
        if changed { "" } else { " (no changes)" }
    );

    Ok(NormalizeOutcome {
        path: path.to_path_buf(),
        backup_path,
        report,
        changed,
    })
}

/// Normalize every `*.adoc` file in the configured output directory.
///
/// Files are processed in sorted order. A per-file failure is logged and the
/// batch continues; only an unreadable output directory is fatal.
pub fn normalize_batch(
    config: &ConversionConfig,
) -> Result<Vec<NormalizeOutcome>, Docx2AdocError> {
    let dir = &config.output_dir;
    let entries = std::fs::read_dir(dir).map_err(|_| Docx2AdocError::InputDirMissing {
        path: dir.clone(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "adoc").unwrap_or(false))
        .collect();
    files.sort();

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        match normalize_file(&file, config) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => warn!("Skipping '{}': {e}", file.display()),
        }
    }
    Ok(outcomes)
}
