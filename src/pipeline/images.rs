//! Image extraction: copy an embedded media blob out of the package.
//!
//! Callers treat failure here as soft: the Sequence Builder logs a warning
//! and drops the image unit, so one broken relationship never aborts the
//! surrounding document. The blob is written verbatim — DOCX media is
//! overwhelmingly PNG, and the generation service reads pixels, not
//! extensions, so no transcoding happens.

use crate::error::Docx2AdocError;
use crate::package::DocxPackage;
use std::path::Path;
use tracing::debug;

/// Extract the media blob behind `rel_id` and persist it at `dest`.
///
/// Resolves the run's embedded-relationship id against the document
/// relationship table, reads the binary part, creates parent directories as
/// needed, and writes the bytes. One file is written per successful call.
pub fn extract_image(
    package: &DocxPackage,
    rel_id: &str,
    dest: &Path,
) -> Result<(), Docx2AdocError> {
    let part = package
        .relationships()
        .resolve_target(rel_id)
        .ok_or_else(|| Docx2AdocError::MissingPart {
            part: format!("relationship '{rel_id}'"),
        })?;

    let bytes = package.read_binary(&part)?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Docx2AdocError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(dest, &bytes).map_err(|e| Docx2AdocError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    debug!("Extracted {} ({} bytes) → {}", part, bytes.len(), dest.display());
    Ok(())
}
